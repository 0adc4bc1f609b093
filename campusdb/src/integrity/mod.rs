// Cross-table rules: uniqueness, cascades and reference checks.
//
// Everything here works on record sets that the store has already loaded;
// nothing in this module touches the filesystem.

use crate::error::{CampusDbError, Result};
use crate::schema::{same_text, College, Entity, Program, Record, Student, NOT_APPLICABLE};
use crate::validation;
use serde::Serialize;
use std::collections::HashMap;

/// Number of dependent records rewritten by a cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cascade {
    pub programs: usize,
    pub students: usize,
}

fn ensure_unique_field<R>(
    records: &[R],
    skip: Option<usize>,
    field: &'static str,
    value: &str,
    get: impl Fn(&R) -> &str,
    eq: impl Fn(&str, &str) -> bool,
) -> Result<()>
where
    R: Record,
{
    let collides = records
        .iter()
        .enumerate()
        .any(|(i, r)| Some(i) != skip && eq(get(r), value));

    if collides {
        return Err(CampusDbError::DuplicateKey {
            entity: R::ENTITY,
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// `skip` is the index of the record being updated, if any.
pub fn ensure_unique_student(students: &[Student], id: &str, skip: Option<usize>) -> Result<()> {
    ensure_unique_field(students, skip, "Student ID", id, |s| &s.id, |a, b| a == b)
}

/// Name and code must each be unused by any other college.
pub fn ensure_unique_college(
    colleges: &[College],
    candidate: &College,
    skip: Option<usize>,
) -> Result<()> {
    ensure_unique_field(colleges, skip, "College Name", &candidate.name, |c| &c.name, same_text)?;
    ensure_unique_field(colleges, skip, "College Code", &candidate.code, |c| &c.code, same_text)
}

/// Name and code must each be unused by any other program.
pub fn ensure_unique_program(
    programs: &[Program],
    candidate: &Program,
    skip: Option<usize>,
) -> Result<()> {
    ensure_unique_field(programs, skip, "Program Name", &candidate.name, |p| &p.name, same_text)?;
    ensure_unique_field(programs, skip, "Program Code", &candidate.code, |p| &p.code, same_text)
}

/// Copy the owning college's current name onto `program`, if the code
/// resolves. A detached program gets the sentinel for both fields.
pub fn snapshot_program_college(program: &mut Program, colleges: &[College]) {
    if program.college_code == NOT_APPLICABLE {
        program.college_name = NOT_APPLICABLE.to_string();
    } else if let Some(college) = colleges.iter().find(|c| c.code == program.college_code) {
        program.college_name = college.name.clone();
    }
}

/// The program's college code must name an existing college. `allow_detached`
/// permits the sentinel, for programs whose college was deleted. An empty
/// code is left to field validation.
pub fn ensure_program_references(
    program: &Program,
    colleges: &[College],
    allow_detached: bool,
) -> Result<()> {
    if program.college_code.trim().is_empty() {
        return Ok(());
    }
    if program.college_code == NOT_APPLICABLE {
        if allow_detached {
            return Ok(());
        }
        return Err(CampusDbError::ReferentialIntegrity(format!(
            "Program {} must belong to a college",
            program.code
        )));
    }
    if !colleges.iter().any(|c| c.code == program.college_code) {
        return Err(CampusDbError::ReferentialIntegrity(format!(
            "Program {} references unknown college code '{}'",
            program.code, program.college_code
        )));
    }
    Ok(())
}

/// Refresh the student's college and program names from the referenced
/// records, so the stored pairs always agree with the source tables.
pub fn snapshot_student(student: &mut Student, colleges: &[College], programs: &[Program]) {
    if let Some(college) = colleges.iter().find(|c| c.code == student.college_code) {
        student.college_name = college.name.clone();
    }
    if student.program_code == NOT_APPLICABLE {
        student.program_name = NOT_APPLICABLE.to_string();
    } else if let Some(program) = programs.iter().find(|p| p.code == student.program_code) {
        student.program_name = program.name.clone();
    }
}

/// The student's college must exist; its program, unless the sentinel, must
/// exist and belong to that college. Empty codes are left to field validation.
pub fn ensure_student_references(
    student: &Student,
    colleges: &[College],
    programs: &[Program],
) -> Result<()> {
    if !student.college_code.trim().is_empty()
        && !colleges.iter().any(|c| c.code == student.college_code)
    {
        return Err(CampusDbError::ReferentialIntegrity(format!(
            "Student {} references unknown college code '{}'",
            student.id, student.college_code
        )));
    }

    if !student.has_program() || student.program_code.trim().is_empty() {
        return Ok(());
    }

    match programs.iter().find(|p| p.code == student.program_code) {
        None => Err(CampusDbError::ReferentialIntegrity(format!(
            "Student {} references unknown program code '{}'",
            student.id, student.program_code
        ))),
        Some(program) if program.college_code != student.college_code => {
            Err(CampusDbError::ReferentialIntegrity(format!(
                "Program {} belongs to college '{}', not '{}'",
                program.code, program.college_code, student.college_code
            )))
        }
        Some(_) => Ok(()),
    }
}

/// Point every program and student that referenced `old_code` at `updated`.
/// Students' program fields are left alone.
pub fn rename_college(
    programs: &mut [Program],
    students: &mut [Student],
    old_code: &str,
    updated: &College,
) -> Cascade {
    let mut cascade = Cascade::default();

    for program in programs.iter_mut().filter(|p| p.college_code == old_code) {
        if program.college_name != updated.name || program.college_code != updated.code {
            program.college_name = updated.name.clone();
            program.college_code = updated.code.clone();
            cascade.programs += 1;
        }
    }

    for student in students.iter_mut().filter(|s| s.college_code == old_code) {
        if student.college_name != updated.name || student.college_code != updated.code {
            student.college_name = updated.name.clone();
            student.college_code = updated.code.clone();
            cascade.students += 1;
        }
    }

    cascade
}

/// Set the college reference of every dependent of `code` to the sentinel.
pub fn detach_college(programs: &mut [Program], students: &mut [Student], code: &str) -> Cascade {
    let mut cascade = Cascade::default();

    for program in programs.iter_mut().filter(|p| p.college_code == code) {
        program.detach_college();
        cascade.programs += 1;
    }
    for student in students.iter_mut().filter(|s| s.college_code == code) {
        student.detach_college();
        cascade.students += 1;
    }

    cascade
}

/// Point every student enrolled in `old_code` at `updated`: program name and
/// code, and the program's college if it moved.
pub fn rename_program(students: &mut [Student], old_code: &str, updated: &Program) -> usize {
    let mut changed = 0;

    for student in students.iter_mut().filter(|s| s.program_code == old_code) {
        let before = student.clone();
        student.program_name = updated.name.clone();
        student.program_code = updated.code.clone();
        if student.college_code != updated.college_code {
            student.college_name = updated.college_name.clone();
            student.college_code = updated.college_code.clone();
        }
        if *student != before {
            changed += 1;
        }
    }

    changed
}

/// Set the program reference of every student enrolled in `code` to the
/// sentinel. College fields are kept.
pub fn detach_program(students: &mut [Student], code: &str) -> usize {
    let mut changed = 0;
    for student in students.iter_mut().filter(|s| s.program_code == code) {
        student.detach_program();
        changed += 1;
    }
    changed
}

/// A problem found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub entity: Entity,
    pub key: String,
    pub message: String,
}

/// Result of a full consistency scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub colleges: usize,
    pub programs: usize,
    pub students: usize,
    pub issues: Vec<Issue>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, entity: Entity, key: &str, message: String) {
        self.issues.push(Issue {
            entity,
            key: key.to_string(),
            message,
        });
    }
}

/// Scan all three tables for format violations, duplicate keys, dangling
/// references and stale snapshots.
///
/// Stored names and codes are only checked for presence: values that were
/// accepted when they were entered are not re-judged.
pub fn check(colleges: &[College], programs: &[Program], students: &[Student]) -> IntegrityReport {
    let mut report = IntegrityReport {
        colleges: colleges.len(),
        programs: programs.len(),
        students: students.len(),
        issues: Vec::new(),
    };

    check_records(&mut report, colleges);
    check_records(&mut report, programs);
    check_records(&mut report, students);

    check_duplicates(&mut report, colleges, "College Name", |c| &c.name);
    check_duplicates(&mut report, colleges, "College Code", |c| &c.code);
    check_duplicates(&mut report, programs, "Program Name", |p| &p.name);
    check_duplicates(&mut report, programs, "Program Code", |p| &p.code);
    check_duplicates(&mut report, students, "Student ID", |s| &s.id);

    let colleges_by_code: HashMap<&str, &College> =
        colleges.iter().map(|c| (c.code.as_str(), c)).collect();
    let programs_by_code: HashMap<&str, &Program> =
        programs.iter().map(|p| (p.code.as_str(), p)).collect();

    for program in programs {
        if program.college_code == NOT_APPLICABLE {
            continue;
        }
        match colleges_by_code.get(program.college_code.as_str()) {
            None => report.push(
                Entity::Program,
                &program.code,
                format!("references missing college '{}'", program.college_code),
            ),
            Some(college) if college.name != program.college_name => report.push(
                Entity::Program,
                &program.code,
                format!(
                    "college name '{}' is stale, college {} is now '{}'",
                    program.college_name, college.code, college.name
                ),
            ),
            Some(_) => {}
        }
    }

    for student in students {
        if student.college_code != NOT_APPLICABLE {
            match colleges_by_code.get(student.college_code.as_str()) {
                None => report.push(
                    Entity::Student,
                    &student.id,
                    format!("references missing college '{}'", student.college_code),
                ),
                Some(college) if college.name != student.college_name => report.push(
                    Entity::Student,
                    &student.id,
                    format!(
                        "college name '{}' is stale, college {} is now '{}'",
                        student.college_name, college.code, college.name
                    ),
                ),
                Some(_) => {}
            }
        }

        if !student.has_program() {
            continue;
        }
        match programs_by_code.get(student.program_code.as_str()) {
            None => report.push(
                Entity::Student,
                &student.id,
                format!("references missing program '{}'", student.program_code),
            ),
            Some(program) => {
                if program.name != student.program_name {
                    report.push(
                        Entity::Student,
                        &student.id,
                        format!(
                            "program name '{}' is stale, program {} is now '{}'",
                            student.program_name, program.code, program.name
                        ),
                    );
                }
                if program.college_code != student.college_code {
                    report.push(
                        Entity::Student,
                        &student.id,
                        format!(
                            "enrolled in {} of college '{}' but assigned to college '{}'",
                            program.code, program.college_code, student.college_code
                        ),
                    );
                }
            }
        }
    }

    report
}

fn check_records<R: Record>(report: &mut IntegrityReport, records: &[R]) {
    for record in records {
        for message in validation::validate_stored(record).errors {
            report.push(R::ENTITY, record.key(), message);
        }
    }
}

fn check_duplicates<R: Record>(
    report: &mut IntegrityReport,
    records: &[R],
    field: &str,
    get: impl Fn(&R) -> &str,
) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for record in records {
        *seen.entry(get(record).trim().to_lowercase()).or_default() += 1;
    }
    let mut reported = std::collections::HashSet::new();
    for record in records {
        let value = get(record);
        let normalized = value.trim().to_lowercase();
        if seen[&normalized] > 1 && reported.insert(normalized) {
            report.push(
                R::ENTITY,
                record.key(),
                format!("duplicate {field} '{value}'"),
            );
        }
    }
}
