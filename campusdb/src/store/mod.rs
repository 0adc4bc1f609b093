use crate::catalog;
use crate::config::Config;
use crate::error::{CampusDbError, Result};
use crate::integrity::{self, IntegrityReport};
use crate::query::{self, StudentQuery};
use crate::schema::{self, same_text, College, Entity, Program, Record, Student};
use crate::stats::{self, Summary};
use crate::table::{StagedTable, Table};
use crate::validation;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a successful mutation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// Tables rewritten, primary table first.
    pub tables: Vec<Entity>,
    pub messages: Vec<String>,
}

/// The main entry point for CampusDB.
///
/// Holds the three table files of a data directory and is the only way to
/// write them: every mutation re-reads what it needs, applies uniqueness
/// and cascade rules, stages every affected table, and then moves the
/// staged files into place, primary table first.
pub struct Store {
    root: PathBuf,
    config: Config,
    students: Table<Student>,
    colleges: Table<College>,
    programs: Table<Program>,
}

impl Store {
    /// Open a store in an existing data directory, reading `campusdb.yaml`
    /// if present. Table files are created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(CampusDbError::Storage {
                path: root,
                message: "data directory does not exist".into(),
            });
        }
        let config = Config::load(&root)?;
        Self::with_config(root, config)
    }

    /// Like [`Store::open`], creating the data directory if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;
        Self::open(path)
    }

    pub fn with_config(root: impl Into<PathBuf>, config: Config) -> Result<Self> {
        let root = root.into();
        let delimiter = config.delimiter_byte()?;
        let store = Store {
            students: Table::new(root.join(&config.students_file), delimiter),
            colleges: Table::new(root.join(&config.colleges_file), delimiter),
            programs: Table::new(root.join(&config.programs_file), delimiter),
            root,
            config,
        };
        log::debug!("Opened store at {}", store.root.display());
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the backing file for `entity`.
    pub fn table_path(&self, entity: Entity) -> &Path {
        match entity {
            Entity::Student => self.students.path(),
            Entity::College => self.colleges.path(),
            Entity::Program => self.programs.path(),
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn colleges(&self) -> Result<Vec<College>> {
        self.colleges.load()
    }

    pub fn programs(&self) -> Result<Vec<Program>> {
        self.programs.load()
    }

    /// All students, in stored (last name, first name) order.
    pub fn students(&self) -> Result<Vec<Student>> {
        self.students.load()
    }

    pub fn college(&self, code: &str) -> Result<College> {
        find(self.colleges.load()?, code)
    }

    pub fn program(&self, code: &str) -> Result<Program> {
        find(self.programs.load()?, code)
    }

    pub fn student(&self, id: &str) -> Result<Student> {
        find(self.students.load()?, id)
    }

    /// Filter, search and sort the students table.
    pub fn query(&self, query: &StudentQuery) -> Result<Vec<Student>> {
        Ok(query::run(self.students.load()?, query))
    }

    pub fn college_options(&self) -> Result<Vec<String>> {
        Ok(query::college_options(&self.colleges.load()?))
    }

    pub fn program_options(&self, college: &str) -> Result<Vec<String>> {
        Ok(query::program_options(&self.programs.load()?, college))
    }

    /// Table sizes and per-college counts, computed from the current files.
    pub fn summary(&self) -> Result<Summary> {
        let colleges = self.colleges.load()?;
        let programs = self.programs.load()?;
        let students = self.students.load()?;
        Ok(stats::summarize(&colleges, &programs, &students))
    }

    /// Scan every table for violations and broken references.
    pub fn check(&self) -> Result<IntegrityReport> {
        let colleges = self.colleges.load()?;
        let programs = self.programs.load()?;
        let students = self.students.load()?;
        Ok(integrity::check(&colleges, &programs, &students))
    }

    // ── Colleges ────────────────────────────────────────────────────

    pub fn add_college(&self, college: College) -> Result<Commit> {
        validation::validate_record(&college).into_result()?;

        let mut colleges = self.colleges.load()?;
        integrity::ensure_unique_college(&colleges, &college, None)?;

        let message = format!("Added college {} ({})", college.name, college.code);
        colleges.push(college);
        self.commit(vec![self.colleges.stage(&colleges)?], vec![message])
    }

    /// Replace the college identified by `code`. Programs and students that
    /// referenced the old code follow the new name and code.
    pub fn edit_college(&self, code: &str, updated: College) -> Result<Commit> {
        let mut colleges = self.colleges.load_existing()?;
        let idx = position(&colleges, code)?;
        let previous = colleges[idx].clone();

        validation::validate_changes(&updated, &previous).into_result()?;
        integrity::ensure_unique_college(&colleges, &updated, Some(idx))?;

        let mut programs = self.programs.load()?;
        let mut students = self.students.load()?;
        let cascade = integrity::rename_college(&mut programs, &mut students, &previous.code, &updated);

        let mut messages = vec![format!(
            "Updated college {} ({}) to {} ({})",
            previous.name, previous.code, updated.name, updated.code
        )];
        colleges[idx] = updated;

        let mut staged = vec![self.colleges.stage(&colleges)?];
        if cascade.programs > 0 {
            staged.push(self.programs.stage(&programs)?);
            messages.push(format!("Updated {} program(s)", cascade.programs));
        }
        if cascade.students > 0 {
            schema::sort_for_storage(&mut students);
            staged.push(self.students.stage(&students)?);
            messages.push(format!("Updated {} student(s)", cascade.students));
        }
        self.commit(staged, messages)
    }

    /// Remove a college. Its programs and students stay, with their college
    /// reference set to `N/A`.
    pub fn delete_college(&self, code: &str) -> Result<Commit> {
        let mut colleges = self.colleges.load_existing()?;
        let idx = position(&colleges, code)?;
        let removed = colleges.remove(idx);

        let mut programs = self.programs.load()?;
        let mut students = self.students.load()?;
        let cascade = integrity::detach_college(&mut programs, &mut students, &removed.code);

        let mut messages = vec![format!("Deleted college {} ({})", removed.name, removed.code)];
        let mut staged = vec![self.colleges.stage(&colleges)?];
        if cascade.programs > 0 {
            staged.push(self.programs.stage(&programs)?);
            messages.push(format!("Detached {} program(s)", cascade.programs));
        }
        if cascade.students > 0 {
            schema::sort_for_storage(&mut students);
            staged.push(self.students.stage(&students)?);
            messages.push(format!("Detached {} student(s)", cascade.students));
        }
        self.commit(staged, messages)
    }

    // ── Programs ────────────────────────────────────────────────────

    /// Add a program. Its college name is taken from the colleges table.
    pub fn add_program(&self, mut program: Program) -> Result<Commit> {
        let colleges = self.colleges.load()?;
        integrity::snapshot_program_college(&mut program, &colleges);
        integrity::ensure_program_references(&program, &colleges, false)?;
        validation::validate_record(&program).into_result()?;

        let mut programs = self.programs.load()?;
        integrity::ensure_unique_program(&programs, &program, None)?;

        let message = format!(
            "Added program {} ({}) to {}",
            program.name, program.code, program.college_code
        );
        programs.push(program);
        self.commit(vec![self.programs.stage(&programs)?], vec![message])
    }

    /// Replace the program identified by `code`. Enrolled students follow the
    /// new name and code, and the new college if the program moved.
    pub fn update_program(&self, code: &str, mut updated: Program) -> Result<Commit> {
        let mut programs = self.programs.load_existing()?;
        let idx = position(&programs, code)?;
        let previous = programs[idx].clone();

        let colleges = self.colleges.load()?;
        integrity::snapshot_program_college(&mut updated, &colleges);
        integrity::ensure_program_references(&updated, &colleges, true)?;
        validation::validate_changes(&updated, &previous).into_result()?;
        integrity::ensure_unique_program(&programs, &updated, Some(idx))?;

        let mut students = self.students.load()?;
        let changed = integrity::rename_program(&mut students, &previous.code, &updated);

        let mut messages = vec![format!(
            "Updated program {} ({}) to {} ({})",
            previous.name, previous.code, updated.name, updated.code
        )];
        programs[idx] = updated;

        let mut staged = vec![self.programs.stage(&programs)?];
        if changed > 0 {
            schema::sort_for_storage(&mut students);
            staged.push(self.students.stage(&students)?);
            messages.push(format!("Updated {changed} student(s)"));
        }
        self.commit(staged, messages)
    }

    /// Remove a program. Enrolled students keep their college and get
    /// `N/A` as their program.
    pub fn delete_program(&self, code: &str) -> Result<Commit> {
        let mut programs = self.programs.load_existing()?;
        let idx = position(&programs, code)?;
        let removed = programs.remove(idx);

        let mut students = self.students.load()?;
        let changed = integrity::detach_program(&mut students, &removed.code);

        let mut messages = vec![format!("Deleted program {} ({})", removed.name, removed.code)];
        let mut staged = vec![self.programs.stage(&programs)?];
        if changed > 0 {
            schema::sort_for_storage(&mut students);
            staged.push(self.students.stage(&students)?);
            messages.push(format!("Detached {changed} student(s)"));
        }
        self.commit(staged, messages)
    }

    // ── Students ────────────────────────────────────────────────────

    /// Register a student. College and program names are filled in from
    /// their codes.
    pub fn add_student(&self, mut student: Student) -> Result<Commit> {
        let colleges = self.colleges.load()?;
        let programs = self.programs.load()?;
        integrity::snapshot_student(&mut student, &colleges, &programs);
        integrity::ensure_student_references(&student, &colleges, &programs)?;
        validation::validate_record(&student).into_result()?;

        let mut students = self.students.load()?;
        integrity::ensure_unique_student(&students, &student.id, None)?;

        let message = format!(
            "Added student {} ({} {})",
            student.id, student.first_name, student.last_name
        );
        students.push(student);
        schema::sort_for_storage(&mut students);
        self.commit(vec![self.students.stage(&students)?], vec![message])
    }

    /// Replace the student identified by `id`; the ID itself may change.
    pub fn update_student(&self, id: &str, mut updated: Student) -> Result<Commit> {
        let mut students = self.students.load_existing()?;
        let idx = position(&students, id)?;

        let colleges = self.colleges.load()?;
        let programs = self.programs.load()?;
        integrity::snapshot_student(&mut updated, &colleges, &programs);
        integrity::ensure_student_references(&updated, &colleges, &programs)?;
        validation::validate_record(&updated).into_result()?;
        integrity::ensure_unique_student(&students, &updated.id, Some(idx))?;

        let message = if updated.id == id {
            format!("Updated student {id}")
        } else {
            format!("Updated student {id} (now {})", updated.id)
        };
        students[idx] = updated;
        schema::sort_for_storage(&mut students);
        self.commit(vec![self.students.stage(&students)?], vec![message])
    }

    pub fn delete_student(&self, id: &str) -> Result<Commit> {
        self.delete_students(&[id])
    }

    /// Remove several students in one write. Every ID must exist; if one is
    /// missing nothing is deleted.
    pub fn delete_students(&self, ids: &[&str]) -> Result<Commit> {
        let mut students = self.students.load_existing()?;
        for id in ids {
            position(&students, id)?;
        }

        let mut messages = Vec::new();
        students.retain(|s| {
            let remove = ids.contains(&s.id.as_str());
            if remove {
                messages.push(format!(
                    "Deleted student {} ({} {})",
                    s.id, s.first_name, s.last_name
                ));
            }
            !remove
        });

        schema::sort_for_storage(&mut students);
        self.commit(vec![self.students.stage(&students)?], messages)
    }

    // ── Catalog ─────────────────────────────────────────────────────

    /// Add the built-in colleges and programs that are not already present.
    /// Entries that clash with existing records on only one of name or code
    /// are skipped and reported. Students are never touched.
    pub fn seed_catalog(&self) -> Result<Commit> {
        let mut colleges = self.colleges.load()?;
        let mut programs = self.programs.load()?;
        let mut messages = Vec::new();
        let (mut added_colleges, mut added_programs) = (0, 0);

        for entry in catalog::default_catalog() {
            let college = entry.college();
            let present = colleges
                .iter()
                .any(|c| same_text(&c.code, &college.code) && same_text(&c.name, &college.name));
            if !present {
                match integrity::ensure_unique_college(&colleges, &college, None) {
                    Ok(()) => {
                        colleges.push(college);
                        added_colleges += 1;
                    }
                    Err(e) => messages.push(format!("Skipped college {}: {e}", college.code)),
                }
            }

            for mut program in entry.programs() {
                if programs.iter().any(|p| p.code == program.code && p.name == program.name) {
                    continue;
                }
                integrity::snapshot_program_college(&mut program, &colleges);
                if let Err(e) = integrity::ensure_program_references(&program, &colleges, false)
                    .and_then(|()| integrity::ensure_unique_program(&programs, &program, None))
                {
                    messages.push(format!("Skipped program {}: {e}", program.code));
                    continue;
                }
                programs.push(program);
                added_programs += 1;
            }
        }

        let mut staged = Vec::new();
        if added_colleges > 0 {
            staged.push(self.colleges.stage(&colleges)?);
        }
        if added_programs > 0 {
            staged.push(self.programs.stage(&programs)?);
        }
        messages.insert(
            0,
            format!("Seeded {added_colleges} college(s) and {added_programs} program(s)"),
        );
        self.commit(staged, messages)
    }

    /// Move staged tables into place in order. A failure on the first table
    /// leaves everything untouched; a later failure is a partial commit.
    fn commit(&self, staged: Vec<StagedTable>, messages: Vec<String>) -> Result<Commit> {
        let mut committed = Vec::new();

        for table in staged {
            let entity = table.entity();
            if let Err(source) = table.commit() {
                if committed.is_empty() {
                    return Err(source);
                }
                log::warn!(
                    "Partial commit in {}: {entity} table not written: {source}",
                    self.root.display()
                );
                return Err(CampusDbError::PartialCommit {
                    committed,
                    failed: entity,
                    source: Box::new(source),
                });
            }
            committed.push(entity);
        }

        for message in &messages {
            log::info!("{message}");
        }
        Ok(Commit {
            tables: committed,
            messages,
        })
    }
}

fn position<R: Record>(records: &[R], key: &str) -> Result<usize> {
    records
        .iter()
        .position(|r| r.key() == key)
        .ok_or_else(|| CampusDbError::NotFound {
            entity: R::ENTITY,
            key: key.to_string(),
        })
}

fn find<R: Record>(mut records: Vec<R>, key: &str) -> Result<R> {
    let idx = position(&records, key)?;
    Ok(records.swap_remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortKey, ALL_COLLEGES, ALL_GENDERS, ALL_PROGRAMS};
    use crate::schema::NOT_APPLICABLE;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn student(id: &str, last: &str, first: &str, college: &str, program: &str) -> Student {
        Student {
            id: id.into(),
            last_name: last.into(),
            first_name: first.into(),
            gender: "Female".into(),
            college_name: String::new(),
            college_code: college.into(),
            program_name: String::new(),
            program_code: program.into(),
            year: "2".into(),
        }
    }

    /// Two colleges, three programs, four students.
    fn setup_test_store() -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();

        store.add_college(College::new("College of Engineering", "COE")).unwrap();
        store.add_college(College::new("College of Computer Studies", "CCS")).unwrap();
        store.add_program(Program::new("Civil Engineering", "BSCE", "COE")).unwrap();
        store.add_program(Program::new("Mining Engineering", "BSMinE", "COE")).unwrap();
        store.add_program(Program::new("Computer Science", "BSCS", "CCS")).unwrap();

        store.add_student(student("2023-0001", "Reyes", "Ana", "COE", "BSCE")).unwrap();
        store.add_student(student("2023-0002", "Santos", "Ben", "COE", "BSMinE")).unwrap();
        store.add_student(student("2022-0003", "Aquino", "Carla", "CCS", "BSCS")).unwrap();
        store.add_student(student("2021-0004", "Lim", "Dan", "COE", NOT_APPLICABLE)).unwrap();

        (tmp, store)
    }

    fn read(store: &Store, entity: Entity) -> Vec<u8> {
        std::fs::read(store.table_path(entity)).unwrap()
    }

    #[test]
    fn test_open_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let result = Store::open(tmp.path().join("nope"));
        assert!(matches!(result, Err(CampusDbError::Storage { .. })));
    }

    #[test]
    fn test_create_makes_directory() {
        let tmp = TempDir::new().unwrap();
        let store = Store::create(tmp.path().join("data")).unwrap();
        assert!(store.root().is_dir());
        assert!(store.students().unwrap().is_empty());
    }

    #[test]
    fn test_first_write_creates_file_with_header() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.add_college(College::new("College of Law", "LAW")).unwrap();

        let content = std::fs::read_to_string(tmp.path().join("colleges.csv")).unwrap();
        assert_eq!(content, "College Name,College Code\nCollege of Law,LAW\n");
    }

    #[test]
    fn test_add_student_snapshots_names() {
        let (_tmp, store) = setup_test_store();
        let s = store.student("2023-0001").unwrap();
        assert_eq!(s.college_name, "College of Engineering");
        assert_eq!(s.program_name, "Civil Engineering");

        let detached = store.student("2021-0004").unwrap();
        assert_eq!(detached.program_name, NOT_APPLICABLE);
    }

    #[test]
    fn test_students_persisted_in_name_order() {
        let (_tmp, store) = setup_test_store();
        let ids: Vec<String> = store.students().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["2022-0003", "2021-0004", "2023-0001", "2023-0002"]);
    }

    #[test]
    fn test_duplicate_student_id_leaves_table_unchanged() {
        let (_tmp, store) = setup_test_store();
        let before = read(&store, Entity::Student);

        let err = store
            .add_student(student("2023-0001", "Other", "Person", "CCS", "BSCS"))
            .unwrap_err();
        assert!(matches!(
            err,
            CampusDbError::DuplicateKey { entity: Entity::Student, field: "Student ID", .. }
        ));
        assert_eq!(read(&store, Entity::Student), before);
    }

    #[test]
    fn test_invalid_student_reports_every_violation() {
        let (_tmp, store) = setup_test_store();
        let mut s = student("23-1", "R2", "", "COE", "BSCE");
        s.gender = "M".into();
        let err = store.add_student(s).unwrap_err();
        match err {
            CampusDbError::Validation(errors) => assert_eq!(errors.len(), 4, "{errors:?}"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.students().unwrap().len(), 4);
    }

    #[test]
    fn test_student_program_must_match_college() {
        let (_tmp, store) = setup_test_store();
        let err = store
            .add_student(student("2024-0001", "Cruz", "Eve", "CCS", "BSCE"))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)));
    }

    #[test]
    fn test_update_student_keeps_ids_unique() {
        let (_tmp, store) = setup_test_store();
        let mut s = store.student("2023-0001").unwrap();
        s.id = "2023-0002".into();
        let err = store.update_student("2023-0001", s.clone()).unwrap_err();
        assert!(matches!(err, CampusDbError::DuplicateKey { .. }));

        s.id = "2023-0001".into();
        s.year = "3".into();
        store.update_student("2023-0001", s).unwrap();
        assert_eq!(store.student("2023-0001").unwrap().year, "3");

        let mut s = store.student("2023-0001").unwrap();
        s.id = "2023-0099".into();
        store.update_student("2023-0001", s).unwrap();
        assert!(store.student("2023-0001").is_err());
        assert_eq!(store.students().unwrap().len(), 4);
    }

    #[test]
    fn test_update_missing_student() {
        let (_tmp, store) = setup_test_store();
        let s = store.student("2023-0001").unwrap();
        let err = store.update_student("1999-0000", s).unwrap_err();
        assert!(matches!(err, CampusDbError::NotFound { entity: Entity::Student, .. }));
    }

    #[test]
    fn test_update_without_table_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let err = store.delete_student("2023-0001").unwrap_err();
        assert!(matches!(err, CampusDbError::Storage { .. }));
    }

    #[test]
    fn test_delete_student() {
        let (_tmp, store) = setup_test_store();
        let commit = store.delete_student("2023-0002").unwrap();
        assert_eq!(commit.tables, vec![Entity::Student]);
        assert!(matches!(
            store.student("2023-0002"),
            Err(CampusDbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_college_rename_cascades() {
        let (_tmp, store) = setup_test_store();
        let commit = store
            .edit_college("COE", College::new("College of Engineering and Technology", "ENGR"))
            .unwrap();
        assert_eq!(
            commit.tables,
            vec![Entity::College, Entity::Program, Entity::Student]
        );

        for p in store.programs().unwrap() {
            if p.code == "BSCS" {
                assert_eq!(p.college_code, "CCS");
            } else {
                assert_eq!(p.college_code, "ENGR");
                assert_eq!(p.college_name, "College of Engineering and Technology");
            }
        }
        for s in store.students().unwrap() {
            if s.id == "2022-0003" {
                assert_eq!(s.college_code, "CCS");
            } else {
                assert_eq!(s.college_code, "ENGR");
            }
        }
        assert_eq!(store.student("2023-0001").unwrap().program_code, "BSCE");
        assert!(store.check().unwrap().is_clean());
    }

    #[test]
    fn test_college_rename_collision_is_atomic() {
        let (_tmp, store) = setup_test_store();
        let colleges = read(&store, Entity::College);
        let programs = read(&store, Entity::Program);
        let students = read(&store, Entity::Student);

        let err = store
            .edit_college("COE", College::new("College of Engineering", "CCS"))
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(read(&store, Entity::College), colleges);
        assert_eq!(read(&store, Entity::Program), programs);
        assert_eq!(read(&store, Entity::Student), students);
    }

    #[test]
    fn test_college_name_only_edit() {
        let (_tmp, store) = setup_test_store();
        store
            .edit_college("CCS", College::new("College of Computing", "CCS"))
            .unwrap();
        assert_eq!(
            store.student("2022-0003").unwrap().college_name,
            "College of Computing"
        );
        assert_eq!(store.program("BSCS").unwrap().college_name, "College of Computing");
    }

    #[test]
    fn test_delete_college_detaches_dependents() {
        let (_tmp, store) = setup_test_store();
        let before = store.student("2023-0001").unwrap();

        store.delete_college("COE").unwrap();

        assert_eq!(store.colleges().unwrap().len(), 1);
        assert_eq!(store.programs().unwrap().len(), 3);
        assert_eq!(store.students().unwrap().len(), 4);

        let p = store.program("BSCE").unwrap();
        assert_eq!(p.college_name, NOT_APPLICABLE);
        assert_eq!(p.college_code, NOT_APPLICABLE);

        let after = store.student("2023-0001").unwrap();
        assert_eq!(after.college_name, NOT_APPLICABLE);
        assert_eq!(after.college_code, NOT_APPLICABLE);
        assert_eq!(after.program_code, before.program_code);
        assert_eq!(after.program_name, before.program_name);
        assert_eq!(after.last_name, before.last_name);

        assert_eq!(store.student("2022-0003").unwrap().college_code, "CCS");
        assert!(store.check().unwrap().is_clean());
    }

    #[test]
    fn test_program_rename_propagates_name_and_code() {
        let (_tmp, store) = setup_test_store();
        let mut updated = store.program("BSCE").unwrap();
        updated.name = "Civil and Structural Engineering".into();
        updated.code = "BSCSE".into();
        store.update_program("BSCE", updated).unwrap();

        let s = store.student("2023-0001").unwrap();
        assert_eq!(s.program_code, "BSCSE");
        assert_eq!(s.program_name, "Civil and Structural Engineering");
        assert_eq!(s.college_code, "COE");
        assert!(store.check().unwrap().is_clean());
    }

    #[test]
    fn test_program_moved_to_other_college() {
        let (_tmp, store) = setup_test_store();
        store
            .update_program("BSMinE", Program::new("Mining Engineering", "BSMinE", "CCS"))
            .unwrap();

        let p = store.program("BSMinE").unwrap();
        assert_eq!(p.college_name, "College of Computer Studies");
        let s = store.student("2023-0002").unwrap();
        assert_eq!(s.college_code, "CCS");
        assert_eq!(s.college_name, "College of Computer Studies");
        assert!(store.check().unwrap().is_clean());
    }

    #[test]
    fn test_program_duplicate_name_rejected() {
        let (_tmp, store) = setup_test_store();
        let err = store
            .add_program(Program::new("computer science", "BSX", "CCS"))
            .unwrap_err();
        assert!(matches!(
            err,
            CampusDbError::DuplicateKey { field: "Program Name", .. }
        ));
    }

    #[test]
    fn test_program_needs_existing_college() {
        let (_tmp, store) = setup_test_store();
        let err = store
            .add_program(Program::new("Nursing", "BSN", "CHS"))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)));
    }

    #[test]
    fn test_student_needs_existing_references() {
        let (_tmp, store) = setup_test_store();
        let before = read(&store, Entity::Student);

        let err = store
            .add_student(student("2024-0001", "Cruz", "Eve", "CHS", NOT_APPLICABLE))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)), "{err:?}");

        let err = store
            .add_student(student("2024-0001", "Cruz", "Eve", "COE", "BSEE"))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)), "{err:?}");

        let mut s = store.student("2023-0001").unwrap();
        s.college_code = "CHS".into();
        let err = store.update_student("2023-0001", s).unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)), "{err:?}");

        assert_eq!(read(&store, Entity::Student), before);
    }

    #[test]
    fn test_program_update_needs_existing_college() {
        let (_tmp, store) = setup_test_store();
        let err = store
            .update_program("BSCE", Program::new("Civil Engineering", "BSCE", "CHS"))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::ReferentialIntegrity(_)), "{err:?}");
    }

    #[test]
    fn test_missing_codes_are_validation_errors() {
        let (_tmp, store) = setup_test_store();
        let err = store
            .add_student(student("2024-0001", "Cruz", "Eve", "", NOT_APPLICABLE))
            .unwrap_err();
        assert!(matches!(err, CampusDbError::Validation(_)), "{err:?}");

        let err = store.add_program(Program::new("Nursing", "BSN", "")).unwrap_err();
        assert!(matches!(err, CampusDbError::Validation(_)), "{err:?}");
    }

    #[test]
    fn test_delete_students_in_one_write() {
        let (_tmp, store) = setup_test_store();
        let commit = store.delete_students(&["2023-0001", "2022-0003"]).unwrap();
        assert_eq!(commit.tables, vec![Entity::Student]);
        assert_eq!(commit.messages.len(), 2);

        let ids: Vec<String> = store.students().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["2021-0004", "2023-0002"]);
    }

    #[test]
    fn test_delete_students_is_all_or_nothing() {
        let (_tmp, store) = setup_test_store();
        let before = read(&store, Entity::Student);

        let err = store
            .delete_students(&["2023-0001", "1999-0000"])
            .unwrap_err();
        assert!(matches!(
            err,
            CampusDbError::NotFound { entity: Entity::Student, ref key } if key == "1999-0000"
        ));
        assert_eq!(read(&store, Entity::Student), before);
    }

    #[test]
    fn test_deletes_keep_students_sorted() {
        let (_tmp, store) = setup_test_store();
        let unsorted = |store: &Store| {
            let mut students = store.students().unwrap();
            students.reverse();
            store.students.save_all(&students).unwrap();
        };
        let stored_ids = |store: &Store| -> Vec<String> {
            store.students().unwrap().into_iter().map(|s| s.id).collect()
        };

        unsorted(&store);
        store.delete_student("2023-0002").unwrap();
        assert_eq!(stored_ids(&store), vec!["2022-0003", "2021-0004", "2023-0001"]);

        unsorted(&store);
        store.delete_program("BSCE").unwrap();
        assert_eq!(stored_ids(&store), vec!["2022-0003", "2021-0004", "2023-0001"]);

        unsorted(&store);
        store.delete_college("COE").unwrap();
        assert_eq!(stored_ids(&store), vec!["2022-0003", "2021-0004", "2023-0001"]);
    }

    #[test]
    fn test_delete_program_detaches_students() {
        let (_tmp, store) = setup_test_store();
        store.delete_program("BSCS").unwrap();

        let s = store.student("2022-0003").unwrap();
        assert_eq!(s.program_name, NOT_APPLICABLE);
        assert_eq!(s.program_code, NOT_APPLICABLE);
        assert_eq!(s.college_code, "CCS");
        assert_eq!(s.college_name, "College of Computer Studies");
        assert!(store.program("BSCS").is_err());
    }

    #[test]
    fn test_delete_without_dependents_writes_one_table() {
        let (_tmp, store) = setup_test_store();
        store.delete_student("2023-0002").unwrap();
        let commit = store.delete_program("BSMinE").unwrap();
        assert_eq!(commit.tables, vec![Entity::Program]);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let (_tmp, store) = setup_test_store();
        let before = read(&store, Entity::Student);
        let students = store.students.load().unwrap();
        store.students.save_all(&students).unwrap();
        assert_eq!(read(&store, Entity::Student), before);
    }

    #[test]
    fn test_query_through_store() {
        let (_tmp, store) = setup_test_store();
        let q = StudentQuery::from_selections(ALL_COLLEGES, ALL_PROGRAMS, ALL_GENDERS, "", SortKey::LastNameAsc);
        assert_eq!(store.query(&q).unwrap().len(), 4);

        let q = StudentQuery::from_selections("College of Engineering", ALL_PROGRAMS, ALL_GENDERS, "2023", SortKey::FirstNameAsc);
        let ids: Vec<String> = store.query(&q).unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["2023-0001", "2023-0002"]);

        assert_eq!(
            store.program_options("College of Engineering").unwrap(),
            vec![ALL_PROGRAMS, "Civil Engineering", "Mining Engineering"]
        );
        assert_eq!(store.college_options().unwrap().len(), 3);
    }

    #[test]
    fn test_summary() {
        let (_tmp, store) = setup_test_store();
        let summary = store.summary().unwrap();
        assert_eq!((summary.colleges, summary.programs, summary.students), (2, 3, 4));
        let coe = summary.per_college.iter().find(|c| c.code == "COE").unwrap();
        assert_eq!((coe.programs, coe.students), (2, 3));
    }

    #[test]
    fn test_seed_catalog_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();

        let commit = store.seed_catalog().unwrap();
        assert_eq!(commit.tables, vec![Entity::College, Entity::Program]);
        assert_eq!(store.colleges().unwrap().len(), 7);
        assert_eq!(store.programs().unwrap().len(), 49);
        assert!(store.check().unwrap().is_clean());

        let commit = store.seed_catalog().unwrap();
        assert!(commit.tables.is_empty());
        assert_eq!(commit.messages[0], "Seeded 0 college(s) and 0 program(s)");
    }

    #[test]
    fn test_seed_catalog_skips_conflicts() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.add_college(College::new("College of Nursing", "CHS")).unwrap();

        let commit = store.seed_catalog().unwrap();
        assert!(commit
            .messages
            .iter()
            .any(|m| m.starts_with("Skipped college CHS")));
        // BSN still attaches to the existing CHS college
        assert_eq!(store.program("BSN").unwrap().college_name, "College of Nursing");
    }

    #[test]
    fn test_catalog_program_editable_without_reformatting() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.seed_catalog().unwrap();

        let mut p = store.program("BSBio-Bot").unwrap();
        p.college_code = "COE".into();
        store.update_program("BSBio-Bot", p.clone()).unwrap();

        p.code = "BS-Bot".into();
        assert!(matches!(
            store.update_program("BSBio-Bot", p),
            Err(CampusDbError::Validation(_))
        ));
    }

    #[test]
    fn test_failure_on_first_table_is_plain_error() {
        let tmp = TempDir::new().unwrap();
        let store = Store::open(tmp.path()).unwrap();
        let staged = store.colleges.stage(&[College::new("College of Law", "LAW")]).unwrap();
        std::fs::create_dir_all(tmp.path().join("colleges.csv").join("blocker")).unwrap();

        let err = store.commit(vec![staged], vec![]).unwrap_err();
        assert!(matches!(err, CampusDbError::Io(_)));
    }

    #[test]
    fn test_failure_mid_cascade_is_partial_commit() {
        let (tmp, store) = setup_test_store();
        let colleges = store.colleges().unwrap();
        let programs = store.programs().unwrap();

        let staged = vec![
            store.colleges.stage(&colleges).unwrap(),
            store.programs.stage(&programs).unwrap(),
        ];
        // a non-empty directory cannot be replaced by a file
        std::fs::remove_file(tmp.path().join("programs.csv")).unwrap();
        std::fs::create_dir_all(tmp.path().join("programs.csv").join("blocker")).unwrap();

        let err = store.commit(staged, vec![]).unwrap_err();
        match err {
            CampusDbError::PartialCommit { committed, failed, .. } => {
                assert_eq!(committed, vec![Entity::College]);
                assert_eq!(failed, Entity::Program);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(Config::FILE_NAME),
            "students_file: roster.tsv\ncolleges_file: colleges.tsv\nprograms_file: programs.tsv\ndelimiter: \"\\t\"\n",
        )
        .unwrap();
        let store = Store::open(tmp.path()).unwrap();
        store.add_college(College::new("College of Law", "LAW")).unwrap();

        let content = std::fs::read_to_string(tmp.path().join("colleges.tsv")).unwrap();
        assert_eq!(content, "College Name\tCollege Code\nCollege of Law\tLAW\n");
    }
}
