use crate::schema::{College, Program, Student};
use serde::Serialize;

/// Dependent-record counts for one college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollegeStats {
    pub name: String,
    pub code: String,
    pub programs: usize,
    pub students: usize,
}

/// Table sizes and per-college counts, derived from current table contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub colleges: usize,
    pub programs: usize,
    pub students: usize,
    pub per_college: Vec<CollegeStats>,
}

/// Count programs and students per college by college code.
pub fn summarize(colleges: &[College], programs: &[Program], students: &[Student]) -> Summary {
    let per_college = colleges
        .iter()
        .map(|college| CollegeStats {
            name: college.name.clone(),
            code: college.code.clone(),
            programs: programs
                .iter()
                .filter(|p| p.college_code == college.code)
                .count(),
            students: students
                .iter()
                .filter(|s| s.college_code == college.code)
                .count(),
        })
        .collect();

    Summary {
        colleges: colleges.len(),
        programs: programs.len(),
        students: students.len(),
        per_college,
    }
}
