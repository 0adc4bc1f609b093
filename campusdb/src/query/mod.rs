use crate::schema::{College, Program, Record, Student};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const ALL_COLLEGES: &str = "All Colleges";
pub const ALL_PROGRAMS: &str = "All Programs";
pub const ALL_GENDERS: &str = "All Genders";

/// An exact-match filter on one student column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Exact(String),
}

impl Filter {
    /// Interpret a dropdown selection. Only the dimension's own `all` entry
    /// (e.g. [`ALL_COLLEGES`]) or an empty value disables the filter.
    pub fn from_selection(selection: &str, all: &str) -> Self {
        let selection = selection.trim();
        if selection.is_empty() || selection == all {
            Filter::All
        } else {
            Filter::Exact(selection.to_string())
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Exact(expected) => expected == value,
        }
    }
}

/// Ordering applied to query results. Ties always fall back to
/// (last name, first name) case-insensitively, then student ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    FirstNameAsc,
    FirstNameDesc,
    LastNameAsc,
    LastNameDesc,
    YearAsc,
    YearDesc,
    /// Female before Male.
    Gender,
    /// Female before Male, then year 4 down to 1, then last and first name.
    Priority,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::FirstNameAsc,
        SortKey::FirstNameDesc,
        SortKey::LastNameAsc,
        SortKey::LastNameDesc,
        SortKey::YearAsc,
        SortKey::YearDesc,
        SortKey::Gender,
        SortKey::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::FirstNameAsc => "First Name A-Z",
            SortKey::FirstNameDesc => "First Name Z-A",
            SortKey::LastNameAsc => "Last Name A-Z",
            SortKey::LastNameDesc => "Last Name Z-A",
            SortKey::YearAsc => "Year 1-4",
            SortKey::YearDesc => "Year 4-1",
            SortKey::Gender => "Gender",
            SortKey::Priority => "Priority",
        }
    }

    fn compare(self, a: &Student, b: &Student) -> Ordering {
        let primary = match self {
            SortKey::FirstNameAsc => lower(&a.first_name).cmp(&lower(&b.first_name)),
            SortKey::FirstNameDesc => lower(&b.first_name).cmp(&lower(&a.first_name)),
            SortKey::LastNameAsc => lower(&a.last_name).cmp(&lower(&b.last_name)),
            SortKey::LastNameDesc => lower(&b.last_name).cmp(&lower(&a.last_name)),
            SortKey::YearAsc => compare_year(&a.year, &b.year, false),
            SortKey::YearDesc => compare_year(&a.year, &b.year, true),
            SortKey::Gender => gender_rank(&a.gender).cmp(&gender_rank(&b.gender)),
            SortKey::Priority => gender_rank(&a.gender)
                .cmp(&gender_rank(&b.gender))
                .then_with(|| compare_year(&a.year, &b.year, true)),
        };
        primary.then_with(|| a.name_order(b))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// Accepts the menu labels (`"Last Name Z-A"`, `"Year"`, ...) as well as
    /// kebab-case names such as `last-name-desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();

        let key = match normalized.as_str() {
            "first-name-a-z" | "first-name-asc" | "first-name" => SortKey::FirstNameAsc,
            "first-name-z-a" | "first-name-desc" => SortKey::FirstNameDesc,
            "last-name-a-z" | "last-name-asc" | "last-name" => SortKey::LastNameAsc,
            "last-name-z-a" | "last-name-desc" => SortKey::LastNameDesc,
            "year-1-4" | "year-asc" => SortKey::YearAsc,
            // plain "Year" lists fourth years first
            "year" | "year-4-1" | "year-desc" => SortKey::YearDesc,
            "gender" => SortKey::Gender,
            "priority" => SortKey::Priority,
            _ => return Err(format!("unknown sort key '{s}'")),
        };
        Ok(key)
    }
}

/// Parameters of a student listing.
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
    pub college: Filter,
    pub program: Filter,
    pub gender: Filter,
    pub search: String,
    pub sort: SortKey,
}

impl StudentQuery {
    /// Build a query from raw dropdown/search box values.
    pub fn from_selections(
        college: &str,
        program: &str,
        gender: &str,
        search: &str,
        sort: SortKey,
    ) -> Self {
        StudentQuery {
            college: Filter::from_selection(college, ALL_COLLEGES),
            program: Filter::from_selection(program, ALL_PROGRAMS),
            gender: Filter::from_selection(gender, ALL_GENDERS),
            search: search.to_string(),
            sort,
        }
    }
}

/// Filter, search and sort `students`. Pure; the store supplies the rows.
pub fn run(mut students: Vec<Student>, query: &StudentQuery) -> Vec<Student> {
    students.retain(|s| {
        query.college.matches(&s.college_name)
            && query.program.matches(&s.program_name)
            && query.gender.matches(&s.gender)
    });

    let needle = query.search.trim().to_lowercase();
    if !needle.is_empty() {
        students.retain(|s| s.values().iter().any(|v| v.to_lowercase().contains(&needle)));
    }

    students.sort_by(|a, b| query.sort.compare(a, b));
    students
}

/// `All Colleges` followed by every college name.
pub fn college_options(colleges: &[College]) -> Vec<String> {
    std::iter::once(ALL_COLLEGES.to_string())
        .chain(colleges.iter().map(|c| c.name.clone()))
        .collect()
}

/// `All Programs` followed by the programs of `college` (every program when
/// `college` is `All Colleges`).
pub fn program_options(programs: &[Program], college: &str) -> Vec<String> {
    let filter = Filter::from_selection(college, ALL_COLLEGES);
    std::iter::once(ALL_PROGRAMS.to_string())
        .chain(
            programs
                .iter()
                .filter(|p| filter.matches(&p.college_name))
                .map(|p| p.name.clone()),
        )
        .collect()
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}

fn gender_rank(gender: &str) -> u8 {
    match gender.to_lowercase().as_str() {
        "female" => 0,
        "male" => 1,
        _ => 2,
    }
}

/// Numeric comparison; unparseable years sort last in either direction.
fn compare_year(a: &str, b: &str, descending: bool) -> Ordering {
    match (a.trim().parse::<u32>().ok(), b.trim().parse::<u32>().ok()) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
