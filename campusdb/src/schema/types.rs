use super::{Entity, FieldDefinition, FieldKind, Record, NOT_APPLICABLE};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A student row. College and program name/code pairs are snapshots of the
/// referenced records taken when the student was last assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "Student ID")]
    pub id: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "College")]
    pub college_name: String,
    #[serde(rename = "College Code")]
    pub college_code: String,
    #[serde(rename = "Program")]
    pub program_name: String,
    #[serde(rename = "Program Code")]
    pub program_code: String,
    #[serde(rename = "Year")]
    pub year: String,
}

impl Record for Student {
    const ENTITY: Entity = Entity::Student;
    const FIELDS: &'static [FieldDefinition] = &[
        FieldDefinition::new("Student ID", FieldKind::StudentId),
        FieldDefinition::new("Last Name", FieldKind::PersonName),
        FieldDefinition::new("First Name", FieldKind::PersonName),
        FieldDefinition::new("Gender", FieldKind::Gender),
        FieldDefinition::new("College", FieldKind::Reference { nullable: false }),
        FieldDefinition::new("College Code", FieldKind::Reference { nullable: false }),
        FieldDefinition::new("Program", FieldKind::Reference { nullable: true }),
        FieldDefinition::new("Program Code", FieldKind::Reference { nullable: true }),
        FieldDefinition::new("Year", FieldKind::Year),
    ];

    fn key(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.last_name.as_str(),
            self.first_name.as_str(),
            self.gender.as_str(),
            self.college_name.as_str(),
            self.college_code.as_str(),
            self.program_name.as_str(),
            self.program_code.as_str(),
            self.year.as_str(),
        ]
    }
}

impl Student {
    /// Clear the college snapshot after its college was deleted.
    pub fn detach_college(&mut self) {
        self.college_name = NOT_APPLICABLE.to_string();
        self.college_code = NOT_APPLICABLE.to_string();
    }

    /// Clear the program snapshot after its program was deleted.
    pub fn detach_program(&mut self) {
        self.program_name = NOT_APPLICABLE.to_string();
        self.program_code = NOT_APPLICABLE.to_string();
    }

    pub fn has_program(&self) -> bool {
        self.program_code != NOT_APPLICABLE
    }

    /// (last name, first name) case-insensitively, then student ID.
    pub fn name_order(&self, other: &Student) -> Ordering {
        self.last_name
            .to_lowercase()
            .cmp(&other.last_name.to_lowercase())
            .then_with(|| {
                self.first_name
                    .to_lowercase()
                    .cmp(&other.first_name.to_lowercase())
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Sort students into the order they are persisted in.
pub fn sort_for_storage(students: &mut [Student]) {
    students.sort_by(Student::name_order);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct College {
    #[serde(rename = "College Name")]
    pub name: String,
    #[serde(rename = "College Code")]
    pub code: String,
}

impl College {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        College {
            name: name.into(),
            code: code.into(),
        }
    }
}

impl Record for College {
    const ENTITY: Entity = Entity::College;
    const FIELDS: &'static [FieldDefinition] = &[
        FieldDefinition::new("College Name", FieldKind::EntityName),
        FieldDefinition::new("College Code", FieldKind::Code),
    ];

    fn key(&self) -> &str {
        &self.code
    }

    fn values(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.code.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "Program Name")]
    pub name: String,
    #[serde(rename = "Program Code")]
    pub code: String,
    #[serde(rename = "College Name")]
    pub college_name: String,
    #[serde(rename = "College Code")]
    pub college_code: String,
}

impl Program {
    /// A program owned by the college with `college_code`. The college name
    /// is filled in from the colleges table when the program is written.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        college_code: impl Into<String>,
    ) -> Self {
        Program {
            name: name.into(),
            code: code.into(),
            college_name: String::new(),
            college_code: college_code.into(),
        }
    }

    pub fn detach_college(&mut self) {
        self.college_name = NOT_APPLICABLE.to_string();
        self.college_code = NOT_APPLICABLE.to_string();
    }
}

impl Record for Program {
    const ENTITY: Entity = Entity::Program;
    const FIELDS: &'static [FieldDefinition] = &[
        FieldDefinition::new("Program Name", FieldKind::EntityName),
        FieldDefinition::new("Program Code", FieldKind::Code),
        FieldDefinition::new("College Name", FieldKind::Reference { nullable: true }),
        FieldDefinition::new("College Code", FieldKind::Reference { nullable: true }),
    ];

    fn key(&self) -> &str {
        &self.code
    }

    fn values(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.code.as_str(),
            self.college_name.as_str(),
            self.college_code.as_str(),
        ]
    }
}
