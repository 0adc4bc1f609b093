// Built-in colleges and programs offered when a data directory is first set up

use crate::schema::{College, Program};

/// A college and its programs, as `(name, code)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct CatalogCollege {
    pub name: &'static str,
    pub code: &'static str,
    pub programs: &'static [(&'static str, &'static str)],
}

impl CatalogCollege {
    pub fn college(&self) -> College {
        College::new(self.name, self.code)
    }

    /// The college's programs with their college snapshot filled in.
    pub fn programs(&self) -> impl Iterator<Item = Program> + '_ {
        self.programs.iter().map(move |(name, code)| Program {
            name: (*name).to_string(),
            code: (*code).to_string(),
            college_name: self.name.to_string(),
            college_code: self.code.to_string(),
        })
    }
}

pub fn default_catalog() -> &'static [CatalogCollege] {
    DEFAULT_CATALOG
}

static DEFAULT_CATALOG: &[CatalogCollege] = &[
    CatalogCollege {
        name: "College of Engineering",
        code: "COE",
        programs: &[
            ("Diploma in Chemical Engineering Technology", "DCET"),
            ("Bachelor of Science in Ceramic Engineering", "BSCerE"),
            ("Bachelor of Science in Civil Engineering", "BSCE"),
            ("Bachelor of Science in Electrical Engineering", "BSEE"),
            ("Bachelor of Science in Mechanical Engineering", "BSME"),
            ("Bachelor of Science in Chemical Engineering", "BSChE"),
            ("Bachelor of Science in Metallurgical Engineering", "BSMetE"),
            ("Bachelor of Science in Computer Engineering", "BSCpE"),
            ("Bachelor of Science in Mining Engineering", "BSMinE"),
            ("Bachelor of Science in Electronics & Communications Engineering", "BSECE"),
            ("Bachelor of Science in Environmental Engineering", "BSEnET"),
        ],
    },
    CatalogCollege {
        name: "College of Science and Mathematics",
        code: "CSM",
        programs: &[
            ("Bachelor of Science in Biology(BOTANY)", "BSBio-Bot"),
            ("Bachelor of Science in Chemistry", "BSChem"),
            ("Bachelor of Science in Mathematics", "BSMath"),
            ("Bachelor of Science in Physics", "BSPhys"),
            ("Bachelor of Science in Biology(ZOOLOGY)", "BSBio-Zoo"),
            ("Bachelor of Science in Biology(Marine)", "BSBio-Mar"),
            ("Bachelor of Science in Biology(General)", "BSBio-Gen"),
            ("Bachelor of Science in Statistics", "BSStat"),
        ],
    },
    CatalogCollege {
        name: "College of Computer Studies",
        code: "CCS",
        programs: &[
            ("Bachelor of Science in Computer Science", "BSCS"),
            ("Bachelor of Science in Information Technology", "BSIT"),
            ("Bachelor of Science in Information Systems", "BSIS"),
            ("Bachelor of Science in Computer Application", "BSCA"),
        ],
    },
    CatalogCollege {
        name: "College of Education",
        code: "CED",
        programs: &[
            ("Bachelor of Elementary Education(Science and Mathematics)", "BEEd-SciMath"),
            ("Bachelor of Elementary Education(Language Education)", "BEEd-Lang"),
            ("Bachelor of Secondary Education(Biology)", "BSEd-Bio"),
            ("Bachelor of Secondary Education(Chemistry)", "BSEd-Chem"),
            ("Bachelor of Secondary Education(Physics)", "BSEd-Phys"),
            ("Bachelor of Secondary Education(Mathematics)", "BSEd-Math"),
            ("Bachelor of Physical Education", "BPEd"),
            ("Bachelor of Technology and Livelihood Education(Home Economics)", "BTLED-HE"),
            ("Bachelor of Technology and Livelihood Education(Industrial Arts)", "BTLed-IA"),
            ("Bachelor of Technical-Vocational Teacher Education(Drafting Technology)", "BTVTED-DT"),
        ],
    },
    CatalogCollege {
        name: "College of Arts and Social Sciences",
        code: "CAS",
        programs: &[
            ("Bachelor of Arts in English Language Studies", "BA-ELS"),
            ("Bachelor of Arts in Literary and Cultural Studies", "BA-LCS"),
            ("Bachelor of Arts in Filipino", "BA-FIL"),
            ("Bachelor of Arts in Panitikan", "BA-PAN"),
            ("Bachelor of Arts in Political Science", "BA-POLSCI"),
            ("Bachelor of Arts in Psychology", "BA-PSY"),
            ("Bachelor of Arts in Sociology", "BA-SOC"),
            ("Bachelor of Arts in History(International History Track)", "BA-HIS-IH"),
            ("Bachelor of Science in Philosophy", "BS-PHIL-AE"),
            ("Bachelor of Science in Psychology", "BS-PSY"),
        ],
    },
    CatalogCollege {
        name: "College of Economics, Business & Accountancy",
        code: "CEBA",
        programs: &[
            ("Bachelor of Science in Accountancy", "BS-ACC"),
            ("Bachelor of Science in Business Administration(Business Economics)", "BSBA-BE"),
            ("Bachelor of Science in Business Administration(Marketing Management)", "BSBA-MM"),
            ("Bachelor of Science in Entrepreneurship", "BS-ENT"),
            ("Bachelor of Science in Hospitality Management", "BSHM"),
        ],
    },
    CatalogCollege {
        name: "College of Health Sciences",
        code: "CHS",
        programs: &[
            ("Bachelor of Science in Nursing", "BSN"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_keys_are_unique() {
        let mut college_codes = HashSet::new();
        let mut program_codes = HashSet::new();
        let mut program_names = HashSet::new();
        for college in default_catalog() {
            assert!(college_codes.insert(college.code), "{}", college.code);
            for program in college.programs() {
                assert!(program_codes.insert(program.code.clone()), "{}", program.code);
                assert!(program_names.insert(program.name.clone()), "{}", program.name);
                assert_eq!(program.college_code, college.code);
            }
        }
        assert_eq!(college_codes.len(), 7);
    }

    #[test]
    fn test_programs_snapshot_their_college() {
        let ccs = default_catalog()
            .iter()
            .find(|c| c.code == "CCS")
            .unwrap();
        let programs: Vec<Program> = ccs.programs().collect();
        assert_eq!(programs.len(), 4);
        assert!(programs
            .iter()
            .all(|p| p.college_name == "College of Computer Studies"));
    }
}
