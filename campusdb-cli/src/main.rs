use campusdb::query::{ALL_COLLEGES, ALL_GENDERS, ALL_PROGRAMS};
use campusdb::{College, Program, SortKey, Store, Student, StudentQuery, NOT_APPLICABLE};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::process;

/// CampusDB CLI: manage students, colleges and programs stored as CSV files
#[derive(Parser)]
#[command(name = "campusdb", version, about)]
struct Cli {
    /// Path to the data directory (default: current directory)
    #[arg(long, default_value = ".")]
    data_dir: String,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Manage colleges
    College {
        #[command(subcommand)]
        action: CollegeAction,
    },

    /// Manage programs
    Program {
        #[command(subcommand)]
        action: ProgramAction,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        action: StudentAction,
    },

    /// Filter, search and sort the student list
    Query {
        /// College name, or "All Colleges"
        #[arg(long, default_value = ALL_COLLEGES)]
        college: String,
        /// Program name, or "All Programs"
        #[arg(long, default_value = ALL_PROGRAMS)]
        program: String,
        /// "Male", "Female", or "All Genders"
        #[arg(long, default_value = ALL_GENDERS)]
        gender: String,
        /// Case-insensitive substring matched against every field
        #[arg(long, default_value = "")]
        search: String,
        /// Sort order (e.g. "Last Name Z-A", year-asc, priority)
        #[arg(long, default_value = "first-name-a-z")]
        sort: SortKey,
    },

    /// Show the values offered by the query filters
    Options {
        /// Limit program options to this college
        #[arg(long, default_value = ALL_COLLEGES)]
        college: String,
    },

    /// Show record counts per college
    Stats,

    /// Check all tables for invalid rows and broken references
    Check,

    /// Add the built-in college and program catalog
    Seed,
}

#[derive(Subcommand)]
enum CollegeAction {
    /// List all colleges
    List,
    /// Add a college
    Add { name: String, code: String },
    /// Rename a college or change its code
    Edit {
        /// Current college code
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_code: Option<String>,
    },
    /// Delete a college; its programs and students are kept
    Delete { code: String },
}

#[derive(Subcommand)]
enum ProgramAction {
    /// List all programs
    List,
    /// Add a program to an existing college
    Add {
        name: String,
        code: String,
        /// Owning college code
        college: String,
    },
    /// Rename a program, change its code, or move it to another college
    Edit {
        /// Current program code
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        new_code: Option<String>,
        /// New owning college code
        #[arg(long)]
        college: Option<String>,
    },
    /// Delete a program; enrolled students are kept
    Delete { code: String },
}

#[derive(Subcommand)]
enum StudentAction {
    /// List all students in stored order
    List,
    /// Show a single student
    Get { id: String },
    /// Register a student
    Add {
        /// Student ID (YYYY-NNNN)
        id: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        gender: String,
        /// College code
        #[arg(long)]
        college: String,
        /// Program code, or N/A
        #[arg(long, default_value = NOT_APPLICABLE)]
        program: String,
        #[arg(long)]
        year: String,
    },
    /// Update a student; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        new_id: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        college: Option<String>,
        #[arg(long)]
        program: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Delete one or more students; nothing is deleted if any ID is unknown
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Serialize)]
struct FilterOptions {
    colleges: Vec<String>,
    programs: Vec<String>,
    genders: Vec<&'static str>,
    sorts: Vec<&'static str>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Using data directory {}", cli.data_dir);
    let store = match cli.command {
        Command::Seed => Store::create(&cli.data_dir)?,
        _ => Store::open(&cli.data_dir)?,
    };
    let format = &cli.format;

    match cli.command {
        Command::College { action } => match action {
            CollegeAction::List => print_output(&store.colleges()?, format)?,
            CollegeAction::Add { name, code } => {
                print_output(&store.add_college(College::new(name, code))?, format)?
            }
            CollegeAction::Edit {
                code,
                name,
                new_code,
            } => {
                let mut college = store.college(&code)?;
                replace(&mut college.name, name);
                replace(&mut college.code, new_code);
                print_output(&store.edit_college(&code, college)?, format)?
            }
            CollegeAction::Delete { code } => print_output(&store.delete_college(&code)?, format)?,
        },

        Command::Program { action } => match action {
            ProgramAction::List => print_output(&store.programs()?, format)?,
            ProgramAction::Add {
                name,
                code,
                college,
            } => print_output(&store.add_program(Program::new(name, code, college))?, format)?,
            ProgramAction::Edit {
                code,
                name,
                new_code,
                college,
            } => {
                let mut program = store.program(&code)?;
                replace(&mut program.name, name);
                replace(&mut program.code, new_code);
                replace(&mut program.college_code, college);
                print_output(&store.update_program(&code, program)?, format)?
            }
            ProgramAction::Delete { code } => print_output(&store.delete_program(&code)?, format)?,
        },

        Command::Student { action } => match action {
            StudentAction::List => print_output(&store.students()?, format)?,
            StudentAction::Get { id } => print_output(&store.student(&id)?, format)?,
            StudentAction::Add {
                id,
                last_name,
                first_name,
                gender,
                college,
                program,
                year,
            } => {
                let student = Student {
                    id,
                    last_name,
                    first_name,
                    gender,
                    college_name: String::new(),
                    college_code: college,
                    program_name: String::new(),
                    program_code: program,
                    year,
                };
                print_output(&store.add_student(student)?, format)?
            }
            StudentAction::Edit {
                id,
                new_id,
                last_name,
                first_name,
                gender,
                college,
                program,
                year,
            } => {
                let mut student = store.student(&id)?;
                replace(&mut student.id, new_id);
                replace(&mut student.last_name, last_name);
                replace(&mut student.first_name, first_name);
                replace(&mut student.gender, gender);
                replace(&mut student.college_code, college);
                replace(&mut student.program_code, program);
                replace(&mut student.year, year);
                print_output(&store.update_student(&id, student)?, format)?
            }
            StudentAction::Delete { ids } => {
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                print_output(&store.delete_students(&ids)?, format)?
            }
        },

        Command::Query {
            college,
            program,
            gender,
            search,
            sort,
        } => {
            let query = StudentQuery::from_selections(&college, &program, &gender, &search, sort);
            print_output(&store.query(&query)?, format)?
        }

        Command::Options { college } => {
            let options = FilterOptions {
                colleges: store.college_options()?,
                programs: store.program_options(&college)?,
                genders: vec![ALL_GENDERS, "Male", "Female"],
                sorts: SortKey::ALL.iter().map(|k| k.label()).collect(),
            };
            print_output(&options, format)?
        }

        Command::Stats => print_output(&store.summary()?, format)?,

        Command::Check => {
            let report = store.check()?;
            print_output(&report, format)?;
            if !report.is_clean() {
                return Err(format!("{} integrity issue(s) found", report.issues.len()).into());
            }
        }

        Command::Seed => print_output(&store.seed_catalog()?, format)?,
    }

    Ok(())
}

fn replace(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn print_output<T: Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
