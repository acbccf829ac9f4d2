//! Calendar lint CLI tool
//!
//! Validates a freeze calendar file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut verbose = false;
    let mut calendar_path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ if calendar_path.is_none() => calendar_path = Some(PathBuf::from(arg)),
            _ => return usage(),
        }
    }

    let Some(calendar_path) = calendar_path else {
        return usage();
    };

    // Check file exists
    if !calendar_path.exists() {
        eprintln!("Error: Calendar file not found: {}", calendar_path.display());
        return ExitCode::from(1);
    }

    match freeze_calendar::load_calendar(&calendar_path) {
        Ok(calendar) => {
            if verbose {
                match calendar.len() {
                    0 => println!("Calendar is valid but has no windows."),
                    1 => println!("Calendar is valid and has one window:"),
                    n => println!("Calendar is valid and has {} windows:", n),
                }

                for window in calendar.iter() {
                    println!("  - {}", window);
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Calendar validation failed");
            eprintln!();
            match &e {
                freeze_calendar::CalendarError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                other => eprintln!("{}", other),
            }
            ExitCode::from(1)
        }
    }
}

fn usage() -> ExitCode {
    eprintln!("Usage: lint-calendar [--verbose] <calendar-file>");
    eprintln!();
    eprintln!("Validates a freeze calendar file (YAML, or TOML for *.toml).");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  lint-calendar --verbose calendars/freeze-calendar.yaml");
    ExitCode::from(2)
}
