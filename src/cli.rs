// File: ./src/cli.rs
//! Command-line parsing and help for the `dealcal` binary.
use crate::category::CategoryId;
use crate::model::{EventId, EventKind};
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    /// Events of every visible category, optionally only one day.
    List { date: Option<NaiveDate> },
    Add {
        title: String,
        date: NaiveDate,
        time: String,
        duration: String,
        kind: EventKind,
    },
    Delete { id: EventId },
    SetCategory { id: CategoryId, visible: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: CliCommand,
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid date '{}'. Expected YYYY-MM-DD", s))
}

fn parse_category(s: &str) -> Result<CategoryId> {
    s.parse()
        .map_err(|_| anyhow!("Unknown category '{}'", s))
}

/// Parse everything after the binary name.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut root = None;
    let mut verbose = false;
    let mut rest: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" | "--root" => {
                let path = iter.next().ok_or_else(|| anyhow!("--root needs a path"))?;
                root = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" | "help" => {
                return Ok(CliArgs {
                    root,
                    verbose,
                    command: CliCommand::Help,
                });
            }
            other => rest.push(other),
        }
    }

    let command = match rest.as_slice() {
        [] | ["list"] => CliCommand::List { date: None },
        ["list", date] => CliCommand::List {
            date: Some(parse_date(date)?),
        },
        ["add", title, date, time, duration] => CliCommand::Add {
            title: title.to_string(),
            date: parse_date(date)?,
            time: time.to_string(),
            duration: duration.to_string(),
            kind: EventKind::default(),
        },
        ["add", title, date, time, duration, kind] => CliCommand::Add {
            title: title.to_string(),
            date: parse_date(date)?,
            time: time.to_string(),
            duration: duration.to_string(),
            kind: EventKind::parse_lossy(kind),
        },
        ["delete", id] => CliCommand::Delete {
            id: EventId::from(*id),
        },
        ["hide", category] => CliCommand::SetCategory {
            id: parse_category(category)?,
            visible: false,
        },
        ["show", category] => CliCommand::SetCategory {
            id: parse_category(category)?,
            visible: true,
        },
        [cmd, ..] => bail!("Unknown or incomplete command '{}'. Try --help", cmd),
    };

    Ok(CliArgs {
        root,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Dealcal v{} - Dealership calendar from the command line",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] [-v] [list [YYYY-MM-DD]]", binary_name);
    println!(
        "    {} add <title> <YYYY-MM-DD> <time> <duration> [kind]",
        binary_name
    );
    println!("    {} delete <id>", binary_name);
    println!("    {} hide|show <category>", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Debug logging.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("FORMATS:");
    println!("    time        \"9:00 AM\", \"12:30 pm\"");
    println!("    duration    \"30 min\", \"1 hour\", \"1.5h\", \"2 hrs\"");
    println!("    kind        work personal family holiday birthday travel reminder deadline");
    println!("    category    work personal family holidays birthdays travel reminders deadlines");
    println!();
    println!("EXAMPLES:");
    println!(
        "    {} add \"Sales standup\" 2024-03-01 \"9:00 AM\" \"30 min\" work",
        binary_name
    );
    println!("    {} hide holidays", binary_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_is_list() {
        let parsed = parse_args(&[]).unwrap();
        assert_eq!(parsed.command, CliCommand::List { date: None });
        assert_eq!(parsed.root, None);
    }

    #[test]
    fn add_with_kind_and_root() {
        let parsed = parse_args(&args(&[
            "--root", "/tmp/x", "add", "Standup", "2024-03-01", "9:00 AM", "30 min", "WORK",
        ]))
        .unwrap();
        assert_eq!(parsed.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            parsed.command,
            CliCommand::Add {
                title: "Standup".into(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                time: "9:00 AM".into(),
                duration: "30 min".into(),
                kind: EventKind::Work,
            }
        );
    }

    #[test]
    fn hide_and_show_categories() {
        let hide = parse_args(&args(&["hide", "Holidays"])).unwrap();
        assert_eq!(
            hide.command,
            CliCommand::SetCategory {
                id: CategoryId::Holidays,
                visible: false
            }
        );
        assert!(parse_args(&args(&["show", "holiday"])).is_err());
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(parse_args(&args(&["add", "x", "03/01/2024", "9:00 AM", "1h"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["--root"])).is_err());
        assert_eq!(
            parse_args(&args(&["-v", "--help"])).unwrap().command,
            CliCommand::Help
        );
    }
}
