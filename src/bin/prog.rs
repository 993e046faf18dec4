//! `prog` - compile a pattern (or load a previously compiled program) and match it
//! against one or more subjects.

use std::path::Path;

use clap::Parser;

use pike_regex::util::Log;
use pike_regex::{compile_with_log, read_program, write_program, MatchOutcome, Program};
#[cfg(test)]
use pike_regex::compile;

/// Match subjects against a byte-oriented regular expression.
#[derive(Parser, Debug)]
#[command(name = "prog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile a pattern and match it against one or more subjects")]
struct Cli {
    /// The pattern to compile, or the path to a program file written by `write_program`.
    pattern: String,

    /// Subjects to match, each checked independently against the same compiled program.
    #[arg(required = true)]
    subjects: Vec<String>,

    /// Print the compiled program's assembly before matching.
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();
    let log = if cli.debug { Log::Verbose } else { Log::None };

    let program = match load_program(&cli.pattern, log) {
        Ok(program) => program,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    if cli.debug {
        print!("{}", write_program(&program));
    }

    for subject in &cli.subjects {
        match program.execute_with_log(subject.as_bytes(), log) {
            Some(outcome) => println!("{}", format_match(&outcome)),
            None => println!("no match"),
        }
    }
}

/// `pattern` names a readable file, treat it as a previously compiled program;
/// otherwise compile it as a pattern.
fn load_program(pattern: &str, log: Log) -> Result<Program, String> {
    if Path::new(pattern).is_file() {
        let text = std::fs::read_to_string(pattern).map_err(|e| format!("IoError: {e}"))?;
        read_program(&text).map_err(|e| e.to_string())
    } else {
        compile_with_log(pattern.as_bytes(), log).map_err(|e| e.to_string())
    }
}

fn format_match(outcome: &MatchOutcome) -> String {
    let mut line = format!("match({})", outcome.end);
    for k in 1..=outcome.captures.len() {
        match outcome.group(k) {
            Some((s, e)) => line.push_str(&format!(" ({s},{e})")),
            None => line.push_str(" (-,-)"),
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_match_lists_every_group_in_order() {
        let program = compile(b"(a+)(b+)").unwrap();
        let outcome = program.execute(b"aabb").unwrap();
        assert_eq!(format_match(&outcome), "match(4) (0,2) (2,4)");
    }

    #[test]
    fn format_match_marks_unparticipated_groups() {
        let program = compile(b"(a)|(b)").unwrap();
        let outcome = program.execute(b"b").unwrap();
        assert_eq!(format_match(&outcome), "match(1) (-,-) (0,1)");
    }

    #[test]
    fn load_program_compiles_a_literal_pattern() {
        let program = load_program("a+", Log::None).unwrap();
        assert!(program.execute(b"aaa").is_some());
    }
}
