//! Interactive category/target picker.
//!
//! Kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `fcast` and choose a model" UX
//!
//! When stdin is not a terminal the first option is taken, matching the
//! dashboard's default selection.

use std::io::{self, BufRead, IsTerminal, Write};

use tracing::info;

use crate::error::AppError;
use crate::io::index::ArtifactIndex;

/// Resolve `(category, target)`, prompting for whichever is missing.
pub fn resolve_selection(
    index: &ArtifactIndex,
    category: Option<String>,
    target: Option<String>,
) -> Result<(String, String), AppError> {
    let category = match category {
        Some(c) => c,
        None => prompt_choice("category", &index.categories())?,
    };
    let target = match target {
        Some(t) => t,
        None => {
            let targets = index.targets(&category);
            if targets.is_empty() {
                // Let the pipeline produce the "unknown category" error.
                return Ok((category, String::new()));
            }
            prompt_choice("target", &targets)?
        }
    };
    Ok((category, target))
}

/// Ask the user to pick one of `options` on stdin.
pub fn prompt_choice(label: &str, options: &[&str]) -> Result<String, AppError> {
    let Some(first) = options.first() else {
        return Err(AppError::input(format!("No {label} available to choose from.")));
    };
    if options.len() == 1 || !io::stdin().is_terminal() {
        info!(label, choice = *first, "using default selection");
        return Ok(first.to_string());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    choose_from(label, options, &mut stdin.lock(), &mut stdout.lock())
}

/// Prompt loop over arbitrary input/output.
///
/// Behavior:
/// - list options, numbered from 1
/// - accept either a number or an exact (case-insensitive) name
/// - empty input takes the first option
/// - `q` cancels
pub fn choose_from<R: BufRead, W: Write>(
    label: &str,
    options: &[&str],
    input: &mut R,
    output: &mut W,
) -> Result<String, AppError> {
    let write_err = |e: io::Error| AppError::io(format!("Failed to write prompt: {e}"));

    writeln!(output, "Available {label} values:").map_err(write_err)?;
    for (idx, option) in options.iter().enumerate() {
        writeln!(output, "{:>3}) {option}", idx + 1).map_err(write_err)?;
    }

    loop {
        write!(output, "Select a {label} by number (1-{}) or name [1] (q to quit): ", options.len())
            .map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::io(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::input(format!(
                "No input received. Pass the {label} with `--{label}`."
            )));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::input("Canceled."));
        }
        if line.is_empty() {
            if let Some(first) = options.first() {
                return Ok(first.to_string());
            }
        }

        if let Ok(choice) = line.parse::<usize>() {
            if (1..=options.len()).contains(&choice) {
                return Ok(options[choice - 1].to_string());
            }
            writeln!(output, "Invalid choice: {choice}. Enter a number between 1 and {}.", options.len())
                .map_err(write_err)?;
            continue;
        }

        if let Some(found) = options.iter().find(|o| o.eq_ignore_ascii_case(line)) {
            return Ok(found.to_string());
        }
        writeln!(output, "Unknown {label}: {line}").map_err(write_err)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const OPTIONS: [&str; 3] = ["Children & YA Books", "Fiction", "Non-Fiction"];

    fn run(input: &str) -> Result<String, AppError> {
        let mut out = Vec::new();
        choose_from("category", &OPTIONS, &mut Cursor::new(input), &mut out)
    }

    #[test]
    fn accepts_number_or_name() {
        assert_eq!(run("2\n").unwrap(), "Fiction");
        assert_eq!(run("non-fiction\n").unwrap(), "Non-Fiction");
    }

    #[test]
    fn empty_line_takes_first() {
        assert_eq!(run("\n").unwrap(), "Children & YA Books");
    }

    #[test]
    fn retries_after_invalid_input() {
        assert_eq!(run("9\nPoetry\n3\n").unwrap(), "Non-Fiction");
    }

    #[test]
    fn quit_and_eof_are_errors() {
        assert_eq!(run("q\n").unwrap_err().exit_code(), 2);
        assert!(run("").unwrap_err().to_string().contains("--category"));
    }
}
