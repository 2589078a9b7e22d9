//! Interactive line-oriented session
//!
//! Reads one command per line, applies it to the session's selection and
//! writes a short report. A failing command is reported and the session goes
//! on; only `quit` or the end of input ends it.

use std::io::{BufRead, Write};
use crate::commands::{handle, Command, Outcome};
use crate::error::{Error, Result};
use crate::pdf::OutputTarget;
use crate::selection::SelectionList;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  open <file|pattern>...   add PDF files to the end of the list (alias: add)
  list                     show the list in merge order (alias: ls)
  move <from> <to>         move the file at position <from> to <to> (alias: mv)
  swap <a> <b>             exchange two files
  order <n>...             put every file in a new order, e.g. order 3 1 2
  clear                    remove every file from the list
  combine                  merge the list into a new file, never overwriting one
  help                     show this text
  quit                     leave (alias: exit)";

/// Split a command line into words; double quotes group words with spaces
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(Error::Usage("unterminated quote".to_string()));
    }
    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

fn parse_position(arg: Option<&String>, usage: &str) -> Result<usize> {
    arg.and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Usage(usage.to_string()))
}

/// Parse one line into a command; `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let tokens = tokenize(line)?;
    let Some((name, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "open" | "add" => {
            if args.is_empty() {
                return Err(Error::Usage("open <file|pattern>...".to_string()));
            }
            Command::Open(args.to_vec())
        }
        "list" | "ls" => Command::List,
        "move" | "mv" => {
            let usage = "move <from> <to>";
            if args.len() != 2 {
                return Err(Error::Usage(usage.to_string()));
            }
            Command::Move {
                from: parse_position(args.first(), usage)?,
                to: parse_position(args.get(1), usage)?,
            }
        }
        "swap" => {
            let usage = "swap <a> <b>";
            if args.len() != 2 {
                return Err(Error::Usage(usage.to_string()));
            }
            Command::Swap {
                a: parse_position(args.first(), usage)?,
                b: parse_position(args.get(1), usage)?,
            }
        }
        "order" => {
            let usage = "order <position>...";
            if args.is_empty() {
                return Err(Error::Usage(usage.to_string()));
            }
            let positions = args
                .iter()
                .map(|arg| parse_position(Some(arg), usage))
                .collect::<Result<Vec<_>>>()?;
            Command::Order(positions)
        }
        "clear" => Command::Clear,
        "combine" => Command::Combine,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(Error::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// An interactive session owning its selection
#[derive(Debug, Default)]
pub struct Shell {
    selection: SelectionList,
    target: OutputTarget,
}

impl Shell {
    pub fn new(selection: SelectionList, target: OutputTarget) -> Self {
        Self { selection, target }
    }

    pub fn selection(&self) -> &SelectionList {
        &self.selection
    }

    /// Run until `quit` or end of input
    ///
    /// Only failures to read input or write output end the session with an
    /// error; command failures are written to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;

            let result = parse_command(&line).and_then(|command| match command {
                Some(command) => handle(&mut self.selection, &self.target, command).map(Some),
                None => Ok(None),
            });

            match result {
                Ok(Some(Outcome::Quit)) => return Ok(()),
                Ok(Some(outcome)) => self.render(&outcome, &mut output)?,
                Ok(None) => {}
                Err(e) => writeln!(output, "error: {}", e)?,
            }

            write!(output, "{}", PROMPT)?;
            output.flush()?;
        }

        writeln!(output)?;
        Ok(())
    }

    fn render<W: Write>(&self, outcome: &Outcome, output: &mut W) -> Result<()> {
        match outcome {
            Outcome::Added(report) => {
                writeln!(output, "added {} file(s)", report.added.len())?;
                for path in &report.repeated {
                    writeln!(output, "already in the list: {}", path.display())?;
                }
            }
            Outcome::Listed(paths) => {
                if paths.is_empty() {
                    writeln!(output, "(no files selected)")?;
                }
                for (i, path) in paths.iter().enumerate() {
                    writeln!(output, "{:>3}. {}", i + 1, path.display())?;
                }
            }
            Outcome::Reordered => {
                for file in self.selection.iter() {
                    writeln!(output, "{:>3}. {}", file.position + 1, file.path.display())?;
                }
            }
            Outcome::Cleared => writeln!(output, "list cleared")?,
            Outcome::Combined(path) => writeln!(output, "combined as {}", path.display())?,
            Outcome::Help => writeln!(output, "{}", HELP)?,
            Outcome::Quit => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(script: &str) -> (Shell, String) {
        let mut shell = Shell::default();
        let mut output = Vec::new();
        shell.run(Cursor::new(script), &mut output).unwrap();
        (shell, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"open "my notes.pdf" b.pdf"#).unwrap(),
            vec!["open", "my notes.pdf", "b.pdf"]
        );
        assert_eq!(tokenize("   ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize(r#"open """#).unwrap(), vec!["open", ""]);
        assert!(matches!(tokenize(r#"open "a.pdf"#), Err(Error::Usage(_))));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("ls").unwrap(), Some(Command::List));
        assert_eq!(
            parse_command("mv 2 1").unwrap(),
            Some(Command::Move { from: 2, to: 1 })
        );
        assert_eq!(
            parse_command("SWAP 1 3").unwrap(),
            Some(Command::Swap { a: 1, b: 3 })
        );
        assert_eq!(
            parse_command("add a.pdf").unwrap(),
            Some(Command::Open(vec!["a.pdf".to_string()]))
        );
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse_command("order 3 1 2").unwrap(),
            Some(Command::Order(vec![3, 1, 2]))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_command("open"), Err(Error::Usage(_))));
        assert!(matches!(parse_command("move 1"), Err(Error::Usage(_))));
        assert!(matches!(parse_command("swap one two"), Err(Error::Usage(_))));
        assert!(matches!(parse_command("order"), Err(Error::Usage(_))));
        assert!(matches!(parse_command("order 2 x"), Err(Error::Usage(_))));
        assert!(matches!(parse_command("print"), Err(Error::UnknownCommand(_))));
    }

    #[test]
    fn test_session_keeps_going_after_errors() {
        let (shell, out) = run_session("bogus\nopen a.pdf b.pdf a.pdf\nswap 1 9\nlist\n");
        assert!(out.contains("error: Unknown command: bogus"));
        assert!(out.contains("added 2 file(s)"));
        assert!(out.contains("already in the list: a.pdf"));
        assert!(out.contains("error: No file at position 9"));
        assert!(out.contains("  1. a.pdf"));
        assert!(out.contains("  2. b.pdf"));
        assert_eq!(shell.selection().len(), 2);
    }

    #[test]
    fn test_session_reorder_and_clear() {
        let (shell, out) = run_session("open a.pdf b.pdf c.pdf\nmove 3 1\n");
        assert!(out.contains("  1. c.pdf\n  2. a.pdf\n  3. b.pdf"));
        assert_eq!(shell.selection().get(0).unwrap().position, 0);

        let (shell, out) = run_session("open a.pdf\nclear\nlist\n");
        assert!(out.contains("list cleared"));
        assert!(out.contains("(no files selected)"));
        assert!(shell.selection().is_empty());
    }

    #[test]
    fn test_session_order_command() {
        let (shell, out) = run_session("open a.pdf b.pdf c.pdf\norder 2 3 1\norder 1 1 1\n");
        assert!(out.contains("  1. b.pdf\n  2. c.pdf\n  3. a.pdf"));
        assert!(out.contains("error: Invalid order"));
        assert_eq!(shell.selection().get(2).unwrap().path.to_str(), Some("a.pdf"));
    }

    #[test]
    fn test_session_quit_stops_reading() {
        let (shell, _) = run_session("quit\nopen a.pdf\n");
        assert!(shell.selection().is_empty());
    }

    #[test]
    fn test_session_combine_empty_reports_error() {
        let (_, out) = run_session("combine\n");
        assert!(out.contains("error: No input files provided"));
    }
}
