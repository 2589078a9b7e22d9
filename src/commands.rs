//! Command handlers over an explicitly owned selection
//!
//! Each user action (open, reorder, clear, combine) is a [`Command`] value.
//! [`handle`] applies one to the selection and reports an [`Outcome`] that a
//! front end can render however it likes.

use std::path::{Path, PathBuf};
use glob::glob;
use tracing::{debug, warn};
use crate::error::{Error, Result};
use crate::pdf::{combine_pdfs, CombineOptions, OutputTarget};
use crate::selection::{AddReport, SelectionList};

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add files (paths or glob patterns) to the end of the selection
    Open(Vec<String>),
    /// Show the selection
    List,
    /// Move the file at 1-based position `from` to position `to`
    Move { from: usize, to: usize },
    /// Exchange the files at two 1-based positions
    Swap { a: usize, b: usize },
    /// Put the whole list in a new order, given as the current 1-based
    /// positions in the order they should end up
    Order(Vec<usize>),
    /// Empty the selection
    Clear,
    /// Combine the selection into one PDF
    Combine,
    /// Show available commands
    Help,
    /// End the session
    Quit,
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(AddReport),
    Listed(Vec<PathBuf>),
    Reordered,
    Cleared,
    Combined(PathBuf),
    Help,
    Quit,
}

/// Apply one command to the selection
pub fn handle(
    selection: &mut SelectionList,
    target: &OutputTarget,
    command: Command,
) -> Result<Outcome> {
    debug!(?command, "handling command");

    match command {
        Command::Open(inputs) => {
            let paths = expand_inputs(&inputs)?;
            Ok(Outcome::Added(selection.add_all(paths)))
        }
        Command::List => Ok(Outcome::Listed(selection.paths())),
        Command::Move { from, to } => {
            let len = selection.len();
            selection.move_item(to_index(from, len)?, to_index(to, len)?)?;
            Ok(Outcome::Reordered)
        }
        Command::Swap { a, b } => {
            let len = selection.len();
            selection.swap(to_index(a, len)?, to_index(b, len)?)?;
            Ok(Outcome::Reordered)
        }
        Command::Order(positions) => {
            let len = selection.len();
            let order = positions
                .into_iter()
                .map(|position| to_index(position, len))
                .collect::<Result<Vec<_>>>()?;
            selection.reorder(&order)?;
            Ok(Outcome::Reordered)
        }
        Command::Clear => {
            selection.clear();
            Ok(Outcome::Cleared)
        }
        Command::Combine => {
            let options = CombineOptions {
                input_paths: selection.paths(),
                target: target.clone(),
            };
            Ok(Outcome::Combined(combine_pdfs(&options)?))
        }
        Command::Help => Ok(Outcome::Help),
        Command::Quit => Ok(Outcome::Quit),
    }
}

/// Convert a displayed 1-based position to a list index
fn to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        return Err(Error::InvalidPosition { position, len });
    }
    Ok(position - 1)
}

/// Whether a path names a PDF file by extension
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Resolve user-supplied paths and glob patterns to PDF paths
///
/// Argument order is kept. An argument naming an existing file is taken
/// literally even if it contains glob characters. The matches of each glob
/// pattern are sorted, and a pattern that matches nothing is an error.
/// Anything without a `.pdf` extension is skipped with a warning.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let is_glob = pattern.contains('*') || pattern.contains('?') || pattern.contains('[');
        if is_glob && !Path::new(pattern).exists() {
            let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

            let mut matched = Vec::new();
            for entry in entries {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => warn!(pattern = %pattern, error = %e, "glob error"),
                }
            }
            matched.retain(|p| is_pdf_path(p));
            if matched.is_empty() {
                return Err(Error::NoFilesMatched(pattern.clone()));
            }

            matched.sort();
            paths.extend(matched);
        } else {
            let path = PathBuf::from(pattern);
            if is_pdf_path(&path) {
                paths.push(path);
            } else {
                warn!("Skipping non-PDF file [{}]", path.display());
            }
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_is_pdf_path() {
        assert!(is_pdf_path(Path::new("a.pdf")));
        assert!(is_pdf_path(Path::new("dir/A.PDF")));
        assert!(!is_pdf_path(Path::new("notes.txt")));
        assert!(!is_pdf_path(Path::new("pdf")));
    }

    #[test]
    fn test_expand_literal_paths_keep_order() {
        let inputs = vec!["b.pdf".to_string(), "a.pdf".to_string()];
        let paths = expand_inputs(&inputs).unwrap();
        assert_eq!(paths, vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")]);
    }

    #[test]
    fn test_expand_skips_non_pdf() {
        let inputs = vec!["a.pdf".to_string(), "readme.md".to_string()];
        let paths = expand_inputs(&inputs).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.pdf")]);
    }

    #[test]
    fn test_expand_glob_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let two = touch(dir.path(), "2.pdf");
        let one = touch(dir.path(), "1.pdf");
        touch(dir.path(), "3.txt");

        let pattern = format!("{}/*", dir.path().display());
        let paths = expand_inputs(&[pattern]).unwrap();
        assert_eq!(paths, vec![one, two]);
    }

    #[test]
    fn test_expand_existing_file_with_brackets_is_literal() {
        let dir = TempDir::new().unwrap();
        let bracketed = touch(dir.path(), "notes [v1].pdf");
        touch(dir.path(), "notes v.pdf");

        let inputs = vec![bracketed.display().to_string()];
        let paths = expand_inputs(&inputs).unwrap();
        assert_eq!(paths, vec![bracketed]);
    }

    #[test]
    fn test_expand_glob_no_match() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.pdf", dir.path().display());
        let result = expand_inputs(&[pattern]);
        assert!(matches!(result, Err(Error::NoFilesMatched(_))));
    }

    #[test]
    fn test_expand_invalid_glob() {
        let result = expand_inputs(&["[.pdf".to_string()]);
        assert!(matches!(result, Err(Error::InvalidGlob(_))));
    }

    #[test]
    fn test_handle_open_drops_repeats() {
        let mut selection = SelectionList::new();
        let target = OutputTarget::default();

        let outcome = handle(
            &mut selection,
            &target,
            Command::Open(vec!["a.pdf".into(), "b.pdf".into(), "a.pdf".into()]),
        )
        .unwrap();

        match outcome {
            Outcome::Added(report) => {
                assert_eq!(report.added.len(), 2);
                assert_eq!(report.repeated, vec![PathBuf::from("a.pdf")]);
            }
            other => panic!("Expected Added, got {:?}", other),
        }
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_handle_positions_are_one_based() {
        let mut selection = SelectionList::new();
        selection.add_all(["a.pdf", "b.pdf", "c.pdf"]);
        let target = OutputTarget::default();

        handle(&mut selection, &target, Command::Move { from: 3, to: 1 }).unwrap();
        assert_eq!(
            selection.paths(),
            vec![
                PathBuf::from("c.pdf"),
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
            ]
        );

        handle(&mut selection, &target, Command::Swap { a: 2, b: 3 }).unwrap();
        assert_eq!(selection.get(1).unwrap().path, PathBuf::from("b.pdf"));

        let err = handle(&mut selection, &target, Command::Swap { a: 0, b: 1 }).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition { position: 0, len: 3 }));

        let err = handle(&mut selection, &target, Command::Move { from: 1, to: 4 }).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition { position: 4, len: 3 }));
    }

    #[test]
    fn test_handle_order_applies_full_permutation() {
        let mut selection = SelectionList::new();
        selection.add_all(["a.pdf", "b.pdf", "c.pdf"]);
        let target = OutputTarget::default();

        handle(&mut selection, &target, Command::Order(vec![3, 1, 2])).unwrap();
        assert_eq!(
            selection.paths(),
            vec![
                PathBuf::from("c.pdf"),
                PathBuf::from("a.pdf"),
                PathBuf::from("b.pdf"),
            ]
        );
        assert!(selection.iter().enumerate().all(|(i, f)| f.position == i));

        let err = handle(&mut selection, &target, Command::Order(vec![1, 1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidOrder(_)));

        let err = handle(&mut selection, &target, Command::Order(vec![1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidOrder(_)));

        let err = handle(&mut selection, &target, Command::Order(vec![1, 2, 4])).unwrap_err();
        assert!(matches!(err, Error::InvalidPosition { position: 4, len: 3 }));

        assert_eq!(selection.get(0).unwrap().path, PathBuf::from("c.pdf"));
    }

    #[test]
    fn test_handle_clear_and_list() {
        let mut selection = SelectionList::new();
        selection.add("a.pdf");
        let target = OutputTarget::default();

        assert_eq!(
            handle(&mut selection, &target, Command::Clear).unwrap(),
            Outcome::Cleared
        );
        assert_eq!(
            handle(&mut selection, &target, Command::List).unwrap(),
            Outcome::Listed(vec![])
        );
    }

    #[test]
    fn test_handle_combine_empty_selection() {
        let dir = TempDir::new().unwrap();
        let mut selection = SelectionList::new();
        let target = OutputTarget::new(dir.path(), Default::default());

        let result = handle(&mut selection, &target, Command::Combine);
        assert!(matches!(result, Err(Error::NoInputs)));
        assert!(!dir.path().join("combined.pdf").exists());
    }
}
