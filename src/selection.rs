//! The ordered list of files chosen for combining
//!
//! The list order is the merge order. Paths are kept exactly as given and a
//! path is never stored twice.

use std::path::{Path, PathBuf};
use tracing::{error, info};
use crate::error::{Error, Result};

/// One chosen file and its current position in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Path exactly as it was chosen
    pub path: PathBuf,
    /// Zero-based position, kept equal to the index in the list
    pub position: usize,
}

/// What happened to each path passed to [`SelectionList::add_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Paths appended to the list
    pub added: Vec<PathBuf>,
    /// Paths that were already present and were dropped
    pub repeated: Vec<PathBuf>,
}

/// Ordered, duplicate-free selection of input files
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    files: Vec<SelectedFile>,
}

impl SelectionList {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFile> {
        self.files.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SelectedFile> {
        self.files.get(index)
    }

    /// Whether this exact path is already selected
    pub fn contains(&self, path: &Path) -> bool {
        self.files
            .iter()
            .any(|f| f.path.as_os_str() == path.as_os_str())
    }

    /// The selected paths in merge order
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Append a path unless it is already selected
    ///
    /// Returns `true` if the path was appended. A repeated path is logged and
    /// dropped without error.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.contains(&path) {
            info!("Repeated file [{}] is chosen", path.display());
            return false;
        }

        let position = self.files.len();
        self.files.push(SelectedFile { path, position });
        true
    }

    /// Append each path in order, skipping ones already selected
    pub fn add_all<I, P>(&mut self, paths: I) -> AddReport
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut report = AddReport::default();
        for path in paths {
            let path = path.into();
            if self.add(path.clone()) {
                report.added.push(path);
            } else {
                report.repeated.push(path);
            }
        }
        report
    }

    /// Move the entry at `from` so that it ends up at index `to`
    ///
    /// This is the drag-and-drop operation: entries between the two indices
    /// shift by one to make room.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;

        let item = self.files.remove(from);
        self.files.insert(to, item);
        self.renumber();
        Ok(())
    }

    /// Exchange the entries at `a` and `b`
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_index(a)?;
        self.check_index(b)?;

        self.files.swap(a, b);
        self.renumber();
        Ok(())
    }

    /// Apply a complete new order
    ///
    /// `order[i]` is the current index of the entry that should end up at
    /// index `i`. It must name every current index exactly once; otherwise the
    /// list is left untouched.
    pub fn reorder(&mut self, order: &[usize]) -> Result<()> {
        if order.len() != self.files.len() {
            return Err(Error::InvalidOrder(format!(
                "expected {} positions, got {}",
                self.files.len(),
                order.len()
            )));
        }

        let mut seen = vec![false; order.len()];
        for &index in order {
            self.check_index(index)?;
            if seen[index] {
                return Err(Error::InvalidOrder(format!(
                    "position {} appears more than once",
                    index
                )));
            }
            seen[index] = true;
        }

        let mut reordered: Vec<SelectedFile> = order
            .iter()
            .map(|&index| self.files[index].clone())
            .collect();
        std::mem::swap(&mut self.files, &mut reordered);
        self.renumber();
        Ok(())
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.files.clear();
        if self.files.is_empty() {
            info!("the pdf list is cleared");
        } else {
            error!("error occurred when clearing the pdf list");
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.files.len() {
            Ok(())
        } else {
            Err(Error::InvalidIndex {
                index,
                len: self.files.len(),
            })
        }
    }

    /// Recompute positions after the order changed
    fn renumber(&mut self) {
        for (i, file) in self.files.iter_mut().enumerate() {
            file.position = i;
        }
    }
}
