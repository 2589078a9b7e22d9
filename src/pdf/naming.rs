//! Output file naming that never overwrites an existing file
//!
//! The first candidate is the base name itself (`combined.pdf`); after that a
//! number goes between the stem and the extension: `combined (1).pdf`,
//! `combined (2).pdf`, and so on.

use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use crate::error::{Error, Result};

/// Base name used when none is configured
pub const DEFAULT_OUTPUT_NAME: &str = "combined.pdf";

/// A base file name split into stem and extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    stem: String,
    extension: Option<String>,
}

impl OutputName {
    /// Split a file name like `combined.pdf` at its last dot
    ///
    /// The name must be a single file name: no directory parts, not `.` or
    /// `..`, and not empty. The output directory is configured separately.
    pub fn new(file_name: &str) -> Result<Self> {
        let mut components = Path::new(file_name).components();
        let single_name = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name == OsStr::new(file_name),
            _ => false,
        };

        if !single_name || file_name.contains(['/', '\\']) {
            return Err(Error::Usage(format!(
                "output name must be a plain file name, got {:?}",
                file_name
            )));
        }

        Ok(Self::split(file_name))
    }

    fn split(file_name: &str) -> Self {
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned());

        Self { stem, extension }
    }

    /// The `n`th candidate: the plain name for 0, `stem (n).ext` otherwise
    pub fn candidate(&self, n: usize) -> String {
        let stem = if n == 0 {
            self.stem.clone()
        } else {
            format!("{} ({})", self.stem, n)
        };

        match &self.extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        }
    }
}

impl Default for OutputName {
    fn default() -> Self {
        Self::split(DEFAULT_OUTPUT_NAME)
    }
}

/// Where combined output goes: a directory plus a base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub name: OutputName,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            name: OutputName::default(),
        }
    }
}

impl OutputTarget {
    pub fn new(dir: impl Into<PathBuf>, name: OutputName) -> Self {
        Self { dir: dir.into(), name }
    }

    /// First candidate path that does not exist yet
    pub fn next_available(&self) -> PathBuf {
        self.first_free_from(0).1
    }

    /// Create the first free candidate and return it opened for writing
    ///
    /// The file is created with create-new semantics, so an existing file is
    /// never truncated. If another file shows up at the probed name before we
    /// get to create it, probing moves on to the next number.
    pub fn create_file(&self) -> Result<(PathBuf, File)> {
        let mut start = 0;
        loop {
            let (n, path) = self.first_free_from(start);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "output name taken while creating; probing on");
                    start = n + 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn first_free_from(&self, start: usize) -> (usize, PathBuf) {
        let mut n = start;
        loop {
            let path = self.dir.join(self.name.candidate(n));
            if !path.exists() {
                return (n, path);
            }
            debug!(path = %path.display(), "output name exists");
            n += 1;
        }
    }
}

/// First free `combined*.pdf` path in `dir`
pub fn next_available_path(dir: &Path) -> PathBuf {
    OutputTarget::new(dir, OutputName::default()).next_available()
}
