//! Persistence of a one-dimensional fall so an interrupted run can resume.
//!
//! A checkpoint lives in three one-column text files inside a directory:
//! `pos_at_quit.txt`, `vel_at_quit.txt`, and `time_at_quit.txt`. Each save
//! appends one row to every file and a load reads back the last rows.
//! Time is stored in seconds.
//!
//! The three files must always hold the same number of rows. A save stages
//! every file before replacing any of them, and a load refuses files whose
//! row counts disagree.

use std::{
    fmt::Write as _,
    fs, io,
    num::ParseFloatError,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

const POSITION_FILE: &str = "pos_at_quit.txt";
const VELOCITY_FILE: &str = "vel_at_quit.txt";
const TIME_FILE: &str = "time_at_quit.txt";

/// Errors raised while reading or writing a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} has no rows")]
    Empty { path: PathBuf },

    #[error("could not parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseFloatError,
    },

    #[error("checkpoint files disagree: {positions} positions, {velocities} velocities, {times} times")]
    Inconsistent {
        positions: usize,
        velocities: usize,
        times: usize,
    },
}

/// The saved state of a fall: height, vertical velocity, and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub position: f64,
    pub velocity: f64,
    pub time: f64,
}

/// A checkpoint directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `true` if all three files are present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.paths().iter().all(|path| path.exists())
    }

    /// Appends a row to each file, creating the files if needed.
    ///
    /// The extended files are first written beside the originals and only
    /// then renamed over them, so a failed write leaves the previous
    /// checkpoint intact.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read, written, or replaced.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let paths = self.paths();
        let values = [checkpoint.position, checkpoint.velocity, checkpoint.time];

        let mut staged = Vec::with_capacity(paths.len());
        for (path, value) in paths.iter().zip(values) {
            match stage(path, value) {
                Ok(temp) => staged.push(temp),
                Err(err) => {
                    for temp in &staged {
                        let _ = fs::remove_file(temp);
                    }
                    return Err(err);
                }
            }
        }

        for (temp, path) in staged.iter().zip(&paths) {
            fs::rename(temp, path).map_err(|source| CheckpointError::Io {
                path: path.clone(),
                source,
            })?;
        }

        info!(dir = %self.dir.display(), time = checkpoint.time, "checkpoint saved");
        Ok(())
    }

    /// Reads the last saved row.
    ///
    /// Returns `Ok(None)` unless all three files exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, its last row is not a
    /// number, or the files hold different numbers of rows.
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        if !self.exists() {
            return Ok(None);
        }

        let [position, velocity, time] = self.paths();
        let (positions, position) = last_row(&position)?;
        let (velocities, velocity) = last_row(&velocity)?;
        let (times, time) = last_row(&time)?;
        if positions != velocities || positions != times {
            return Err(CheckpointError::Inconsistent {
                positions,
                velocities,
                times,
            });
        }

        let checkpoint = Checkpoint {
            position,
            velocity,
            time,
        };

        info!(dir = %self.dir.display(), time = checkpoint.time, "checkpoint restored");
        Ok(Some(checkpoint))
    }

    /// Removes whichever checkpoint files exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub fn clear(&self) -> Result<(), CheckpointError> {
        for path in self.paths() {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(CheckpointError::Io { path, source }),
            }
        }
        info!(dir = %self.dir.display(), "checkpoint cleared");
        Ok(())
    }

    fn paths(&self) -> [PathBuf; 3] {
        [POSITION_FILE, VELOCITY_FILE, TIME_FILE].map(|name| self.dir.join(name))
    }
}

/// Writes the contents of `path` plus one new row to a sibling file.
fn stage(path: &Path, value: f64) -> Result<PathBuf, CheckpointError> {
    let mut contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(CheckpointError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    let _ = writeln!(contents, "{value:.18e}");

    let temp = path.with_extension("txt.tmp");
    fs::write(&temp, contents).map_err(|source| CheckpointError::Io {
        path: temp.clone(),
        source,
    })?;
    Ok(temp)
}

/// Returns the number of non-empty rows and the value of the last one.
fn last_row(path: &Path) -> Result<(usize, f64), CheckpointError> {
    let contents = fs::read_to_string(path).map_err(|source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rows: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let row = rows.last().ok_or_else(|| CheckpointError::Empty {
        path: path.to_path_buf(),
    })?;

    let value = row.parse().map_err(|source| CheckpointError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((rows.len(), value))
}
