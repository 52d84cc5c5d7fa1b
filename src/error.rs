use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The input log could not be opened, `reason` is the error reported by the os
    #[error("failed to open {}: {reason}", .path.display())]
    FileOpen { path: PathBuf, reason: io::Error },
    /// Reading the opened log or writing the output failed
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_open_error(&self) -> bool {
        matches!(self, Error::FileOpen { .. })
    }

    /// The underlying io error, regardless of the stage it happened in
    pub fn io_error(&self) -> &io::Error {
        match self {
            Error::FileOpen { reason, .. } => reason,
            Error::Io(e) => e,
        }
    }
}

pub type Result<O, E = Error> = std::result::Result<O, E>;

#[test]
fn test_open_error_message() {
    let error = Error::FileOpen {
        path: PathBuf::from("missing.log"),
        reason: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
    };
    assert!(error.is_open_error());
    assert_eq!(
        "failed to open missing.log: No such file or directory",
        error.to_string()
    );
}

#[test]
fn test_io_error_is_transparent() {
    let error = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
    assert!(!error.is_open_error());
    assert_eq!(io::ErrorKind::BrokenPipe, error.io_error().kind());
    assert_eq!("broken pipe", error.to_string());
}
