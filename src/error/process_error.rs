use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Course directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Error reading directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No video/audio pairs found in {0}")]
    NoPairsFound(String),

    #[error("Error creating output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {status} while writing {}", .output.display())]
    MergeExit {
        output: PathBuf,
        status: ExitStatus,
    },

    #[error("Failed to execute {}: {source}", .program.display())]
    MergeLaunch {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is not usable: {reason}", .program.display())]
    FfmpegUnavailable {
        program: PathBuf,
        reason: String,
    },

    #[error("Error moving {} to trash: {reason}", .path.display())]
    Cleanup {
        path: PathBuf,
        reason: String,
    },

    #[error("Invalid fragment pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ProcessError>;
