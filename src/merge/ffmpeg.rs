use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error};

use crate::course::matcher::MergePair;
use crate::error::process_error::{ProcessError, Result};
use crate::merge::Merger;

pub struct FfmpegMerger {
    program: PathBuf,
}

impl FfmpegMerger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runs `ffmpeg -version` to make sure the executable is there at all.
    pub async fn check_available(&self) -> Result<()> {
        let status = self
            .command()
            .arg("-version")
            .status()
            .await
            .map_err(|err| ProcessError::FfmpegUnavailable {
                program: self.program.clone(),
                reason: err.to_string(),
            })?;

        if !status.success() {
            return Err(ProcessError::FfmpegUnavailable {
                program: self.program.clone(),
                reason: format!("-version exited with {}", status),
            });
        }

        Ok(())
    }

    async fn run(&self, pair: &MergePair) -> Result<()> {
        if let Some(parent) = pair.output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ProcessError::OutputDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut command = self.command();
        command.args(merge_args(&pair.video, &pair.audio, &pair.output));
        debug!("Executing: {:?}", command.as_std());

        let status = command
            .status()
            .await
            .map_err(|source| ProcessError::MergeLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ProcessError::MergeExit {
                output: pair.output.clone(),
                status,
            });
        }

        Ok(())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl Merger for FfmpegMerger {
    async fn merge(&self, pair: &MergePair) -> bool {
        match self.run(pair).await {
            Ok(_) => true,
            Err(err) => {
                error!("Error merging files: {}", err);
                false
            }
        }
    }
}

/// Video stream copied as is, audio re-encoded to AAC, cut to the shorter
/// input, existing output overwritten.
pub fn merge_args(video: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    args.push("-i".into());
    args.push(video.into());
    args.push("-i".into());
    args.push(audio.into());

    for arg in [
        "-c:v",
        "copy",
        "-c:a",
        "aac",
        "-strict",
        "experimental",
        "-map",
        "0:v:0",
        "-map",
        "1:a:0",
        "-shortest",
        "-y",
    ] {
        args.push(arg.into());
    }

    args.push(output.into());
    args
}
