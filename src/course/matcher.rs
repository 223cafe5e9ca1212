//! Pairs the video and audio fragments a course download leaves behind.
//!
//! A lesson is downloaded as two files: a video-only fragment named
//! `<num>-<name>.fhls-fastly_skyfire-<suffix>.mp4` and an audio fragment whose
//! name starts with `<num>-<name>` and contains `audio`. Once merged the lesson
//! becomes `<num>-<name>.mp4`, which is also how already-processed lessons are
//! recognised.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::process_error::{ProcessError, Result};

pub const FRAGMENT_MARKER: &str = "fhls-fastly_skyfire";
pub const AUDIO_MARKER: &str = "audio";

const PARTIAL_EXTENSIONS: [&str; 2] = [".part", ".ytdl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    Video,
    Audio,
    AlreadyMerged,
}

/// Returns `None` for anything that is not an `.mp4`.
pub fn classify(file_name: &str) -> Option<Fragment> {
    if !file_name.ends_with(".mp4") {
        return None;
    }

    if file_name.contains(AUDIO_MARKER) {
        Some(Fragment::Audio)
    } else if file_name.contains(FRAGMENT_MARKER) {
        Some(Fragment::Video)
    } else {
        Some(Fragment::AlreadyMerged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    /// Digits exactly as they appear in the file name, so `01` stays `01`.
    pub number: String,
    pub name: String,
}

impl Lesson {
    pub fn prefix(&self) -> String {
        format!("{}-{}", self.number, self.name)
    }

    pub fn output_file_name(&self) -> String {
        format!("{}.mp4", self.prefix())
    }

    fn index(&self) -> u64 {
        self.number.parse().unwrap_or(u64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePair {
    pub lesson: Lesson,
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub pairs: Vec<MergePair>,
    /// Lessons whose output file is already there.
    pub skipped: usize,
    /// Video fragments without an audio fragment to go with them.
    pub unmatched: Vec<String>,
    /// Downloads that were interrupted or are still running.
    pub partial: usize,
}

pub struct FragmentMatcher {
    video_pattern: Regex,
}

impl FragmentMatcher {
    pub fn new() -> Result<Self> {
        let video_pattern = Regex::new(&format!(
            r"^(\d+)-(.*?)\.{}-\d+\.mp4$",
            regex::escape(FRAGMENT_MARKER)
        ))?;

        Ok(Self { video_pattern })
    }

    pub fn parse_video(&self, file_name: &str) -> Option<Lesson> {
        let captures = self.video_pattern.captures(file_name)?;

        Some(Lesson {
            number: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }

    /// Lists `course_dir` and pairs what it finds.
    pub async fn scan(&self, course_dir: &Path) -> Result<ScanReport> {
        let read_dir_error = |source: std::io::Error| ProcessError::ReadDir {
            path: course_dir.to_path_buf(),
            source,
        };

        let mut entries = tokio::fs::read_dir(course_dir).await.map_err(read_dir_error)?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            // a lossy name would pair paths that don't exist on disk
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!("Ignoring file with non UTF-8 name: {}", name.to_string_lossy()),
            }
        }

        Ok(self.pair(course_dir, &names))
    }

    /// Pairs fragments out of a directory listing. `names` must hold every
    /// entry of `course_dir`, since it doubles as the existence check for
    /// output files.
    pub fn pair(&self, course_dir: &Path, names: &[String]) -> ScanReport {
        let existing: HashSet<&str> = names.iter().map(String::as_str).collect();

        let mut videos = Vec::new();
        let mut audios = Vec::new();
        let mut report = ScanReport::default();

        for name in names {
            match classify(name) {
                Some(Fragment::Video) => videos.push(name.as_str()),
                Some(Fragment::Audio) => audios.push(name.as_str()),
                Some(Fragment::AlreadyMerged) => debug!("Already merged: {}", name),
                None if PARTIAL_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) => {
                    report.partial += 1
                }
                None => {}
            }
        }

        // shortest candidate first, so `1-intro` prefers `1-intro-audio.mp4`
        // over `1-introduction-audio.mp4`
        audios.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        videos.sort();

        let mut claimed = HashSet::new();
        for video in videos {
            let lesson = match self.parse_video(video) {
                Some(lesson) => lesson,
                None => {
                    debug!("Ignoring fragment with unexpected name: {}", video);
                    continue;
                }
            };

            let output_name = lesson.output_file_name();
            if !claimed.insert(output_name.clone()) {
                warn!("Ignoring {}, another fragment already produces {}", video, output_name);
                continue;
            }

            if existing.contains(output_name.as_str()) {
                report.skipped += 1;
                continue;
            }

            let prefix = lesson.prefix();
            let audio = match audios.iter().find(|audio| audio.starts_with(&prefix)) {
                Some(audio) => audio,
                None => {
                    report.unmatched.push(video.to_string());
                    continue;
                }
            };

            report.pairs.push(MergePair {
                video: course_dir.join(video),
                audio: course_dir.join(audio),
                output: course_dir.join(output_name),
                lesson,
            });
        }

        report.pairs.sort_by(|a, b| {
            a.lesson
                .index()
                .cmp(&b.lesson.index())
                .then_with(|| a.lesson.name.cmp(&b.lesson.name))
        });
        report.unmatched.sort();

        report
    }
}
