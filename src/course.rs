pub mod cleanup;
pub mod matcher;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::process_error::{ProcessError, Result};
use crate::merge::Merger;
use crate::options::Options;

use cleanup::Trash;
use matcher::{FragmentMatcher, MergePair};

#[derive(Debug)]
pub struct CourseOutcome {
    pub merged: Vec<MergePair>,
    /// False as soon as a single pair fails to merge.
    pub success: bool,
}

/// Processes the course named in `options`, or every course under the input
/// directory when none is named. Returns whether everything went through.
pub async fn process_courses(options: &Options, merger: &impl Merger, trash: &impl Trash) -> bool {
    let matcher = match FragmentMatcher::new() {
        Ok(matcher) => matcher,
        Err(err) => {
            error!("{}", err);
            return false;
        }
    };

    if let Some(course) = &options.course {
        let course_dir = options.input_dir.join(course);
        if !course_dir.is_dir() {
            error!("{}", ProcessError::DirectoryNotFound(course_dir));
            return false;
        }

        return process_course(&course_dir, &matcher, options, merger, trash).await;
    }

    let course_dirs = match list_courses(&options.input_dir).await {
        Ok(course_dirs) => course_dirs,
        Err(err) => {
            error!("{}", err);
            return false;
        }
    };

    let mut success = true;
    for course_dir in course_dirs {
        if !process_course(&course_dir, &matcher, options, merger, trash).await {
            success = false;
        }
    }

    success
}

async fn list_courses(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir_error = |source: std::io::Error| ProcessError::ReadDir {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(input_dir).await.map_err(read_dir_error)?;

    let mut course_dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        if path.is_dir() {
            course_dirs.push(path);
        }
    }

    course_dirs.sort();
    Ok(course_dirs)
}

async fn process_course(
    course_dir: &Path,
    matcher: &FragmentMatcher,
    options: &Options,
    merger: &impl Merger,
    trash: &impl Trash,
) -> bool {
    match merge_course(course_dir, matcher, options, merger, trash).await {
        Ok(outcome) => outcome.success,
        Err(err) => {
            error!("{}", err);
            false
        }
    }
}

/// Merges every pair of one course and, if all of them went through, trashes
/// the originals. A course with a single failed merge keeps all its originals.
pub async fn merge_course(
    course_dir: &Path,
    matcher: &FragmentMatcher,
    options: &Options,
    merger: &impl Merger,
    trash: &impl Trash,
) -> Result<CourseOutcome> {
    let course_name = course_dir
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| course_dir.display().to_string());

    info!("Course: {}", course_name);

    let report = matcher.scan(course_dir).await?;

    if report.skipped > 0 {
        info!("Skipped {} lessons that were already processed", report.skipped);
    }
    for video in &report.unmatched {
        warn!("No audio fragment found for {}", video);
    }
    if report.partial > 0 {
        warn!("{} downloads in {} are not finished yet", report.partial, course_name);
    }

    if report.pairs.is_empty() {
        return Err(ProcessError::NoPairsFound(course_name));
    }

    let mut outcome = CourseOutcome {
        merged: Vec::with_capacity(report.pairs.len()),
        success: true,
    };

    for pair in report.pairs {
        info!("Processing: {}", pair.lesson.output_file_name());
        if merger.merge(&pair).await {
            outcome.merged.push(pair);
        } else {
            outcome.success = false;
        }
    }

    info!(
        "{}: merged {}, skipped {}, unmatched {}",
        course_name,
        outcome.merged.len(),
        report.skipped,
        report.unmatched.len()
    );

    if outcome.success && options.delete_originals && !outcome.merged.is_empty() {
        cleanup::trash_originals(&outcome.merged, trash);
    } else if !outcome.success && options.delete_originals {
        warn!("Keeping original files of {} since not every lesson could be merged", course_name);
    }

    Ok(outcome)
}
