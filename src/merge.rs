pub mod ffmpeg;

use crate::course::matcher::MergePair;

pub use ffmpeg::FfmpegMerger;

/// Turns one video/audio pair into its output file.
///
/// Implementations report failures themselves and only hand back whether the
/// output was written, so a broken lesson never stops the rest of a course.
#[allow(async_fn_in_trait)]
pub trait Merger {
    async fn merge(&self, pair: &MergePair) -> bool;
}
