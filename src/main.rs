mod course;
mod error;
mod merge;
mod options;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use course::cleanup::SystemTrash;
use merge::FfmpegMerger;

#[derive(Parser, Debug)]
#[command(version, about = "Merge the video and audio fragments of downloaded courses")]
struct Args {
    #[clap(short, long)]
    /// directory that contains one folder per course [default: ./downloads]
    input: Option<PathBuf>,

    #[clap(short, long)]
    /// only process this course folder
    course: Option<String>,

    #[clap(short, long)]
    /// keep the original fragments after merging
    keep: bool,

    #[clap(long, env = "FFMPEG", default_value = "ffmpeg")]
    /// ffmpeg executable used to merge the fragments
    ffmpeg: PathBuf,

    #[clap(short, long)]
    /// print debug output
    verbose: bool,
}

impl Args {
    fn into_options(self) -> options::Options {
        let input_dir = self.input.unwrap_or_else(|| match std::env::current_dir() {
            Ok(cwd) => cwd.join("downloads"),
            Err(_) => PathBuf::from("downloads"),
        });

        options::Options {
            input_dir,
            course: self.course,
            delete_originals: !self.keep,
            ffmpeg: self.ffmpeg,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "course_merger=debug"
    } else {
        "course_merger=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).without_time())
        .init();
}

fn summary(success: bool) -> ExitCode {
    if success {
        println!("Processing completed.");
        ExitCode::SUCCESS
    } else {
        println!("Some files could not be processed.");
        ExitCode::FAILURE
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    let options = args.into_options();

    debug!("Options: {:?}", options);

    let merger = FfmpegMerger::new(&options.ffmpeg);
    if let Err(err) = merger.check_available().await {
        error!("{}", err);
        error!("FFmpeg is required to merge video files, see https://ffmpeg.org/download.html");
        return summary(false);
    }

    let success = course::process_courses(&options, &merger, &SystemTrash).await;

    summary(success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags() {
        let args = Args::try_parse_from(["course_merger", "-k", "-c", "vue", "-i", "x"]).unwrap();
        let options = args.into_options();

        assert_eq!(options.input_dir, PathBuf::from("x"));
        assert_eq!(options.course.as_deref(), Some("vue"));
        assert!(!options.delete_originals);
    }

    #[test]
    fn long_flags() {
        let args = Args::try_parse_from([
            "course_merger",
            "--keep",
            "--course",
            "vue",
            "--input",
            "/data/courses",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
        ])
        .unwrap();
        let options = args.into_options();

        assert_eq!(options.input_dir, PathBuf::from("/data/courses"));
        assert_eq!(options.course.as_deref(), Some("vue"));
        assert!(!options.delete_originals);
        assert_eq!(options.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["course_merger"]).unwrap();
        let options = args.into_options();

        assert_eq!(
            options.input_dir,
            std::env::current_dir().unwrap().join("downloads")
        );
        assert_eq!(options.course, None);
        assert!(options.delete_originals);
    }

    #[test]
    fn input_needs_a_value() {
        assert!(Args::try_parse_from(["course_merger", "-i"]).is_err());
    }

    #[test]
    fn exit_code_follows_outcome() {
        assert_eq!(summary(true), ExitCode::SUCCESS);
        assert_eq!(summary(false), ExitCode::FAILURE);
    }
}
