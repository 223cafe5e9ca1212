use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Options {
    pub input_dir: PathBuf,
    pub course: Option<String>,
    pub delete_originals: bool,
    pub ffmpeg: PathBuf,
}
