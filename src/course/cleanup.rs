use std::path::Path;

use tracing::{debug, error};

use crate::course::matcher::MergePair;
use crate::error::process_error::{ProcessError, Result};

/// Somewhere originals go once they are no longer needed, from where they can
/// still be restored.
pub trait Trash {
    fn discard(&self, path: &Path) -> Result<()>;
}

/// The platform trash / recycle bin.
pub struct SystemTrash;

impl Trash for SystemTrash {
    fn discard(&self, path: &Path) -> Result<()> {
        trash::delete(path).map_err(|err| ProcessError::Cleanup {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

/// Moves the video and audio fragment of every pair to the trash and returns
/// how many files were moved. A file that can't be moved is reported and the
/// rest are still tried.
pub fn trash_originals(pairs: &[MergePair], trash: &impl Trash) -> usize {
    let mut moved = 0;

    for path in pairs.iter().flat_map(|pair| [&pair.video, &pair.audio]) {
        match trash.discard(path) {
            Ok(_) => {
                debug!("Moved {} to trash", path.display());
                moved += 1;
            }
            Err(err) => error!("Error sending original file to trash: {}", err),
        }
    }

    moved
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;

    use super::*;
    use crate::course::matcher::Lesson;

    #[derive(Default)]
    struct RecordingTrash {
        refuse: Vec<PathBuf>,
        discarded: RefCell<Vec<PathBuf>>,
    }

    impl Trash for RecordingTrash {
        fn discard(&self, path: &Path) -> Result<()> {
            if self.refuse.iter().any(|refused| refused == path) {
                return Err(ProcessError::Cleanup {
                    path: path.to_path_buf(),
                    reason: "permission denied".to_string(),
                });
            }
            self.discarded.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn pair(number: &str, name: &str) -> MergePair {
        let dir = Path::new("/course");
        MergePair {
            lesson: Lesson {
                number: number.to_string(),
                name: name.to_string(),
            },
            video: dir.join(format!("{}-{}.fhls-fastly_skyfire-500.mp4", number, name)),
            audio: dir.join(format!("{}-{}-audio.mp4", number, name)),
            output: dir.join(format!("{}-{}.mp4", number, name)),
        }
    }

    #[test]
    fn discards_video_and_audio_of_every_pair() {
        let trash = RecordingTrash::default();
        let pairs = vec![pair("01", "intro"), pair("02", "setup")];

        assert_eq!(trash_originals(&pairs, &trash), 4);
        assert_eq!(
            *trash.discarded.borrow(),
            vec![
                pairs[0].video.clone(),
                pairs[0].audio.clone(),
                pairs[1].video.clone(),
                pairs[1].audio.clone(),
            ]
        );
    }

    #[test]
    fn keeps_going_after_a_failed_move() {
        let pairs = vec![pair("01", "intro"), pair("02", "setup")];
        let trash = RecordingTrash {
            refuse: vec![pairs[0].video.clone()],
            ..Default::default()
        };

        assert_eq!(trash_originals(&pairs, &trash), 3);
        assert!(trash.discarded.borrow().contains(&pairs[0].audio));
        assert!(trash.discarded.borrow().contains(&pairs[1].video));
    }
}
