use std::path::{Path, PathBuf};

use crate::saving::domain::staged_layout::frame_file_name;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Numbered still images in one folder, written in arrival order.
pub struct ImageSequence {
    directory: PathBuf,
    extension: String,
    writer: Box<dyn ImageWriter>,
    next_index: u64,
}

impl ImageSequence {
    /// Ensures `directory` exists and roots the sequence there.
    pub fn create(
        directory: &Path,
        extension: &str,
        writer: Box<dyn ImageWriter>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            extension: extension.to_string(),
            writer,
            next_index: 0,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Number of frames written so far.
    pub fn len(&self) -> u64 {
        self.next_index
    }

    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Saves the frame under the next index. The index only advances when
    /// the write succeeds.
    pub fn push(&mut self, frame: &Frame) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self
            .directory
            .join(frame_file_name(self.next_index, &self.extension));
        self.writer.write(&path, frame)?;
        self.next_index += 1;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingWriter {
        paths: Arc<Mutex<Vec<PathBuf>>>,
        fail: bool,
    }

    impl ImageWriter for RecordingWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail {
                return Err("disk full".into());
            }
            self.paths.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 12], 2, 2, 3, 0)
    }

    #[test]
    fn test_create_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        let writer = RecordingWriter {
            paths: Arc::default(),
            fail: false,
        };
        let seq = ImageSequence::create(&target, "jpg", Box::new(writer)).unwrap();
        assert!(target.is_dir());
        assert!(seq.is_empty());
        assert_eq!(seq.directory(), target);
    }

    #[test]
    fn test_push_numbers_frames_consecutively() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Arc::new(Mutex::new(Vec::new()));
        let writer = RecordingWriter {
            paths: paths.clone(),
            fail: false,
        };
        let mut seq = ImageSequence::create(dir.path(), "jpg", Box::new(writer)).unwrap();
        for _ in 0..3 {
            seq.push(&frame()).unwrap();
        }
        assert_eq!(seq.len(), 3);

        let names: Vec<String> = paths
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["000000000000.jpg", "000000000001.jpg", "000000000002.jpg"]
        );
    }

    #[test]
    fn test_failed_push_does_not_advance() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter {
            paths: Arc::default(),
            fail: true,
        };
        let mut seq = ImageSequence::create(dir.path(), "jpg", Box::new(writer)).unwrap();
        assert!(seq.push(&frame()).is_err());
        assert_eq!(seq.len(), 0);
    }
}
