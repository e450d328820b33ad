use std::path::{Path, PathBuf};

use video_saver_core::shared::frame::Frame;

use super::{is_image, FrameSource};

/// Still images of a folder, in filename order.
///
/// Zero-padded names such as `000000000000.jpg` therefore come out in
/// sequence. Images are decoded lazily, one per `next_frame`.
pub struct ImageFolderSource {
    files: Vec<PathBuf>,
    position: usize,
}

impl ImageFolderSource {
    pub fn open(dir: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        if files.is_empty() {
            return Err(format!("no images found in {}", dir.display()).into());
        }
        files.sort();
        Ok(Self { files, position: 0 })
    }
}

impl FrameSource for ImageFolderSource {
    fn frame_rate(&self) -> Option<f64> {
        None
    }

    fn frame_count(&self) -> Option<usize> {
        Some(self.files.len())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(path) = self.files.get(self.position) else {
            return Ok(None);
        };
        let img = image::open(path)
            .map_err(|e| format!("failed to read image {}: {e}", path.display()))?
            .to_rgb8();
        let (width, height) = img.dimensions();
        let frame = Frame::new(img.into_raw(), width, height, 3, self.position);
        self.position += 1;
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_image(dir: &Path, name: &str, value: u8) {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([value, value, value]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_frames_follow_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        write_test_image(dir.path(), "b.png", 200);
        write_test_image(dir.path(), "a.png", 100);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut source = ImageFolderSource::open(dir.path()).unwrap();
        assert_eq!(source.frame_count(), Some(2));

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.data()[0], 100);
        assert_eq!(first.index(), 0);
        assert_eq!((first.width(), first.height()), (4, 3));

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.data()[0], 200);
        assert_eq!(second.index(), 1);

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_open_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageFolderSource::open(dir.path()).is_err());
    }

    #[test]
    fn test_unreadable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();
        let mut source = ImageFolderSource::open(dir.path()).unwrap();
        assert!(source.next_frame().is_err());
    }
}
