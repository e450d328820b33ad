//! Host-side frame sources feeding the saver: video files decoded with
//! ffmpeg-next and folders of still images.

pub mod image_folder;
pub mod video_file;

use std::path::Path;

use video_saver_core::shared::frame::Frame;

use image_folder::ImageFolderSource;
use video_file::VideoFileSource;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Pulls RGB frames one at a time from an input.
pub trait FrameSource {
    /// Native frame rate, if the input has one.
    fn frame_rate(&self) -> Option<f64>;

    /// Number of frames the input announces, if known.
    fn frame_count(&self) -> Option<usize>;

    /// Next frame in presentation order, `None` once exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;
}

/// Opens a directory as an image folder and anything else as a video file.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    if path.is_dir() {
        Ok(Box::new(ImageFolderSource::open(path)?))
    } else {
        Ok(Box::new(VideoFileSource::open(path)?))
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
