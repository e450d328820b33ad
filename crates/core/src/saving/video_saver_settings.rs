use std::path::PathBuf;

use crate::saving::domain::backend_kind::BackendKind;
use crate::shared::constants::{
    DEFAULT_CONTAINER_CODEC, DEFAULT_FFMPEG_BINARY, DEFAULT_PIXEL_FORMAT, DEFAULT_SEQUENCE_CODEC,
};

/// Configuration of one video saving session.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSaverSettings {
    /// Destination video. An `.mp4` extension selects the staged backend.
    pub output_path: PathBuf,
    /// Encoder name for the direct backend.
    pub codec: String,
    pub fps: f64,
    /// Video whose audio track is merged into the output (staged only).
    pub audio_source: Option<PathBuf>,
    /// External ffmpeg executable used by the staged backend.
    pub ffmpeg_binary: PathBuf,
    /// Video codec the external encoder uses for the staged output.
    pub sequence_codec: String,
    pub pixel_format: String,
}

impl VideoSaverSettings {
    pub fn new(output_path: impl Into<PathBuf>, fps: f64) -> Self {
        Self {
            output_path: output_path.into(),
            codec: DEFAULT_CONTAINER_CODEC.to_string(),
            fps,
            audio_source: None,
            ffmpeg_binary: PathBuf::from(DEFAULT_FFMPEG_BINARY),
            sequence_codec: DEFAULT_SEQUENCE_CODEC.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
        }
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    /// An empty path means no audio merge.
    pub fn with_audio_source(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.audio_source = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    pub fn with_ffmpeg_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.ffmpeg_binary = binary.into();
        self
    }

    pub fn with_sequence_codec(mut self, codec: impl Into<String>) -> Self {
        self.sequence_codec = codec.into();
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: impl Into<String>) -> Self {
        self.pixel_format = pixel_format.into();
        self
    }

    pub fn backend_kind(&self) -> BackendKind {
        BackendKind::for_output(&self.output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = VideoSaverSettings::new("out.avi", 30.0);
        assert_eq!(settings.codec, "mpeg4");
        assert_eq!(settings.ffmpeg_binary, PathBuf::from("ffmpeg"));
        assert_eq!(settings.sequence_codec, "libx264");
        assert_eq!(settings.pixel_format, "yuv420p");
        assert_eq!(settings.audio_source, None);
        assert_eq!(settings.backend_kind(), BackendKind::Direct);
    }

    #[test]
    fn test_empty_audio_source_means_none() {
        let settings = VideoSaverSettings::new("out.mp4", 30.0).with_audio_source("");
        assert_eq!(settings.audio_source, None);

        let settings = settings.with_audio_source("source.mp4");
        assert_eq!(settings.audio_source, Some(PathBuf::from("source.mp4")));
    }

    #[test]
    fn test_builders() {
        let settings = VideoSaverSettings::new("out.mp4", 25.0)
            .with_codec("mjpeg")
            .with_ffmpeg_binary("/opt/ffmpeg/bin/ffmpeg")
            .with_sequence_codec("libx265")
            .with_pixel_format("yuv444p");
        assert_eq!(settings.codec, "mjpeg");
        assert_eq!(settings.ffmpeg_binary, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(settings.sequence_codec, "libx265");
        assert_eq!(settings.pixel_format, "yuv444p");
        assert_eq!(settings.backend_kind(), BackendKind::Staged);
    }
}
