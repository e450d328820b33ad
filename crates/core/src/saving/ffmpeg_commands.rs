use std::path::{Path, PathBuf};

use crate::saving::video_saver_settings::VideoSaverSettings;
use crate::video::domain::command_runner::CommandLine;

/// Builds the fixed ffmpeg invocations the staged backend depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegCommands {
    binary: PathBuf,
    video_codec: String,
    pixel_format: String,
}

impl FfmpegCommands {
    pub fn new(binary: impl Into<PathBuf>, video_codec: &str, pixel_format: &str) -> Self {
        Self {
            binary: binary.into(),
            video_codec: video_codec.to_string(),
            pixel_format: pixel_format.to_string(),
        }
    }

    pub fn from_settings(settings: &VideoSaverSettings) -> Self {
        Self::new(
            &settings.ffmpeg_binary,
            &settings.sequence_codec,
            &settings.pixel_format,
        )
    }

    fn base(&self) -> CommandLine {
        CommandLine::new(self.binary.as_os_str())
    }

    /// Cheap invocation that only succeeds when ffmpeg is installed.
    pub fn probe(&self) -> CommandLine {
        self.base().arg("-version")
    }

    /// Encodes a numbered image sequence into `output`, overwriting it.
    pub fn encode_sequence(&self, pattern: &Path, fps: f64, output: &Path) -> CommandLine {
        self.base()
            .args(["-y", "-framerate"])
            .arg(format!("{fps}"))
            .arg("-i")
            .arg(pattern.as_os_str())
            .args(["-c:v", self.video_codec.as_str()])
            .args(["-pix_fmt", self.pixel_format.as_str()])
            .arg(output.as_os_str())
    }

    /// Copies the video stream of `video` and the audio stream of `audio`
    /// into `output`, stopping at the shorter of the two.
    pub fn merge_audio(&self, video: &Path, audio: &Path, output: &Path) -> CommandLine {
        self.base()
            .args(["-y", "-i"])
            .arg(video.as_os_str())
            .arg("-i")
            .arg(audio.as_os_str())
            .args(["-map", "0:v:0", "-map", "1:a?", "-codec", "copy", "-shortest"])
            .arg(output.as_os_str())
    }
}
