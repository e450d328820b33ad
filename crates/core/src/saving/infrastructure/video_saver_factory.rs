use crate::saving::video_saver::VideoSaver;
use crate::saving::video_saver_settings::VideoSaverSettings;
use crate::shared::error::VideoSaverError;
use crate::video::infrastructure::ffmpeg_container_writer::FfmpegContainerWriter;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;
use crate::video::infrastructure::system_command_runner::SystemCommandRunner;

/// Creates a saver backed by ffmpeg-next, the `image` crate and the host's
/// ffmpeg executable. Logs which backend was selected.
pub fn create_video_saver(settings: VideoSaverSettings) -> Result<VideoSaver, VideoSaverError> {
    let saver = VideoSaver::new(
        settings,
        Box::new(FfmpegContainerWriter::new()),
        Box::new(ImageFileWriter::new()),
        Box::new(SystemCommandRunner::new()),
    )?;
    log::info!(
        "Saving video to {} using the {:?} backend",
        saver.output_path().display(),
        saver.backend_kind()
    );
    Ok(saver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saving::domain::backend_kind::BackendKind;
    use crate::shared::error::ErrorKind;
    use crate::shared::frame::Frame;
    use crate::shared::frame_size::FrameSize;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, 128]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_direct_end_to_end_writes_one_frame_despite_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut saver = create_video_saver(VideoSaverSettings::new(&path, 30.0)).unwrap();
        assert_eq!(saver.backend_kind(), BackendKind::Direct);

        saver.write_frame(&gradient_frame(640, 480)).unwrap();
        assert!(saver.is_opened());
        assert_eq!(saver.frame_size(), Some(FrameSize::new(640, 480)));

        let err = saver.write_frame(&gradient_frame(320, 240)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResolutionMismatch);

        let report = saver.finish();
        assert!(report.is_clean());

        ffmpeg_next::init().unwrap();
        let mut ictx = ffmpeg_next::format::input(&path).unwrap();
        let video_index = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap()
            .index();
        let packets = ictx
            .packets()
            .filter(|(stream, _)| stream.index() == video_index)
            .count();
        assert_eq!(packets, 1);
    }

    #[test]
    fn test_direct_session_below_one_fps_opens_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.avi");

        let mut saver = create_video_saver(VideoSaverSettings::new(&path, 0.4)).unwrap();
        saver.write_frame(&gradient_frame(64, 48)).unwrap();
        saver.write_frame(&gradient_frame(64, 48)).unwrap();
        assert!(saver.is_opened());

        let report = saver.finish();
        assert!(report.is_clean());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_missing_parent_directory_fails_on_first_write() {
        let mut saver =
            create_video_saver(VideoSaverSettings::new("/nonexistent/dir/out.avi", 30.0)).unwrap();
        let err = saver.write_frame(&gradient_frame(64, 48)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendOpen);
        assert!(!saver.is_opened());
    }
}
