use std::path::Path;

use crate::saving::domain::backend_kind::BackendKind;
use crate::saving::domain::frame_accumulator::FrameAccumulator;
use crate::saving::domain::image_sequence::ImageSequence;
use crate::saving::domain::staged_layout::StagedLayout;
use crate::saving::ffmpeg_commands::FfmpegCommands;
use crate::saving::finalize_report::FinalizeReport;
use crate::saving::staged_finalizer::StagedFinalizer;
use crate::saving::video_saver_settings::VideoSaverSettings;
use crate::shared::constants::TEMP_IMAGE_EXTENSION;
use crate::shared::error::{ErrorKind, VideoSaverError};
use crate::shared::frame::Frame;
use crate::shared::frame_size::FrameSize;
use crate::video::domain::command_runner::CommandRunner;
use crate::video::domain::container_writer::ContainerWriter;
use crate::video::domain::image_writer::ImageWriter;

enum Backend {
    Direct(Box<dyn ContainerWriter>),
    Staged(StagedBackend),
}

struct StagedBackend {
    layout: StagedLayout,
    /// Handed to the image sequence when the first frame arrives.
    image_writer: Option<Box<dyn ImageWriter>>,
    sequence: Option<ImageSequence>,
}

/// Saves a stream of frame batches as one video file.
///
/// The output resolution is unknown until the first batch arrives, so the
/// backend opens lazily on the first [`write`](Self::write). Depending on
/// the output extension, frames either stream into a container writer
/// (`Direct`) or become numbered JPEGs that ffmpeg encodes into the output
/// at teardown (`Staged`), optionally merging in an external audio track.
///
/// Teardown happens in [`finish`](Self::finish) or, failing that, on drop.
/// Writes must be serialized by the caller.
pub struct VideoSaver {
    settings: VideoSaverSettings,
    backend: Backend,
    runner: Box<dyn CommandRunner>,
    commands: FfmpegCommands,
    accumulator: FrameAccumulator,
    started: bool,
    finished: bool,
}

impl VideoSaver {
    /// Validates the settings and selects the backend.
    ///
    /// Fails if the frame rate is not positive, if the staged backend is
    /// selected on an unsupported platform or without ffmpeg installed, or
    /// if an audio source is requested for the direct backend.
    pub fn new(
        mut settings: VideoSaverSettings,
        container_writer: Box<dyn ContainerWriter>,
        image_writer: Box<dyn ImageWriter>,
        runner: Box<dyn CommandRunner>,
    ) -> Result<Self, VideoSaverError> {
        settings.audio_source = settings
            .audio_source
            .take()
            .filter(|p| !p.as_os_str().is_empty());

        if !(settings.fps > 0.0 && settings.fps.is_finite()) {
            return Err(VideoSaverError::precondition(format!(
                "Desired fps (frame rate) to save the video is <= 0 (got {}).",
                settings.fps
            )));
        }

        let kind = settings.backend_kind();
        let commands = FfmpegCommands::from_settings(&settings);

        if kind == BackendKind::Staged {
            check_staged_supported()?;
            if !runner.probe(&commands.probe()) {
                return Err(VideoSaverError::precondition(format!(
                    "In order to save the video in MP4 format, FFmpeg must be installed on your \
                     system (`{}` could not be run). Please, use an `avi` output format (e.g., \
                     `output.avi`) or install FFmpeg by running `sudo apt-get install ffmpeg` \
                     (Ubuntu), `brew install ffmpeg` (Mac) or an analogous command.",
                    settings.ffmpeg_binary.display()
                )));
            }
        }

        if settings.audio_source.is_some() && kind != BackendKind::Staged {
            return Err(VideoSaverError::precondition(
                "In order to save the video with audio, it must be in MP4 format. So either \
                 1) do not set an audio source or 2) make sure the output path finishes in `.mp4`.",
            ));
        }

        let backend = match kind {
            BackendKind::Direct => Backend::Direct(container_writer),
            BackendKind::Staged => Backend::Staged(StagedBackend {
                layout: StagedLayout::for_session(&settings.output_path),
                image_writer: Some(image_writer),
                sequence: None,
            }),
        };

        Ok(Self {
            settings,
            backend,
            runner,
            commands,
            accumulator: FrameAccumulator::new(),
            started: false,
            finished: false,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.settings.output_path
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self.backend {
            Backend::Direct(_) => BackendKind::Direct,
            Backend::Staged(_) => BackendKind::Staged,
        }
    }

    /// Size locked by the first write, if any.
    pub fn frame_size(&self) -> Option<FrameSize> {
        self.accumulator.locked_size()
    }

    /// Temporary image folder of the staged backend.
    pub fn temp_directory(&self) -> Option<&Path> {
        match &self.backend {
            Backend::Direct(_) => None,
            Backend::Staged(staged) => Some(staged.layout.temp_directory()),
        }
    }

    /// Frames handed to the staged backend so far. Always zero for the
    /// direct backend.
    pub fn frames_written(&self) -> u64 {
        match &self.backend {
            Backend::Direct(_) => 0,
            Backend::Staged(staged) => staged.sequence.as_ref().map_or(0, ImageSequence::len),
        }
    }

    /// Direct: whether the container writer is open. Staged: whether the
    /// image sequence has been created.
    pub fn is_opened(&self) -> bool {
        match &self.backend {
            Backend::Direct(writer) => writer.is_opened(),
            Backend::Staged(staged) => staged.sequence.is_some(),
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoSaverError> {
        self.write(std::slice::from_ref(frame))
    }

    /// Writes one time step. Multiple frames are simultaneous views and are
    /// joined left-to-right into a single output frame.
    pub fn write(&mut self, frames: &[Frame]) -> Result<(), VideoSaverError> {
        if self.finished {
            return Err(VideoSaverError::new(
                ErrorKind::BackendWrite,
                "Video has already been finalized.",
            ));
        }
        FrameAccumulator::validate(frames)?;

        // The backend opens on the first batch because only then is the
        // resolution known. A failed open is not retried.
        if !self.started {
            self.started = true;
            if let Some(size) = self.accumulator.lock(frames) {
                self.open_backend(size)?;
            }
        }

        if !self.is_opened() {
            return Err(VideoSaverError::new(
                ErrorKind::BackendOpen,
                "Video to write frames is not opened.",
            ));
        }

        let frame = FrameAccumulator::concatenate(frames)?;
        self.accumulator.check(&frame)?;
        self.dispatch(&frame)
    }

    fn open_backend(&mut self, size: FrameSize) -> Result<(), VideoSaverError> {
        let settings = &self.settings;
        match &mut self.backend {
            Backend::Direct(writer) => {
                log::debug!(
                    "Opening {} ({}, {} fps, {size})",
                    settings.output_path.display(),
                    settings.codec,
                    settings.fps
                );
                writer
                    .open(&settings.output_path, &settings.codec, settings.fps, size)
                    .map_err(|e| {
                        VideoSaverError::new(
                            ErrorKind::BackendOpen,
                            format!(
                                "Video to write frames could not be opened as `{}` ({e}). \
                                 Please, check that:\
                                 \n\t1. The path ends in `.avi` (or another container the \
                                 encoder supports).\
                                 \n\t2. The parent folder exists.\
                                 \n\t3. FFmpeg is built with the `{}` encoder.\
                                 \n\t4. You are not saving in a protected folder. If you desire \
                                 to save a video in a protected folder, use sudo (Ubuntu) or \
                                 execute the binary file as administrator (Windows).",
                                settings.output_path.display(),
                                settings.codec
                            ),
                        )
                    })
            }
            Backend::Staged(staged) => {
                let directory = staged.layout.temp_directory();
                log::info!(
                    "Temporarily saving video frames as JPG images in: {}",
                    directory.display()
                );
                let Some(image_writer) = staged.image_writer.take() else {
                    return Err(VideoSaverError::new(
                        ErrorKind::BackendOpen,
                        "Image writer was already consumed.",
                    ));
                };
                let sequence = ImageSequence::create(directory, TEMP_IMAGE_EXTENSION, image_writer)
                    .map_err(|e| {
                        VideoSaverError::new(
                            ErrorKind::BackendOpen,
                            format!(
                                "Temporary image folder {} could not be created: {e}",
                                directory.display()
                            ),
                        )
                    })?;
                staged.sequence = Some(sequence);
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, frame: &Frame) -> Result<(), VideoSaverError> {
        let output_path = &self.settings.output_path;
        match &mut self.backend {
            Backend::Direct(writer) => writer.write(frame).map_err(|e| {
                VideoSaverError::new(
                    ErrorKind::BackendWrite,
                    format!("Frame could not be appended to {}: {e}", output_path.display()),
                )
            }),
            Backend::Staged(staged) => {
                let Some(sequence) = staged.sequence.as_mut() else {
                    return Err(VideoSaverError::new(
                        ErrorKind::BackendOpen,
                        "Video to write frames is not opened.",
                    ));
                };
                sequence.push(frame).map(|_| ()).map_err(|e| {
                    VideoSaverError::new(
                        ErrorKind::BackendWrite,
                        format!(
                            "Frame could not be saved in {}: {e}",
                            sequence.directory().display()
                        ),
                    )
                })
            }
        }
    }

    /// Finalizes the video now and returns what happened. Dropping the
    /// saver does the same but can only log the report.
    pub fn finish(mut self) -> FinalizeReport {
        self.teardown()
    }

    fn teardown(&mut self) -> FinalizeReport {
        if self.finished {
            return FinalizeReport::default();
        }
        self.finished = true;

        match &mut self.backend {
            Backend::Direct(writer) => close_direct(writer.as_mut(), &self.settings.output_path),
            Backend::Staged(staged) => {
                let frames_written = staged.sequence.as_ref().map_or(0, ImageSequence::len);
                // Release the image writer before the folder is encoded and removed.
                staged.sequence = None;
                staged.image_writer = None;
                StagedFinalizer::new(
                    self.runner.as_ref(),
                    &self.commands,
                    &staged.layout,
                    &self.settings.output_path,
                    self.settings.fps,
                )
                .finalize(frames_written, self.settings.audio_source.as_deref())
            }
        }
    }
}

impl Drop for VideoSaver {
    fn drop(&mut self) {
        if !self.finished {
            self.teardown().log();
        }
    }
}

fn close_direct(writer: &mut dyn ContainerWriter, output_path: &Path) -> FinalizeReport {
    let mut report = FinalizeReport::default();
    if !writer.is_opened() {
        return report;
    }
    match writer.close() {
        Ok(()) => {
            report.video_saved = true;
            log::info!("Video saved to {}.", output_path.display());
        }
        Err(e) => report.issues.push(VideoSaverError::new(
            ErrorKind::Finalization,
            format!("Video {} could not be finished: {e}", output_path.display()),
        )),
    }
    report
}

#[cfg(windows)]
fn check_staged_supported() -> Result<(), VideoSaverError> {
    Err(VideoSaverError::precondition(
        "MP4 recording requires an Ubuntu or Mac machine. Please, use an `avi` output format \
         (e.g., `output.avi`) instead.",
    ))
}

#[cfg(not(windows))]
fn check_staged_supported() -> Result<(), VideoSaverError> {
    Ok(())
}
