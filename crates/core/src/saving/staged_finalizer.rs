use std::path::Path;

use crate::saving::domain::staged_layout::StagedLayout;
use crate::saving::ffmpeg_commands::FfmpegCommands;
use crate::saving::finalize_report::FinalizeReport;
use crate::shared::error::{ErrorKind, VideoSaverError};
use crate::video::domain::command_runner::{CommandLine, CommandRunner};

/// Turns the staged JPEG folder into the output video, then optionally
/// merges an audio track into it.
///
/// Each external step runs once. Failures are recorded in the report and
/// never undo an earlier step.
pub struct StagedFinalizer<'a> {
    runner: &'a dyn CommandRunner,
    commands: &'a FfmpegCommands,
    layout: &'a StagedLayout,
    output_path: &'a Path,
    fps: f64,
}

impl<'a> StagedFinalizer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        commands: &'a FfmpegCommands,
        layout: &'a StagedLayout,
        output_path: &'a Path,
        fps: f64,
    ) -> Self {
        Self {
            runner,
            commands,
            layout,
            output_path,
            fps,
        }
    }

    pub fn finalize(&self, frames_written: u64, audio_source: Option<&Path>) -> FinalizeReport {
        let mut report = FinalizeReport::default();
        let temp_directory = self.layout.temp_directory();

        if frames_written == 0 {
            log::warn!(
                "No frames were written, so no video is created at {}.",
                self.output_path.display()
            );
            self.remove_temp_directory(&mut report);
            return report;
        }

        log::info!(
            "JPG images temporarily generated in {}.",
            temp_directory.display()
        );
        let encode = self.commands.encode_sequence(
            &self.layout.sequence_pattern(),
            self.fps,
            self.output_path,
        );
        log::info!("Creating MP4 video out of JPG images by running:\n{encode}\n");

        match self.run(&encode, &mut report) {
            Ok(()) => {
                report.video_saved = true;
                if self.remove_temp_directory(&mut report) {
                    log::info!("Video saved and temporary image folder removed.");
                }
            }
            Err(reason) => {
                report.issues.push(VideoSaverError::new(
                    ErrorKind::ExternalProcess,
                    format!(
                        "Video {} could not be saved ({reason}). The JPG images were kept in {}. \
                         Make sure you can manually run the following command (with no errors) \
                         from the terminal:\n{encode}",
                        self.output_path.display(),
                        temp_directory.display()
                    ),
                ));
            }
        }

        if let Some(audio) = audio_source {
            if report.video_saved {
                self.merge_audio(audio, &mut report);
            } else {
                log::warn!(
                    "Skipping audio merge from {} because the video was not saved.",
                    audio.display()
                );
            }
        }

        report
    }

    fn merge_audio(&self, audio: &Path, report: &mut FinalizeReport) {
        let merged_output = self.layout.merged_output();
        let command = self
            .commands
            .merge_audio(self.output_path, audio, merged_output);
        log::info!("Adding audio to video by running:\n{command}");

        let outcome = self
            .run(&command, report)
            .and_then(|()| {
                std::fs::rename(merged_output, self.output_path).map_err(|e| {
                    format!(
                        "moving {} to {} failed: {e}",
                        merged_output.display(),
                        self.output_path.display()
                    )
                })
            });

        match outcome {
            Ok(()) => {
                report.audio_merged = true;
                log::info!("Audio added to {}.", self.output_path.display());
            }
            Err(reason) => {
                if merged_output.exists() {
                    let _ = std::fs::remove_file(merged_output);
                }
                report.issues.push(VideoSaverError::new(
                    ErrorKind::ExternalProcess,
                    format!(
                        "Video {} could not be saved with audio ({reason}). The video without \
                         audio was kept. Make sure you can manually run the following command \
                         (with no errors) from the terminal:\n{command}",
                        self.output_path.display()
                    ),
                ));
            }
        }
    }

    /// Runs a command once, describing any failure for the diagnostic.
    fn run(&self, command: &CommandLine, report: &mut FinalizeReport) -> Result<(), String> {
        report.commands.push(command.clone());
        match self.runner.run(command) {
            Ok(0) => Ok(()),
            Ok(code) => Err(format!("exit code: {code}")),
            Err(e) => Err(e.to_string()),
        }
    }

    fn remove_temp_directory(&self, report: &mut FinalizeReport) -> bool {
        let temp_directory = self.layout.temp_directory();
        if !temp_directory.exists() {
            return false;
        }
        match std::fs::remove_dir_all(temp_directory) {
            Ok(()) => {
                report.temp_directory_removed = true;
                true
            }
            Err(e) => {
                report.issues.push(VideoSaverError::new(
                    ErrorKind::Finalization,
                    format!(
                        "Temporary image folder {} could not be removed: {e}",
                        temp_directory.display()
                    ),
                ));
                false
            }
        }
    }
}
