use crate::shared::error::VideoSaverError;
use crate::video::domain::command_runner::CommandLine;

/// Outcome of a session teardown.
///
/// Teardown never fails outright: every problem is recorded in `issues`
/// with diagnostic severity so partially finished artifacts stay usable.
#[derive(Debug, Default)]
pub struct FinalizeReport {
    /// The output video exists (encoded, or written incrementally).
    pub video_saved: bool,
    pub audio_merged: bool,
    pub temp_directory_removed: bool,
    /// External commands in the order they ran.
    pub commands: Vec<CommandLine>,
    pub issues: Vec<VideoSaverError>,
}

impl FinalizeReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn log(&self) {
        for issue in &self.issues {
            issue.report();
        }
    }
}
