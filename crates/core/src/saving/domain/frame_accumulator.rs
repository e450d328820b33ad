use std::borrow::Cow;

use crate::shared::error::{ErrorKind, VideoSaverError};
use crate::shared::frame::Frame;
use crate::shared::frame_size::FrameSize;

/// Validates frame batches and enforces the resolution lock.
///
/// A batch holds simultaneous views of one time step. Views are joined
/// left-to-right, so the first accepted batch fixes the output size at
/// (sum of widths, shared height). Every later batch must join to exactly
/// that size.
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    locked: Option<FrameSize>,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked_size(&self) -> Option<FrameSize> {
        self.locked
    }

    /// Rejects empty batches, empty frames, non-RGB frames, frames whose data
    /// does not match their dimensions and views whose heights differ.
    pub fn validate(frames: &[Frame]) -> Result<(), VideoSaverError> {
        let Some(first) = frames.first() else {
            return Err(VideoSaverError::invalid_frame(
                "The image(s) to be saved cannot be empty.",
            ));
        };
        if frames.iter().any(Frame::is_empty) {
            return Err(VideoSaverError::invalid_frame(
                "The image(s) to be saved cannot be empty.",
            ));
        }
        if let Some(frame) = frames.iter().find(|f| f.channels() != 3) {
            return Err(VideoSaverError::invalid_frame(format!(
                "Frames to be saved must be 3-channel RGB, got {} channels.",
                frame.channels()
            )));
        }
        if let Some(frame) = frames.iter().find(|f| !f.is_well_formed()) {
            return Err(VideoSaverError::invalid_frame(format!(
                "Frame data holds {} bytes but a {} RGB frame needs {}.",
                frame.data().len(),
                frame.size(),
                frame.width() as usize * frame.height() as usize * 3
            )));
        }
        if let Some(frame) = frames.iter().find(|f| f.height() != first.height()) {
            return Err(VideoSaverError::invalid_frame(format!(
                "All views of a frame batch must share the same height to be concatenated \
                 side by side, got {} and {}.",
                first.height(),
                frame.height()
            )));
        }
        Ok(())
    }

    /// Size the batch joins to: summed widths by the shared height.
    pub fn joined_size(frames: &[Frame]) -> FrameSize {
        let width = frames.iter().map(Frame::width).sum();
        let height = frames.first().map(Frame::height).unwrap_or(0);
        FrameSize::new(width, height)
    }

    /// Locks the output size on the first call. Returns the newly locked
    /// size, or `None` when a size was already locked.
    pub fn lock(&mut self, frames: &[Frame]) -> Option<FrameSize> {
        if self.locked.is_some() {
            return None;
        }
        let size = Self::joined_size(frames);
        self.locked = Some(size);
        Some(size)
    }

    /// Joins the batch into one frame. A single view is borrowed as-is.
    pub fn concatenate(frames: &[Frame]) -> Result<Cow<'_, Frame>, VideoSaverError> {
        match frames {
            [single] => Ok(Cow::Borrowed(single)),
            _ => Frame::hconcat(frames).map(Cow::Owned).map_err(|e| {
                VideoSaverError::invalid_frame(format!("Frames could not be concatenated: {e}"))
            }),
        }
    }

    /// Fails unless `frame` matches the locked size.
    pub fn check(&self, frame: &Frame) -> Result<(), VideoSaverError> {
        match self.locked {
            Some(size) if size == frame.size() => Ok(()),
            Some(size) => Err(VideoSaverError::new(
                ErrorKind::ResolutionMismatch,
                format!(
                    "The frames to be saved have different resolution ({} expected, {} received). \
                     You can only save frames with the same resolution.",
                    size,
                    frame.size()
                ),
            )),
            None => Err(VideoSaverError::invalid_frame(
                "No resolution has been locked yet.",
            )),
        }
    }
}
