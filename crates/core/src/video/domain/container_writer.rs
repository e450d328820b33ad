use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::frame_size::FrameSize;

/// Streams frames straight into an encoded video container.
///
/// Abstracts the encoding library so the saving session never depends on
/// a specific codec implementation.
pub trait ContainerWriter: Send {
    /// Opens the container at `path`. `codec` is an encoder name understood
    /// by the implementation.
    fn open(
        &mut self,
        path: &Path,
        codec: &str,
        fps: f64,
        size: FrameSize,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn is_opened(&self) -> bool;

    /// Appends one frame. The frame must match the size given to `open`.
    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes buffered packets and finishes the container. Safe to call
    /// more than once.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
