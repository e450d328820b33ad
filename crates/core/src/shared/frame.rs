use ndarray::{concatenate, ArrayView3, Axis, ShapeError};

use crate::shared::frame_size::FrameSize;

/// A single video/image frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the saving layer
/// treats pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    /// Wraps pixel bytes without checking them; see [`Frame::is_well_formed`].
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    /// True when the frame has a zero dimension or carries no pixel data.
    pub fn is_empty(&self) -> bool {
        self.size().is_empty() || self.channels == 0 || self.data.is_empty()
    }

    /// True when the data holds exactly `width * height * channels` bytes.
    pub fn is_well_formed(&self) -> bool {
        let (h, w, c) = self.shape();
        h.checked_mul(w)
            .and_then(|n| n.checked_mul(c))
            .is_some_and(|len| len == self.data.len())
    }

    pub fn as_ndarray(&self) -> Result<ArrayView3<'_, u8>, ShapeError> {
        ArrayView3::from_shape(self.shape(), &self.data)
    }

    /// Joins frames left-to-right into one frame.
    ///
    /// All frames must share height and channel count. The result takes the
    /// index of the first frame.
    pub fn hconcat(frames: &[Frame]) -> Result<Frame, ShapeError> {
        let views = frames
            .iter()
            .map(Frame::as_ndarray)
            .collect::<Result<Vec<_>, _>>()?;
        let joined = concatenate(Axis(1), &views)?;
        let (height, width, channels) = joined.dim();
        // Iteration is row-major regardless of the memory layout `concatenate` picked.
        let data: Vec<u8> = joined.iter().copied().collect();
        let index = frames.first().map(Frame::index).unwrap_or(0);
        Ok(Frame::new(
            data,
            width as u32,
            height as u32,
            channels as u8,
            index,
        ))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
        assert_eq!(frame.size(), FrameSize::new(2, 2));
    }

    #[test]
    fn test_well_formed_requires_exact_length() {
        assert!(Frame::new(vec![0u8; 12], 2, 2, 3, 0).is_well_formed());
        assert!(!Frame::new(vec![0u8; 10], 2, 2, 3, 0).is_well_formed());
        assert!(!Frame::new(vec![0u8; 14], 2, 2, 3, 0).is_well_formed());
    }

    #[test]
    fn test_as_ndarray_rejects_short_data() {
        let frame = Frame::new(vec![0u8; 10], 2, 2, 3, 0);
        assert!(frame.as_ndarray().is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(Frame::new(Vec::new(), 0, 0, 3, 0).is_empty());
        assert!(Frame::new(Vec::new(), 4, 0, 3, 0).is_empty());
        assert!(!Frame::new(vec![0u8; 3], 1, 1, 3, 0).is_empty());
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray().unwrap();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_hconcat_places_frames_left_to_right() {
        // Two 1x2 frames (width 1, height 2), distinct values per row.
        let left = Frame::new(vec![1, 1, 1, 2, 2, 2], 1, 2, 3, 7);
        let right = Frame::new(vec![3, 3, 3, 4, 4, 4], 1, 2, 3, 8);

        let joined = Frame::hconcat(&[left, right]).unwrap();
        assert_eq!(joined.size(), FrameSize::new(2, 2));
        assert_eq!(joined.index(), 7);
        assert_eq!(
            joined.data(),
            &[1, 1, 1, 3, 3, 3, 2, 2, 2, 4, 4, 4][..],
            "rows must interleave the source frames"
        );
    }

    #[test]
    fn test_hconcat_sums_widths() {
        let frames: Vec<Frame> = (0..3)
            .map(|i| Frame::new(vec![i as u8; 4 * 2 * 3], 4, 2, 3, i))
            .collect();
        let joined = Frame::hconcat(&frames).unwrap();
        assert_eq!(joined.width(), 12);
        assert_eq!(joined.height(), 2);
        assert_eq!(joined.data().len(), 12 * 2 * 3);
    }

    #[test]
    fn test_hconcat_rejects_mismatched_heights() {
        let a = Frame::new(vec![0u8; 2 * 2 * 3], 2, 2, 3, 0);
        let b = Frame::new(vec![0u8; 2 * 3 * 3], 2, 3, 3, 0);
        assert!(Frame::hconcat(&[a, b]).is_err());
    }
}
