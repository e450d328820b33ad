use std::fmt;

/// Width and height of a (possibly concatenated) output frame in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FrameSize::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn test_is_empty() {
        assert!(FrameSize::new(0, 480).is_empty());
        assert!(FrameSize::new(640, 0).is_empty());
        assert!(!FrameSize::new(1, 1).is_empty());
    }
}
