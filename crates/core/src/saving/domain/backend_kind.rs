use std::path::Path;

use crate::shared::constants::STAGED_EXTENSION;

/// Which backend a saving session writes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Frames stream straight into a container writer.
    Direct,
    /// Frames become temporary JPEGs that an external encoder turns into
    /// the output video at teardown.
    Staged,
}

impl BackendKind {
    /// Picks the backend from the output extension (case-insensitive).
    pub fn for_output(path: &Path) -> Self {
        let staged = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(STAGED_EXTENSION))
            .unwrap_or(false);
        if staged {
            BackendKind::Staged
        } else {
            BackendKind::Direct
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::mp4("out.mp4", BackendKind::Staged)]
    #[case::upper_mp4("/videos/OUT.MP4", BackendKind::Staged)]
    #[case::mixed_mp4("clip.Mp4", BackendKind::Staged)]
    #[case::avi("out.avi", BackendKind::Direct)]
    #[case::mkv("out.mkv", BackendKind::Direct)]
    #[case::mp4_in_stem("out.mp4.avi", BackendKind::Direct)]
    #[case::no_extension("out", BackendKind::Direct)]
    fn test_for_output(#[case] path: &str, #[case] expected: BackendKind) {
        assert_eq!(BackendKind::for_output(Path::new(path)), expected);
    }
}
