use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::shared::constants::{
    FRAME_INDEX_DIGITS, SESSION_TOKEN_LEN, TEMP_FOLDER_SALT, TEMP_IMAGE_EXTENSION,
};

/// Filesystem layout of one staged session.
///
/// The temporary image folder sits next to the output as
/// `<output without extension><salt>_<token>`. The token is unique per
/// session so two sessions sharing an output stem never share a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedLayout {
    temp_directory: PathBuf,
    merged_output: PathBuf,
}

impl StagedLayout {
    pub fn new(output_path: &Path, session_token: &str) -> Self {
        let mut stem: OsString = output_path.with_extension("").into_os_string();
        stem.push(TEMP_FOLDER_SALT);
        stem.push("_");
        stem.push(session_token);

        let mut merged = stem.clone();
        merged.push("_audio");
        let merged_output = match output_path.extension() {
            Some(ext) => PathBuf::from(merged).with_extension(ext),
            None => PathBuf::from(merged),
        };

        Self {
            temp_directory: PathBuf::from(stem),
            merged_output,
        }
    }

    /// Layout with a fresh random session token.
    pub fn for_session(output_path: &Path) -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Self::new(output_path, &token[..SESSION_TOKEN_LEN])
    }

    pub fn temp_directory(&self) -> &Path {
        &self.temp_directory
    }

    /// Where the audio merge writes before replacing the output. Lives next
    /// to the output so the replace is a same-filesystem rename.
    pub fn merged_output(&self) -> &Path {
        &self.merged_output
    }

    /// Input pattern for the sequence encoder, e.g. `<dir>/%012d.jpg`.
    pub fn sequence_pattern(&self) -> PathBuf {
        self.temp_directory.join(format!(
            "%0{FRAME_INDEX_DIGITS}d.{TEMP_IMAGE_EXTENSION}"
        ))
    }
}

/// Fixed-width frame filename, e.g. `000000000042.jpg`.
pub fn frame_file_name(index: u64, extension: &str) -> String {
    format!("{index:0width$}.{extension}", width = FRAME_INDEX_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_directory_replaces_extension() {
        let layout = StagedLayout::new(Path::new("/videos/out.mp4"), "abcd1234");
        assert_eq!(
            layout.temp_directory(),
            Path::new(&format!("/videos/out{TEMP_FOLDER_SALT}_abcd1234"))
        );
    }

    #[test]
    fn test_merged_output_keeps_extension_and_folder() {
        let layout = StagedLayout::new(Path::new("/videos/out.mp4"), "abcd1234");
        assert_eq!(
            layout.merged_output(),
            Path::new(&format!("/videos/out{TEMP_FOLDER_SALT}_abcd1234_audio.mp4"))
        );
    }

    #[test]
    fn test_sequence_pattern() {
        let layout = StagedLayout::new(Path::new("out.mp4"), "t");
        let pattern = layout.sequence_pattern();
        assert_eq!(pattern.file_name().unwrap(), "%012d.jpg");
        assert_eq!(pattern.parent().unwrap(), layout.temp_directory());
    }

    #[test]
    fn test_sessions_get_distinct_directories() {
        let a = StagedLayout::for_session(Path::new("/videos/out.mp4"));
        let b = StagedLayout::for_session(Path::new("/videos/out.mp4"));
        assert_ne!(a.temp_directory(), b.temp_directory());
    }

    #[test]
    fn test_frame_file_name_is_zero_padded() {
        assert_eq!(frame_file_name(0, "jpg"), "000000000000.jpg");
        assert_eq!(frame_file_name(42, "jpg"), "000000000042.jpg");
        assert_eq!(frame_file_name(999_999_999_999, "png"), "999999999999.png");
    }

    #[test]
    fn test_frame_file_names_sort_in_frame_order() {
        let mut names: Vec<String> = [10u64, 2, 1, 100, 0]
            .iter()
            .map(|&i| frame_file_name(i, "jpg"))
            .collect();
        names.sort();
        assert_eq!(names[0], "000000000000.jpg");
        assert_eq!(names[4], "000000000100.jpg");
    }
}
