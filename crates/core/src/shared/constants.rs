/// Output extension that routes a session through the staged backend
/// (temporary JPEGs, then an external image-sequence encode).
pub const STAGED_EXTENSION: &str = "mp4";

/// Extension of the temporary still images written by the staged backend.
pub const TEMP_IMAGE_EXTENSION: &str = "jpg";

/// Width of the zero-padded frame index in temporary image filenames.
pub const FRAME_INDEX_DIGITS: usize = 12;

/// Appended to the output stem to build the temporary image folder name.
pub const TEMP_FOLDER_SALT: &str = "_r8904530ijyiopf9034jiop4g90j0yh795640h38j";

/// Characters of the per-session UUID appended after the salt.
pub const SESSION_TOKEN_LEN: usize = 8;

pub const DEFAULT_CONTAINER_CODEC: &str = "mpeg4";
pub const DEFAULT_FFMPEG_BINARY: &str = "ffmpeg";
pub const DEFAULT_SEQUENCE_CODEC: &str = "libx264";
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
