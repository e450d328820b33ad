pub mod ffmpeg_container_writer;
pub mod image_file_writer;
pub mod system_command_runner;
