//! Accumulates frame batches and saves them as a video file.
//!
//! A [`VideoSaver`](saving::video_saver::VideoSaver) validates and joins
//! multi-view frame batches, locks the output resolution on the first
//! write, and routes frames either straight into an ffmpeg-next encoder or
//! through temporary JPEGs that the ffmpeg executable encodes (and
//! optionally muxes with an audio track) at teardown.

pub mod shared {
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod frame_size;
}

pub mod video {
    pub mod domain {
        pub mod command_runner;
        pub mod container_writer;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod saving {
    pub mod domain {
        pub mod backend_kind;
        pub mod frame_accumulator;
        pub mod image_sequence;
        pub mod staged_layout;
    }
    pub mod ffmpeg_commands;
    pub mod finalize_report;
    pub mod staged_finalizer;
    pub mod video_saver;
    pub mod video_saver_settings;
    pub mod infrastructure {
        pub mod video_saver_factory;
    }
}
