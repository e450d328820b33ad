use std::path::Path;

use ffmpeg_next::Rational;

use crate::shared::frame::Frame;
use crate::shared::frame_size::FrameSize;
use crate::video::domain::container_writer::ContainerWriter;

/// Encodes RGB frames into a video container via ffmpeg-next.
///
/// The encoder is looked up by name (e.g. `mpeg4`, `mjpeg`, `ffv1`) and the
/// container format is guessed from the output path's extension.
pub struct FfmpegContainerWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    size: FrameSize,
    time_base: Rational,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegContainerWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegContainerWriter {}

impl FfmpegContainerWriter {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            size: FrameSize::new(0, 0),
            time_base: Rational(0, 1),
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegContainerWriter: not opened".into());
        };
        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegContainerWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(self.time_base, ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegContainerWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Largest numerator or denominator allowed in the stream rate. MPEG-4
/// part 2 stores the time base denominator in 16 bits.
const MAX_RATE_TERM: i32 = 65_535;

/// Closest rational to `fps` within [`MAX_RATE_TERM`], so 29.97 becomes
/// 2997/100 and 0.4 becomes 2/5.
fn frame_rate(fps: f64) -> Result<Rational, Box<dyn std::error::Error>> {
    if !(fps > 0.0 && fps.is_finite()) {
        return Err(format!("frame rate must be positive, got {fps}").into());
    }
    // Safety: av_d2q only does arithmetic on its arguments.
    let rate = unsafe { ffmpeg_next::ffi::av_d2q(fps, MAX_RATE_TERM) };
    if rate.num <= 0 || rate.den <= 0 {
        return Err(format!("frame rate {fps} has no usable rational form").into());
    }
    Ok(Rational(rate.num, rate.den))
}

/// Prefers YUV420P, the most widely playable format, when the encoder
/// supports it.
fn pick_pixel_format(codec: &ffmpeg_next::codec::Codec) -> ffmpeg_next::format::Pixel {
    let preferred = ffmpeg_next::format::Pixel::YUV420P;
    let supported: Vec<_> = codec
        .video()
        .ok()
        .and_then(|video| video.formats())
        .map(|formats| formats.collect())
        .unwrap_or_default();
    if supported.is_empty() || supported.contains(&preferred) {
        preferred
    } else {
        supported[0]
    }
}

impl ContainerWriter for FfmpegContainerWriter {
    fn open(
        &mut self,
        path: &Path,
        codec: &str,
        fps: f64,
        size: FrameSize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let rate = frame_rate(fps)?;
        let time_base = rate.invert();

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let encoder_codec = ffmpeg_next::encoder::find_by_name(codec)
            .ok_or_else(|| format!("encoder `{codec}` not found"))?;
        let pixel_format = pick_pixel_format(&encoder_codec);

        let mut ost = octx.add_stream(Some(encoder_codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(encoder_codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(size.width);
        encoder_ctx.set_height(size.height);
        encoder_ctx.set_format(pixel_format);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(rate));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        ost.set_time_base(time_base);
        ost.set_avg_frame_rate(rate);

        self.video_stream_index = 0; // only stream

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            size.width,
            size.height,
            pixel_format,
            size.width,
            size.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.size = size;
        self.time_base = time_base;
        self.frame_count = 0;

        Ok(())
    }

    fn is_opened(&self) -> bool {
        self.encoder.is_some()
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_opened() {
            return Err("FfmpegContainerWriter: not opened".into());
        }
        if frame.size() != self.size || frame.channels() != 3 || !frame.is_well_formed() {
            return Err(format!(
                "FfmpegContainerWriter: expected a {} RGB frame, got {} with {} channels",
                self.size,
                frame.size(),
                frame.channels()
            )
            .into());
        }

        let width = self.size.width as usize;
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.size.width,
            self.size.height,
        );

        let stride = rgb_frame.stride(0);
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..self.size.height as usize {
            let src_start = row * width * 3;
            let dst_start = row * stride;
            data[dst_start..dst_start + width * 3]
                .copy_from_slice(&src[src_start..src_start + width * 3]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(&rgb_frame, &mut yuv_frame)?;
        }
        yuv_frame.set_pts(Some(self.frame_count as i64));

        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_frame(&yuv_frame)?;
        }
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}
