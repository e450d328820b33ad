use std::path::Path;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use video_saver_core::shared::frame::Frame;

use super::FrameSource;

/// Decodes the best video stream of a file to RGB24 frames, one packet at a
/// time.
pub struct VideoFileSource {
    input: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    frame_rate: Option<f64>,
    frame_count: Option<usize>,
    next_index: usize,
    eof_sent: bool,
}

impl VideoFileSource {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let input = ffmpeg_next::format::input(path)?;

        let (stream_index, parameters, rate, frames) = {
            let stream = input
                .streams()
                .best(ffmpeg_next::media::Type::Video)
                .ok_or_else(|| format!("no video stream in {}", path.display()))?;
            (
                stream.index(),
                stream.parameters(),
                stream.avg_frame_rate(),
                stream.frames(),
            )
        };

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;
        let scaler = scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            scaling::Flags::BILINEAR,
        )?;

        let frame_rate = (rate.numerator() > 0 && rate.denominator() > 0)
            .then(|| f64::from(rate.numerator()) / f64::from(rate.denominator()));
        log::debug!(
            "Opened {} ({}x{}, {:?} fps)",
            path.display(),
            decoder.width(),
            decoder.height(),
            frame_rate
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            frame_rate,
            frame_count: usize::try_from(frames).ok().filter(|&n| n > 0),
            next_index: 0,
            eof_sent: false,
        })
    }

    fn receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb = Video::empty();
        self.scaler.run(&decoded, &mut rgb)?;
        let frame = Frame::new(
            packed_rgb(&rgb),
            rgb.width(),
            rgb.height(),
            3,
            self.next_index,
        );
        self.next_index += 1;
        Ok(Some(frame))
    }
}

impl FrameSource for VideoFileSource {
    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }

    fn frame_count(&self) -> Option<usize> {
        self.frame_count
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        loop {
            if let Some(frame) = self.receive()? {
                return Ok(Some(frame));
            }
            if self.eof_sent {
                return Ok(None);
            }
            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
            }
        }
    }
}

/// Drops the per-row padding of an RGB24 frame.
fn packed_rgb(rgb: &Video) -> Vec<u8> {
    let row_len = rgb.width() as usize * 3;
    let stride = rgb.stride(0);
    rgb.data(0)
        .chunks(stride)
        .take(rgb.height() as usize)
        .flat_map(|row| &row[..row_len])
        .copied()
        .collect()
}
