use std::path::Path;

use crate::shared::constants::FALLBACK_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::output_codec::OutputCodec;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes video frames via ffmpeg-next, video stream only.
pub struct FfmpegWriter {
    session: Option<EncodeSession>,
}

struct EncodeSession {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn encoder_params(codec: OutputCodec) -> (ffmpeg_next::codec::Id, ffmpeg_next::format::Pixel) {
    match codec {
        OutputCodec::Mpeg4 => (
            ffmpeg_next::codec::Id::MPEG4,
            ffmpeg_next::format::Pixel::YUV420P,
        ),
        // MJPEG wants full-range chroma.
        OutputCodec::Mjpeg => (
            ffmpeg_next::codec::Id::MJPEG,
            ffmpeg_next::format::Pixel::YUVJ420P,
        ),
    }
}

/// Integer frame rate for the encoder time base.
fn integer_fps(fps: f64) -> i32 {
    let rounded = fps.round();
    if rounded.is_finite() && rounded >= 1.0 {
        rounded as i32
    } else {
        FALLBACK_FPS as i32
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: OutputCodec,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let (codec_id, pixel_format) = encoder_params(codec);
        let encoder_codec = ffmpeg_next::encoder::find(codec_id)
            .ok_or_else(|| format!("{codec} encoder not found"))?;

        let mut ost = octx.add_stream(Some(encoder_codec))?;
        let video_stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(encoder_codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(pixel_format);

        let fps = integer_fps(metadata.fps);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            pixel_format,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Writing {} with {codec}: {}x{} @ {fps} fps",
            path.display(),
            metadata.width,
            metadata.height
        );

        self.session = Some(EncodeSession {
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            fps,
            frame_count: 0,
            video_stream_index,
        });

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let session = self.session.as_mut().ok_or("FfmpegWriter: not opened")?;

        if frame.width() != session.width
            || frame.height() != session.height
            || frame.channels() != 3
        {
            return Err(format!(
                "frame is {}x{}x{}, writer expects {}x{}x3",
                frame.width(),
                frame.height(),
                frame.channels(),
                session.width,
                session.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            session.width,
            session.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = session.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        for row in 0..session.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        session.scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(session.frame_count as i64));

        session.encoder.send_frame(&yuv_frame)?;
        session.drain_packets()?;

        session.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        session.encoder.send_eof()?;
        session.drain_packets()?;
        session.octx.write_trailer()?;

        log::debug!("Finalized output after {} frames", session.frame_count);
        Ok(())
    }
}

impl EncodeSession {
    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let ost_time_base = self
            .octx
            .stream(self.video_stream_index)
            .ok_or("output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }
}
