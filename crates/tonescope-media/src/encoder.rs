//! H.264/AAC muxing for offline rendering.
//!
//! One [`VideoEncoder`] owns the output container and both codec
//! contexts. The offline frame driver submits one RGBA framebuffer and
//! one audio slice per frame, in frame order; timestamps come straight
//! from the frame index and the running sample position, so the streams
//! stay aligned with the analysis time base.

use std::path::Path;

use ffmpeg_next as ffmpeg;

use ffmpeg::{codec, encoder, format, frame, software, ChannelLayout, Dictionary, Packet, Rational};
use tracing::info;

use crate::{MediaError, Result};

/// Output stream parameters.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
    /// Video frame rate.
    pub fps: u32,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Audio channel count (1 or 2).
    pub channels: u16,
    /// AAC bit rate.
    pub audio_bit_rate: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fps: 30,
            sample_rate: 44_100,
            channels: 1,
            audio_bit_rate: 128_000,
        }
    }
}

impl EncoderConfig {
    fn channel_layout(&self) -> ChannelLayout {
        if self.channels >= 2 {
            ChannelLayout::STEREO
        } else {
            ChannelLayout::MONO
        }
    }
}

/// H.264 + AAC encoder writing one muxed file.
pub struct VideoEncoder {
    octx: format::context::Output,
    video: encoder::video::Encoder,
    audio: encoder::audio::Encoder,
    scaler: software::scaling::Context,
    config: EncoderConfig,

    video_stream: usize,
    audio_stream: usize,
    video_tb: Rational,
    audio_tb: Rational,

    rgba_frame: frame::Video,
    yuv_frame: frame::Video,

    /// Per-channel samples not yet grouped into a full codec frame.
    pending: Vec<Vec<f32>>,
    audio_frame_size: usize,

    video_pts: i64,
    audio_pts: i64,
}

impl VideoEncoder {
    /// Opens the output file and both codecs.
    ///
    /// Failure here aborts recording before any frame is rendered; the
    /// caller falls back to plain windowed playback.
    pub fn new<P: AsRef<Path>>(path: P, config: EncoderConfig) -> Result<Self> {
        let path = path.as_ref();
        ffmpeg::init().map_err(|e| MediaError::EncoderInit(e.to_string()))?;

        let mut octx = format::output(&path)
            .map_err(|e| MediaError::FileOpen(format!("{}: {}", path.display(), e)))?;
        let global_header = octx
            .format()
            .flags()
            .contains(format::Flags::GLOBAL_HEADER);

        // Video stream.
        let video_codec =
            encoder::find(codec::Id::H264).ok_or(MediaError::CodecNotFound("H.264"))?;
        let mut video_ctx = codec::context::Context::new_with_codec(video_codec)
            .encoder()
            .video()
            .map_err(|e| MediaError::EncoderInit(e.to_string()))?;
        video_ctx.set_width(config.width);
        video_ctx.set_height(config.height);
        video_ctx.set_format(format::Pixel::YUV420P);
        video_ctx.set_time_base(Rational(1, config.fps as i32));
        video_ctx.set_frame_rate(Some(Rational(config.fps as i32, 1)));
        video_ctx.set_gop(12);
        video_ctx.set_max_b_frames(2);
        if global_header {
            video_ctx.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let mut x264_opts = Dictionary::new();
        x264_opts.set("preset", "medium");
        let video = video_ctx
            .open_with(x264_opts)
            .map_err(|e| MediaError::EncoderInit(format!("H.264: {}", e)))?;

        let mut vstream = octx
            .add_stream(video_codec)
            .map_err(|e| MediaError::EncoderInit(e.to_string()))?;
        vstream.set_parameters(&video);
        vstream.set_time_base(Rational(1, config.fps as i32));
        let video_stream = vstream.index();

        // Audio stream.
        let audio_codec = encoder::find(codec::Id::AAC).ok_or(MediaError::CodecNotFound("AAC"))?;
        let mut audio_ctx = codec::context::Context::new_with_codec(audio_codec)
            .encoder()
            .audio()
            .map_err(|e| MediaError::EncoderInit(e.to_string()))?;
        audio_ctx.set_rate(config.sample_rate as i32);
        audio_ctx.set_channel_layout(config.channel_layout());
        audio_ctx.set_format(format::Sample::F32(format::sample::Type::Planar));
        audio_ctx.set_bit_rate(config.audio_bit_rate);
        audio_ctx.set_time_base(Rational(1, config.sample_rate as i32));
        if global_header {
            audio_ctx.set_flags(codec::Flags::GLOBAL_HEADER);
        }
        let audio = audio_ctx
            .open_as(audio_codec)
            .map_err(|e| MediaError::EncoderInit(format!("AAC: {}", e)))?;

        let mut astream = octx
            .add_stream(audio_codec)
            .map_err(|e| MediaError::EncoderInit(e.to_string()))?;
        astream.set_parameters(&audio);
        astream.set_time_base(Rational(1, config.sample_rate as i32));
        let audio_stream = astream.index();

        octx.write_header()
            .map_err(|e| MediaError::EncoderInit(format!("header: {}", e)))?;

        // Muxer may rewrite stream time bases during write_header.
        let video_tb = octx
            .stream(video_stream)
            .map(|s| s.time_base())
            .unwrap_or(Rational(1, config.fps as i32));
        let audio_tb = octx
            .stream(audio_stream)
            .map(|s| s.time_base())
            .unwrap_or(Rational(1, config.sample_rate as i32));

        let scaler = software::scaling::Context::get(
            format::Pixel::RGBA,
            config.width,
            config.height,
            format::Pixel::YUV420P,
            config.width,
            config.height,
            software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| MediaError::EncoderInit(format!("scaler: {}", e)))?;

        let frame_size = audio.frame_size() as usize;
        let audio_frame_size = if frame_size == 0 { 1024 } else { frame_size };

        let rgba_frame = frame::Video::new(format::Pixel::RGBA, config.width, config.height);
        let yuv_frame = frame::Video::new(format::Pixel::YUV420P, config.width, config.height);

        info!(
            "Encoder ready: {}x{} @ {} fps, {} Hz {}ch AAC, -> {}",
            config.width,
            config.height,
            config.fps,
            config.sample_rate,
            config.channels,
            path.display()
        );

        Ok(Self {
            octx,
            video,
            audio,
            scaler,
            pending: vec![Vec::new(); config.channels as usize],
            audio_frame_size,
            config,
            video_stream,
            audio_stream,
            video_tb,
            audio_tb,
            rgba_frame,
            yuv_frame,
            video_pts: 0,
            audio_pts: 0,
        })
    }

    /// Stream parameters this encoder was opened with.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encodes one RGBA framebuffer (`width * height * 4` bytes, rows
    /// top to bottom) as the next video frame.
    pub fn write_video_frame(&mut self, rgba: &[u8]) -> Result<()> {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let expected = width * height * 4;
        if rgba.len() != expected {
            return Err(MediaError::Encode(format!(
                "framebuffer size mismatch: expected {} bytes, got {}",
                expected,
                rgba.len()
            )));
        }

        // Copy row by row; the frame's stride may exceed width * 4.
        let stride = self.rgba_frame.stride(0);
        let data = self.rgba_frame.data_mut(0);
        for y in 0..height {
            let src = &rgba[y * width * 4..(y + 1) * width * 4];
            data[y * stride..y * stride + width * 4].copy_from_slice(src);
        }

        self.scaler
            .run(&self.rgba_frame, &mut self.yuv_frame)
            .map_err(|e| MediaError::Encode(format!("scale: {}", e)))?;
        self.yuv_frame.set_pts(Some(self.video_pts));
        self.video_pts += 1;

        self.video
            .send_frame(&self.yuv_frame)
            .map_err(|e| MediaError::Encode(format!("video frame: {}", e)))?;
        self.drain_video_packets()
    }

    /// Appends one audio slice (one plane per channel, equal lengths)
    /// and encodes every full codec frame that is now available.
    pub fn write_audio(&mut self, planes: &[&[f32]]) -> Result<()> {
        if planes.len() != self.pending.len() {
            return Err(MediaError::Encode(format!(
                "channel count mismatch: expected {}, got {}",
                self.pending.len(),
                planes.len()
            )));
        }
        for (pending, plane) in self.pending.iter_mut().zip(planes) {
            pending.extend_from_slice(plane);
        }
        self.drain_audio_frames(false)
    }

    /// Flushes both encoders and writes the container trailer.
    pub fn finish(mut self) -> Result<()> {
        self.drain_audio_frames(true)?;

        self.video
            .send_eof()
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        self.drain_video_packets()?;

        self.audio
            .send_eof()
            .map_err(|e| MediaError::Encode(e.to_string()))?;
        self.drain_audio_packets()?;

        self.octx
            .write_trailer()
            .map_err(|e| MediaError::Encode(format!("trailer: {}", e)))?;

        info!(
            "Encoder finished: {} video frames, {} audio samples",
            self.video_pts, self.audio_pts
        );
        Ok(())
    }

    fn drain_audio_frames(&mut self, flush: bool) -> Result<()> {
        let frame_size = self.audio_frame_size;
        loop {
            let available = self.pending[0].len();
            if available == 0 || (available < frame_size && !flush) {
                break;
            }
            let take = available.min(frame_size);

            let mut aframe = frame::Audio::new(
                format::Sample::F32(format::sample::Type::Planar),
                frame_size,
                self.config.channel_layout(),
            );
            aframe.set_rate(self.config.sample_rate);
            aframe.set_pts(Some(self.audio_pts));

            for (channel, pending) in self.pending.iter_mut().enumerate() {
                let plane = aframe.plane_mut::<f32>(channel);
                plane[..take].copy_from_slice(&pending[..take]);
                // Final partial frame: pad the tail with silence.
                for slot in plane[take..].iter_mut() {
                    *slot = 0.0;
                }
                pending.drain(..take);
            }
            self.audio_pts += frame_size as i64;

            self.audio
                .send_frame(&aframe)
                .map_err(|e| MediaError::Encode(format!("audio frame: {}", e)))?;
            self.drain_audio_packets()?;
        }
        Ok(())
    }

    fn drain_video_packets(&mut self) -> Result<()> {
        let mut packet = Packet::empty();
        while self.video.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.video_stream);
            packet.rescale_ts(Rational(1, self.config.fps as i32), self.video_tb);
            packet
                .write_interleaved(&mut self.octx)
                .map_err(|e| MediaError::Encode(format!("mux video: {}", e)))?;
        }
        Ok(())
    }

    fn drain_audio_packets(&mut self) -> Result<()> {
        let mut packet = Packet::empty();
        while self.audio.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.audio_stream);
            packet.rescale_ts(Rational(1, self.config.sample_rate as i32), self.audio_tb);
            packet
                .write_interleaved(&mut self.octx)
                .map_err(|e| MediaError::Encode(format!("mux audio: {}", e)))?;
        }
        Ok(())
    }
}
