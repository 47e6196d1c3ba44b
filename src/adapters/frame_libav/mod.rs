//! Frame extraction adapter using libav bindings
//!
//! Decodes just enough of a video to learn its duration, seeks to the
//! requested time, decodes forward to the first frame at or after that
//! time and encodes it as a JPEG data URI. Requested times count from the
//! first frame, so streams that start late (MPEG-TS captures) are offset
//! by their start time.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::extension_of;
use crate::ports::*;

/// Where in the extraction a libav call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// Opening the container and finding a video stream
    Open,
    /// Reading packets and decoding frames
    Decode,
}

/// Map a libav error onto the user-facing extraction failure
pub fn classify_libav_error(stage: ExtractionStage, err: &ffmpeg::Error) -> ExtractionError {
    use ffmpeg::Error;

    match err {
        Error::Exit => ExtractionError::Aborted,
        Error::HttpBadRequest
        | Error::HttpUnauthorized
        | Error::HttpForbidden
        | Error::HttpNotFound
        | Error::HttpOther4xx
        | Error::HttpServerError
        | Error::ProtocolNotFound => ExtractionError::Network,
        Error::DemuxerNotFound | Error::DecoderNotFound | Error::StreamNotFound => {
            ExtractionError::FormatUnsupported
        }
        Error::InvalidData if stage == ExtractionStage::Open => ExtractionError::FormatUnsupported,
        Error::InvalidData | Error::Bug | Error::Bug2 | Error::PatchWelcome | Error::Experimental => {
            ExtractionError::Decode
        }
        _ => ExtractionError::Unknown,
    }
}

/// LibAV-based frame extractor
pub struct LibavFrameAdapter {
    jpeg_quality: u8,
}

impl LibavFrameAdapter {
    /// Initialise libav and create an extractor encoding at `jpeg_quality` (1-100)
    pub fn new(jpeg_quality: u8) -> Result<Self, DomainError> {
        crate::init()?;

        Ok(Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        })
    }

    /// Blocking extraction. File-backed sources are opened in place; in-memory
    /// ones go through a temporary file that is removed on every path
    fn extract_blocking(
        source: VideoSource,
        at_seconds: Option<f64>,
        jpeg_quality: u8,
    ) -> Result<FrameImage, ExtractionError> {
        let frame = match source.path() {
            Some(path) => Self::decode_frame_at(path, at_seconds)?,
            None => {
                let staged = Self::stage(&source)?;
                Self::decode_frame_at(staged.path(), at_seconds)?
            }
        };
        let jpeg = Self::encode_jpeg(&frame, jpeg_quality)?;
        Ok(FrameImage::from_bytes("image/jpeg", &jpeg))
    }

    /// Copy an in-memory source to a temporary file libav can open
    fn stage(source: &VideoSource) -> Result<NamedTempFile, ExtractionError> {
        let mut handle = tempfile::Builder::new()
            .prefix("reel-renamer-")
            .suffix(extension_of(source.name()))
            .tempfile()
            .map_err(|e| {
                debug!("Failed to create temporary video file: {}", e);
                ExtractionError::Unknown
            })?;
        let mut reader = source.open().map_err(|e| {
            debug!("Failed to open {}: {}", source.name(), e);
            ExtractionError::Unknown
        })?;
        io::copy(&mut reader, &mut handle)
            .and_then(|_| handle.flush())
            .map_err(|e| {
                debug!("Failed to stage video bytes: {}", e);
                ExtractionError::Unknown
            })?;
        Ok(handle)
    }

    /// Open the file, seek and return the first decoded frame at or past the target
    fn decode_frame_at(path: &Path, at_seconds: Option<f64>) -> Result<Video, ExtractionError> {
        let open_err = |e: ffmpeg::Error| classify_libav_error(ExtractionStage::Open, &e);
        let decode_err = |e: ffmpeg::Error| classify_libav_error(ExtractionStage::Decode, &e);

        let mut ictx = ffmpeg::format::input(&path).map_err(open_err)?;

        let (stream_index, time_base, stream_start, stream_duration, mut decoder) = {
            let stream = ictx
                .streams()
                .best(ffmpeg::media::Type::Video)
                .ok_or(ExtractionError::FormatUnsupported)?;
            let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(open_err)?;
            (stream.index(), stream.time_base(), stream.start_time(), stream.duration(), decoder)
        };

        if decoder.width() == 0 || decoder.height() == 0 {
            return Err(ExtractionError::FormatUnsupported);
        }

        let duration = if stream_duration > 0 {
            stream_duration as f64 * f64::from(time_base)
        } else if ictx.duration() > 0 {
            ictx.duration() as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
        } else {
            0.0
        };
        let start = start_offset(stream_start, f64::from(time_base));
        let target = seek_target(duration, at_seconds);
        let absolute = start + target;
        debug!(
            "Video {}x{}, starts at {:.3}s, duration {:.3}s, capturing at {:.3}s",
            decoder.width(),
            decoder.height(),
            start,
            duration,
            target
        );

        if target > 0.0 {
            let ts = (absolute * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
            if let Err(e) = ictx.seek(ts, ..ts) {
                debug!("Seek to {:.3}s failed, decoding from start: {}", target, e);
            }
            decoder.flush();
        }

        let reached = |frame: &Video| {
            frame
                .timestamp()
                .or_else(|| frame.pts())
                .map(|ts| ts as f64 * f64::from(time_base) + 1e-3 >= absolute)
                .unwrap_or(true)
        };

        let mut last: Option<Video> = None;
        let mut decoded = Video::empty();
        let mut packet = ffmpeg::Packet::empty();
        loop {
            match packet.read(&mut ictx) {
                Ok(()) => {}
                Err(ffmpeg::Error::Eof) => break,
                Err(e) => return Err(decode_err(e)),
            }
            if packet.stream() != stream_index {
                continue;
            }
            decoder.send_packet(&packet).map_err(decode_err)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if reached(&decoded) {
                    return Ok(decoded);
                }
                last = Some(decoded.clone());
            }
        }

        decoder.send_eof().map_err(decode_err)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            if reached(&decoded) {
                return Ok(decoded);
            }
            last = Some(decoded.clone());
        }

        last.ok_or(ExtractionError::NoFrame)
    }

    /// Convert a decoded frame to RGB and encode it as JPEG
    fn encode_jpeg(frame: &Video, quality: u8) -> Result<Vec<u8>, ExtractionError> {
        let (width, height) = (frame.width(), frame.height());
        let mut scaler = scaling::Context::get(
            frame.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| classify_libav_error(ExtractionStage::Decode, &e))?;

        let mut rgb_frame = Video::empty();
        scaler
            .run(frame, &mut rgb_frame)
            .map_err(|e| classify_libav_error(ExtractionStage::Decode, &e))?;

        // Rows are padded to the stride; copy only the visible pixels
        let data = rgb_frame.data(0);
        let stride = rgb_frame.stride(0);
        let row_len = width as usize * 3;
        let mut pixels = Vec::with_capacity(row_len * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            pixels.extend_from_slice(&data[start..start + row_len]);
        }

        let image = RgbImage::from_raw(width, height, pixels).ok_or(ExtractionError::NoFrame)?;
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality)
            .encode_image(&image)
            .map_err(|e| {
                debug!("JPEG encoding failed: {}", e);
                ExtractionError::Unknown
            })?;
        Ok(jpeg)
    }
}

/// libav's `AV_NOPTS_VALUE`: the stream does not know its start
const NO_PTS: i64 = i64::MIN;

/// Start time of a stream in seconds; unknown or negative starts count as zero
pub fn start_offset(start_time: i64, time_base: f64) -> f64 {
    if start_time == NO_PTS {
        return 0.0;
    }
    let seconds = start_time as f64 * time_base;
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

/// Time to capture: the requested time clamped to the duration, or the midpoint
pub fn seek_target(duration: f64, at_seconds: Option<f64>) -> f64 {
    let target = match at_seconds {
        Some(at) if duration > 0.0 => at.min(duration),
        Some(at) => at,
        None => duration / 2.0,
    };
    if target.is_finite() {
        target.max(0.0)
    } else {
        0.0
    }
}

#[async_trait]
impl FrameExtractPort for LibavFrameAdapter {
    async fn extract_frame(
        &self,
        source: &VideoSource,
        at_seconds: Option<f64>,
    ) -> Result<FrameImage, ExtractionError> {
        let source = source.clone();
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || Self::extract_blocking(source, at_seconds, quality))
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    ExtractionError::Aborted
                } else {
                    ExtractionError::Unknown
                }
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_target_defaults_to_midpoint() {
        assert_eq!(seek_target(10.0, None), 5.0);
        assert_eq!(seek_target(0.0, None), 0.0);
    }

    #[test]
    fn test_seek_target_clamps_to_duration() {
        assert_eq!(seek_target(10.0, Some(3.0)), 3.0);
        assert_eq!(seek_target(10.0, Some(30.0)), 10.0);
        assert_eq!(seek_target(10.0, Some(-2.0)), 0.0);
        assert_eq!(seek_target(0.0, Some(4.0)), 4.0);
        assert_eq!(seek_target(f64::NAN, None), 0.0);
    }

    #[test]
    fn test_start_offset_converts_stream_ticks() {
        assert!((start_offset(126_000, 1.0 / 90_000.0) - 1.4).abs() < 1e-9);
        assert_eq!(start_offset(0, 1.0 / 90_000.0), 0.0);
        assert_eq!(start_offset(NO_PTS, 1.0 / 90_000.0), 0.0);
        assert_eq!(start_offset(-3000, 1.0 / 1000.0), 0.0);
    }

    #[test]
    fn test_classify_open_errors() {
        use ffmpeg::Error;
        assert_eq!(
            classify_libav_error(ExtractionStage::Open, &Error::InvalidData),
            ExtractionError::FormatUnsupported
        );
        assert_eq!(
            classify_libav_error(ExtractionStage::Open, &Error::DemuxerNotFound),
            ExtractionError::FormatUnsupported
        );
        assert_eq!(
            classify_libav_error(ExtractionStage::Open, &Error::HttpNotFound),
            ExtractionError::Network
        );
    }

    #[test]
    fn test_classify_decode_errors() {
        use ffmpeg::Error;
        assert_eq!(
            classify_libav_error(ExtractionStage::Decode, &Error::InvalidData),
            ExtractionError::Decode
        );
        assert_eq!(classify_libav_error(ExtractionStage::Decode, &Error::Exit), ExtractionError::Aborted);
        assert_eq!(
            classify_libav_error(ExtractionStage::Decode, &Error::BufferTooSmall),
            ExtractionError::Unknown
        );
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_extract() {
        let adapter = LibavFrameAdapter::new(90).unwrap();
        let source = VideoSource::new("broken.mp4", "video/mp4", b"definitely not a video".to_vec());
        assert!(adapter.extract_frame(&source, None).await.is_err());
    }
}
