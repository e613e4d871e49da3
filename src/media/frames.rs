use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

/// Decoded audio frame from the remote peer (16-bit PCM, interleaved)
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since the track started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Flatten samples to little-endian PCM bytes, the format the
    /// streaming recognizer expects on its raw audio channel.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Decoded video frame from the remote peer (raw RGB24 pixels)
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Pixel data, row-major RGB24 (width * height * 3 bytes)
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp in milliseconds since the track started
    pub timestamp_ms: u64,
}

/// JPEG quality used for sampled stills sent to the emotion worker
const SAMPLE_JPEG_QUALITY: u8 = 80;

impl VideoFrame {
    /// Encode the frame as a compact JPEG still.
    pub fn to_jpeg(&self) -> Result<Vec<u8>> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.data.len() != expected {
            anyhow::bail!(
                "frame buffer is {} bytes, expected {} for {}x{} RGB24",
                self.data.len(),
                expected,
                self.width,
                self.height
            );
        }

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, SAMPLE_JPEG_QUALITY)
            .encode(&self.data, self.width, self.height, ExtendedColorType::Rgb8)
            .context("failed to encode sampled frame as JPEG")?;
        Ok(buf)
    }
}
