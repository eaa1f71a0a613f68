//! In-memory carrier image and the container read/write boundary.

use crate::capacity::COLOR_CHANNELS;
use crate::format::Format;
use crate::Error;
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;

/// Quality used when saving JPEG carriers
pub const JPEG_QUALITY: u8 = 100;

/// 8-bit interleaved RGB or RGBA pixels, alpha last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    width: u32,
    height: u32,
    channels: usize,
    pixels: Vec<u8>,
}

impl Carrier {
    pub fn new(width: u32, height: u32, channels: usize, pixels: Vec<u8>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedCarrierMode(format!(
                "empty image ({width}x{height})"
            )));
        }
        if channels != COLOR_CHANNELS && channels != COLOR_CHANNELS + 1 {
            return Err(Error::UnsupportedCarrierMode(format!(
                "{channels} channels per pixel, expected RGB or RGBA"
            )));
        }
        let required = width as usize * height as usize * channels;
        if pixels.len() != required {
            return Err(Error::UnsupportedCarrierMode(format!(
                "pixel buffer is {} bytes, but {required} bytes is required",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels > COLOR_CHANNELS
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// One color channel as a row-major plane of floats
    pub fn plane(&self, channel: usize) -> Vec<f64> {
        debug_assert!(channel < COLOR_CHANNELS);
        self.pixels
            .chunks_exact(self.channels)
            .map(|px| f64::from(px[channel]))
            .collect()
    }

    /// Writes `plane` back into one color channel, rounding and clamping to 0..=255
    pub fn set_plane(&mut self, channel: usize, plane: &[f64]) {
        debug_assert!(channel < COLOR_CHANNELS);
        debug_assert_eq!(plane.len(), self.width as usize * self.height as usize);
        for (px, value) in self.pixels.chunks_exact_mut(self.channels).zip(plane) {
            px[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Decodes a container into a carrier, normalising to RGB or RGBA
    pub fn decode(bytes: &[u8], format: Format) -> Result<Self, Error> {
        let carrier = match format {
            Format::Png => decode_png(bytes)?,
            Format::Jpeg | Format::Bmp | Format::WebP => decode_image(bytes, format)?,
        };
        log::debug!(
            "decoded {format} carrier {}x{} with {} channels",
            carrier.width,
            carrier.height,
            carrier.channels
        );
        Ok(carrier)
    }

    /// Encodes the carrier back into `format`
    pub fn encode(&self, format: Format) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        match format {
            Format::Png => self.encode_png(&mut out)?,
            Format::Jpeg => {
                let rgb = self.color_only();
                JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                    .write_image(&rgb, self.width, self.height, ExtendedColorType::Rgb8)
                    .map_err(|e| Error::write(format, e))?;
            }
            Format::Bmp => BmpEncoder::new(&mut out)
                .write_image(&self.pixels, self.width, self.height, self.color_type())
                .map_err(|e| Error::write(format, e))?,
            Format::WebP => WebPEncoder::new_lossless(&mut out)
                .write_image(&self.pixels, self.width, self.height, self.color_type())
                .map_err(|e| Error::write(format, e))?,
        }
        log::debug!("encoded {format} carrier into {} bytes", out.len());
        Ok(out)
    }

    fn color_type(&self) -> ExtendedColorType {
        if self.has_alpha() {
            ExtendedColorType::Rgba8
        } else {
            ExtendedColorType::Rgb8
        }
    }

    fn color_only(&self) -> Vec<u8> {
        if !self.has_alpha() {
            return self.pixels.clone();
        }
        self.pixels
            .chunks_exact(self.channels)
            .flat_map(|px| px[..COLOR_CHANNELS].iter().copied())
            .collect()
    }

    fn encode_png(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        let color = if self.has_alpha() {
            png::ColorType::Rgba
        } else {
            png::ColorType::Rgb
        };
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::write(Format::Png, e))?;
        writer
            .write_image_data(&self.pixels)
            .map_err(|e| Error::write(Format::Png, e))?;
        writer.finish().map_err(|e| Error::write(Format::Png, e))
    }
}

fn decode_png(bytes: &[u8]) -> Result<Carrier, Error> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| Error::malformed(Format::Png, e))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| Error::malformed(Format::Png, e))?;
    buf.truncate(frame.buffer_size());

    if frame.bit_depth != png::BitDepth::Eight {
        return Err(Error::UnsupportedCarrierMode(format!(
            "PNG bit depth {:?} after expansion",
            frame.bit_depth
        )));
    }
    let (channels, pixels) = match frame.color_type {
        png::ColorType::Rgb => (3, buf),
        png::ColorType::Rgba => (4, buf),
        png::ColorType::Grayscale => (3, buf.iter().flat_map(|&g| [g, g, g]).collect()),
        png::ColorType::GrayscaleAlpha => (
            4,
            buf.chunks_exact(2)
                .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
                .collect(),
        ),
        other => {
            return Err(Error::UnsupportedCarrierMode(format!(
                "PNG color type {other:?} after expansion"
            )))
        }
    };
    Carrier::new(frame.width, frame.height, channels, pixels)
}

fn decode_image(bytes: &[u8], format: Format) -> Result<Carrier, Error> {
    let image = image::load_from_memory_with_format(bytes, format.image_format())
        .map_err(|e| Error::malformed(format, e))?;
    let (width, height) = (image.width(), image.height());
    if format != Format::Jpeg && image.color().has_alpha() {
        Carrier::new(width, height, 4, image.into_rgba8().into_raw())
    } else {
        Carrier::new(width, height, 3, image.into_rgb8().into_raw())
    }
}
