// src/core/scanner/image_scanner.rs

use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use tracing::{debug, info, warn};

use crate::core::error::{EngineError, EngineResult};
use crate::core::knowledge_base::SAMPLE_EXTRACTED_TEXTS;

/// A decoded upload with the metadata the response reports.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn format_label(&self) -> &'static str {
        format_label(self.format)
    }

    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Text pulled out of an image, with the extractor's confidence in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub confidence: f64,
}

/// The OCR seam. Real engines plug in here without touching the scoring code.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, image: &DecodedImage) -> EngineResult<Extraction>;
}

/// Stand-in OCR that returns one of the canned phishing samples.
///
/// The sample is picked from a checksum of the image bytes, so the same image
/// always yields the same text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleTextExtractor;

impl SampleTextExtractor {
    pub const CONFIDENCE: f64 = 85.0;
}

impl TextExtractor for SampleTextExtractor {
    fn extract(&self, image: &DecodedImage) -> EngineResult<Extraction> {
        let checksum = image
            .bytes
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(*b)));
        let index = (checksum % SAMPLE_EXTRACTED_TEXTS.len() as u64) as usize;
        debug!(index, "Selected sample text for image.");
        Ok(Extraction {
            text: SAMPLE_EXTRACTED_TEXTS[index].to_string(),
            confidence: Self::CONFIDENCE,
        })
    }
}

/// Returns the same text for every image. Useful when the text was recognized
/// elsewhere and only the scoring is wanted.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedTextExtractor {
    pub text: String,
    pub confidence: f64,
}

impl FixedTextExtractor {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self { text: text.into(), confidence }
    }
}

impl TextExtractor for FixedTextExtractor {
    fn extract(&self, _image: &DecodedImage) -> EngineResult<Extraction> {
        Ok(Extraction { text: self.text.clone(), confidence: self.confidence })
    }
}

/// Drops a `data:image/...;base64,` prefix, if any.
pub fn strip_data_uri(input: &str) -> EngineResult<&str> {
    let trimmed = input.trim();
    if !trimmed.starts_with("data:") {
        return Ok(trimmed);
    }
    match trimmed.split_once(',') {
        Some((_, payload)) => Ok(payload),
        None => Err(EngineError::InvalidInput("data URI has no payload".to_string())),
    }
}

/// Decodes base64 (or a data URI) and reads the image header.
pub fn decode_image(input: &str) -> EngineResult<DecodedImage> {
    let payload: String = strip_data_uri(input)?.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(EngineError::InvalidInput("no image data supplied".to_string()));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| EngineError::InvalidInput(format!("invalid base64: {}", e)))?;
    debug!(bytes = bytes.len(), "Decoded base64 payload.");

    let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| EngineError::InvalidInput(format!("could not read image: {}", e)))?;

    let format = match reader.format() {
        Some(f) if is_supported(f) => f,
        Some(f) => {
            warn!(format = ?f, "Unsupported image format.");
            return Err(EngineError::InvalidInput(format!("unsupported image format: {:?}", f)));
        }
        None => return Err(EngineError::InvalidInput("unrecognized image format".to_string())),
    };

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| EngineError::InvalidInput(format!("could not decode image: {}", e)))?;

    info!(format = format_label(format), width, height, "Image decoded.");
    Ok(DecodedImage { bytes, format, width, height })
}

fn is_supported(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg
            | ImageFormat::Png
            | ImageFormat::WebP
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::Gif
    )
}

fn format_label(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Gif => "GIF",
        _ => "UNKNOWN",
    }
}
