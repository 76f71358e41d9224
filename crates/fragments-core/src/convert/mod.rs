//! Format conversion: the legal conversion matrix and its converters.
//!
//! Every legal non-identity conversion is one row of [`CONVERSIONS`]. The
//! engine indexes the table once at construction; the per-type `formats`
//! lists are derived from the same rows, so the two can never disagree.

mod raster;
mod structured;
mod text;

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::ConversionError;
use crate::registry::TypeRegistry;
use crate::types::BareType;

/// Transforms source bytes; `Err` carries the reason.
type Converter = fn(&[u8]) -> Result<Vec<u8>, String>;

/// One row of the conversion matrix.
struct Conversion {
    from: BareType,
    to: BareType,
    convert: Converter,
}

const fn row(from: BareType, to: BareType, convert: Converter) -> Conversion {
    Conversion { from, to, convert }
}

use BareType::*;

/// The conversion matrix. Row order defines the order of `formats`.
const CONVERSIONS: &[Conversion] = &[
    row(TextMarkdown, TextPlain, text::markdown_to_plain),
    row(TextMarkdown, TextHtml, text::markdown_to_html),
    row(TextHtml, TextPlain, text::html_to_plain),
    row(ApplicationJson, TextPlain, structured::json_to_plain),
    row(ApplicationJson, ApplicationYaml, structured::json_to_yaml),
    row(ApplicationJson, ApplicationXYaml, structured::json_to_yaml),
    row(TextCsv, TextPlain, text::passthrough),
    row(TextCsv, ApplicationJson, structured::csv_to_json),
    row(ApplicationYaml, TextPlain, text::passthrough),
    row(ApplicationYaml, ApplicationJson, structured::yaml_to_json),
    row(ApplicationXYaml, TextPlain, text::passthrough),
    row(ApplicationXYaml, ApplicationJson, structured::yaml_to_json),
    row(ImagePng, ImageJpeg, raster::to_jpeg),
    row(ImagePng, ImageWebp, raster::to_webp),
    row(ImagePng, ImageGif, raster::to_gif),
    row(ImageJpeg, ImagePng, raster::to_png),
    row(ImageJpeg, ImageWebp, raster::to_webp),
    row(ImageJpeg, ImageGif, raster::to_gif),
    row(ImageWebp, ImagePng, raster::to_png),
    row(ImageWebp, ImageJpeg, raster::to_jpeg),
    row(ImageWebp, ImageGif, raster::to_gif),
    row(ImageGif, ImagePng, raster::to_png),
    row(ImageGif, ImageJpeg, raster::to_jpeg),
    row(ImageGif, ImageWebp, raster::to_webp),
];

/// Borrow source bytes as text for the text-based converters.
fn as_utf8(data: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(data).map_err(|e| format!("content is not valid UTF-8: {e}"))
}

/// Converts content between supported representations.
pub struct ConversionEngine {
    registry: Arc<TypeRegistry>,
    routes: HashMap<(BareType, BareType), Converter>,
    formats: HashMap<BareType, Vec<BareType>>,
}

impl ConversionEngine {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let mut routes = HashMap::new();
        let mut formats = HashMap::new();

        for &from in registry.supported() {
            let mut targets = vec![from];
            for conversion in CONVERSIONS.iter().filter(|c| c.from == from) {
                routes.insert((conversion.from, conversion.to), conversion.convert);
                targets.push(conversion.to);
            }
            formats.insert(from, targets);
        }

        Self {
            registry,
            routes,
            formats,
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The types content of `from` may be exported as: itself first, then
    /// every single-step target.
    pub fn formats(&self, from: BareType) -> &[BareType] {
        self.formats.get(&from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn can_convert(&self, from: BareType, to: BareType) -> bool {
        from == to || self.routes.contains_key(&(from, to))
    }

    /// Convert `data` from one type to another.
    ///
    /// Identity conversions return `data` untouched.
    pub fn convert(
        &self,
        from: BareType,
        data: &Bytes,
        to: BareType,
    ) -> Result<Bytes, ConversionError> {
        if from == to {
            return Ok(data.clone());
        }

        let convert = self
            .routes
            .get(&(from, to))
            .ok_or(ConversionError::Unsupported { from, to })?;

        convert(data)
            .map(Bytes::from)
            .map_err(|reason| ConversionError::Failed { from, to, reason })
    }
}
