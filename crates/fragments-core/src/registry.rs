//! The type registry: supported content types and extension lookup tables.
//!
//! A registry is built once and shared (usually behind an `Arc`) with the
//! conversion engine and the fragment service.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::types::{BareType, ContentType};

/// Every recognized extension, aliases included.
///
/// Canonical extensions come from [`BareType::extension`]; the aliases here
/// only widen what callers may request.
const EXTENSIONS: &[(&str, BareType)] = &[
    ("txt", BareType::TextPlain),
    ("md", BareType::TextMarkdown),
    ("html", BareType::TextHtml),
    ("csv", BareType::TextCsv),
    ("json", BareType::ApplicationJson),
    ("yaml", BareType::ApplicationYaml),
    ("yml", BareType::ApplicationYaml),
    ("png", BareType::ImagePng),
    ("jpg", BareType::ImageJpeg),
    ("jpeg", BareType::ImageJpeg),
    ("webp", BareType::ImageWebp),
    ("avif", BareType::ImageAvif),
    ("gif", BareType::ImageGif),
];

/// Supported content types and their file extensions.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    by_extension: HashMap<&'static str, BareType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            by_extension: EXTENSIONS.iter().copied().collect(),
        }
    }

    /// All supported bare types.
    pub fn supported(&self) -> &'static [BareType] {
        &BareType::ALL
    }

    /// Parse a header value into a declared content type.
    pub fn parse(&self, header: &str) -> Result<ContentType, CoreError> {
        ContentType::parse(header)
    }

    /// Whether a `Content-Type` header names a supported type.
    ///
    /// Malformed headers are simply unsupported.
    pub fn is_supported(&self, header: &str) -> bool {
        self.parse(header).is_ok()
    }

    /// Resolve a bare MIME string (no parameters) to a supported type.
    pub fn resolve(&self, bare: &str) -> Option<BareType> {
        bare.parse().ok()
    }

    /// Canonical extension for a bare MIME string.
    pub fn extension_for(&self, bare: &str) -> Option<&'static str> {
        self.resolve(bare).map(BareType::extension)
    }

    /// Type for a file extension. Case-insensitive; a leading `.` is ignored.
    pub fn type_for_extension(&self, extension: &str) -> Option<BareType> {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        self.by_extension.get(ext.as_str()).copied()
    }

    /// Like [`TypeRegistry::type_for_extension`], failing with
    /// [`CoreError::UnknownExtension`].
    pub fn require_extension(&self, extension: &str) -> Result<BareType, CoreError> {
        self.type_for_extension(extension).ok_or_else(|| {
            CoreError::UnknownExtension(extension.trim().trim_start_matches('.').to_owned())
        })
    }

    /// The full extension table, aliases included.
    pub fn extensions(&self) -> impl Iterator<Item = (&'static str, BareType)> + '_ {
        EXTENSIONS.iter().copied()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
