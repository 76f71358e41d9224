//! Strong type definitions for Fragments.
//!
//! Identifiers are newtypes so owners and fragment ids cannot be swapped at
//! compile time. Content types resolve to the closed [`BareType`] enum.

use std::fmt;
use std::str::FromStr;

use mime::Mime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Opaque fragment identifier.
///
/// Freshly created fragments get a random UUID; restored fragments keep
/// whatever id they were stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for FragmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque identifier of the principal owning a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OwnerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OwnerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for OwnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A supported content type with its parameters stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BareType {
    TextPlain,
    TextMarkdown,
    TextHtml,
    TextCsv,
    ApplicationJson,
    ApplicationYaml,
    /// Legacy spelling of YAML, interchangeable with [`BareType::ApplicationYaml`].
    ApplicationXYaml,
    ImagePng,
    ImageJpeg,
    ImageWebp,
    ImageAvif,
    ImageGif,
}

impl BareType {
    /// Every supported type, in registry order.
    pub const ALL: [BareType; 12] = [
        BareType::TextPlain,
        BareType::TextMarkdown,
        BareType::TextHtml,
        BareType::TextCsv,
        BareType::ApplicationJson,
        BareType::ApplicationYaml,
        BareType::ApplicationXYaml,
        BareType::ImagePng,
        BareType::ImageJpeg,
        BareType::ImageWebp,
        BareType::ImageAvif,
        BareType::ImageGif,
    ];

    /// The MIME spelling, e.g. `text/plain`.
    pub const fn as_str(self) -> &'static str {
        match self {
            BareType::TextPlain => "text/plain",
            BareType::TextMarkdown => "text/markdown",
            BareType::TextHtml => "text/html",
            BareType::TextCsv => "text/csv",
            BareType::ApplicationJson => "application/json",
            BareType::ApplicationYaml => "application/yaml",
            BareType::ApplicationXYaml => "application/x-yaml",
            BareType::ImagePng => "image/png",
            BareType::ImageJpeg => "image/jpeg",
            BareType::ImageWebp => "image/webp",
            BareType::ImageAvif => "image/avif",
            BareType::ImageGif => "image/gif",
        }
    }

    /// Canonical file extension, without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            BareType::TextPlain => "txt",
            BareType::TextMarkdown => "md",
            BareType::TextHtml => "html",
            BareType::TextCsv => "csv",
            BareType::ApplicationJson => "json",
            BareType::ApplicationYaml | BareType::ApplicationXYaml => "yaml",
            BareType::ImagePng => "png",
            BareType::ImageJpeg => "jpg",
            BareType::ImageWebp => "webp",
            BareType::ImageAvif => "avif",
            BareType::ImageGif => "gif",
        }
    }

    pub const fn is_text(self) -> bool {
        matches!(
            self,
            BareType::TextPlain | BareType::TextMarkdown | BareType::TextHtml | BareType::TextCsv
        )
    }

    pub const fn is_image(self) -> bool {
        matches!(
            self,
            BareType::ImagePng
                | BareType::ImageJpeg
                | BareType::ImageWebp
                | BareType::ImageAvif
                | BareType::ImageGif
        )
    }

    pub const fn is_yaml(self) -> bool {
        matches!(self, BareType::ApplicationYaml | BareType::ApplicationXYaml)
    }
}

impl fmt::Display for BareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BareType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BareType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnsupportedType(s.to_owned()))
    }
}

/// A declared content type: the raw header value plus its resolved bare type.
///
/// The raw value is kept verbatim (trimmed) so parameters such as
/// `charset=utf-8` survive a store round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentType {
    raw: String,
    bare: BareType,
}

impl ContentType {
    /// Parse a `Content-Type` style value.
    ///
    /// Fails with [`CoreError::UnsupportedType`] when the value is malformed
    /// or its bare type is not supported.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let raw = value.trim();
        let mime: Mime = raw
            .parse()
            .map_err(|_| CoreError::UnsupportedType(raw.to_owned()))?;
        let bare = mime
            .essence_str()
            .parse::<BareType>()
            .map_err(|_| CoreError::UnsupportedType(raw.to_owned()))?;
        Ok(Self {
            raw: raw.to_owned(),
            bare,
        })
    }

    /// The full declared value, parameters included.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn bare(&self) -> BareType {
        self.bare
    }

    /// The declared type without parameters.
    pub fn mime_type(&self) -> &'static str {
        self.bare.as_str()
    }

    /// The `charset` parameter, if one was declared.
    pub fn charset(&self) -> Option<String> {
        let mime: Mime = self.raw.parse().ok()?;
        mime.get_param(mime::CHARSET).map(|v| v.as_str().to_owned())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<BareType> for ContentType {
    fn from(bare: BareType) -> Self {
        Self {
            raw: bare.as_str().to_owned(),
            bare,
        }
    }
}

impl TryFrom<String> for ContentType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentType> for String {
    fn from(ct: ContentType) -> Self {
        ct.raw
    }
}
