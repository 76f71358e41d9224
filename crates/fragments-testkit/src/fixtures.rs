//! Test fixtures and sample payloads.
//!
//! Common setup code for integration tests.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

use fragments_core::{BareType, Fragment, OwnerId};
use fragments_store::MemoryStore;

/// A test fixture with an owner and a shared memory store.
///
/// The store sits behind an `Arc` so a service can be built over a clone
/// while the test keeps inspecting the same data.
pub struct TestFixture {
    pub owner: OwnerId,
    pub store: Arc<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture for the default test owner.
    pub fn new() -> Self {
        Self::with_owner("test-owner")
    }

    pub fn with_owner(owner: impl Into<OwnerId>) -> Self {
        Self {
            owner: owner.into(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Build an unsaved fragment owned by the fixture's owner.
    pub fn fragment(&self, content_type: &str) -> Fragment {
        Fragment::builder(self.owner.clone(), content_type)
            .build()
            .expect("fixture content type is supported")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create fixtures for several distinct owners sharing nothing.
pub fn multi_owner_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_owner(format!("owner-{i}")))
        .collect()
}

/// A small valid payload for `content_type`.
pub fn sample(content_type: BareType) -> Bytes {
    match content_type {
        BareType::TextPlain => Bytes::from_static(b"This is a test fragment"),
        BareType::TextMarkdown => Bytes::from_static(
            b"# Heading\n\nSome *emphasis* and a [link](https://example.com).\n\n- one\n- two\n",
        ),
        BareType::TextHtml => Bytes::from_static(
            br#"<div><p>Hello <strong>World</strong></p><img src="x"/><br/></div>"#,
        ),
        BareType::TextCsv => Bytes::from_static(b"name,age\nJohn,30\nJane,25"),
        BareType::ApplicationJson => Bytes::from_static(br#"{"name":"test","value":123}"#),
        BareType::ApplicationYaml | BareType::ApplicationXYaml => {
            Bytes::from_static(b"name: test\nvalue: 123\n")
        }
        BareType::ImagePng => sample_image(ImageFormat::Png),
        BareType::ImageJpeg => sample_image(ImageFormat::Jpeg),
        BareType::ImageWebp => sample_image(ImageFormat::WebP),
        BareType::ImageGif => sample_image(ImageFormat::Gif),
        // No AVIF encoder is built in; images are stored unvalidated, so an
        // ISO-BMFF `ftyp` box is enough.
        BareType::ImageAvif => Bytes::from_static(
            b"\x00\x00\x00\x1cftypavif\x00\x00\x00\x00avifmif1miaf",
        ),
    }
}

/// A payload that fails validation for `content_type`, or `None` for types
/// that accept any non-empty bytes.
pub fn invalid_sample(content_type: BareType) -> Option<Bytes> {
    let bytes: &'static [u8] = match content_type {
        BareType::TextHtml => b"Hello World",
        BareType::TextCsv => b"just some words",
        BareType::ApplicationJson => b"{not json",
        BareType::ApplicationYaml | BareType::ApplicationXYaml => b"- a\n- b\n",
        _ => return None,
    };
    Some(Bytes::from_static(bytes))
}

/// An 8x8 gradient encoded as `format`.
pub fn sample_image(format: ImageFormat) -> Bytes {
    let rgba = ImageBuffer::from_fn(8, 8, |x, y| {
        Rgba([(x * 32) as u8, (y * 32) as u8, 160, 255])
    });
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };

    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("sample image encodes");
    Bytes::from(out.into_inner())
}
