//! # Fragments Testkit
//!
//! Testing utilities for Fragments.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A shared in-memory store plus valid and invalid sample
//!   payloads for every supported type
//! - **Generators**: Proptest strategies for content types, JSON values and
//!   CSV tables
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use fragments_testkit::generators::supported_header;
//!
//! proptest! {
//!     #[test]
//!     fn every_supported_header_parses(header in supported_header()) {
//!         prop_assert!(TypeRegistry::new().is_supported(&header));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use fragments_core::BareType;
//! use fragments_testkit::fixtures::{sample, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let fragment = fixture.fragment("text/markdown");
//! assert!(!sample(BareType::TextMarkdown).is_empty());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{invalid_sample, multi_owner_fixtures, sample, sample_image, TestFixture};
pub use generators::{CsvTable, JsonDoc};
