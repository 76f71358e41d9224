//! # Fragments Core
//!
//! Pure primitives for Fragments: content types, content validation, and
//! format conversion.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over fragment metadata and content bytes.
//!
//! ## Key Types
//!
//! - [`BareType`] - Closed set of supported content types
//! - [`ContentType`] - A declared content type, possibly with parameters
//! - [`TypeRegistry`] - Supported types and the extension tables
//! - [`ConversionEngine`] - The legal conversion matrix and its converters
//! - [`Fragment`] - Immutable fragment metadata
//!
//! ## Validation
//!
//! Content is checked against its declared type with [`validate_content`]
//! before it is accepted. See the [`validation`] module.

pub mod convert;
pub mod error;
pub mod fragment;
pub mod registry;
pub mod types;
pub mod validation;

pub use convert::ConversionEngine;
pub use error::{ConversionError, CoreError, ValidationError};
pub use fragment::{Fragment, FragmentBuilder};
pub use registry::TypeRegistry;
pub use types::{BareType, ContentType, FragmentId, OwnerId};
pub use validation::validate_content;
