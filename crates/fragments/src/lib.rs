//! # Fragments
//!
//! Typed content storage: fragments of text, structured data and images,
//! validated against their declared type on write and exportable into other
//! representations.
//!
//! ## Key Concepts
//!
//! - **Fragment**: An owned, typed blob of content plus metadata
//! - **Bare type**: A content type with parameters (e.g. charset) stripped
//! - **Conversion matrix**: The fixed table of legal (source, target) pairs
//! - **Storage gateway**: Where metadata and content are kept
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fragments::{BareType, Fragments, FragmentsConfig, OwnerId};
//! use fragments::store::SqliteStore;
//!
//! async fn example() -> fragments::Result<()> {
//!     let store = SqliteStore::open("fragments.db")?;
//!     let service = Fragments::new(store, FragmentsConfig::default());
//!
//!     let owner = OwnerId::from("alice");
//!     let fragment = service
//!         .create(&owner, "text/markdown", "# Hello *World*")
//!         .await?;
//!
//!     let html = service.export_as(&fragment, BareType::TextHtml).await?;
//!     assert_eq!(html.content_type.as_str(), "text/html");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `fragments::core` - Types, validation and conversion
//! - `fragments::store` - Storage gateway and backends

pub mod error;
pub mod service;

// Re-export component crates
pub use fragments_core as core;
pub use fragments_store as store;

// Re-export main types for convenience
pub use error::{FragmentsError, Result};
pub use service::{Export, FragmentList, Fragments, FragmentsConfig, DEFAULT_MAX_CONTENT_SIZE};

// Re-export commonly used core types
pub use fragments_core::{
    BareType, ContentType, ConversionEngine, Fragment, FragmentBuilder, FragmentId, OwnerId,
    TypeRegistry,
};
