//! # Fragments Store
//!
//! Persistence for fragment metadata and content behind the
//! [`StorageGateway`] trait, with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`StorageGateway`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use fragments_core::{Fragment, OwnerId};
//! use fragments_store::{SqliteStore, StorageGateway};
//!
//! async fn example() -> fragments_store::Result<()> {
//!     let store = SqliteStore::open("fragments.db")?;
//!
//!     let owner = OwnerId::from("alice");
//!     let fragment = Fragment::builder(owner.clone(), "text/plain").build().unwrap();
//!     store
//!         .put_fragment(&owner, &fragment, Bytes::from_static(b"hello"))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Owner scoping**: every key is `(owner_id, fragment_id)`; one owner never
//!   sees another's fragments
//! - **Paired writes**: `put_fragment` stores metadata and content in one step
//!   on both bundled backends

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::StorageGateway;
