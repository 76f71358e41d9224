//! The Fragments service: the caller-facing API.
//!
//! Ties the type registry, the validator and the conversion engine to a
//! storage gateway. Fragments are values; every write returns the new
//! version, which callers should keep in place of the old one.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;

use fragments_core::{
    validate_content, BareType, ContentType, ConversionEngine, ConversionError, Fragment,
    FragmentId, OwnerId, TypeRegistry, ValidationError,
};
use fragments_store::StorageGateway;

use crate::error::{FragmentsError, Result};

/// Largest accepted upload, 5 MiB.
pub const DEFAULT_MAX_CONTENT_SIZE: usize = 5 * 1024 * 1024;

/// Configuration for [`Fragments`].
#[derive(Debug, Clone)]
pub struct FragmentsConfig {
    /// Whether content is checked against its declared type on write.
    pub validate_on_write: bool,
    /// Largest content payload accepted, in bytes.
    pub max_content_size: usize,
}

impl Default for FragmentsConfig {
    fn default() -> Self {
        Self {
            validate_on_write: true,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }
}

/// Result of listing an owner's fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<FragmentId>),
    Expanded(Vec<Fragment>),
}

impl FragmentList {
    pub fn len(&self) -> usize {
        match self {
            FragmentList::Ids(ids) => ids.len(),
            FragmentList::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The listed ids, whichever form the list has.
    pub fn ids(&self) -> Vec<&FragmentId> {
        match self {
            FragmentList::Ids(ids) => ids.iter().collect(),
            FragmentList::Expanded(fragments) => fragments.iter().map(Fragment::id).collect(),
        }
    }
}

/// Exported content and the type it is now in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// The declared type when nothing was converted, the target type otherwise.
    pub content_type: ContentType,
    pub data: Bytes,
}

/// The main Fragments struct.
///
/// Provides:
/// - Creating, saving and deleting fragments
/// - Validated content writes
/// - Listing by owner
/// - Export into other representations
pub struct Fragments<S: StorageGateway> {
    /// The storage backend.
    store: Arc<S>,
    /// Supported types and extensions, shared with the engine.
    registry: Arc<TypeRegistry>,
    /// Conversion matrix.
    engine: ConversionEngine,
    config: FragmentsConfig,
}

impl<S: StorageGateway> Fragments<S> {
    /// Create a service over `store` with the default type registry.
    pub fn new(store: S, config: FragmentsConfig) -> Self {
        Self::with_registry(store, Arc::new(TypeRegistry::new()), config)
    }

    /// Create a service sharing an existing registry.
    pub fn with_registry(store: S, registry: Arc<TypeRegistry>, config: FragmentsConfig) -> Self {
        Self {
            store: Arc::new(store),
            engine: ConversionEngine::new(Arc::clone(&registry)),
            registry,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    pub fn config(&self) -> &FragmentsConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Types
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a `Content-Type` header value names a supported type.
    pub fn is_supported_type(&self, header: &str) -> bool {
        self.registry.is_supported(header)
    }

    /// Types the fragment's content can be exported as.
    pub fn formats(&self, fragment: &Fragment) -> &[BareType] {
        fragment.formats(&self.engine)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a new, unsaved fragment.
    pub fn new_fragment(&self, owner_id: &OwnerId, content_type: &str) -> Result<Fragment> {
        Ok(Fragment::builder(owner_id.clone(), content_type).build()?)
    }

    /// Persist the fragment's metadata and return it with `updated` refreshed.
    pub async fn save(&self, fragment: &Fragment) -> Result<Fragment> {
        let saved = fragment.touched(Utc::now());
        self.store.put_metadata(saved.owner_id(), &saved).await?;

        tracing::debug!(
            owner_id = %saved.owner_id(),
            fragment_id = %saved.id(),
            content_type = %saved.content_type(),
            "saved fragment metadata"
        );
        Ok(saved)
    }

    /// Validate and store new content for the fragment.
    ///
    /// On success the returned fragment has `size` set to `data.len()` and a
    /// fresh `updated`, and its metadata and content are persisted together.
    /// On failure nothing is written and `fragment` stays valid as it was.
    pub async fn set_data(&self, fragment: &Fragment, data: impl Into<Bytes>) -> Result<Fragment> {
        let data = data.into();
        self.check_content(fragment, &data)?;

        let next = fragment.with_content_len(data.len() as u64, Utc::now());
        self.store
            .put_fragment(next.owner_id(), &next, data)
            .await?;

        tracing::debug!(
            owner_id = %next.owner_id(),
            fragment_id = %next.id(),
            size = next.size(),
            "stored fragment content"
        );
        Ok(next)
    }

    /// Create a fragment and store its first content in one call.
    pub async fn create(
        &self,
        owner_id: &OwnerId,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<Fragment> {
        let fragment = self.new_fragment(owner_id, content_type)?;
        let created = self.set_data(&fragment, data).await?;

        tracing::info!(
            owner_id = %owner_id,
            fragment_id = %created.id(),
            content_type = %created.content_type(),
            size = created.size(),
            "created fragment"
        );
        Ok(created)
    }

    /// Replace the content of an existing fragment.
    ///
    /// `content_type` must name the fragment's declared type; a type change
    /// is rejected with [`FragmentsError::TypeMismatch`].
    pub async fn update(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<Fragment> {
        let requested = ContentType::parse(content_type)?;
        let fragment = self.by_id(owner_id, id).await?;

        if fragment.bare_type() != requested.bare() {
            tracing::warn!(
                owner_id = %owner_id,
                fragment_id = %id,
                expected = %fragment.content_type(),
                actual = %requested,
                "refused content type change"
            );
            return Err(FragmentsError::TypeMismatch {
                expected: fragment.content_type().to_string(),
                actual: requested.to_string(),
            });
        }

        let updated = self.set_data(&fragment, data).await?;
        tracing::info!(
            owner_id = %owner_id,
            fragment_id = %id,
            size = updated.size(),
            "updated fragment"
        );
        Ok(updated)
    }

    /// Delete a fragment's metadata and content.
    pub async fn delete(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<()> {
        self.by_id(owner_id, id).await?;
        self.store.delete_all(owner_id, id).await?;

        tracing::info!(owner_id = %owner_id, fragment_id = %id, "deleted fragment");
        Ok(())
    }

    fn check_content(&self, fragment: &Fragment, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(ValidationError::Empty {
                content_type: fragment.bare_type(),
            }
            .into());
        }

        let limit = self.config.max_content_size;
        if data.len() > limit {
            tracing::warn!(
                fragment_id = %fragment.id(),
                size = data.len(),
                limit,
                "content too large"
            );
            return Err(FragmentsError::ContentTooLarge {
                size: data.len(),
                limit,
            });
        }

        if self.config.validate_on_write {
            if let Err(err) = validate_content(fragment.bare_type(), data) {
                tracing::debug!(
                    fragment_id = %fragment.id(),
                    content_type = %fragment.content_type(),
                    error = %err,
                    "content rejected"
                );
                return Err(err.into());
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Load a fragment's metadata.
    pub async fn by_id(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<Fragment> {
        self.store
            .get_metadata(owner_id, id)
            .await?
            .ok_or_else(|| FragmentsError::NotFound {
                owner_id: owner_id.clone(),
                id: id.clone(),
            })
    }

    /// List an owner's fragments, as ids or full metadata.
    pub async fn by_user(&self, owner_id: &OwnerId, expand: bool) -> Result<FragmentList> {
        let ids = self.store.list_ids(owner_id).await?;
        if !expand {
            return Ok(FragmentList::Ids(ids));
        }

        let mut fragments = Vec::with_capacity(ids.len());
        for id in &ids {
            // Skip ids deleted between the two reads.
            if let Some(fragment) = self.store.get_metadata(owner_id, id).await? {
                fragments.push(fragment);
            }
        }
        Ok(FragmentList::Expanded(fragments))
    }

    /// The fragment's stored content, unchanged.
    pub async fn get_data(&self, fragment: &Fragment) -> Result<Bytes> {
        self.store
            .get_content(fragment.owner_id(), fragment.id())
            .await?
            .ok_or_else(|| FragmentsError::NotFound {
                owner_id: fragment.owner_id().clone(),
                id: fragment.id().clone(),
            })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// The fragment's content converted to `target`.
    ///
    /// Exporting as the declared type returns the stored bytes and the
    /// declared type, parameters included.
    pub async fn export_as(&self, fragment: &Fragment, target: BareType) -> Result<Export> {
        let from = fragment.bare_type();
        if !self.formats(fragment).contains(&target) {
            return Err(ConversionError::Unsupported { from, to: target }.into());
        }

        let data = self.get_data(fragment).await?;
        if from == target {
            return Ok(Export {
                content_type: fragment.content_type().clone(),
                data,
            });
        }

        let converted = self.engine.convert(from, &data, target).map_err(|err| {
            tracing::warn!(
                fragment_id = %fragment.id(),
                error = %err,
                "conversion failed"
            );
            err
        })?;

        tracing::debug!(
            fragment_id = %fragment.id(),
            from = %from,
            to = %target,
            size = converted.len(),
            "converted fragment"
        );
        Ok(Export {
            content_type: ContentType::from(target),
            data: converted,
        })
    }

    /// Like [`export_as`](Self::export_as), with the target named by a file
    /// extension such as `html` or `.yml`.
    pub async fn export_by_extension(&self, fragment: &Fragment, extension: &str) -> Result<Export> {
        let target = self.registry.require_extension(extension)?;
        self.export_as(fragment, target).await
    }
}
