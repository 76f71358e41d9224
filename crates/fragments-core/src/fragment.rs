//! Fragment metadata: an immutable value plus pure derived properties.
//!
//! Writes never mutate a fragment in place. [`Fragment::touched`] and
//! [`Fragment::with_content_len`] return the next version, which the caller
//! persists and keeps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::convert::ConversionEngine;
use crate::error::CoreError;
use crate::types::{BareType, ContentType, FragmentId, OwnerId};

/// Metadata of one fragment.
///
/// Serializes as `{"id", "ownerId", "created", "updated", "type", "size"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    id: FragmentId,
    owner_id: OwnerId,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    #[serde(rename = "type")]
    content_type: ContentType,
    size: u64,
}

impl Fragment {
    /// Start building a fragment for `owner_id` with a declared content type.
    pub fn builder(owner_id: impl Into<OwnerId>, content_type: impl Into<String>) -> FragmentBuilder {
        FragmentBuilder::new(owner_id, content_type)
    }

    pub fn id(&self) -> &FragmentId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// The declared type, parameters included.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Byte length of the last content written.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bare_type(&self) -> BareType {
        self.content_type.bare()
    }

    /// The declared type without parameters, e.g. `text/html`.
    pub fn mime_type(&self) -> &'static str {
        self.content_type.mime_type()
    }

    pub fn is_text(&self) -> bool {
        self.bare_type().is_text()
    }

    pub fn is_image(&self) -> bool {
        self.bare_type().is_image()
    }

    /// Types this fragment's content can be exported as.
    pub fn formats<'e>(&self, engine: &'e ConversionEngine) -> &'e [BareType] {
        engine.formats(self.bare_type())
    }

    /// The same fragment with `updated` set to `now`.
    pub fn touched(&self, now: DateTime<Utc>) -> Fragment {
        Fragment {
            updated: now,
            ..self.clone()
        }
    }

    /// The fragment after a content write of `len` bytes at `now`.
    pub fn with_content_len(&self, len: u64, now: DateTime<Utc>) -> Fragment {
        Fragment {
            size: len,
            updated: now,
            ..self.clone()
        }
    }
}

/// Builder for [`Fragment`].
///
/// New fragments get a generated id and `created == updated == now`;
/// restored fragments pass their stored values through.
#[derive(Debug, Clone)]
pub struct FragmentBuilder {
    id: Option<FragmentId>,
    owner_id: OwnerId,
    content_type: String,
    size: u64,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl FragmentBuilder {
    pub fn new(owner_id: impl Into<OwnerId>, content_type: impl Into<String>) -> Self {
        Self {
            id: None,
            owner_id: owner_id.into(),
            content_type: content_type.into(),
            size: 0,
            created: None,
            updated: None,
        }
    }

    pub fn id(mut self, id: impl Into<FragmentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Validate and build the fragment.
    ///
    /// Fails when the owner or id is empty or the content type is unsupported.
    pub fn build(self) -> Result<Fragment, CoreError> {
        if self.owner_id.is_empty() {
            return Err(CoreError::InvalidFragment("ownerId is required".into()));
        }
        if self.content_type.trim().is_empty() {
            return Err(CoreError::InvalidFragment("type is required".into()));
        }
        let content_type = ContentType::parse(&self.content_type)?;

        let id = match self.id {
            Some(id) if id.as_str().is_empty() => {
                return Err(CoreError::InvalidFragment("id must not be empty".into()));
            }
            Some(id) => id,
            None => FragmentId::generate(),
        };

        let now = Utc::now();
        let created = self.created.unwrap_or(now);
        let updated = self.updated.unwrap_or(created);

        Ok(Fragment {
            id,
            owner_id: self.owner_id,
            created,
            updated,
            content_type,
            size: self.size,
        })
    }
}
