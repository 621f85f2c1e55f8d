use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ArrangementError;

/// Longest tag accepted by `Arrangement::add_tag`, in characters.
pub const MAX_TAG_LEN: usize = 32;

/// Virtual-desktop index recorded when the platform cannot report one.
pub const DEFAULT_SPACE_INDEX: i32 = 0;

/// Globally unique arrangement identity. This, not the name, is the merge key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrangementId(Uuid);

impl ArrangementId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ArrangementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArrangementId {
    type Err = ArrangementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ArrangementError::InvalidId {
                value: s.to_string(),
            })
    }
}

/// Window rectangle in screen coordinates.
///
/// Serialized as the ordered tuple `[x, y, width, height]`, which is the
/// cross-device interchange shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the frame has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<[f64; 4]> for Frame {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<Frame> for [f64; 4] {
    fn from(frame: Frame) -> Self {
        [frame.x, frame.y, frame.width, frame.height]
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// One captured window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    /// Stable application identifier (bundle id). Never empty.
    pub owning_app_id: String,
    pub app_display_name: String,
    /// May be empty for untitled windows.
    pub window_title: String,
    pub frame: Frame,
    pub is_minimized: bool,
    pub is_full_screen: bool,
    pub space_index: i32,
}

/// Every field of an arrangement, as decoded from a persisted or remote form.
///
/// Consumed by `Arrangement::from_parts`, the only way to rebuild an
/// arrangement that was not just captured.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementParts {
    pub id: ArrangementId,
    pub name: String,
    pub windows: Vec<WindowRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub origin_device: String,
    pub tags: Vec<String>,
}

/// A named, timestamped snapshot of window records.
///
/// `id`, `windows`, `created_at` and `origin_device` never change after
/// creation. Tag operations return a new value with the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ArrangementParts")]
pub struct Arrangement {
    id: ArrangementId,
    name: String,
    windows: Vec<WindowRecord>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    origin_device: String,
    tags: Vec<String>,
}

impl Arrangement {
    /// Fresh arrangement stamped with the current time. Capture is the only producer.
    pub(crate) fn new(
        name: String,
        windows: Vec<WindowRecord>,
        tags: &[String],
        origin_device: String,
    ) -> Result<Self, ArrangementError> {
        let mut validated: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = validate_tag(tag)?;
            if !validated.contains(&tag) {
                validated.push(tag);
            }
        }

        let now = Utc::now();
        Ok(Self {
            id: ArrangementId::generate(),
            name,
            windows,
            created_at: now,
            updated_at: now,
            origin_device,
            tags: validated,
        })
    }

    /// Rebuild an arrangement from decoded fields, failing if any invariant is broken.
    ///
    /// Duplicate and blank tags are collapsed rather than rejected.
    pub fn from_parts(parts: ArrangementParts) -> Result<Self, ArrangementError> {
        let invalid = |reason: &str| ArrangementError::InvalidArrangement {
            name: parts.name.clone(),
            reason: reason.to_string(),
        };

        if parts.origin_device.trim().is_empty() {
            return Err(invalid("originDevice is empty"));
        }
        if parts.updated_at < parts.created_at {
            return Err(invalid("updatedAt precedes createdAt"));
        }
        if parts.windows.iter().any(|w| w.owning_app_id.is_empty()) {
            return Err(invalid("window without owningAppId"));
        }

        let mut tags: Vec<String> = Vec::with_capacity(parts.tags.len());
        for tag in parts.tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Ok(Self {
            id: parts.id,
            name: parts.name,
            windows: parts.windows,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            origin_device: parts.origin_device,
            tags,
        })
    }

    pub fn id(&self) -> ArrangementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn windows(&self) -> &[WindowRecord] {
        &self.windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn origin_device(&self) -> &str {
        &self.origin_device
    }

    pub fn is_from_device(&self, device_id: &str) -> bool {
        self.origin_device == device_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        self.tags.iter().any(|t| t == tag)
    }

    /// Return a copy carrying `tag`. Adding a tag that is already present is a no-op.
    pub fn add_tag(&self, tag: &str) -> Result<Arrangement, ArrangementError> {
        let tag = validate_tag(tag)?;
        if self.has_tag(&tag) {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.tags.push(tag);
        next.touch();
        Ok(next)
    }

    /// Return a copy without `tag`. Removing an absent tag is a no-op.
    pub fn remove_tag(&self, tag: &str) -> Arrangement {
        if !self.has_tag(tag) {
            return self.clone();
        }

        let tag = tag.trim();
        let mut next = self.clone();
        next.tags.retain(|t| t != tag);
        next.touch();
        next
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

impl TryFrom<ArrangementParts> for Arrangement {
    type Error = ArrangementError;

    fn try_from(parts: ArrangementParts) -> Result<Self, Self::Error> {
        Arrangement::from_parts(parts)
    }
}

fn validate_tag(tag: &str) -> Result<String, ArrangementError> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(ArrangementError::InvalidTag {
            tag: tag.to_string(),
            reason: "tag is empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_TAG_LEN {
        return Err(ArrangementError::InvalidTag {
            tag: tag.to_string(),
            reason: format!("tag is longer than {} characters", MAX_TAG_LEN),
        });
    }
    Ok(trimmed.to_string())
}
