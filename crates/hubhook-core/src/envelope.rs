//! Delivery envelope model.
//!
//! A delivery is a three-level structure: the envelope names the overall
//! object kind, each entry identifies the source object, and each change
//! names a field plus a field-specific opaque value. Unknown object kinds
//! and unknown fields deserialize successfully so that new platform
//! topics do not break parsing.

use serde::{de::DeserializeOwned, Deserialize};

/// Object kind of a delivery envelope.
///
/// The platform sends the topic the subscription was created against.
/// Anything other than `page` or `user` lands on [`ObjectKind::Unknown`]
/// and is rejected at dispatch, not at parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A page subscription topic.
    Page,
    /// A user subscription topic.
    User,
    /// Any topic this service does not understand.
    #[serde(other)]
    Unknown,
}

impl ObjectKind {
    /// Returns whether entries of this kind are processed.
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Page | Self::User)
    }
}

/// Top-level shape of a delivery body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// Subscription topic this delivery belongs to.
    pub object: ObjectKind,
    /// Per-source entries, in arrival order.
    pub entry: Vec<Entry>,
}

/// One notification source within a delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    /// Identifier of the object the changes apply to.
    pub id: String,
    /// User scoping identifier, present on some topics.
    #[serde(default)]
    pub uid: Option<String>,
    /// Unix timestamp of the change batch, when the platform sends one.
    #[serde(default)]
    pub time: Option<i64>,
    /// Field changes, in arrival order. Absent arrays parse as empty.
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// A single field change notification.
///
/// `value` is field-specific; handlers registered for the field decide
/// how to interpret it. Fields nobody registered for pass through as a
/// no-op.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// Name of the changed field, e.g. `photos`.
    pub field: String,
    /// Opaque structured value keyed by `field`.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Change {
    /// Deserializes the opaque value into a field-specific type.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when the value does not match
    /// the requested shape.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.value.clone())
    }
}

/// Typed value carried by a `photos` field change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoChange {
    /// Action taken on the photo, e.g. `add`.
    pub verb: String,
    /// Identifier of the affected photo object.
    pub object_id: String,
}
