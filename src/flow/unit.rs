//! Flow unit record

use crate::content::ContentClaim;
use crate::flow::attributes;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Attribute map, ordered by key. Keys are unique by construction.
pub type Attributes = BTreeMap<String, String>;

/// An inbound content-bearing record.
///
/// The payload is referenced through a [`ContentClaim`] and is never mutated once the unit
/// exists; the engine only reads its length and streams it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowUnit {
    id: Uuid,
    attributes: Attributes,
    claim: Option<ContentClaim>,
    size: u64,
}

impl FlowUnit {
    /// Create a unit referencing `claim`, whose payload is `size` bytes long.
    pub fn new(claim: Option<ContentClaim>, size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            attributes: Attributes::new(),
            claim,
            size,
        }
    }

    /// Create a unit with no content.
    pub fn empty() -> Self {
        Self::new(None, 0)
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Set an attribute, replacing any previous value for the key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Replace every attribute at once.
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    pub fn claim(&self) -> Option<&ContentClaim> {
        self.claim.as_ref()
    }

    /// Payload length in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn filename(&self) -> Option<&str> {
        self.attribute(attributes::FILENAME)
    }
}
