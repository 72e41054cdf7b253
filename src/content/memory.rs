//! In-memory content store

use crate::content::{ContentClaim, ContentStore};
use crate::error::ContentError;
use crate::flow::FlowUnit;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::debug;

/// Volatile content store keyed by claim.
///
/// Payloads are shared as `Arc<[u8]>`, so concurrent readers never copy the stored bytes.
#[derive(Default)]
pub struct MemoryContentStore {
    payloads: RwLock<HashMap<ContentClaim, Arc<[u8]>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Store `content` and return a flow unit referencing it.
    pub fn import(&self, content: impl Into<Vec<u8>>) -> Result<FlowUnit, ContentError> {
        let content = content.into();
        let size = content.len() as u64;
        let claim = self.write(content)?;
        Ok(FlowUnit::new(Some(claim), size))
    }

    /// Full payload of `unit`, or an empty vector for a unit without content.
    pub fn content_of(&self, unit: &FlowUnit) -> Result<Vec<u8>, ContentError> {
        let mut bytes = Vec::with_capacity(unit.size() as usize);
        if let Some(claim) = unit.claim() {
            self.read(claim)?.read_to_end(&mut bytes)?;
        }
        Ok(bytes)
    }
}

impl ContentStore for MemoryContentStore {
    fn write(&self, content: Vec<u8>) -> Result<ContentClaim, ContentError> {
        let claim = ContentClaim::new();
        debug!(claim = %claim, bytes = content.len(), "Storing payload");
        self.payloads
            .write()
            .insert(claim.clone(), Arc::from(content.into_boxed_slice()));
        Ok(claim)
    }

    fn read(&self, claim: &ContentClaim) -> Result<Box<dyn Read + Send>, ContentError> {
        let payload = self
            .payloads
            .read()
            .get(claim)
            .cloned()
            .ok_or_else(|| ContentError::ClaimNotFound(claim.clone()))?;
        Ok(Box::new(Cursor::new(payload)))
    }

    fn exists(&self, claim: &ContentClaim) -> bool {
        self.payloads.read().contains_key(claim)
    }

    fn remove(&self, claim: &ContentClaim) -> bool {
        self.payloads.write().remove(claim).is_some()
    }

    fn len(&self) -> usize {
        self.payloads.read().len()
    }
}
