//! URI-keyed registry of extension interfaces.

use super::{
    BodyInterface, CommentInterface, ExtensionInterface, ExtensionValue, ScatNamesInterface,
    UnknownInterface,
};
use crate::utils::errors::ScopResult;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry mapping URIs to extension interfaces.
///
/// Lookups never fail: an unregistered URI resolves to an
/// [`UnknownInterface`] that keeps the inner text verbatim.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    interfaces: HashMap<String, Arc<dyn ExtensionInterface>>,
}

impl ExtensionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `comment`, `scatnames` and `body` interfaces.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CommentInterface);
        registry.register(ScatNamesInterface);
        registry.register(BodyInterface);
        registry
    }

    /// Register an interface under its URI, replacing any previous one.
    pub fn register<I: ExtensionInterface + 'static>(
        &mut self,
        interface: I,
    ) -> Option<Arc<dyn ExtensionInterface>> {
        self.register_arc(Arc::new(interface))
    }

    pub fn register_arc(
        &mut self,
        interface: Arc<dyn ExtensionInterface>,
    ) -> Option<Arc<dyn ExtensionInterface>> {
        let uri = interface.uri().to_string();
        let previous = self.interfaces.insert(uri.clone(), interface);
        if previous.is_some() {
            warn!("extension interface for <{}> replaced", uri);
        }
        previous
    }

    /// Remove the interface registered under `uri`.
    pub fn unregister(&mut self, uri: &str) -> Option<Arc<dyn ExtensionInterface>> {
        self.interfaces.remove(uri)
    }

    pub fn is_registered(&self, uri: &str) -> bool {
        self.interfaces.contains_key(uri)
    }

    /// Interface for `uri`, falling back to the unknown interface.
    pub fn lookup(&self, uri: &str) -> Arc<dyn ExtensionInterface> {
        match self.interfaces.get(uri) {
            Some(interface) => Arc::clone(interface),
            None => Arc::new(UnknownInterface::new(uri)),
        }
    }

    /// Parse the inner text of a `<uri>` block.
    pub fn parse(&self, uri: &str, text: &str) -> ScopResult<ExtensionValue> {
        if !self.is_registered(uri) {
            warn!("no interface registered for <{}>, keeping its text verbatim", uri);
        } else {
            debug!("parsing <{}> extension", uri);
        }
        let payload = self.lookup(uri).parse(text)?;
        Ok(ExtensionValue::new(payload))
    }

    /// A new empty payload for `uri`.
    pub fn create(&self, uri: &str) -> ExtensionValue {
        ExtensionValue::new(self.lookup(uri).create())
    }

    /// Registered URIs, sorted.
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.interfaces.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("uris", &self.uris())
            .finish()
    }
}
