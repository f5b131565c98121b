//! Fallback payload for URIs with no registered interface.

use super::{downcast_eq, Extension, ExtensionInterface};
use crate::utils::errors::ScopResult;
use std::any::Any;

/// Verbatim text of an extension nobody registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unknown {
    uri: String,
    text: String,
}

impl Unknown {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Extension for Unknown {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn print(&self) -> String {
        self.text.clone()
    }

    fn clone_box(&self) -> Box<dyn Extension> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn Extension) -> bool {
        downcast_eq(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Interface handed out by the registry for unregistered URIs.
#[derive(Debug, Clone)]
pub struct UnknownInterface {
    uri: String,
}

impl UnknownInterface {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

impl ExtensionInterface for UnknownInterface {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn create(&self) -> Box<dyn Extension> {
        Box::new(Unknown::new(self.uri.clone(), String::new()))
    }

    fn parse(&self, text: &str) -> ScopResult<Box<dyn Extension>> {
        Ok(Box::new(Unknown::new(self.uri.clone(), text)))
    }
}
