//! URI-tagged extension payloads.
//!
//! Relations, statements and programs each carry an ordered [`ExtensionList`].
//! The core never knows the concrete payload types: a payload implements
//! [`Extension`] and is produced from text by an [`ExtensionInterface`]
//! registered under its URI in an [`ExtensionRegistry`]. URIs nobody
//! registered fall back to [`unknown::Unknown`], which keeps the text verbatim.

pub mod body;
pub mod comment;
pub mod registry;
pub mod scatnames;
pub mod unknown;

pub use body::{Body, BodyInterface};
pub use comment::{Comment, CommentInterface};
pub use registry::ExtensionRegistry;
pub use scatnames::{ScatNames, ScatNamesInterface};
pub use unknown::{Unknown, UnknownInterface};

use crate::utils::errors::ScopResult;
use std::any::Any;
use std::fmt;

/// An extension payload.
pub trait Extension: fmt::Debug + Send + Sync + 'static {
    /// URI identifying the payload type (also the textual mark).
    fn uri(&self) -> &str;

    /// Inner text of the payload, without marks.
    fn print(&self) -> String;

    /// Deep copy.
    fn clone_box(&self) -> Box<dyn Extension>;

    /// Structural equality with another payload.
    fn equals(&self, other: &dyn Extension) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Capability descriptor for one payload type.
pub trait ExtensionInterface: Send + Sync {
    fn uri(&self) -> &str;

    /// A new, empty payload.
    fn create(&self) -> Box<dyn Extension>;

    /// Build a payload from the text found between its marks.
    fn parse(&self, text: &str) -> ScopResult<Box<dyn Extension>>;
}

impl Clone for Box<dyn Extension> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// `equals` for payload types that implement `PartialEq`.
pub(crate) fn downcast_eq<T: Extension + PartialEq>(this: &T, other: &dyn Extension) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .map_or(false, |other| this == other)
}

/// One attached extension.
#[derive(Debug, Clone)]
pub struct ExtensionValue {
    payload: Box<dyn Extension>,
}

impl ExtensionValue {
    pub fn new(payload: Box<dyn Extension>) -> Self {
        Self { payload }
    }

    pub fn uri(&self) -> &str {
        self.payload.uri()
    }

    pub fn payload(&self) -> &dyn Extension {
        self.payload.as_ref()
    }

    /// Typed view of the payload.
    pub fn downcast_ref<T: Extension>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    /// Typed mutable view of the payload.
    pub fn downcast_mut<T: Extension>(&mut self) -> Option<&mut T> {
        self.payload.as_any_mut().downcast_mut::<T>()
    }

    pub fn print(&self) -> String {
        self.payload.print()
    }

    pub fn equal(&self, other: &ExtensionValue) -> bool {
        self.uri() == other.uri() && self.payload.equals(other.payload.as_ref())
    }
}

impl<T: Extension> From<T> for ExtensionValue {
    fn from(payload: T) -> Self {
        Self::new(Box::new(payload))
    }
}

/// Ordered collection of extensions.
#[derive(Debug, Clone, Default)]
pub struct ExtensionList {
    values: Vec<ExtensionValue>,
}

impl ExtensionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append an extension.
    pub fn push(&mut self, value: impl Into<ExtensionValue>) {
        self.values.push(value.into());
    }

    /// Replace the first extension with the same URI, or append.
    pub fn set(&mut self, value: impl Into<ExtensionValue>) {
        let value = value.into();
        match self.values.iter_mut().find(|v| v.uri() == value.uri()) {
            Some(slot) => *slot = value,
            None => self.values.push(value),
        }
    }

    /// First extension with the given URI.
    pub fn find(&self, uri: &str) -> Option<&ExtensionValue> {
        self.values.iter().find(|v| v.uri() == uri)
    }

    pub fn find_mut(&mut self, uri: &str) -> Option<&mut ExtensionValue> {
        self.values.iter_mut().find(|v| v.uri() == uri)
    }

    /// First payload of type `T`.
    pub fn get<T: Extension>(&self) -> Option<&T> {
        self.values.iter().find_map(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: Extension>(&mut self) -> Option<&mut T> {
        self.values.iter_mut().find_map(|v| v.downcast_mut::<T>())
    }

    /// Remove and return the first extension with the given URI.
    pub fn remove(&mut self, uri: &str) -> Option<ExtensionValue> {
        let pos = self.values.iter().position(|v| v.uri() == uri)?;
        Some(self.values.remove(pos))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtensionValue> {
        self.values.iter()
    }

    /// Order-sensitive structural equality.
    pub fn equal(&self, other: &ExtensionList) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().zip(&other.values).all(|(a, b)| a.equal(b))
    }
}

impl<'a> IntoIterator for &'a ExtensionList {
    type Item = &'a ExtensionValue;
    type IntoIter = std::slice::Iter<'a, ExtensionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl Extend<ExtensionValue> for ExtensionList {
    fn extend<I: IntoIterator<Item = ExtensionValue>>(&mut self, iter: I) {
        self.values.extend(iter);
    }
}
