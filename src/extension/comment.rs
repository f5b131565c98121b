//! `comment` extension: free text attached to a program or statement.

use super::{downcast_eq, Extension, ExtensionInterface};
use crate::utils::errors::ScopResult;
use std::any::Any;

pub const COMMENT_URI: &str = "comment";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Extension for Comment {
    fn uri(&self) -> &str {
        COMMENT_URI
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

#[derive(Debug, Clone, Copy, Default)]
pub struct CommentInterface;

impl ExtensionInterface for CommentInterface {
    fn uri(&self) -> &str {
        COMMENT_URI
    }

    fn create(&self) -> Box<dyn Extension> {
        Box::new(Comment::default())
    }

    fn parse(&self, text: &str) -> ScopResult<Box<dyn Extension>> {
        Ok(Box::new(Comment::new(text)))
    }
}
