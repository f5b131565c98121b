//! `scatnames` extension: names of the scattering dimensions of a program.

use super::{downcast_eq, Extension, ExtensionInterface};
use crate::utils::errors::ScopResult;
use std::any::Any;

pub const SCATNAMES_URI: &str = "scatnames";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScatNames {
    pub names: Vec<String>,
}

impl ScatNames {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Extension for ScatNames {
    fn uri(&self) -> &str {
        SCATNAMES_URI
    }

    fn print(&self) -> String {
        self.names.join(" ")
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
pub struct ScatNamesInterface;

impl ExtensionInterface for ScatNamesInterface {
    fn uri(&self) -> &str {
        SCATNAMES_URI
    }

    fn create(&self) -> Box<dyn Extension> {
        Box::new(ScatNames::default())
    }

    fn parse(&self, text: &str) -> ScopResult<Box<dyn Extension>> {
        let names = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(str::split_whitespace);
        Ok(Box::new(ScatNames::new(names)))
    }
}
