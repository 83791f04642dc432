use std::ops::Range;

use crate::token::Token;

/// A named set of material paths, one per material slot
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Look {
    pub name: Token,
    pub materials: Vec<String>,
}

impl Look {
    pub fn new(name: Token) -> Self {
        Self {
            name,
            materials: Vec::new(),
        }
    }
}

/// One attribute value of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartAttribute {
    pub tag: Token,
    pub attribute_type: i32,
    pub value: u32,
}

/// A named model configuration.
///
/// Every variant of a model carries the same attribute tags in the same
/// order; only the values differ.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variant {
    pub name: Token,
    pub attributes: Vec<PartAttribute>,
}

impl Variant {
    pub fn new(name: Token) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }
}

/// A named group of pieces and locators.
///
/// The ranges index into [`crate::model::Model::pieces`] and
/// [`crate::model::Model::locators`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Part {
    pub name: Token,
    pub pieces: Range<usize>,
    pub locators: Range<usize>,
}

impl Part {
    pub fn new(name: Token) -> Self {
        Self {
            name,
            pieces: 0..0,
            locators: 0..0,
        }
    }
}
