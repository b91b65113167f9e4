//! Small accessor traits shared by IR nodes.

use crate::{ExternFunction, FunctionSignature, Name, Param, Span};

pub trait Spanned {
    fn span(&self) -> Span;
}

pub trait Named {
    fn name(&self) -> Name;
}

impl Named for FunctionSignature {
    fn name(&self) -> Name {
        self.name
    }
}

impl Named for ExternFunction {
    fn name(&self) -> Name {
        self.name
    }
}

impl Named for Param {
    fn name(&self) -> Name {
        self.name
    }
}

impl Spanned for Span {
    fn span(&self) -> Span {
        *self
    }
}
