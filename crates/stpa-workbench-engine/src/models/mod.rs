pub mod aspect;
pub mod spec_model;

pub use aspect::AspectKind;
pub use spec_model::{Element, Reference, SpecModel};
