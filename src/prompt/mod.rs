//! Prompt construction for the language model.

pub mod builder;

pub use builder::*;
