//! Data types shared by the loaders and the assembly pipeline.

pub mod character;
pub mod group;
pub mod mode;
pub mod prompt;
pub mod template;
