//! Assembly pipeline: derivation, resolution, binding, assembly, rendering.

pub mod assembler;
pub mod binder;
pub mod derive;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod tables;
