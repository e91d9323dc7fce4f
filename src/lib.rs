//! EG Prompt Builder: deterministic prompt assembly for image generation.
//!
//! Turns a roster of character attribute rows and reusable prompt-section
//! templates into finished main/negative prompts, locking per-character
//! identity (height, skin tone, hair, eyes) so group shots do not blend
//! characters together.

pub mod core;
pub mod io;
pub mod schema;
