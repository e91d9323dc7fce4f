//! File-facing collaborators: CSV sources in, prompt files and summaries out.

pub mod output;
pub mod source;
