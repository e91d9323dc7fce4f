use serde::{Deserialize, Serialize};

/// Kind tag used when a template's origin matches no known keyword.
pub const DEFAULT_KIND: &str = "default";

/// One `(section, content)` row of a template source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSection {
    pub name: String,
    /// Free text, possibly containing bracketed placeholder tokens.
    pub content: String,
}

impl TemplateSection {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An ordered set of template sections loaded from one source.
///
/// `kind` is inferred from the source name (see `Tables::infer_kind`) and
/// drives automatic pose/outfit selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePack {
    pub origin: String,
    pub kind: String,
    pub sections: Vec<TemplateSection>,
}

impl TemplatePack {
    pub fn new(origin: impl Into<String>, kind: impl Into<String>, sections: Vec<TemplateSection>) -> Self {
        Self {
            origin: origin.into(),
            kind: kind.into(),
            sections,
        }
    }
}
