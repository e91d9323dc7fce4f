//! Template binding: placeholder substitution in template section content.

use serde::{Deserialize, Serialize};

use crate::schema::character::CharacterRecord;

/// Bracketed tokens the binder understands. Matching is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    CharacterName,
    Hair,
    Casual,
    Pajamas,
    Camp,
    Band,
    Formal,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Self::CharacterName,
        Self::Hair,
        Self::Casual,
        Self::Pajamas,
        Self::Camp,
        Self::Band,
        Self::Formal,
    ];

    /// The literal token, including brackets.
    pub fn token(&self) -> &'static str {
        match self {
            Self::CharacterName => "[CHARACTER NAME]",
            Self::Hair => "[PASTE HAIR BLOCK HERE]",
            Self::Casual => "[PASTE CASUAL OUTFIT BLOCK HERE]",
            Self::Pajamas => "[PASTE PAJAMAS BLOCK HERE]",
            Self::Camp => "[PASTE CAMP EVERFREE OUTFIT BLOCK HERE]",
            Self::Band => "[PASTE RAINBOOMS BAND OUTFIT BLOCK HERE]",
            Self::Formal => "[PASTE FORMAL OUTFIT BLOCK HERE]",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }

    fn value_for<'r>(&self, record: &'r CharacterRecord) -> &'r str {
        let blocks = &record.blocks;
        match self {
            Self::CharacterName => &record.name,
            Self::Hair => &blocks.hair,
            Self::Casual => &blocks.casual,
            Self::Pajamas => &blocks.pajamas,
            Self::Camp => &blocks.camp,
            Self::Band => &blocks.band,
            Self::Formal => &blocks.formal,
        }
    }
}

/// A segment of parsed template content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Text emitted as-is, including any unrecognized bracketed tokens.
    Literal(String),
    Placeholder(Placeholder),
}

/// Template content split into literals and recognized placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundTemplate {
    pub segments: Vec<Segment>,
}

/// What placeholders are filled from.
#[derive(Debug, Clone, Copy)]
pub enum BindTarget<'a> {
    Single(&'a CharacterRecord),
    /// Group content only names the members; every other per-character
    /// placeholder binds to an empty string.
    Group { names: &'a str },
}

impl BoundTemplate {
    /// Split `content` into segments. Never fails: an unknown token or an
    /// unclosed `[` stays literal text.
    pub fn parse(content: &str) -> BoundTemplate {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = content;

        while let Some(open) = rest.find('[') {
            literal.push_str(&rest[..open]);
            let tail = &rest[open..];
            let Some(close) = tail.find(']') else {
                literal.push_str(tail);
                rest = "";
                break;
            };

            let token = &tail[..=close];
            match Placeholder::from_token(token) {
                Some(placeholder) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                    rest = &tail[close + 1..];
                }
                None => {
                    // Emit the '[' and rescan after it so a real token nested
                    // behind a stray bracket is still found.
                    literal.push('[');
                    rest = &tail[1..];
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        BoundTemplate { segments }
    }

    pub fn render(&self, target: BindTarget<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(p) => match target {
                    BindTarget::Single(record) => out.push_str(p.value_for(record)),
                    BindTarget::Group { names } => {
                        if *p == Placeholder::CharacterName {
                            out.push_str(names);
                        }
                    }
                },
            }
        }
        out
    }
}

/// Parse and fill one section's content in a single step.
pub fn bind(content: &str, target: BindTarget<'_>) -> String {
    BoundTemplate::parse(content).render(target)
}

/// Human-readable member list used for the group name placeholder.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
