use thiserror::Error;

use super::character::CharacterRecord;

/// Smallest group the assembler will format.
pub const MIN_GROUP_SIZE: usize = 2;

/// Most random groups a single run may request.
pub const MAX_RANDOM_GROUPS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group needs at least 2 distinct characters, got {} ({})", .members.len(), .members.join(", "))]
    Insufficient { members: Vec<String> },
    #[error("random group size {requested} exceeds roster size {available}")]
    Capacity { requested: usize, available: usize },
    #[error("random group size {0} is below the minimum of 2")]
    InvalidSize(usize),
    #[error("random group count {0} is outside 1..=5000")]
    InvalidCount(usize),
}

/// An ordered, duplicate-free set of at least two characters.
///
/// Iteration order is the order the caller supplied; it is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSelection<'a> {
    members: Vec<&'a CharacterRecord>,
}

impl<'a> GroupSelection<'a> {
    /// Build a group, silently dropping repeat members (case-insensitive
    /// name match, first occurrence wins).
    pub fn new<I>(candidates: I) -> Result<Self, GroupError>
    where
        I: IntoIterator<Item = &'a CharacterRecord>,
    {
        let mut members: Vec<&'a CharacterRecord> = Vec::new();
        for record in candidates {
            if !members.iter().any(|m| m.same_identity(record)) {
                members.push(record);
            }
        }

        if members.len() < MIN_GROUP_SIZE {
            return Err(GroupError::Insufficient {
                members: members.iter().map(|m| m.name.clone()).collect(),
            });
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[&'a CharacterRecord] {
        &self.members
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a selection holds at least two members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::{AgeGroup, AppearanceBlocks, Gender};

    fn record(name: &str) -> CharacterRecord {
        CharacterRecord {
            name: name.to_string(),
            age_group: AgeGroup::Teen,
            gender: Gender::Female,
            eye_color: "blue".to_string(),
            skin_tone: "light pastel skin".to_string(),
            body_type: "slim build".to_string(),
            blocks: AppearanceBlocks::default(),
        }
    }

    #[test]
    fn keeps_caller_order() {
        let a = record("Sunset Shimmer");
        let b = record("Applejack");
        let c = record("Rarity");
        let group = GroupSelection::new([&a, &b, &c]).unwrap();
        assert_eq!(group.names(), vec!["Sunset Shimmer", "Applejack", "Rarity"]);
    }

    #[test]
    fn drops_case_insensitive_duplicates() {
        let a = record("Rarity");
        let a_lower = record("rarity");
        let b = record("Applejack");
        let group = GroupSelection::new([&a, &a_lower, &b]).unwrap();
        assert_eq!(group.names(), vec!["Rarity", "Applejack"]);
    }

    #[test]
    fn rejects_single_member_after_dedup() {
        let a = record("Rarity");
        let err = GroupSelection::new([&a, &a]).unwrap_err();
        assert_eq!(
            err,
            GroupError::Insufficient {
                members: vec!["Rarity".to_string()]
            }
        );
        assert!(err.to_string().contains("Rarity"));
    }
}
