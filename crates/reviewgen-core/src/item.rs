use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Category;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Process-local random identifier for a generated item.
///
/// Nine lowercase base-36 characters. Uniqueness is only guaranteed against
/// the ids passed to [`ItemId::random_excluding`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let id: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    /// Draw random ids until one is not already taken.
    pub fn random_excluding<F>(taken: F) -> Self
    where
        F: Fn(&ItemId) -> bool,
    {
        loop {
            let id = Self::random();
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Star rating on a 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(5);

    /// Clamp into the valid range.
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn stars(&self) -> String {
        "★".repeat(self.0 as usize)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::MAX
    }
}

/// One review extracted from a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub id: ItemId,
    pub text: String,
    pub category: Category,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

impl GeneratedItem {
    /// Build an item with the maximal rating. `text` is trimmed.
    pub fn new(id: ItemId, text: &str, category: Category, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text: text.trim().to_string(),
            category,
            rating: Rating::MAX,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_id_shape() {
        for _ in 0..50 {
            let id = ItemId::random();
            assert_eq!(id.as_str().len(), 9);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn random_excluding_skips_taken() {
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let id = ItemId::random_excluding(|candidate| seen.contains(candidate));
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn rating_clamps() {
        assert_eq!(Rating::new(0), Rating::MIN);
        assert_eq!(Rating::new(9), Rating::MAX);
        assert_eq!(Rating::new(3).value(), 3);
    }

    #[test]
    fn rating_stars() {
        assert_eq!(Rating::MAX.stars().chars().count(), 5);
    }

    #[test]
    fn new_item_is_trimmed_and_maximal() {
        let item = GeneratedItem::new(
            ItemId::from("abc123xyz"),
            "  Great to work with.  \n",
            Category::Leadership,
            Utc::now(),
        );
        assert_eq!(item.text, "Great to work with.");
        assert_eq!(item.rating, Rating::MAX);
        assert_eq!(item.category, Category::Leadership);
    }

    #[test]
    fn item_serializes_flat_id() {
        let item = GeneratedItem::new(
            ItemId::from("abc123xyz"),
            "ok",
            Category::Communication,
            Utc::now(),
        );
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], "abc123xyz");
        assert_eq!(value["rating"], 5);
        assert_eq!(value["category"], "communication");
    }
}
