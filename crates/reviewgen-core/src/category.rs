use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ReviewgenError;

/// The kind of review to ask the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    GeneralExperience,
    TechnicalSkills,
    Communication,
    Leadership,
    ProblemSolving,
}

impl Category {
    /// Every category, in picker order.
    pub const ALL: &[Category] = &[
        Category::GeneralExperience,
        Category::TechnicalSkills,
        Category::Communication,
        Category::Leadership,
        Category::ProblemSolving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GeneralExperience => "general_experience",
            Category::TechnicalSkills => "technical_skills",
            Category::Communication => "communication",
            Category::Leadership => "leadership",
            Category::ProblemSolving => "problem_solving",
        }
    }

    /// Label shown to users and embedded in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::GeneralExperience => "General Experience",
            Category::TechnicalSkills => "Technical Skills",
            Category::Communication => "Communication",
            Category::Leadership => "Leadership",
            Category::ProblemSolving => "Problem Solving",
        }
    }

    /// Accepts either the snake_case key or the display label, ignoring case.
    pub fn parse_str(s: &str) -> Option<Self> {
        let needle = s.trim();
        Category::ALL.iter().copied().find(|c| {
            c.as_str().eq_ignore_ascii_case(needle) || c.display_name().eq_ignore_ascii_case(needle)
        })
    }

    /// The category after this one, wrapping around.
    pub fn next(&self) -> Self {
        let idx = self.index();
        Category::ALL[(idx + 1) % Category::ALL.len()]
    }

    /// The category before this one, wrapping around.
    pub fn prev(&self) -> Self {
        let idx = self.index();
        Category::ALL[(idx + Category::ALL.len() - 1) % Category::ALL.len()]
    }

    pub fn index(&self) -> usize {
        Category::ALL
            .iter()
            .position(|c| c == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = ReviewgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse_str(s).ok_or_else(|| {
            let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
            ReviewgenError::InvalidInput(format!(
                "unknown category '{s}' (expected one of: {})",
                known.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_general_experience() {
        assert_eq!(Category::default(), Category::GeneralExperience);
    }

    #[test]
    fn parse_accepts_key_and_label() {
        assert_eq!(
            Category::parse_str("technical_skills"),
            Some(Category::TechnicalSkills)
        );
        assert_eq!(
            Category::parse_str("Problem Solving"),
            Some(Category::ProblemSolving)
        );
        assert_eq!(Category::parse_str("  LEADERSHIP "), Some(Category::Leadership));
        assert_eq!(Category::parse_str("cooking"), None);
    }

    #[test]
    fn from_str_reports_known_keys() {
        let err = "cooking".parse::<Category>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cooking"));
        assert!(msg.contains("general_experience"));
    }

    #[test]
    fn as_str_round_trips() {
        for c in Category::ALL {
            assert_eq!(Category::parse_str(c.as_str()), Some(*c));
            assert_eq!(Category::parse_str(c.display_name()), Some(*c));
        }
    }

    #[test]
    fn next_and_prev_wrap() {
        assert_eq!(Category::ProblemSolving.next(), Category::GeneralExperience);
        assert_eq!(Category::GeneralExperience.prev(), Category::ProblemSolving);
        assert_eq!(Category::Communication.next(), Category::Leadership);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::TechnicalSkills).unwrap();
        assert_eq!(json, "\"technical_skills\"");
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Category::Communication.to_string(), "Communication");
    }
}
