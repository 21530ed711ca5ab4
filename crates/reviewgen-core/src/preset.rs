use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ReviewgenError;

/// A named sample text that can be selected instead of typing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub text: String,
}

impl Preset {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Parse a JSON array of `{"name", "text"}` objects.
    pub fn parse_list(json: &str) -> Result<Vec<Preset>, ReviewgenError> {
        let presets: Vec<Preset> = serde_json::from_str(json)
            .map_err(|e| ReviewgenError::Config(format!("invalid presets: {e}")))?;
        if let Some(blank) = presets.iter().find(|p| p.name.trim().is_empty()) {
            return Err(ReviewgenError::Config(format!(
                "preset with empty name (text: {:?})",
                blank.text
            )));
        }
        Ok(presets)
    }

    pub fn load_file(path: &Path) -> Result<Vec<Preset>, ReviewgenError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReviewgenError::Config(format!("read presets {}: {e}", path.display()))
        })?;
        Self::parse_list(&json)
    }

    /// Find a preset by name, ignoring case.
    pub fn find<'a>(presets: &'a [Preset], name: &str) -> Result<&'a Preset, ReviewgenError> {
        presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ReviewgenError::NotFound(format!("preset '{name}'")))
    }
}
