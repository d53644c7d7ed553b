use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

use crate::error::{AppError, AppResult};

/// Constraints a mood expands to before filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoodRule {
    /// A movie must carry at least one of these genres
    #[serde(default)]
    pub genres: Vec<String>,
    /// A movie must carry none of these genres
    #[serde(default)]
    pub exclude_genres: Vec<String>,
    #[serde(default)]
    pub rating_min: Option<f64>,
    /// Minutes
    #[serde(default)]
    pub runtime_max: Option<u32>,
}

/// Mood name to rule table, read once at startup
#[derive(Debug, Clone, Default)]
pub struct MoodMappings {
    rules: HashMap<String, MoodRule>,
}

#[derive(Debug, Deserialize)]
struct MoodDocument {
    #[serde(default)]
    mood_mappings: HashMap<String, MoodRule>,
}

impl MoodMappings {
    pub fn new(rules: HashMap<String, MoodRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|(name, rule)| (name.trim().to_lowercase(), rule))
                .collect(),
        }
    }

    /// Parses a YAML document with a top-level `mood_mappings` table
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: MoodDocument = serde_yml::from_str(yaml)
            .map_err(|e| anyhow::anyhow!("Invalid mood mapping document: {}", e))?;
        Ok(Self::new(document.mood_mappings))
    }

    /// Loads the mood file; a missing file yields an empty table
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let mappings = Self::from_yaml(&contents)?;
                tracing::info!(
                    path = %path.display(),
                    moods = mappings.len(),
                    "Loaded mood mappings"
                );
                Ok(mappings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Mood mapping file not found, moods disabled");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read mood mappings from {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Looks up a mood by name, case-insensitively
    pub fn resolve(&self, mood: &str) -> AppResult<&MoodRule> {
        self.rules
            .get(&mood.trim().to_lowercase())
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown mood: {}", mood)))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
