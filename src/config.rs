//! Analysis configuration: significance threshold and the movie lists the
//! explicit and franchise comparisons are built from.
//!
//! Every field has a default, so a config file only needs the keys it
//! overrides:
//!
//! ```json
//! { "alpha": 0.01, "franchises": [{ "name": "Toy Story", "titles": ["Toy Story (1995)", "Toy Story 2 (1999)"] }] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::verdict::DEFAULT_ALPHA;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("alpha must lie strictly between 0 and 1, got {0}")]
    InvalidAlpha(f64),
}

/// An ordered series of titles. The first present title is compared
/// against all later present titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Franchise {
    pub name: String,
    pub titles: Vec<String>,
}

impl Franchise {
    pub fn new<S: Into<String>>(name: &str, titles: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.to_string(),
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Reject H0 iff p < alpha.
    pub alpha: f64,
    /// Movie tested against `comparison_movies`.
    pub target_movie: String,
    pub comparison_movies: Vec<String>,
    pub franchises: Vec<Franchise>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            target_movie: "Shrek (2001)".to_string(),
            comparison_movies: vec![
                "Finding Nemo (2003)".to_string(),
                "The Incredibles (2004)".to_string(),
                "Pirates of the Caribbean: The Curse of the Black Pearl (2003)".to_string(),
            ],
            franchises: default_franchises(),
        }
    }
}

pub fn default_franchises() -> Vec<Franchise> {
    vec![
        Franchise::new(
            "Star Wars",
            [
                "Star Wars: Episode IV - A New Hope (1977)",
                "Star Wars: Episode V - The Empire Strikes Back (1980)",
                "Star Wars: Episode VI - Return of the Jedi (1983)",
            ],
        ),
        Franchise::new(
            "Harry Potter",
            [
                "Harry Potter and the Sorcerer's Stone (2001)",
                "Harry Potter and the Chamber of Secrets (2002)",
            ],
        ),
        Franchise::new("Matrix", ["The Matrix (1999)", "The Matrix Reloaded (2003)"]),
        Franchise::new(
            "Indiana Jones",
            [
                "Raiders of the Lost Ark (1981)",
                "Indiana Jones and the Last Crusade (1989)",
            ],
        ),
        Franchise::new(
            "Jurassic Park",
            ["Jurassic Park (1993)", "The Lost World: Jurassic Park (1997)"],
        ),
    ]
}

impl AnalysisConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Result<Self, ConfigError> {
        self.alpha = alpha;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}
