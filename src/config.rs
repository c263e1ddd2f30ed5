//! Session configuration, read from TOML.
//!
//! Every section has defaults, so an empty file (or no file) reproduces the
//! W(3) study: the 40-point symplectic quadrangle, codes and cohomology over
//! GF(2) and GF(3), and a search against E8 at |⟨α,β⟩| = 1.

use crate::correspond::{SearchOptions, SpectrumPolicy};
use crate::field::SUPPORTED_ORDERS;
use crate::graph::DEFAULT_TOLERANCE;
use crate::group::SearchBudget;
use crate::roots::InnerProductRule;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML in {path}: {source}")]
    TomlError {
        path: Utf8PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to write TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// W(q); `order` is q.
    Symplectic,
    /// Q(4,q); `order` is q.
    Parabolic,
    /// GQ(s,1); `order` is s.
    Grid,
    /// GQ(1,t); `order` is t.
    DualGrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub family: Family,
    pub order: u32,
    /// Alternating Gram matrix for a non-standard W(q), as raw field values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gram: Option<Vec<Vec<u32>>>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            family: Family::Symplectic,
            order: 3,
            gram: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    pub tolerance: f64,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomorphismConfig {
    pub max_nodes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_millis: Option<u64>,
    /// Largest group the generator closure may enumerate.
    pub closure_limit: usize,
}

impl Default for AutomorphismConfig {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            max_millis: None,
            closure_limit: 200_000,
        }
    }
}

impl AutomorphismConfig {
    pub fn budget(&self) -> SearchBudget {
        SearchBudget {
            max_nodes: self.max_nodes,
            max_duration: self.max_millis.map(Duration::from_millis),
        }
    }
}

/// A claimed minimum weight, checked against the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightClaim {
    pub field: u32,
    pub weight: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeConfig {
    pub fields: Vec<u32>,
    /// Largest number of codewords a weight enumeration may visit.
    pub enumeration_budget: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<WeightClaim>,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            fields: vec![2, 3],
            enumeration_budget: 1 << 25,
            claims: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohomologyConfig {
    /// The first two are compared; they must differ.
    pub fields: Vec<u32>,
    pub max_dimension: usize,
}

impl Default for CohomologyConfig {
    fn default() -> Self {
        Self {
            fields: vec![2, 3],
            max_dimension: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootTarget {
    /// `A3`, `D4`, `E8`, ...
    pub system: String,
    pub rule: InnerProductRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enabled: bool,
    /// Worker threads for parallel stages; 0 lets rayon decide.
    pub threads: usize,
    pub max_subsets: u64,
    pub spectrum: SpectrumPolicy,
    pub targets: Vec<RootTarget>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threads: 0,
            max_subsets: SearchOptions::default().max_subsets,
            spectrum: SpectrumPolicy::Always,
            targets: vec![RootTarget {
                system: "E8".into(),
                rule: InnerProductRule::Abs(1),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: Utf8PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: Utf8PathBuf::from(crate::cache::CACHE_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub geometry: GeometryConfig,
    pub spectrum: SpectrumConfig,
    pub automorphism: AutomorphismConfig,
    pub code: CodeConfig,
    pub cohomology: CohomologyConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

impl SessionConfig {
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_owned(),
            source: e,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::TomlError {
            path: path.to_owned(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_subsets: self.search.max_subsets,
            spectrum: self.search.spectrum,
            tolerance: self.spectrum.tolerance,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let supported = |field: &'static str, q: u32| {
            if SUPPORTED_ORDERS.contains(&q) {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("GF({q}) is not supported"),
                })
            }
        };
        match self.geometry.family {
            Family::Symplectic | Family::Parabolic => supported("geometry.order", self.geometry.order)?,
            Family::Grid | Family::DualGrid if self.geometry.order == 0 => {
                return Err(ConfigError::Invalid {
                    field: "geometry.order",
                    reason: "grids need order at least 1".into(),
                });
            }
            _ => {}
        }
        if self.geometry.gram.is_some() && self.geometry.family != Family::Symplectic {
            return Err(ConfigError::Invalid {
                field: "geometry.gram",
                reason: "only symplectic geometries take a Gram matrix".into(),
            });
        }
        if self.spectrum.tolerance.is_nan() || self.spectrum.tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "spectrum.tolerance",
                reason: format!("{} is not positive", self.spectrum.tolerance),
            });
        }
        for &q in &self.code.fields {
            supported("code.fields", q)?;
        }
        for claim in &self.code.claims {
            if !self.code.fields.contains(&claim.field) {
                return Err(ConfigError::Invalid {
                    field: "code.claims",
                    reason: format!("GF({}) is not listed in code.fields", claim.field),
                });
            }
        }
        match self.cohomology.fields.as_slice() {
            [a, b, ..] if a != b => {
                for &q in &self.cohomology.fields {
                    supported("cohomology.fields", q)?;
                }
            }
            _ => {
                return Err(ConfigError::Invalid {
                    field: "cohomology.fields",
                    reason: "need two distinct fields to cross-check".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.geometry.family, Family::Symplectic);
        assert_eq!(config.geometry.order, 3);
        assert_eq!(config.search.targets[0].rule, InnerProductRule::Abs(1));
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [geometry]
            family = "grid"
            order = 2

            [automorphism]
            max_nodes = 500
            max_millis = 2000

            [[code.claims]]
            field = 2
            weight = 6
            count = 240

            [[search.targets]]
            system = "D4"
            rule = { any_of = [1, -1] }
            "#,
        )
        .unwrap();
        assert_eq!(config.geometry.family, Family::Grid);
        assert_eq!(config.automorphism.budget().max_duration, Some(Duration::from_secs(2)));
        assert_eq!(config.code.fields, vec![2, 3]);
        assert_eq!(config.code.claims[0].count, Some(240));
        assert_eq!(config.search.targets.len(), 1);
        assert_eq!(config.search.targets[0].rule, InnerProductRule::AnyOf(vec![1, -1]));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            "[geometry]\norder = 6",
            "[spectrum]\ntolerance = 0.0",
            "[cohomology]\nfields = [2, 2]",
            "[code]\nfields = [8]",
            "[geometry]\nfamily = \"grid\"\ngram = [[0]]",
        ];
        for toml in bad {
            assert!(
                matches!(SessionConfig::from_toml_str(toml), Err(ConfigError::Invalid { .. })),
                "{toml}"
            );
        }
        assert!(matches!(
            SessionConfig::from_toml_str("[geometry]\nfamily = \"hexagon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SessionConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(SessionConfig::from_toml_str(&text).unwrap(), config);
    }
}
