use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::brain::{validate_layer_sizes, DEFAULT_MUTATION_INTENSITY};
use crate::{Error, Result};

/// Knobs of a training round. Every field falls back to its default when missing from the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Input size, hidden layer sizes, output size.
    pub layer_sizes: Vec<usize>,
    /// The number of students per generation.
    pub students: usize,
    /// Intensity used when spawning students from the best brain.
    pub mutation_intensity: f64,
    /// "A little bit of variance" applied to a brain loaded from disk.
    pub load_variance: f64,
    /// Seed of the random number generator, entropy when unset.
    pub seed: Option<u64>,
    /// Where best brains are stored.
    pub brain_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layer_sizes: vec![8, 6, 4],
            students: 10,
            mutation_intensity: DEFAULT_MUTATION_INTENSITY,
            load_variance: DEFAULT_MUTATION_INTENSITY,
            seed: None,
            brain_dir: PathBuf::from("brains"),
        }
    }
}

impl Config {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)
            .map_err(|err| Error::Configuration(format!("{path:?}: {err}")))?;
        config.validate()?;

        tracing::info!(?path, ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_layer_sizes(&self.layer_sizes)?;
        if self.students == 0 {
            return Err(Error::Configuration("a generation needs at least one student".into()));
        }
        for (name, value) in [
            ("mutation_intensity", self.mutation_intensity),
            ("load_variance", self.load_variance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Configuration(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Seeded generator when `seed` is set.
    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{ "students": 3, "seed": 5 }"#).unwrap();
        assert_eq!(config.students, 3);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.layer_sizes, Config::default().layer_sizes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            Config {
                layer_sizes: vec![4],
                ..Config::default()
            },
            Config {
                layer_sizes: vec![4, 0, 2],
                ..Config::default()
            },
            Config {
                students: 0,
                ..Config::default()
            },
            Config {
                mutation_intensity: -1.0,
                ..Config::default()
            },
            Config {
                load_variance: f64::NAN,
                ..Config::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::Configuration(_))));
        }
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = Config {
            seed: Some(99),
            ..Config::default()
        };
        assert_eq!(config.rng().u64(..), config.rng().u64(..));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "studnets": 3 }"#).is_err());
    }
}
