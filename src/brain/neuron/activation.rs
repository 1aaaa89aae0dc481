use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{functions, Error};

/// Activation function shared by every neuron of a layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationFunction {
    Constant,
    Identity,
    Step { threshold: f64 },
    #[default]
    Sigmoid,
    Tanh,
}

type Constructor = fn(Option<f64>) -> Result<ActivationFunction, Error>;

/// Name -> constructor table, the only place activation names are resolved.
static REGISTRY: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut registry: HashMap<&'static str, Constructor> = HashMap::new();
    registry.insert("constant", |param| no_param("constant", param, ActivationFunction::Constant));
    registry.insert("identity", |param| no_param("identity", param, ActivationFunction::Identity));
    registry.insert("sigmoid", |param| no_param("sigmoid", param, ActivationFunction::Sigmoid));
    registry.insert("tanh", |param| no_param("tanh", param, ActivationFunction::Tanh));
    registry.insert("step", |param| {
        Ok(ActivationFunction::Step {
            threshold: param.unwrap_or(0.0),
        })
    });
    registry
});

fn no_param(
    name: &str,
    param: Option<f64>,
    function: ActivationFunction,
) -> Result<ActivationFunction, Error> {
    match param {
        None => Ok(function),
        Some(_) => Err(Error::Configuration(format!(
            "activation `{name}` takes no parameter"
        ))),
    }
}

impl ActivationFunction {
    /// A step function with the default threshold of 0.
    pub const fn step() -> Self {
        Self::Step { threshold: 0.0 }
    }

    pub fn calculate(&self, weighted_sum: f64) -> f64 {
        match self {
            Self::Constant => functions::constant(weighted_sum),
            Self::Identity => functions::identity(weighted_sum),
            Self::Step { threshold } => functions::step(weighted_sum, *threshold),
            Self::Sigmoid => functions::sigmoid(weighted_sum),
            Self::Tanh => functions::tanh(weighted_sum),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Identity => "identity",
            Self::Step { .. } => "step",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        match self {
            Self::Step { threshold } => threshold.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step { threshold } => write!(f, "step:{threshold}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Parses `name` or `name:param`, e.g. `sigmoid` or `step:0.25`.
impl FromStr for ActivationFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => {
                let param = param.trim().parse::<f64>().map_err(|err| {
                    Error::Configuration(format!("bad activation parameter `{param}`: {err}"))
                })?;
                (name, Some(param))
            }
            None => (s, None),
        };
        let name = name.trim().to_ascii_lowercase();

        let constructor = REGISTRY
            .get(name.as_str())
            .ok_or_else(|| Error::Configuration(format!("unknown activation function `{name}`")))?;
        let function = constructor(param)?;
        if !function.is_valid() {
            return Err(Error::Configuration(format!("invalid activation `{s}`")));
        }
        Ok(function)
    }
}
