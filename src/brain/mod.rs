use std::fs;
use std::path::Path;

use crate::{Error, Result};

mod neuron;
pub use neuron::*;
mod layer;
pub use layer::*;
mod topology;
pub use topology::*;
mod serialize;
pub use serialize::*;

/// File extension of a persisted brain.
pub const BRAIN_EXTENSION: &str = "crbn";

/// Layered feed-forward network, the brain of a critter.
///
/// The last hidden layer doubles as the output layer, so there is always at least one.
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    neurons: NeuronArena,
    input: Layer,
    hidden: Vec<Layer>,
}

impl NeuralNetwork {
    /// Builds a fully connected sigmoid network.
    ///
    /// `layer_sizes[0]` is the input size, the remaining entries are the hidden layers in order,
    /// the last one being the output layer.
    pub fn new(layer_sizes: &[usize], rng: &mut fastrand::Rng) -> Result<Self> {
        Self::with_activation(layer_sizes, ActivationFunction::Sigmoid, rng)
    }

    /// Same as [`NeuralNetwork::new`] with another activation function for every layer.
    pub fn with_activation(
        layer_sizes: &[usize],
        activation: ActivationFunction,
        rng: &mut fastrand::Rng,
    ) -> Result<Self> {
        validate_layer_sizes(layer_sizes)?;
        if !activation.is_valid() {
            return Err(Error::Configuration(format!(
                "invalid activation function `{activation}`"
            )));
        }

        let mut neurons = NeuronArena::new();
        let input = Layer::with_neurons(&mut neurons, activation, layer_sizes[0]);
        let mut hidden: Vec<Layer> = Vec::with_capacity(layer_sizes.len() - 1);

        for &size in &layer_sizes[1..] {
            let layer = Layer::with_neurons(&mut neurons, activation, size);
            hidden.last().unwrap_or(&input).connect(&layer, &mut neurons, rng);
            hidden.push(layer);
        }

        Ok(Self {
            neurons,
            input,
            hidden,
        })
    }

    /// A network with `extra_hidden` randomly sized hidden layers between the inputs and outputs,
    /// each holding between `min_per_layer` and `max_per_layer` neurons.
    pub fn random(
        inputs: usize,
        outputs: usize,
        extra_hidden: usize,
        min_per_layer: usize,
        max_per_layer: usize,
        rng: &mut fastrand::Rng,
    ) -> Result<Self> {
        Topology::new(inputs, outputs)
            .random_hidden_layers(extra_hidden, min_per_layer, max_per_layer)
            .build(rng)
    }

    /// Assembles a network from already wired parts.
    pub(crate) fn from_parts(neurons: NeuronArena, input: Layer, hidden: Vec<Layer>) -> Self {
        Self {
            neurons,
            input,
            hidden,
        }
    }

    pub fn input_layer(&self) -> &Layer {
        &self.input
    }

    /// Hidden layers in order, the output layer included.
    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Layer {
        self.hidden
            .last()
            .expect("construction and deserialization both guarantee an output layer")
    }

    /// Input layer followed by the hidden layers.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::once(&self.input).chain(self.hidden.iter())
    }

    pub fn neurons(&self) -> &NeuronArena {
        &self.neurons
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers().map(Layer::len).collect()
    }

    pub fn input_count(&self) -> usize {
        self.input.len()
    }

    pub fn output_count(&self) -> usize {
        self.output_layer().len()
    }

    pub fn connection_count(&self) -> usize {
        self.neurons
            .iter()
            .map(|(_, neuron)| neuron.connections().len())
            .sum()
    }

    /// Every connection weight, layer by layer.
    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.hidden
            .iter()
            .flat_map(|layer| layer.ids().iter())
            .flat_map(move |&id| self.neurons[id].connections().iter())
            .map(|connection| connection.weight)
    }

    /// Runs one forward pass. The input layer is left untouched when the length is wrong.
    pub fn feedforward(&mut self, inputs: &[f64]) -> Result<()> {
        if inputs.len() != self.input.len() {
            return Err(Error::ShapeMismatch {
                expected: self.input.len(),
                actual: inputs.len(),
            });
        }

        for (&id, &value) in self.input.ids().iter().zip(inputs) {
            self.neurons[id].set_output(value);
        }
        for layer in self.hidden.iter() {
            layer.feedforward(&mut self.neurons);
        }

        Ok(())
    }

    /// Snapshot of the output layer.
    pub fn output(&self) -> Vec<f64> {
        self.output_layer().outputs(&self.neurons)
    }

    /// `feedforward` followed by `output`.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        self.feedforward(inputs)?;
        Ok(self.output())
    }

    /// Perturbs the weights of every hidden and output neuron. See [`Neuron::mutate`].
    pub fn mutate(&mut self, intensity: f64, rng: &mut fastrand::Rng) {
        for layer in self.hidden.iter() {
            layer.mutate(&mut self.neurons, intensity, rng);
        }
    }

    /// A mutated copy, leaving `self` untouched.
    pub fn mutated(&self, intensity: f64, rng: &mut fastrand::Rng) -> Self {
        let mut new = self.clone();
        new.mutate(intensity, rng);
        new
    }

    pub fn serialize(&self) -> Result<String> {
        let file = NetworkFile::from_network(self);
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn deserialize(serialized: &str) -> Result<Self> {
        let file: NetworkFile = serde_json::from_str(serialized)
            .map_err(|err| Error::Deserialization(err.to_string()))?;
        file.into_network()
    }

    /// Writes the network to `path`, one network per file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.serialize()?)?;
        tracing::debug!(?path, "saved brain");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let network = Self::deserialize(&fs::read_to_string(path)?)?;
        tracing::debug!(?path, sizes = ?network.layer_sizes(), "loaded brain");
        Ok(network)
    }
}

pub(crate) fn validate_layer_sizes(layer_sizes: &[usize]) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(Error::Configuration(format!(
            "a network needs an input and an output layer, got {} layer sizes",
            layer_sizes.len()
        )));
    }
    if let Some(position) = layer_sizes.iter().position(|&size| size == 0) {
        return Err(Error::Configuration(format!("layer {position} has no neurons")));
    }
    Ok(())
}
