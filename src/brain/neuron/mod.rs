use std::ops::{Index, IndexMut};

use smallvec::SmallVec;

mod activation;
pub use activation::*;

/// Intensity used when the caller has no preference.
pub const DEFAULT_MUTATION_INTENSITY: f64 = 1.0;

/// Handle of a neuron inside its network's [`NeuronArena`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NeuronId(pub(crate) usize);

impl NeuronId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Incoming weighted edge; the weight lives on the receiving neuron.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    pub source: NeuronId,
    pub weight: f64,
}

/// A neuron
#[derive(Clone, Debug)]
pub struct Neuron {
    output: f64,
    activation: ActivationFunction,
    /// Incoming connections, in registration order
    connections: SmallVec<[Connection; 8]>,
    destroyed: bool,
}

impl Neuron {
    pub fn new(activation: ActivationFunction) -> Self {
        Self {
            output: 0.0,
            activation,
            connections: SmallVec::new(),
            destroyed: false,
        }
    }

    /// The last calculated, or directly assigned, output.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Assigns the output directly, the way input neurons receive their values.
    pub fn set_output(&mut self, output: f64) {
        self.output = output;
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Weight of the connection coming from `source`, if any.
    pub fn weight(&self, source: NeuronId) -> Option<f64> {
        self.connections
            .iter()
            .find(|connection| connection.source == source)
            .map(|connection| connection.weight)
    }

    /// Registers an incoming connection, overwriting the weight of an existing one from the same source.
    pub fn add_connection(&mut self, source: NeuronId, weight: f64) {
        match self
            .connections
            .iter_mut()
            .find(|connection| connection.source == source)
        {
            Some(connection) => connection.weight = weight,
            None => self.connections.push(Connection { source, weight }),
        }
    }

    /// Drops every incoming connection.
    pub fn disconnect(&mut self) {
        self.connections.clear();
    }

    /// Sum of `source output * weight` over the incoming connections.
    pub fn weighted_sum(&self, arena: &NeuronArena) -> f64 {
        self.connections
            .iter()
            .map(|connection| arena[connection.source].output * connection.weight)
            .sum()
    }

    /// Nudges every weight by a uniform draw from `[-intensity / 10, intensity / 10]`, clamped to `[-1, 1]`.
    ///
    /// A non-finite intensity leaves the weights untouched.
    pub fn mutate(&mut self, intensity: f64, rng: &mut fastrand::Rng) {
        if !intensity.is_finite() {
            return;
        }
        let spread = intensity.abs() / 10.0;

        self.connections.iter_mut().for_each(|connection| {
            let delta = (rng.f64() * 2.0 - 1.0) * spread;
            connection.weight = (connection.weight + delta).clamp(-1.0, 1.0);
        });
    }

    /// Logical deletion; the neuron stays in its arena and layer.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Owns every neuron of a network; layers and connections refer to them by [`NeuronId`].
#[derive(Clone, Debug, Default)]
pub struct NeuronArena {
    neurons: Vec<Neuron>,
}

impl NeuronArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, neuron: Neuron) -> NeuronId {
        self.neurons.push(neuron);
        NeuronId(self.neurons.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeuronId, &Neuron)> {
        self.neurons
            .iter()
            .enumerate()
            .map(|(index, neuron)| (NeuronId(index), neuron))
    }

    /// Makes `from` feed into `to`.
    pub fn connect(&mut self, from: NeuronId, to: NeuronId, weight: f64) {
        self[to].add_connection(from, weight);
    }

    /// Recomputes the output of `id` from its incoming connections and returns it.
    pub fn calculate(&mut self, id: NeuronId) -> f64 {
        let neuron = &self[id];
        let output = neuron.activation.calculate(neuron.weighted_sum(self));
        self[id].output = output;
        output
    }

    /// Removes connections coming from destroyed neurons.
    pub fn clean(&mut self) {
        let destroyed: Vec<bool> = self.neurons.iter().map(|neuron| neuron.destroyed).collect();
        self.neurons.iter_mut().for_each(|neuron| {
            neuron
                .connections
                .retain(|connection| !destroyed[connection.source.0]);
        });
    }
}

impl Index<NeuronId> for NeuronArena {
    type Output = Neuron;

    fn index(&self, id: NeuronId) -> &Neuron {
        &self.neurons[id.0]
    }
}

impl IndexMut<NeuronId> for NeuronArena {
    fn index_mut(&mut self, id: NeuronId) -> &mut Neuron {
        &mut self.neurons[id.0]
    }
}
