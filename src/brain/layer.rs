use super::*;

/// An ordered group of neurons sharing one activation function.
///
/// The neurons themselves live in the network's [`NeuronArena`]; a layer only keeps their handles.
#[derive(Clone, Debug)]
pub struct Layer {
    activation: ActivationFunction,
    neurons: Vec<NeuronId>,
}

impl Layer {
    pub fn new(activation: ActivationFunction) -> Self {
        Self {
            activation,
            neurons: Vec::new(),
        }
    }

    /// A layer of `count` fresh neurons.
    pub fn with_neurons(
        arena: &mut NeuronArena,
        activation: ActivationFunction,
        count: usize,
    ) -> Self {
        let mut layer = Self::new(activation);
        (0..count).for_each(|_| {
            layer.add_neuron(arena);
        });
        layer
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    /// Creates a neuron in `arena` and appends it to this layer.
    pub fn add_neuron(&mut self, arena: &mut NeuronArena) -> NeuronId {
        let id = arena.push(Neuron::new(self.activation));
        self.neurons.push(id);
        id
    }

    pub fn get(&self, index: usize) -> Result<NeuronId> {
        self.neurons
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.neurons.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn ids(&self) -> &[NeuronId] {
        &self.neurons
    }

    /// Connects every neuron of this layer to every neuron of `target` with a random weight in `[-1, 1]`.
    ///
    /// Calling it twice for the same pair rewrites the weights.
    pub fn connect(&self, target: &Layer, arena: &mut NeuronArena, rng: &mut fastrand::Rng) {
        for &from in self.neurons.iter() {
            for &to in target.neurons.iter() {
                arena.connect(from, to, rng.f64() * 2.0 - 1.0);
            }
        }
    }

    /// Recalculates every neuron of the layer; upstream layers must already be up to date.
    pub fn feedforward(&self, arena: &mut NeuronArena) {
        self.neurons.iter().for_each(|&id| {
            arena.calculate(id);
        });
    }

    pub fn outputs(&self, arena: &NeuronArena) -> Vec<f64> {
        self.neurons.iter().map(|&id| arena[id].output()).collect()
    }

    pub(crate) fn mutate(&self, arena: &mut NeuronArena, intensity: f64, rng: &mut fastrand::Rng) {
        self.neurons
            .iter()
            .for_each(|&id| arena[id].mutate(intensity, rng));
    }
}
