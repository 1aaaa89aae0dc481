use super::*;

/// Bounds of a randomly sized hidden layer, inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomLayer {
    pub min: usize,
    pub max: usize,
}

/// Layer size plan for a network: explicit hidden layers first, then randomly sized ones.
///
/// ```
/// use critter_brain::Topology;
///
/// let mut rng = fastrand::Rng::with_seed(1);
/// let network = Topology::new(8, 4)
///     .hidden(6)
///     .random_hidden(2, 5)
///     .build(&mut rng)
///     .unwrap();
///
/// assert_eq!(network.hidden_layers().len(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Topology {
    inputs: usize,
    outputs: usize,
    hidden: Vec<usize>,
    random_hidden: Vec<RandomLayer>,
    activation: ActivationFunction,
}

impl Topology {
    pub fn new(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs,
            outputs,
            hidden: Vec::new(),
            random_hidden: Vec::new(),
            activation: ActivationFunction::Sigmoid,
        }
    }

    /// Adds a hidden layer of exactly `neurons` neurons.
    pub fn hidden(mut self, neurons: usize) -> Self {
        self.hidden.push(neurons);
        self
    }

    /// Adds a hidden layer holding between `min` and `max` neurons, drawn at build time.
    pub fn random_hidden(mut self, min: usize, max: usize) -> Self {
        self.random_hidden.push(RandomLayer { min, max });
        self
    }

    /// Adds `count` layers like [`Topology::random_hidden`].
    pub fn random_hidden_layers(mut self, count: usize, min: usize, max: usize) -> Self {
        self.random_hidden
            .extend(std::iter::repeat(RandomLayer { min, max }).take(count));
        self
    }

    pub fn activation(mut self, activation: ActivationFunction) -> Self {
        self.activation = activation;
        self
    }

    /// Draws the random layer sizes: `[inputs, hidden.., random.., outputs]`.
    pub fn resolve(&self, rng: &mut fastrand::Rng) -> Result<Vec<usize>> {
        let mut sizes = Vec::with_capacity(self.hidden.len() + self.random_hidden.len() + 2);
        sizes.push(self.inputs);
        sizes.extend_from_slice(&self.hidden);

        for RandomLayer { min, max } in self.random_hidden.iter().copied() {
            if min == 0 || min > max {
                return Err(Error::Configuration(format!(
                    "random hidden layer bounds must satisfy 1 <= min <= max, got {min}..={max}"
                )));
            }
            sizes.push(rng.usize(min..=max));
        }

        sizes.push(self.outputs);
        validate_layer_sizes(&sizes)?;
        Ok(sizes)
    }

    pub fn build(&self, rng: &mut fastrand::Rng) -> Result<NeuralNetwork> {
        let sizes = self.resolve(rng)?;
        NeuralNetwork::with_activation(&sizes, self.activation, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_layers_come_before_random_ones() {
        let mut rng = fastrand::Rng::with_seed(17);
        for _ in 0..50 {
            let sizes = Topology::new(6, 2)
                .hidden(5)
                .random_hidden_layers(3, 2, 4)
                .resolve(&mut rng)
                .unwrap();
            assert_eq!(sizes.len(), 6);
            assert_eq!(sizes[0], 6);
            assert_eq!(sizes[1], 5);
            assert!(sizes[2..5].iter().all(|&size| (2..=4).contains(&size)));
            assert_eq!(sizes[5], 2);
        }
    }

    #[test]
    fn equal_bounds_give_fixed_size() {
        let mut rng = fastrand::Rng::with_seed(1);
        let sizes = Topology::new(1, 1).random_hidden(3, 3).resolve(&mut rng).unwrap();
        assert_eq!(sizes, vec![1, 3, 1]);
    }

    #[test]
    fn random_constructor_matches_topology() {
        let mut rng = fastrand::Rng::with_seed(23);
        let network = NeuralNetwork::random(4, 2, 2, 1, 6, &mut rng).unwrap();
        let sizes = network.layer_sizes();

        assert_eq!(sizes.len(), 4);
        assert_eq!((sizes[0], sizes[3]), (4, 2));
        assert!(sizes[1..3].iter().all(|&size| (1..=6).contains(&size)));
    }

    #[test]
    fn rejects_bad_bounds() {
        let mut rng = fastrand::Rng::with_seed(2);
        assert!(matches!(
            Topology::new(2, 2).random_hidden(5, 4).build(&mut rng),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Topology::new(2, 2).random_hidden(0, 4).build(&mut rng),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Topology::new(0, 2).build(&mut rng),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn activation_is_applied_to_every_layer() {
        let mut rng = fastrand::Rng::with_seed(4);
        let step = ActivationFunction::Step { threshold: 0.5 };
        let network = Topology::new(2, 2).hidden(3).activation(step).build(&mut rng).unwrap();
        assert!(network.layers().all(|layer| layer.activation() == step));
    }
}
