use serde::{Deserialize, Serialize};

use super::*;

/// `[source layer, source neuron, weight]`
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
struct ConnectionRecord(usize, usize, f64);

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct NeuronRecord {
    connections: Vec<ConnectionRecord>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct LayerRecord {
    activation: ActivationFunction,
    neurons: Vec<NeuronRecord>,
}

/// An intermediary struct used for deserializing/serializing `NeuralNetwork` data.
///
/// Layer 0 is the input layer and the last one the output layer. Connections name their
/// source by layer and position, so the file does not depend on arena order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkFile {
    layers: Vec<LayerRecord>,
}

impl NetworkFile {
    pub fn from_network(network: &NeuralNetwork) -> Self {
        let layers: Vec<&Layer> = network.layers().collect();

        // arena index -> (layer, position)
        let mut locations = vec![(0, 0); network.neurons().len()];
        for (layer_index, layer) in layers.iter().enumerate() {
            for (position, id) in layer.ids().iter().enumerate() {
                locations[id.index()] = (layer_index, position);
            }
        }

        Self {
            layers: layers
                .iter()
                .map(|layer| LayerRecord {
                    activation: layer.activation(),
                    neurons: layer
                        .ids()
                        .iter()
                        .map(|&id| NeuronRecord {
                            connections: network.neurons()[id]
                                .connections()
                                .iter()
                                .map(|connection| {
                                    let (layer, position) = locations[connection.source.index()];
                                    ConnectionRecord(layer, position, connection.weight)
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Validates the whole file before building anything, so a corrupt file never yields a network.
    pub fn into_network(self) -> Result<NeuralNetwork> {
        self.validate()?;

        let mut neurons = NeuronArena::new();
        let layers: Vec<Layer> = self
            .layers
            .iter()
            .map(|record| {
                Layer::with_neurons(&mut neurons, record.activation, record.neurons.len())
            })
            .collect();

        for (record, layer) in self.layers.iter().zip(layers.iter()) {
            for (neuron, &id) in record.neurons.iter().zip(layer.ids()) {
                for &ConnectionRecord(source_layer, source, weight) in neuron.connections.iter() {
                    neurons.connect(layers[source_layer].ids()[source], id, weight);
                }
            }
        }

        let mut layers = layers.into_iter();
        let input = layers.next().ok_or_else(|| corrupt("missing input layer"))?;
        Ok(NeuralNetwork::from_parts(neurons, input, layers.collect()))
    }

    fn validate(&self) -> Result<()> {
        if self.layers.len() < 2 {
            return Err(corrupt(format!(
                "expected at least 2 layers, found {}",
                self.layers.len()
            )));
        }

        for (layer_index, layer) in self.layers.iter().enumerate() {
            if layer.neurons.is_empty() {
                return Err(corrupt(format!("layer {layer_index} has no neurons")));
            }
            if !layer.activation.is_valid() {
                return Err(corrupt(format!("layer {layer_index} has an invalid activation")));
            }

            for (position, neuron) in layer.neurons.iter().enumerate() {
                if layer_index == 0 && !neuron.connections.is_empty() {
                    return Err(corrupt(format!(
                        "input neuron {position} has incoming connections"
                    )));
                }

                let mut sources: Vec<(usize, usize)> = Vec::with_capacity(neuron.connections.len());
                for &ConnectionRecord(source_layer, source, weight) in neuron.connections.iter() {
                    let location = format!("neuron {layer_index}/{position}");
                    if source_layer >= layer_index {
                        return Err(corrupt(format!(
                            "{location} reads from layer {source_layer}, which is not upstream"
                        )));
                    }
                    if source >= self.layers[source_layer].neurons.len() {
                        return Err(corrupt(format!(
                            "{location} reads from missing neuron {source_layer}/{source}"
                        )));
                    }
                    if !(-1.0..=1.0).contains(&weight) {
                        return Err(corrupt(format!(
                            "{location} has weight {weight} outside [-1, 1]"
                        )));
                    }
                    if sources.contains(&(source_layer, source)) {
                        return Err(corrupt(format!(
                            "{location} lists neuron {source_layer}/{source} twice"
                        )));
                    }
                    sources.push((source_layer, source));
                }
            }
        }

        Ok(())
    }
}

fn corrupt(message: impl Into<String>) -> Error {
    Error::Deserialization(message.into())
}
