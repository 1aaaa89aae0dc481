//! Internally, from bigger to smaller:
//! pub Generation -> pub Student -> pub NeuralNetwork -> pub Layer -> pub Neuron
//!
//! A critter feeds a flat vector of sensor readings into its `NeuralNetwork` and reads back a
//! flat vector of outputs. Between rounds the single best brain is saved to a `.crbn` file and
//! the next generation is spawned from mutated copies of it.
//!
//! This top-level file contains the crate interface, imports and reexports.

mod brain;
pub use brain::*;
mod config;
pub use config::*;
mod error;
pub use error::*;
mod generation;
pub use generation::*;
mod functions;
pub use functions::*;
