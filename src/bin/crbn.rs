use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use critter_brain::*;

#[derive(Parser)]
#[command(name = "crbn", about = "Create, inspect, run and evolve critter brains")]
pub enum Cli {
    /// Create a new random brain.
    New {
        #[arg(long, value_delimiter = ',', required = true)]
        /// Layer sizes, input first and output last, e.g. `3,4,2`.
        layers: Vec<usize>,

        #[arg(long, default_value_t = 0)]
        /// Extra randomly sized hidden layers inserted before the output layer.
        random_hidden: usize,

        #[arg(long, default_value_t = 1)]
        /// Minimal neurons count of a random hidden layer.
        min: usize,

        #[arg(long, default_value_t = 8)]
        /// Maximal neurons count of a random hidden layer.
        max: usize,

        #[arg(long, default_value_t = ActivationFunction::Sigmoid)]
        /// Activation function of every layer, e.g. `sigmoid` or `step:0.5`.
        activation: ActivationFunction,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, short)]
        /// Path to the brain file.
        output: PathBuf,
    },

    /// Print topology and weight statistics of a brain.
    Inspect {
        /// Path to the brain file.
        path: PathBuf,
    },

    /// Feed inputs through a brain and print its outputs.
    Run {
        /// Path to the brain file.
        path: PathBuf,

        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        inputs: Vec<f64>,
    },

    /// Mutate the weights of a brain.
    Mutate {
        /// Path to the brain file.
        path: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MUTATION_INTENSITY)]
        intensity: f64,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, short)]
        /// Where to write the mutated brain, in place when omitted.
        output: Option<PathBuf>,
    },

    /// Evolve brains towards a target output vector and keep the best of each generation.
    Evolve {
        #[arg(long, short)]
        /// Path to a JSON config file, defaults are used when omitted.
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 20)]
        generations: usize,

        #[arg(long)]
        /// Brain to start from instead of random ones.
        from: Option<PathBuf>,

        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        /// Output the brains are scored against.
        target: Vec<f64>,
    },
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::New {
                layers,
                random_hidden,
                min,
                max,
                activation,
                seed,
                output,
            } => {
                let mut rng = rng(seed);

                let (&inputs, rest) = layers.split_first().context("no layer sizes given")?;
                let (&outputs, hidden) = rest.split_last().context("no output layer size given")?;

                let topology = hidden
                    .iter()
                    .fold(Topology::new(inputs, outputs), |topology, &size| topology.hidden(size))
                    .random_hidden_layers(random_hidden, min, max)
                    .activation(activation);
                let network = topology.build(&mut rng)?;

                network.save(&output)?;
                println!("Created {:?} brain in {output:?}", network.layer_sizes());
            }

            Self::Inspect { path } => {
                let network = NeuralNetwork::load(&path)?;
                let weights: Vec<f64> = network.weights().collect();

                println!("Layers:      {:?}", network.layer_sizes());
                for (index, layer) in network.layers().enumerate() {
                    println!("  layer {index}: {} x {}", layer.len(), layer.activation());
                }
                println!("Connections: {}", network.connection_count());

                if !weights.is_empty() {
                    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    let mean = weights.iter().sum::<f64>() / weights.len() as f64;

                    println!("Weights:     min = {min:.4}, max = {max:.4}, mean = {mean:.4}");
                }
            }

            Self::Run { path, inputs } => {
                let mut network = NeuralNetwork::load(&path)?;
                let outputs = network.evaluate(&inputs)?;

                println!("{outputs:?}");
            }

            Self::Mutate {
                path,
                intensity,
                seed,
                output,
            } => {
                let mut network = NeuralNetwork::load(&path)?;
                network.mutate(intensity, &mut rng(seed));

                let output = output.unwrap_or(path);
                network.save(&output)?;
                println!("Mutated brain saved to {output:?}");
            }

            Self::Evolve {
                config,
                generations,
                from,
                target,
            } => {
                let config = match config {
                    Some(path) => Config::from_file(path)?,
                    None => Config::default(),
                };
                let output_size = config.layer_sizes.last().copied().unwrap_or_default();
                anyhow::ensure!(
                    target.len() == output_size,
                    "target has {} values but the brains have {output_size} outputs",
                    target.len()
                );

                let mut rng = config.rng();
                let base = match from {
                    Some(path) => {
                        let base = load_brain(&path, config.load_variance, &mut rng)?;
                        anyhow::ensure!(
                            base.layer_sizes() == config.layer_sizes,
                            "{path:?} has layer sizes {:?} but the config expects {:?}",
                            base.layer_sizes(),
                            config.layer_sizes
                        );
                        Some(base)
                    }
                    None => None,
                };

                let inputs = vec![0.5; config.layer_sizes[0]];
                let fitness = |brain: &mut NeuralNetwork| -> Result<f64> {
                    let outputs = brain.evaluate(&inputs)?;
                    Ok(-squared_error(&outputs, &target))
                };

                let mut generation = Generation::spawn(&config, base.as_ref(), &mut rng)?;
                for _ in 0..generations {
                    generation.try_evaluate(&fitness)?;
                    if let Some(best) = generation.best() {
                        let number = generation.number();
                        println!("Generation {number}: best score {:.6}", best.score());
                    }
                    generation.save_best(&config.brain_dir)?;
                    generation = generation.next(&config, &mut rng)?;
                }
            }
        }

        Ok(())
    }
}

fn squared_error(outputs: &[f64], target: &[f64]) -> f64 {
    outputs
        .iter()
        .zip(target)
        .map(|(output, target)| (output - target).powi(2))
        .sum()
}

fn rng(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Cli::parse().execute()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crbn-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A config file for `config_sizes` brains saving into `dir`, and a saved base brain.
    fn evolve_files(
        dir: &Path,
        config_sizes: &[usize],
        base_sizes: &[usize],
    ) -> (PathBuf, PathBuf) {
        let config = dir.join("config.json");
        let text = serde_json::json!({
            "layer_sizes": config_sizes,
            "students": 2,
            "seed": 1,
            "brain_dir": dir,
        });
        fs::write(&config, text.to_string()).unwrap();

        let base = dir.join("base.crbn");
        NeuralNetwork::new(base_sizes, &mut fastrand::Rng::with_seed(1))
            .unwrap()
            .save(&base)
            .unwrap();

        (config, base)
    }

    #[test]
    fn new_splits_layers_and_parses_activation() {
        let cli = Cli::try_parse_from([
            "crbn",
            "new",
            "--layers",
            "3,4,2",
            "--activation",
            "step:0.5",
            "-o",
            "a.crbn",
        ])
        .unwrap();

        match cli {
            Cli::New {
                layers,
                random_hidden,
                activation,
                seed,
                output,
                ..
            } => {
                assert_eq!(layers, vec![3, 4, 2]);
                assert_eq!(random_hidden, 0);
                assert_eq!(activation, ActivationFunction::Step { threshold: 0.5 });
                assert_eq!(seed, None);
                assert_eq!(output, PathBuf::from("a.crbn"));
            }
            _ => panic!("expected the new command"),
        }
    }

    #[test]
    fn new_defaults_to_sigmoid_and_requires_layers() {
        let cli = Cli::try_parse_from(["crbn", "new", "--layers", "2,1", "-o", "b.crbn"]).unwrap();
        assert!(matches!(
            cli,
            Cli::New {
                activation: ActivationFunction::Sigmoid,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["crbn", "new", "-o", "b.crbn"]).is_err());
        assert!(Cli::try_parse_from([
            "crbn",
            "new",
            "--layers",
            "2,1",
            "--activation",
            "relu",
            "-o",
            "b.crbn",
        ])
        .is_err());
    }

    #[test]
    fn run_accepts_negative_inputs() {
        let cli =
            Cli::try_parse_from(["crbn", "run", "x.crbn", "--inputs", "-1,0.5,-0.25"]).unwrap();

        match cli {
            Cli::Run { path, inputs } => {
                assert_eq!(path, PathBuf::from("x.crbn"));
                assert_eq!(inputs, vec![-1.0, 0.5, -0.25]);
            }
            _ => panic!("expected the run command"),
        }
    }

    #[test]
    fn evolve_accepts_negative_target() {
        let cli =
            Cli::try_parse_from(["crbn", "evolve", "--target", "-0.5,1", "--generations", "3"])
                .unwrap();

        assert!(matches!(
            cli,
            Cli::Evolve {
                generations: 3,
                config: None,
                from: None,
                ref target,
            } if target == &vec![-0.5, 1.0]
        ));
    }

    #[test]
    fn evolve_rejects_base_brain_of_another_shape() {
        let dir = scratch_dir("evolve-mismatch");
        let (config, base) = evolve_files(&dir, &[3, 2], &[2, 2]);

        let result = Cli::Evolve {
            config: Some(config),
            generations: 1,
            from: Some(base),
            target: vec![0.0, 1.0],
        }
        .execute();

        assert!(result.is_err());
        assert!(!dir.join("generation-0.crbn").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn evolve_from_matching_base_saves_best() {
        let dir = scratch_dir("evolve-match");
        let (config, base) = evolve_files(&dir, &[2, 2], &[2, 2]);

        Cli::Evolve {
            config: Some(config),
            generations: 1,
            from: Some(base),
            target: vec![0.0, 1.0],
        }
        .execute()
        .unwrap();

        assert!(dir.join("generation-0.crbn").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn squared_error_sums_over_outputs() {
        assert_eq!(squared_error(&[0.5, 1.0], &[0.0, 0.0]), 1.25);
        assert_eq!(squared_error(&[0.25], &[0.25]), 0.0);
    }
}
