use super::*;

/// One critter's brain together with how well it did this round.
#[derive(Clone, Debug)]
pub struct Student {
    pub(crate) brain: NeuralNetwork,
    pub(crate) score: f64,
}

impl Student {
    pub fn new(brain: NeuralNetwork) -> Self {
        Self { brain, score: 0.0 }
    }

    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    pub fn export_brain(&self, path: impl AsRef<Path>) -> Result<()> {
        self.brain.save(path)
    }
}

/// Loads a `.crbn` brain and mutates it with `variance` so a reloaded best is never reused verbatim.
pub fn load_brain(
    path: impl AsRef<Path>,
    variance: f64,
    rng: &mut fastrand::Rng,
) -> Result<NeuralNetwork> {
    let path = path.as_ref();
    let mut brain = NeuralNetwork::load(path)?;
    brain.mutate(variance, rng);

    tracing::info!(?path, variance, "loaded best brain");
    Ok(brain)
}
