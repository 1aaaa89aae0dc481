use std::fs;
use std::path::{Path, PathBuf};

use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use crate::{Config, NeuralNetwork, Result, BRAIN_EXTENSION};

mod student;
pub use student::*;

/// The students of one round. Only the single best of them carries over.
#[derive(Clone, Debug)]
pub struct Generation {
    number: usize,
    students: Vec<Student>,
}

impl Generation {
    /// `config.students` students, mutated copies of `base` or fresh random brains without one.
    pub fn spawn(
        config: &Config,
        base: Option<&NeuralNetwork>,
        rng: &mut fastrand::Rng,
    ) -> Result<Self> {
        Self::spawn_numbered(0, config, base, rng)
    }

    fn spawn_numbered(
        number: usize,
        config: &Config,
        base: Option<&NeuralNetwork>,
        rng: &mut fastrand::Rng,
    ) -> Result<Self> {
        config.validate()?;

        let students = (0..config.students)
            .map(|_| match base {
                Some(brain) => Ok(Student::new(brain.mutated(config.mutation_intensity, rng))),
                None => NeuralNetwork::new(&config.layer_sizes, rng).map(Student::new),
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            generation = number,
            students = students.len(),
            from_best = base.is_some(),
            "spawned generation"
        );

        Ok(Self { number, students })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn students_mut(&mut self) -> &mut [Student] {
        &mut self.students
    }

    /// Scores every student in parallel. Each student's brain is only touched by its own call.
    pub fn evaluate<F>(&mut self, fitness: F)
    where
        F: Fn(&mut NeuralNetwork) -> f64 + Sync + Send,
    {
        (&mut self.students).par_iter_mut().for_each(|student| {
            student.score = fitness(&mut student.brain);
        });
    }

    /// Like [`Generation::evaluate`] with a fallible fitness. Stops at an error, leaving the
    /// remaining scores unspecified.
    pub fn try_evaluate<F>(&mut self, fitness: F) -> Result<()>
    where
        F: Fn(&mut NeuralNetwork) -> Result<f64> + Sync + Send,
    {
        (&mut self.students).par_iter_mut().try_for_each(|student| {
            student.score = fitness(&mut student.brain)?;
            Ok(())
        })
    }

    /// The highest-scoring student; the earliest one wins ties and NaN scores never win.
    pub fn best(&self) -> Option<&Student> {
        self.students
            .iter()
            .filter(|student| !student.score.is_nan())
            .fold(None, |best: Option<&Student>, student| match best {
                Some(best) if best.score >= student.score => Some(best),
                _ => Some(student),
            })
    }

    /// The following generation, spawned from this one's best brain.
    pub fn next(&self, config: &Config, rng: &mut fastrand::Rng) -> Result<Self> {
        let best = self.best();
        if let Some(best) = best {
            tracing::info!(generation = self.number, score = best.score, "best of generation");
        }
        Self::spawn_numbered(self.number + 1, config, best.map(Student::brain), rng)
    }

    /// Path of this generation's best brain inside `dir`.
    pub fn brain_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref()
            .join(format!("generation-{}.{BRAIN_EXTENSION}", self.number))
    }

    /// Writes the best brain to `dir`, creating it if needed. `None` when no student has a usable score.
    pub fn save_best(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let Some(best) = self.best() else {
            return Ok(None);
        };
        fs::create_dir_all(dir.as_ref())?;

        let path = self.brain_path(dir);
        best.export_brain(&path)?;

        tracing::info!(generation = self.number, score = best.score, ?path, "saved best brain");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn config() -> Config {
        Config {
            layer_sizes: vec![2, 3, 1],
            students: 6,
            seed: Some(3),
            ..Config::default()
        }
    }

    #[test]
    fn spawn_without_base_builds_fresh_brains() {
        let config = config();
        let generation = Generation::spawn(&config, None, &mut config.rng()).unwrap();

        assert_eq!(generation.number(), 0);
        assert_eq!(generation.students().len(), 6);
        assert!(generation.students().iter().all(|student| {
            student.brain().layer_sizes() == vec![2, 3, 1] && student.score() == 0.0
        }));
    }

    #[test]
    fn spawn_from_base_stays_close_to_it() {
        let config = config();
        let mut rng = config.rng();
        let base = NeuralNetwork::new(&[2, 3, 1], &mut rng).unwrap();
        let generation = Generation::spawn(&config, Some(&base), &mut rng).unwrap();

        for student in generation.students() {
            for (old, new) in base.weights().zip(student.brain().weights()) {
                assert!((old - new).abs() <= config.mutation_intensity / 10.0 + 1e-12);
            }
        }
    }

    #[test]
    fn best_picks_single_highest_score() {
        let config = config();
        let mut generation = Generation::spawn(&config, None, &mut config.rng()).unwrap();
        let scores = [1.0, 4.0, f64::NAN, 4.0, -2.0, 0.5];
        for (student, score) in generation.students_mut().iter_mut().zip(scores) {
            student.set_score(score);
        }

        let best = generation.best().unwrap();
        assert_eq!(best.score(), 4.0);
        assert!(std::ptr::eq(best, &generation.students()[1]));
    }

    #[test]
    fn best_is_none_when_all_scores_are_nan() {
        let config = config();
        let mut generation = Generation::spawn(&config, None, &mut config.rng()).unwrap();
        generation.evaluate(|_| f64::NAN);
        assert!(generation.best().is_none());
    }

    #[test]
    fn evaluate_scores_every_student() {
        let config = config();
        let mut generation = Generation::spawn(&config, None, &mut config.rng()).unwrap();
        generation.evaluate(|brain| brain.evaluate(&[1.0, 0.0]).map(|out| out[0]).unwrap_or(0.0));

        for student in generation.students() {
            let mut brain = student.brain().clone();
            assert_eq!(student.score(), brain.evaluate(&[1.0, 0.0]).unwrap()[0]);
        }
    }

    #[test]
    fn try_evaluate_scores_or_propagates() {
        let config = config();
        let mut generation = Generation::spawn(&config, None, &mut config.rng()).unwrap();

        generation
            .try_evaluate(|brain| Ok(brain.evaluate(&[0.5, 0.5])?[0]))
            .unwrap();
        assert!(generation
            .students()
            .iter()
            .all(|student| (0.0..1.0).contains(&student.score())));

        let result = generation.try_evaluate(|brain| Ok(brain.evaluate(&[0.5])?[0]));
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn next_generation_descends_from_best() {
        let config = config();
        let mut rng = config.rng();
        let mut generation = Generation::spawn(&config, None, &mut rng).unwrap();
        generation.students_mut()[2].set_score(10.0);
        let best: Vec<f64> = generation.students()[2].brain().weights().collect();

        let next = generation.next(&config, &mut rng).unwrap();
        assert_eq!(next.number(), 1);
        for student in next.students() {
            for (old, new) in best.iter().zip(student.brain().weights()) {
                assert!((old - new).abs() <= config.mutation_intensity / 10.0 + 1e-12);
            }
        }
    }
}
