//! Feedforward decision network with a step activation and an
//! evolutionary mutation operator.
//!
//! A network is an ordered stack of dense levels. Inference thresholds
//! each neuron's weighted input sum against its bias, producing binary
//! activations; there is no gradient machinery anywhere. Parameters
//! evolve solely through [`Network::mutate`], which blends every weight
//! and bias toward a fresh uniform sample.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::lerp;

#[derive(Clone, Debug, PartialEq)]
pub struct Network {
    levels: Vec<Level>,
}

impl Network {
    /// Builds one level per adjacent pair of `neuron_counts`, with all
    /// weights and biases drawn uniformly from [-1, 1].
    pub fn new(neuron_counts: &[usize], rng: &mut dyn RngCore) -> Result<Self, NetworkError> {
        if neuron_counts.len() < 2 {
            return Err(NetworkError::TooFewLevels(neuron_counts.len()));
        }
        if let Some(level) = neuron_counts.iter().position(|&count| count == 0) {
            return Err(NetworkError::EmptyLevel(level));
        }

        let levels = neuron_counts
            .windows(2)
            .map(|pair| Level::randomized(pair[0], pair[1], rng))
            .collect();

        Ok(Self { levels })
    }

    /// [`Network::new`] seeded from the thread-local generator.
    pub fn random(neuron_counts: &[usize]) -> Result<Self, NetworkError> {
        Self::new(neuron_counts, &mut rand::rng())
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn input_count(&self) -> usize {
        self.levels.first().map_or(0, Level::input_count)
    }

    pub fn output_count(&self) -> usize {
        self.levels.last().map_or(0, Level::output_count)
    }

    /// Runs inference, feeding each level's binary activations into the
    /// next, and returns the final level's outputs.
    pub fn feed_forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_count() {
            return Err(NetworkError::InputSize {
                expected: self.input_count(),
                got: inputs.len(),
            });
        }

        let mut current = DVector::from_column_slice(inputs);
        for level in &mut self.levels {
            current = level.activate(&current);
        }
        Ok(current.iter().copied().collect())
    }

    /// Blends every weight and bias toward a fresh uniform [-1, 1]
    /// sample: `rate` 0 leaves the network untouched, 1 replaces each
    /// parameter outright. Rates outside [0, 1] are accepted and
    /// extrapolate past the sampling bound.
    pub fn mutate(&mut self, rate: f64, rng: &mut dyn RngCore) {
        for level in &mut self.levels {
            level.mutate(rate, rng);
        }
    }
}

/// One dense layer: a weight matrix (output rows by input columns), a
/// bias vector, and the transient activation vectors from the latest
/// inference call, kept only so a renderer can display them.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    weights: DMatrix<f64>,
    biases: DVector<f64>,
    inputs: DVector<f64>,
    outputs: DVector<f64>,
}

impl Level {
    fn randomized(input_count: usize, output_count: usize, rng: &mut dyn RngCore) -> Self {
        Self {
            weights: DMatrix::from_fn(output_count, input_count, |_, _| {
                rng.random_range(-1.0..1.0)
            }),
            biases: DVector::from_fn(output_count, |_, _| rng.random_range(-1.0..1.0)),
            inputs: DVector::zeros(input_count),
            outputs: DVector::zeros(output_count),
        }
    }

    pub fn input_count(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_count(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weight(&self, output: usize, input: usize) -> f64 {
        self.weights[(output, input)]
    }

    pub fn bias(&self, output: usize) -> f64 {
        self.biases[output]
    }

    pub fn inputs(&self) -> &[f64] {
        self.inputs.as_slice()
    }

    pub fn outputs(&self) -> &[f64] {
        self.outputs.as_slice()
    }

    fn activate(&mut self, inputs: &DVector<f64>) -> DVector<f64> {
        self.inputs = inputs.clone();
        let sums = &self.weights * inputs;
        self.outputs = DVector::from_fn(self.biases.len(), |i, _| {
            if sums[i] > self.biases[i] {
                1.0
            } else {
                0.0
            }
        });
        self.outputs.clone()
    }

    fn mutate(&mut self, rate: f64, rng: &mut dyn RngCore) {
        for bias in self.biases.iter_mut() {
            *bias = lerp(*bias, rng.random_range(-1.0..1.0), rate);
        }
        for weight in self.weights.iter_mut() {
            *weight = lerp(*weight, rng.random_range(-1.0..1.0), rate);
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NetworkError {
    #[error("a network needs at least two neuron counts, got {0}")]
    TooFewLevels(usize),
    #[error("neuron count {0} is zero")]
    EmptyLevel(usize),
    #[error("input vector has length {got}, expected {expected}")]
    InputSize { expected: usize, got: usize },
    #[error("level {level} output vector has length {got}, expected {expected}")]
    OutputSize {
        level: usize,
        expected: usize,
        got: usize,
    },
    #[error("level {level} bias vector has length {got}, expected {expected}")]
    BiasSize {
        level: usize,
        expected: usize,
        got: usize,
    },
    #[error("level {level} weight rows have inconsistent lengths")]
    RaggedWeights { level: usize },
    #[error("level {level} expects {got} inputs but the previous level produces {expected}")]
    LevelChain {
        level: usize,
        expected: usize,
        got: usize,
    },
    #[error("a persisted network must contain at least one level")]
    NoLevels,
}

/// Wire shape of a persisted network: `weights[i][j]` is the weight
/// from input neuron `j` to output neuron `i`. The `inputs`/`outputs`
/// fields snapshot the latest activations and are ignored when a
/// network is reconstructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub levels: Vec<LevelRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub inputs: Vec<f64>,
    pub outputs: Vec<f64>,
    pub biases: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
}

impl From<&Network> for NetworkRecord {
    fn from(network: &Network) -> Self {
        Self {
            levels: network
                .levels
                .iter()
                .map(|level| LevelRecord {
                    inputs: level.inputs().to_vec(),
                    outputs: level.outputs().to_vec(),
                    biases: level.biases.iter().copied().collect(),
                    weights: level
                        .weights
                        .row_iter()
                        .map(|row| row.iter().copied().collect())
                        .collect(),
                })
                .collect(),
        }
    }
}

impl TryFrom<NetworkRecord> for Network {
    type Error = NetworkError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        if record.levels.is_empty() {
            return Err(NetworkError::NoLevels);
        }

        let mut levels = Vec::with_capacity(record.levels.len());
        let mut previous_outputs = None;
        for (index, level) in record.levels.iter().enumerate() {
            let output_count = level.weights.len();
            let input_count = level.weights.first().map_or(0, Vec::len);

            if level.weights.iter().any(|row| row.len() != input_count) {
                return Err(NetworkError::RaggedWeights { level: index });
            }
            if level.biases.len() != output_count {
                return Err(NetworkError::BiasSize {
                    level: index,
                    expected: output_count,
                    got: level.biases.len(),
                });
            }
            if let Some(expected) = previous_outputs {
                if input_count != expected {
                    return Err(NetworkError::LevelChain {
                        level: index,
                        expected,
                        got: input_count,
                    });
                }
            }
            previous_outputs = Some(output_count);

            levels.push(Level {
                weights: DMatrix::from_row_iterator(
                    output_count,
                    input_count,
                    level.weights.iter().flatten().copied(),
                ),
                biases: DVector::from_column_slice(&level.biases),
                inputs: DVector::zeros(input_count),
                outputs: DVector::zeros(output_count),
            });
        }

        Ok(Self { levels })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    use super::*;

    fn seeded(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn level_record(biases: Vec<f64>, weights: Vec<Vec<f64>>) -> LevelRecord {
        let inputs = weights.first().map_or(0, Vec::len);
        LevelRecord {
            inputs: vec![0.0; inputs],
            outputs: vec![0.0; biases.len()],
            biases,
            weights,
        }
    }

    fn parameters(network: &Network) -> Vec<f64> {
        network
            .levels()
            .iter()
            .flat_map(|level| {
                level
                    .biases
                    .iter()
                    .chain(level.weights.iter())
                    .copied()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_new_level_shapes() {
        let network = Network::new(&[5, 6, 4], &mut seeded(1)).unwrap();
        assert_eq!(network.levels().len(), 2);
        assert_eq!(network.levels()[0].input_count(), 5);
        assert_eq!(network.levels()[0].output_count(), 6);
        assert_eq!(network.levels()[1].input_count(), 6);
        assert_eq!(network.levels()[1].output_count(), 4);
        assert_eq!(network.input_count(), 5);
        assert_eq!(network.output_count(), 4);
    }

    #[test]
    fn test_new_initial_parameters_in_range() {
        let network = Network::new(&[5, 6, 4], &mut seeded(2)).unwrap();
        assert!(parameters(&network).iter().all(|p| (-1.0..1.0).contains(p)));
    }

    #[test]
    fn test_new_is_seed_reproducible() {
        let a = Network::new(&[5, 6, 4], &mut seeded(3)).unwrap();
        let b = Network::new(&[5, 6, 4], &mut seeded(3)).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    #[case::no_counts(&[], NetworkError::TooFewLevels(0))]
    #[case::single_count(&[5], NetworkError::TooFewLevels(1))]
    #[case::zero_width(&[5, 0, 4], NetworkError::EmptyLevel(1))]
    fn test_new_rejects_bad_shapes(#[case] counts: &[usize], #[case] expected: NetworkError) {
        assert_eq!(Network::new(counts, &mut seeded(4)).unwrap_err(), expected);
    }

    #[test]
    fn test_feed_forward_zero_input_positive_biases() {
        // A zero input sum never exceeds a positive bias, so nothing fires.
        let record = NetworkRecord {
            levels: vec![
                level_record(vec![0.5, 0.5], vec![vec![1.0, 1.0], vec![-1.0, 1.0]]),
                level_record(vec![0.1], vec![vec![1.0, 1.0]]),
            ],
        };
        let mut network = Network::try_from(record).unwrap();
        let outputs = network.feed_forward(&[0.0, 0.0]).unwrap();
        assert_eq!(outputs, vec![0.0]);
    }

    #[test]
    fn test_feed_forward_step_activation() {
        let record = NetworkRecord {
            levels: vec![level_record(vec![0.5, 1.5], vec![vec![1.0, 1.0], vec![1.0, 1.0]])],
        };
        let mut network = Network::try_from(record).unwrap();
        // Sum is 1.0: above the first bias, not above the second.
        let outputs = network.feed_forward(&[1.0, 0.0]).unwrap();
        assert_eq!(outputs, vec![1.0, 0.0]);
    }

    #[test]
    fn test_feed_forward_retains_activation_snapshot() {
        let record = NetworkRecord {
            levels: vec![level_record(vec![-0.5], vec![vec![1.0, 1.0]])],
        };
        let mut network = Network::try_from(record).unwrap();
        network.feed_forward(&[1.0, 0.0]).unwrap();
        assert_eq!(network.levels()[0].inputs(), &[1.0, 0.0]);
        assert_eq!(network.levels()[0].outputs(), &[1.0]);
    }

    #[test]
    fn test_feed_forward_rejects_wrong_input_length() {
        let mut network = Network::new(&[5, 6, 4], &mut seeded(5)).unwrap();
        assert_eq!(
            network.feed_forward(&[0.0; 3]).unwrap_err(),
            NetworkError::InputSize {
                expected: 5,
                got: 3
            }
        );
    }

    #[test]
    fn test_mutate_rate_zero_is_identity() {
        let mut network = Network::new(&[5, 6, 4], &mut seeded(6)).unwrap();
        let before = network.clone();
        network.mutate(0.0, &mut seeded(7));
        assert_eq!(network, before);
    }

    #[test]
    fn test_mutate_rate_one_replaces_parameters() {
        let mut network = Network::new(&[5, 6, 4], &mut seeded(8)).unwrap();
        let before = parameters(&network);
        network.mutate(1.0, &mut seeded(9));
        let after = parameters(&network);
        assert!(after.iter().all(|p| p.abs() <= 1.0));
        let changed = before
            .iter()
            .zip(after.iter())
            .filter(|(b, a)| b != a)
            .count();
        assert_eq!(changed, before.len());
    }

    #[test]
    fn test_mutate_small_rate_bounds_drift() {
        let mut network = Network::new(&[5, 6, 4], &mut seeded(10)).unwrap();
        let before = parameters(&network);
        network.mutate(0.05, &mut seeded(11));
        // Parameters and samples both live in [-1, 1], so each step
        // moves at most 0.05 * 2.
        for (b, a) in before.iter().zip(parameters(&network).iter()) {
            assert!((a - b).abs() <= 0.1 + f64::EPSILON);
        }
    }

    #[test]
    fn test_mutate_is_seed_reproducible() {
        let mut a = Network::new(&[5, 6, 4], &mut seeded(12)).unwrap();
        let mut b = a.clone();
        a.mutate(0.3, &mut seeded(13));
        b.mutate(0.3, &mut seeded(13));
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_round_trip() {
        let mut network = Network::new(&[3, 4, 2], &mut seeded(14)).unwrap();
        let record = NetworkRecord::from(&network);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: NetworkRecord = serde_json::from_str(&json).unwrap();
        let mut restored = Network::try_from(parsed).unwrap();

        let inputs = [0.2, 0.8, 0.5];
        assert_eq!(
            network.feed_forward(&inputs).unwrap(),
            restored.feed_forward(&inputs).unwrap()
        );
    }

    #[test]
    fn test_record_wire_shape() {
        let record = NetworkRecord {
            levels: vec![level_record(vec![0.25], vec![vec![0.5, -0.5]])],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"levels":[{"inputs":[0.0,0.0],"outputs":[0.0],"biases":[0.25],"weights":[[0.5,-0.5]]}]}"#
        );
    }

    #[test]
    fn test_record_ignores_activation_snapshot() {
        let record = NetworkRecord {
            levels: vec![LevelRecord {
                inputs: vec![9.0, 9.0],
                outputs: vec![9.0],
                biases: vec![-0.5],
                weights: vec![vec![1.0, 1.0]],
            }],
        };
        let network = Network::try_from(record).unwrap();
        assert_eq!(network.levels()[0].inputs(), &[0.0, 0.0]);
        assert_eq!(network.levels()[0].outputs(), &[0.0]);
    }

    #[rstest]
    #[case::empty(NetworkRecord { levels: vec![] }, NetworkError::NoLevels)]
    #[case::ragged(
        NetworkRecord {
            levels: vec![LevelRecord {
                inputs: vec![],
                outputs: vec![],
                biases: vec![0.0, 0.0],
                weights: vec![vec![1.0, 1.0], vec![1.0]],
            }],
        },
        NetworkError::RaggedWeights { level: 0 }
    )]
    #[case::bias_mismatch(
        NetworkRecord {
            levels: vec![level_record(vec![0.0], vec![vec![1.0], vec![1.0]])],
        },
        NetworkError::BiasSize { level: 0, expected: 2, got: 1 }
    )]
    #[case::broken_chain(
        NetworkRecord {
            levels: vec![
                level_record(vec![0.0, 0.0], vec![vec![1.0], vec![1.0]]),
                level_record(vec![0.0], vec![vec![1.0, 1.0, 1.0]]),
            ],
        },
        NetworkError::LevelChain { level: 1, expected: 2, got: 3 }
    )]
    fn test_record_validation(#[case] record: NetworkRecord, #[case] expected: NetworkError) {
        assert_eq!(Network::try_from(record).unwrap_err(), expected);
    }

    #[test]
    fn test_mutated_copy_drifts_within_bound_end_to_end() {
        let mut rng = seeded(15);
        let parent = Network::new(&[5, 6, 4], &mut rng).unwrap();
        let mut child = parent.clone();
        child.mutate(0.05, &mut rng);
        for (b, a) in parameters(&parent).iter().zip(parameters(&child).iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 0.1 + f64::EPSILON);
        }
    }
}
