//! Dataset of labeled positions: `(FEN, centipawn evaluation)` pairs read
//! from a CSV-style text file, encoded once up front and served as batches
//! of input/target tensor pairs.

use std::fmt::Display;
use std::path::Path;
use rand::seq::SliceRandom;
use tch::{Kind, Tensor};
use crate::encoding::{bit_planes, unpack_bit_planes, NUM_FEATURES, NUM_PLANES};
use crate::position::{FenParseError, Position};
use crate::trainer::DEVICE;

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    MalformedLine { line: usize, content: String },
    MalformedFen { line: usize, error: FenParseError },
    Empty,
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "Failed to read dataset: {}", err),
            DatasetError::MalformedLine { line, content } => write!(f, "Malformed dataset line {}: {}", line, content),
            DatasetError::MalformedFen { line, error } => write!(f, "Malformed FEN on dataset line {}: {}", line, error),
            DatasetError::Empty => write!(f, "Dataset contains no examples"),
        }
    }
}

impl std::error::Error for DatasetError {}

pub struct EvalDataset {
    features: Vec<[u8; NUM_FEATURES]>,
    labels: Vec<f32>,
}

impl EvalDataset {
    pub fn from_file(path: impl AsRef<Path>) -> Result<EvalDataset, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(DatasetError::Io)?;
        EvalDataset::from_csv(&content)
    }

    /// Parses lines of the form `<fen>,<evaluation>`. A FEN never contains a
    /// comma, so the split happens at the last one. Blank lines are skipped.
    pub fn from_csv(content: &str) -> Result<EvalDataset, DatasetError> {
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (line_index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (fen, label) = match line.rsplit_once(',') {
                Some(parts) => parts,
                None => return Err(DatasetError::MalformedLine {
                    line: line_index + 1,
                    content: line.to_string(),
                }),
            };

            let label: f32 = match label.trim().parse() {
                Ok(label) => label,
                Err(_) => return Err(DatasetError::MalformedLine {
                    line: line_index + 1,
                    content: line.to_string(),
                }),
            };

            let position = Position::from_fen(fen.trim()).map_err(|error| DatasetError::MalformedFen {
                line: line_index + 1,
                error,
            })?;

            features.push(unpack_bit_planes(&bit_planes(&position)));
            labels.push(label);
        }

        if features.is_empty() {
            return Err(DatasetError::Empty);
        }

        Ok(EvalDataset { features, labels })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// One full pass over the dataset in batches. With `shuffle` the visit
    /// order is a fresh random permutation; without it, file order.
    pub fn batches(&self, batch_size: usize, shuffle: bool) -> BatchIter {
        assert!(batch_size > 0);

        let mut order: Vec<usize> = (0..self.len()).collect();
        if shuffle {
            order.shuffle(&mut rand::thread_rng());
        }

        BatchIter {
            dataset: self,
            order,
            cursor: 0,
            batch_size,
        }
    }
}

pub struct BatchIter<'a> {
    dataset: &'a EvalDataset,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
}

impl Iterator for BatchIter<'_> {
    /// `(inputs, targets)`: a float (B, 12, 8, 8) tensor and a float (B, 1)
    /// tensor on the training device. The last batch may be short.
    type Item = (Tensor, Tensor);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];

        let mut cells = Vec::with_capacity(indices.len() * NUM_FEATURES);
        let mut labels = Vec::with_capacity(indices.len());
        for &index in indices {
            cells.extend_from_slice(&self.dataset.features[index]);
            labels.push(self.dataset.labels[index]);
        }

        let inputs = Tensor::from_slice(&cells)
            .view([indices.len() as i64, NUM_PLANES as i64, 8, 8])
            .to_kind(Kind::Float)
            .to_device(*DEVICE);
        let targets = Tensor::from_slice(&labels)
            .view([indices.len() as i64, 1])
            .to_device(*DEVICE);

        self.cursor = end;
        Some((inputs, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,25
rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1,37
rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2,-12
rnbqkbnr/pppp1ppp/8/4p3/4PP2/8/PPPP2PP/RNBQKBNR b KQkq f3 0 2,114
r1bqkbnr/pppp1ppp/2n5/4p3/4PP2/8/PPPP2PP/RNBQKBNR w KQkq - 1 3,-231
";

    #[test]
    fn test_from_csv() {
        let dataset = EvalDataset::from_csv(CSV).unwrap();
        assert_eq!(dataset.len(), 5);
        assert_eq!(dataset.labels[0], 25.0);
        assert_eq!(dataset.labels[4], -231.0);
    }

    #[test]
    fn test_from_csv_rejects_malformed_input() {
        assert!(matches!(EvalDataset::from_csv(""), Err(DatasetError::Empty)));
        assert!(matches!(
            EvalDataset::from_csv("no comma here"),
            Err(DatasetError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            EvalDataset::from_csv("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,abc"),
            Err(DatasetError::MalformedLine { line: 1, .. })
        ));
        let csv = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1,25\nnot/a/fen w - - 0 1,3";
        assert!(matches!(
            EvalDataset::from_csv(csv),
            Err(DatasetError::MalformedFen { line: 2, .. })
        ));
    }

    #[test]
    fn test_batch_shapes_and_count() {
        let dataset = EvalDataset::from_csv(CSV).unwrap();
        let batches: Vec<(Tensor, Tensor)> = dataset.batches(2, false).collect();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].0.size(), vec![2, 12, 8, 8]);
        assert_eq!(batches[0].1.size(), vec![2, 1]);
        // The last batch is short.
        assert_eq!(batches[2].0.size(), vec![1, 12, 8, 8]);
        assert_eq!(batches[2].1.size(), vec![1, 1]);

        assert_eq!(batches[0].0.kind(), Kind::Float);
        assert_eq!(batches[0].1.kind(), Kind::Float);
    }

    #[test]
    fn test_unshuffled_batches_preserve_file_order() {
        let dataset = EvalDataset::from_csv(CSV).unwrap();
        let labels: Vec<f32> = dataset
            .batches(2, false)
            .flat_map(|(_, targets)| {
                Vec::<f32>::try_from(&targets.flatten(0, -1).to_device(tch::Device::Cpu)).unwrap()
            })
            .collect();
        assert_eq!(labels, vec![25.0, 37.0, -12.0, 114.0, -231.0]);
    }

    #[test]
    fn test_shuffled_pass_covers_every_example_once() {
        let dataset = EvalDataset::from_csv(CSV).unwrap();
        let mut labels: Vec<f32> = dataset
            .batches(2, true)
            .flat_map(|(_, targets)| {
                Vec::<f32>::try_from(&targets.flatten(0, -1).to_device(tch::Device::Cpu)).unwrap()
            })
            .collect();
        labels.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(labels, vec![-231.0, -12.0, 25.0, 37.0, 114.0]);
    }
}
