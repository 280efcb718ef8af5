use std::fmt::Display;
use std::path::PathBuf;
use tch::TchError;

/// Failure to restore a checkpoint that was explicitly requested. Always
/// fatal; no partial recovery is attempted.
#[derive(Debug)]
pub enum CheckpointLoadError {
    Missing(PathBuf),
    Io(std::io::Error),
    Decode(String),
    UnknownVariable(String),
    MissingVariable(String),
    ShapeMismatch { name: String, expected: Vec<i64>, found: Vec<i64> },
}

impl Display for CheckpointLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CheckpointLoadError::Missing(path) => write!(f, "Checkpoint file not found: {}", path.display()),
            CheckpointLoadError::Io(err) => write!(f, "Failed to read checkpoint: {}", err),
            CheckpointLoadError::Decode(msg) => write!(f, "Failed to decode checkpoint: {}", msg),
            CheckpointLoadError::UnknownVariable(name) => write!(f, "Checkpoint contains unknown variable: {}", name),
            CheckpointLoadError::MissingVariable(name) => write!(f, "Checkpoint is missing variable: {}", name),
            CheckpointLoadError::ShapeMismatch { name, expected, found } => write!(
                f,
                "Checkpoint shape mismatch for {}: expected {:?}, found {:?}",
                name, expected, found
            ),
        }
    }
}

impl std::error::Error for CheckpointLoadError {}

#[derive(Debug)]
pub enum CheckpointSaveError {
    Io(std::io::Error),
    Encode(String),
    Tensor(TchError),
}

impl Display for CheckpointSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CheckpointSaveError::Io(err) => write!(f, "Failed to write checkpoint: {}", err),
            CheckpointSaveError::Encode(msg) => write!(f, "Failed to encode checkpoint: {}", msg),
            CheckpointSaveError::Tensor(err) => write!(f, "Failed to capture parameters: {}", err),
        }
    }
}

impl std::error::Error for CheckpointSaveError {}

impl From<std::io::Error> for CheckpointSaveError {
    fn from(err: std::io::Error) -> CheckpointSaveError {
        CheckpointSaveError::Io(err)
    }
}

impl From<TchError> for CheckpointSaveError {
    fn from(err: TchError) -> CheckpointSaveError {
        CheckpointSaveError::Tensor(err)
    }
}

/// Failure inside a single batch's forward/backward/update. Aborts the
/// current epoch; no partial-epoch checkpoint is written.
#[derive(Debug)]
pub enum BatchProcessingError {
    Tensor(TchError),
    NonFiniteLoss(f64),
}

impl Display for BatchProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BatchProcessingError::Tensor(err) => write!(f, "Batch update failed: {}", err),
            BatchProcessingError::NonFiniteLoss(loss) => write!(f, "Batch produced a non-finite loss: {}", loss),
        }
    }
}

impl std::error::Error for BatchProcessingError {}

impl From<TchError> for BatchProcessingError {
    fn from(err: TchError) -> BatchProcessingError {
        BatchProcessingError::Tensor(err)
    }
}

#[derive(Debug)]
pub enum TrainError {
    CheckpointLoad(CheckpointLoadError),
    CheckpointSave(CheckpointSaveError),
    BatchProcessing(BatchProcessingError),
}

impl Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TrainError::CheckpointLoad(err) => write!(f, "{}", err),
            TrainError::CheckpointSave(err) => write!(f, "{}", err),
            TrainError::BatchProcessing(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for TrainError {}

impl From<CheckpointLoadError> for TrainError {
    fn from(err: CheckpointLoadError) -> TrainError {
        TrainError::CheckpointLoad(err)
    }
}

impl From<CheckpointSaveError> for TrainError {
    fn from(err: CheckpointSaveError) -> TrainError {
        TrainError::CheckpointSave(err)
    }
}

impl From<BatchProcessingError> for TrainError {
    fn from(err: BatchProcessingError) -> TrainError {
        TrainError::BatchProcessing(err)
    }
}
