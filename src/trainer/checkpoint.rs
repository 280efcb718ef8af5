use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tch::{nn, Device, Kind, TchError, Tensor};
use crate::trainer::{CheckpointLoadError, CheckpointSaveError};

/// One parameter tensor, flattened to CPU floats for serialization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NamedTensor {
    pub name: String,
    pub shape: Vec<i64>,
    pub values: Vec<f32>,
}

impl NamedTensor {
    pub fn from_tensor(name: &str, tensor: &Tensor) -> Result<NamedTensor, TchError> {
        let flat = tensor
            .to_device(Device::Cpu)
            .to_kind(Kind::Float)
            .contiguous()
            .f_flatten(0, -1)?;
        let values = Vec::<f32>::try_from(&flat)?;
        Ok(NamedTensor {
            name: name.to_string(),
            shape: tensor.size(),
            values,
        })
    }

    pub fn to_tensor(&self, device: Device) -> Tensor {
        Tensor::from_slice(&self.values)
            .reshape(&self.shape[..])
            .to_device(device)
    }
}

/// Durable snapshot of a training run: epoch counter, per-epoch loss history,
/// model parameters and optimizer momentum buffers, persisted as one record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub epoch: usize,
    pub loss_history: Vec<f64>,
    pub model: Vec<NamedTensor>,
    pub optimizer: Vec<NamedTensor>,
}

/// Variables of a store in name order, so captures of identical state
/// serialize identically.
pub(crate) fn ordered_variables(vs: &nn::VarStore) -> Vec<(String, Tensor)> {
    let mut variables: Vec<(String, Tensor)> = vs.variables().into_iter().collect();
    variables.sort_by(|a, b| a.0.cmp(&b.0));
    variables
}

impl Checkpoint {
    pub fn capture(
        epoch: usize,
        loss_history: &[f64],
        vs: &nn::VarStore,
        optimizer_state: &[(String, Tensor)],
    ) -> Result<Checkpoint, CheckpointSaveError> {
        let mut model = Vec::new();
        for (name, tensor) in ordered_variables(vs) {
            model.push(NamedTensor::from_tensor(&name, &tensor)?);
        }

        let mut optimizer = Vec::new();
        for (name, tensor) in optimizer_state {
            optimizer.push(NamedTensor::from_tensor(name, tensor)?);
        }

        Ok(Checkpoint {
            epoch,
            loss_history: loss_history.to_vec(),
            model,
            optimizer,
        })
    }

    /// Writes the checkpoint to a sibling temp file, then renames it over the
    /// target path so a reader never observes a half-written checkpoint.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointSaveError> {
        let bytes = bincode::serialize(self)
            .map_err(|err| CheckpointSaveError::Encode(err.to_string()))?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Checkpoint, CheckpointLoadError> {
        if !path.exists() {
            return Err(CheckpointLoadError::Missing(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(CheckpointLoadError::Io)?;
        bincode::deserialize(&bytes).map_err(|err| CheckpointLoadError::Decode(err.to_string()))
    }

    /// Copies the stored model parameters into the given variable store. The
    /// stored names and shapes must match the store exactly.
    pub fn restore_model(&self, vs: &nn::VarStore) -> Result<(), CheckpointLoadError> {
        let mut variables = vs.variables();

        for name in variables.keys() {
            if !self.model.iter().any(|entry| &entry.name == name) {
                return Err(CheckpointLoadError::MissingVariable(name.clone()));
            }
        }

        for entry in &self.model {
            let variable = variables
                .get_mut(&entry.name)
                .ok_or_else(|| CheckpointLoadError::UnknownVariable(entry.name.clone()))?;
            if variable.size() != entry.shape {
                return Err(CheckpointLoadError::ShapeMismatch {
                    name: entry.name.clone(),
                    expected: variable.size(),
                    found: entry.shape.clone(),
                });
            }
            let restored = entry.to_tensor(variable.device());
            tch::no_grad(|| variable.copy_(&restored));
        }

        Ok(())
    }

    /// Rebuilds the optimizer momentum buffers on the devices of their owning
    /// variables. Buffers are allowed to cover a subset of the variables (a
    /// variable that never received a gradient has no buffer), but every
    /// stored buffer must match a current variable.
    pub fn restore_optimizer(&self, vs: &nn::VarStore) -> Result<Vec<(String, Tensor)>, CheckpointLoadError> {
        let variables = vs.variables();
        let mut state = Vec::with_capacity(self.optimizer.len());
        for entry in &self.optimizer {
            let variable = variables
                .get(&entry.name)
                .ok_or_else(|| CheckpointLoadError::UnknownVariable(entry.name.clone()))?;
            if variable.size() != entry.shape {
                return Err(CheckpointLoadError::ShapeMismatch {
                    name: entry.name.clone(),
                    expected: variable.size(),
                    found: entry.shape.clone(),
                });
            }
            state.push((entry.name.clone(), entry.to_tensor(variable.device())));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use crate::trainer::{EvalMlp, ValueNetwork, DEVICE};
    use super::*;

    fn temp_checkpoint_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("stockling_{}_{}.ckpt", name, std::process::id()))
    }

    #[test]
    fn test_named_tensor_round_trip() {
        let tensor = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).reshape([2, 3]);
        let named = NamedTensor::from_tensor("w", &tensor).unwrap();
        assert_eq!(named.shape, vec![2, 3]);
        assert_eq!(named.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(named.to_tensor(Device::Cpu), tensor);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let path = temp_checkpoint_path("round_trip");
        let model = EvalMlp::new(*DEVICE, 16);

        let checkpoint = Checkpoint::capture(3, &[0.5, 0.4, 0.3], model.var_store(), &[]).unwrap();
        checkpoint.save(&path).unwrap();

        let loaded = Checkpoint::load(&path).unwrap();
        assert_eq!(loaded, checkpoint);
        assert_eq!(loaded.epoch, 3);
        assert_eq!(loaded.loss_history, vec![0.5, 0.4, 0.3]);

        let restored = EvalMlp::new(*DEVICE, 16);
        loaded.restore_model(restored.var_store()).unwrap();
        for (name, tensor) in restored.var_store().variables() {
            let original = &model.var_store().variables()[&name];
            assert!(tensor.allclose(original, 1e-6, 1e-6, false));
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_checkpoint_overwrite_is_idempotent() {
        let path = temp_checkpoint_path("overwrite");
        let model = EvalMlp::new(*DEVICE, 16);

        let checkpoint = Checkpoint::capture(1, &[0.9], model.var_store(), &[]).unwrap();
        checkpoint.save(&path).unwrap();
        let first = Checkpoint::load(&path).unwrap();
        checkpoint.save(&path).unwrap();
        let second = Checkpoint::load(&path).unwrap();

        assert_eq!(first, second);
        assert!(!path.with_extension("tmp").exists());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_checkpoint_fails() {
        let path = temp_checkpoint_path("does_not_exist");
        match Checkpoint::load(&path) {
            Err(CheckpointLoadError::Missing(missing)) => assert_eq!(missing, path),
            other => panic!("expected Missing error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_corrupt_checkpoint_fails() {
        let path = temp_checkpoint_path("corrupt");
        std::fs::write(&path, b"not a checkpoint").unwrap();
        assert!(matches!(Checkpoint::load(&path), Err(CheckpointLoadError::Decode(_))));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_restore_rejects_shape_mismatch() {
        let small = EvalMlp::new(*DEVICE, 8);
        let large = EvalMlp::new(*DEVICE, 16);

        let checkpoint = Checkpoint::capture(1, &[0.1], small.var_store(), &[]).unwrap();
        assert!(matches!(
            checkpoint.restore_model(large.var_store()),
            Err(CheckpointLoadError::ShapeMismatch { .. })
        ));
    }
}
