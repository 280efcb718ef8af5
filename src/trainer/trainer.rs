use std::path::PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use tch::Reduction;
use crate::dataset::EvalDataset;
use crate::trainer::{
    BatchProcessingError, Checkpoint, SgdMomentum, TrainError, ValueNetwork,
};

#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Total epoch budget, counted from epoch 0 even when resuming.
    pub epochs: usize,
    pub batch_size: usize,
    pub checkpoint_path: PathBuf,
    /// Restore from `checkpoint_path` before training. A missing or corrupt
    /// checkpoint is then a fatal error.
    pub load_checkpoint: bool,
}

/// Durable progress of a training run. Owned and mutated only by the
/// trainer, once per completed epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingState {
    pub epoch: usize,
    pub loss_history: Vec<f64>,
}

impl TrainingState {
    fn fresh() -> TrainingState {
        TrainingState {
            epoch: 0,
            loss_history: Vec::new(),
        }
    }
}

pub struct Trainer<M: ValueNetwork> {
    config: TrainConfig,
    model: M,
    optimizer: SgdMomentum,
    state: TrainingState,
}

impl<M: ValueNetwork> Trainer<M> {
    /// Builds a ready-to-run trainer, either fresh or restored from the
    /// configured checkpoint.
    pub fn initialize(config: TrainConfig, model: M, mut optimizer: SgdMomentum) -> Result<Trainer<M>, TrainError> {
        let state = if config.load_checkpoint {
            let checkpoint = Checkpoint::load(&config.checkpoint_path).map_err(TrainError::CheckpointLoad)?;
            checkpoint.restore_model(model.var_store()).map_err(TrainError::CheckpointLoad)?;
            let velocity = checkpoint.restore_optimizer(model.var_store()).map_err(TrainError::CheckpointLoad)?;
            optimizer.import_state(velocity);
            TrainingState {
                epoch: checkpoint.epoch,
                loss_history: checkpoint.loss_history,
            }
        } else {
            TrainingState::fresh()
        };

        Ok(Trainer {
            config,
            model,
            optimizer,
            state,
        })
    }

    pub fn state(&self) -> &TrainingState {
        &self.state
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs epochs until the configured budget is reached. A state restored
    /// at or past the budget runs nothing.
    pub fn run(&mut self, dataset: &EvalDataset) -> Result<(), TrainError> {
        while self.state.epoch < self.config.epochs {
            self.run_epoch(dataset)?;
        }
        Ok(())
    }

    /// One shuffled full pass over the dataset. Every batch updates the model
    /// before the next batch is touched; the epoch loss is the mean over all
    /// per-batch losses. Completing the pass bumps the epoch counter, extends
    /// the loss history and persists a checkpoint before returning the mean
    /// loss.
    pub fn run_epoch(&mut self, dataset: &EvalDataset) -> Result<f64, TrainError> {
        assert!(!dataset.is_empty());

        let num_batches = dataset.len().div_ceil(self.config.batch_size);
        let bar = ProgressBar::new(num_batches as u64)
            .with_style(ProgressStyle::default_bar()
                .template("Epoch {prefix} {bar:32.green} [Batch {human_pos}/{human_len}] {msg}")
                .unwrap());
        bar.set_prefix(format!("{}", self.state.epoch + 1));

        let mut batch_losses = Vec::with_capacity(num_batches);

        for (inputs, targets) in dataset.batches(self.config.batch_size, true) {
            let loss_value = self.train_batch(&inputs, &targets).map_err(TrainError::BatchProcessing)?;
            batch_losses.push(loss_value);

            bar.set_message(format!("loss {:.6}", loss_value));
            bar.inc(1);
        }
        bar.finish_and_clear();

        let mean_loss = batch_losses.iter().sum::<f64>() / batch_losses.len() as f64;

        self.state.epoch += 1;
        self.state.loss_history.push(mean_loss);
        self.save_checkpoint()?;

        println!(
            "Epoch {} completed. Avg. training loss: {:.6}. Checkpoint saved to {}",
            self.state.epoch,
            mean_loss,
            self.config.checkpoint_path.display()
        );

        Ok(mean_loss)
    }

    /// Forward, loss, backward, optimizer step for a single batch.
    fn train_batch(&mut self, inputs: &tch::Tensor, targets: &tch::Tensor) -> Result<f64, BatchProcessingError> {
        let predictions = self.model.forward(inputs, true);
        let loss = predictions.f_mse_loss(targets, Reduction::Mean)?;

        self.optimizer.zero_grad(self.model.var_store());
        loss.f_backward()?;
        self.optimizer.step(self.model.var_store());

        let loss_value = loss.f_double_value(&[])?;
        if !loss_value.is_finite() {
            return Err(BatchProcessingError::NonFiniteLoss(loss_value));
        }
        Ok(loss_value)
    }

    fn save_checkpoint(&self) -> Result<(), TrainError> {
        let checkpoint = Checkpoint::capture(
            self.state.epoch,
            &self.state.loss_history,
            self.model.var_store(),
            &self.optimizer.export_state(),
        ).map_err(TrainError::CheckpointSave)?;
        checkpoint.save(&self.config.checkpoint_path).map_err(TrainError::CheckpointSave)?;
        Ok(())
    }
}
