use std::path::PathBuf;
use stockling::dataset::EvalDataset;
use stockling::trainer::{EvalMlp, SgdMomentum, TrainConfig, Trainer, DEVICE};

pub const DATA_FILE: &str = "data/evals.csv";
pub const CHECKPOINT_FILE: &str = "checkpoint.bin";

pub const LEARNING_RATE: f64 = 1e-3;
pub const MOMENTUM: f64 = 0.7;
pub const NESTEROV: bool = true;
pub const BATCH_SIZE: usize = 256;
pub const NUM_EPOCHS: usize = 40;
pub const NUM_HIDDEN: i64 = 2048;
pub const LOAD_CHECKPOINT: bool = false;

fn main() {
    let dataset = EvalDataset::from_file(DATA_FILE).expect("Failed to load dataset");
    println!("Loaded {} positions from {}", dataset.len(), DATA_FILE);

    let model = EvalMlp::new(*DEVICE, NUM_HIDDEN);
    let optimizer = SgdMomentum::new(LEARNING_RATE, MOMENTUM, NESTEROV);

    let config = TrainConfig {
        epochs: NUM_EPOCHS,
        batch_size: BATCH_SIZE,
        checkpoint_path: PathBuf::from(CHECKPOINT_FILE),
        load_checkpoint: LOAD_CHECKPOINT,
    };

    let mut trainer = Trainer::initialize(config, model, optimizer).expect("Failed to initialize trainer");
    if LOAD_CHECKPOINT {
        println!("Checkpoint successfully loaded. Resuming from epoch {}", trainer.state().epoch);
    }

    trainer.run(&dataset).expect("Training failed");
    println!("Training completed after {} epochs", trainer.state().epoch);
}
