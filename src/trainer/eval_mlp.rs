use tch::{nn, Device, Tensor};
use crate::encoding::NUM_FEATURES;

/// Capability surface the training loop needs from a model: produce a
/// prediction, and expose its variable store so an optimizer can update the
/// parameters and a checkpoint can serialize them. Any regression network
/// satisfying this trait is substitutable without touching the trainer.
pub trait ValueNetwork {
    fn forward(&self, x: &Tensor, train: bool) -> Tensor;
    fn var_store(&self) -> &nn::VarStore;
    fn var_store_mut(&mut self) -> &mut nn::VarStore;
}

/// Feed-forward evaluation network: 768 input cells, one hidden layer, one
/// scalar output.
#[derive(Debug)]
pub struct EvalMlp {
    pub vs: nn::VarStore,
    fc1: nn::Linear,
    fc2: nn::Linear,
}

impl EvalMlp {
    pub fn new(device: Device, num_hidden: i64) -> EvalMlp {
        let vs = nn::VarStore::new(device);
        let root = vs.root();

        let fc1 = nn::linear(&root / "fc1", NUM_FEATURES as i64, num_hidden, Default::default());
        let fc2 = nn::linear(&root / "fc2", num_hidden, 1, Default::default());

        EvalMlp {
            vs,
            fc1,
            fc2,
        }
    }
}

impl ValueNetwork for EvalMlp {
    fn forward(&self, x: &Tensor, _train: bool) -> Tensor {
        assert!(x.size().len() >= 2);

        x.view([-1, NUM_FEATURES as i64])
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
    }

    fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }
}
