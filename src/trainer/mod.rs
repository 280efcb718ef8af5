//! Training side of the crate: the evaluation network, a checkpointable SGD
//! optimizer and the epoch loop controller.

use lazy_static::lazy_static;
use tch::Device;

mod checkpoint;
mod error;
mod eval_mlp;
mod sgd;
mod trainer;

pub use checkpoint::*;
pub use error::*;
pub use eval_mlp::*;
pub use sgd::*;
pub use trainer::*;

lazy_static! {
    pub static ref DEVICE: Device = Device::cuda_if_available();
}
