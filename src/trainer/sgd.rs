use std::collections::HashMap;
use tch::{nn, Tensor};
use crate::trainer::checkpoint::ordered_variables;

/// Stochastic gradient descent with momentum and optional Nesterov
/// correction, applied directly to the variables of a store.
///
/// Unlike `tch`'s built-in optimizers this keeps its momentum buffers as
/// named tensors, so the full optimizer state can travel inside a checkpoint
/// and a resumed run continues with the same velocity it stopped with.
#[derive(Debug)]
pub struct SgdMomentum {
    learning_rate: f64,
    momentum: f64,
    nesterov: bool,
    velocity: HashMap<String, Tensor>,
}

impl SgdMomentum {
    pub fn new(learning_rate: f64, momentum: f64, nesterov: bool) -> SgdMomentum {
        SgdMomentum {
            learning_rate,
            momentum,
            nesterov,
            velocity: HashMap::new(),
        }
    }

    pub fn zero_grad(&self, vs: &nn::VarStore) {
        for (_, mut variable) in vs.variables() {
            if variable.requires_grad() {
                variable.zero_grad();
            }
        }
    }

    /// One update step over every variable that has a gradient:
    /// `v <- momentum * v + g`, then `theta <- theta - lr * d` where `d` is
    /// `g + momentum * v` under Nesterov and `v` otherwise.
    pub fn step(&mut self, vs: &nn::VarStore) {
        tch::no_grad(|| {
            for (name, mut variable) in ordered_variables(vs) {
                let grad = variable.grad();
                if !grad.defined() {
                    continue;
                }

                let velocity = self
                    .velocity
                    .entry(name)
                    .or_insert_with(|| variable.zeros_like());
                let accumulated = &*velocity * self.momentum + &grad;
                velocity.copy_(&accumulated);

                let update = if self.nesterov {
                    &grad + &*velocity * self.momentum
                } else {
                    velocity.shallow_clone()
                };
                let updated = &variable - update * self.learning_rate;
                variable.copy_(&updated);
            }
        });
    }

    /// Momentum buffers in name order, for checkpointing.
    pub fn export_state(&self) -> Vec<(String, Tensor)> {
        let mut state: Vec<(String, Tensor)> = self
            .velocity
            .iter()
            .map(|(name, tensor)| (name.clone(), tensor.shallow_clone()))
            .collect();
        state.sort_by(|a, b| a.0.cmp(&b.0));
        state
    }

    pub fn import_state(&mut self, state: Vec<(String, Tensor)>) {
        self.velocity = state.into_iter().collect();
    }
}
