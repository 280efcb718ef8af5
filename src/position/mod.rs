//! This module contains chess position related code.

mod board;
mod fen;
mod position;

pub use board::*;
pub use fen::*;
pub use position::*;
