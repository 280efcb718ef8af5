#![allow(non_upper_case_globals)]

pub mod utils;
pub mod position;
pub mod encoding;
pub mod dataset;
pub mod trainer;
