//! Validators, one module per artifact.

pub mod codegen;
pub mod network;
pub mod table;
