//! Byte-level stochastic text generation.
//!
//! This crate learns how often each byte follows each other byte in a
//! training stream and generates new byte sequences from those counts:
//! - Order-1 (or order-0) Markov model over the 256 byte values
//! - Training in separate chunks that form one continuous stream
//! - Exact weighted sampling with an injected entropy source
//! - Generation that stops at the first sampled zero byte
//!
//! [`StochModel`] is the entry point for embedders: it serializes training,
//! generation and reset under a single lock.

/// Markov model, training, sampling and generation.
pub mod model;

/// Model configuration (order, counter limit, overflow policy).
pub mod config;

/// Entropy sources for sampling.
pub mod entropy;

/// Error type shared by every operation.
pub mod error;

/// Training data loading helpers.
pub mod io;

pub use config::{ModelConfig, ModelOrder, OverflowPolicy};
pub use entropy::{EntropySource, OsEntropy, ScriptedEntropy, SeededEntropy, ThreadEntropy};
pub use error::{Error, Result};
pub use model::generator::{Generated, Generator};
pub use model::stoch_model::StochModel;
pub use model::trainer::Trainer;
pub use model::transition_model::{ModelStats, TransitionModel};
pub use model::{ALPHABET_SIZE, Symbol, TERMINATOR};
