//! Byte-level Markov model.
//!
//! This module provides:
//! - Per-context next-symbol counts (`FrequencyTable`)
//! - The 256-context transition model (`TransitionModel`)
//! - Weighted inverse-CDF sampling (`sampler`)
//! - Chunked training with a persistent cursor (`Trainer`)
//! - Terminator-aware sequence generation (`Generator`)
//! - A lock-guarded instance exposing the training, generation and reset
//!   ports (`StochModel`)

/// One symbol of trained or generated data.
pub type Symbol = u8;

/// Number of possible symbols, and therefore of contexts.
pub const ALPHABET_SIZE: usize = 256;

/// Symbol that ends generation; trained like any other byte.
pub const TERMINATOR: Symbol = 0;

/// Next-symbol counts for a single context.
pub mod frequency_table;

/// Weighted random choice over a discrete distribution.
pub mod sampler;

/// Context-indexed collection of frequency tables.
///
/// Handles routing, counter limits, start-context choice and merging.
pub mod transition_model;

/// Chunk ingestion keeping the chain continuous across calls.
pub mod trainer;

/// Sequence generation from a read-only model.
pub mod generator;

/// Shared model instance serializing every port call under one lock.
pub mod stoch_model;
