use thiserror::Error;

/// Errors reported by the model ports.
///
/// None of these leave a partial update behind: a rejected training chunk
/// changes no count, and generation never mutates the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// Caller error, e.g. a zero-sized generation request or a wide training
	/// value that does not fit in a byte.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The injected entropy source could not yield a value.
	#[error("randomness unavailable: {0}")]
	RandomnessUnavailable(String),

	/// A training chunk would push the counters past the configured limit.
	#[error("counter overflow: {requested} observations requested, {available} available")]
	CounterOverflow { requested: u64, available: u64 },

	#[error("invalid configuration: {0}")]
	Config(String),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
