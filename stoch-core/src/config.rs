use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Order of the Markov chain.
///
/// # Variants
/// - `Zero`: a single histogram, every symbol is drawn from the same table.
/// - `First`: the previous symbol selects the table for the next one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrder {
	Zero,
	#[default]
	First,
}

/// What training does when the counters reach `counter_limit`.
///
/// # Variants
/// - `Reject`: the whole chunk is refused and nothing is counted.
/// - `Saturate`: the chunk is counted up to the limit, the rest is dropped.
///   The training cursor still follows every byte.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
	#[default]
	Reject,
	Saturate,
}

/// Configuration of a model instance.
///
/// # Invariants
/// - `counter_limit` is strictly positive
///
/// Every count is bounded by its table total and every table total by the
/// grand total, so capping the grand total caps every counter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
	/// Markov order (0 or 1).
	pub order: ModelOrder,

	/// Behavior when a chunk does not fit under `counter_limit`.
	pub overflow: OverflowPolicy,

	/// Maximum value of the grand total.
	counter_limit: u64,

	/// Force the last byte of every generated buffer to the terminator.
	pub nul_terminate: bool,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			order: ModelOrder::First,
			overflow: OverflowPolicy::Reject,
			counter_limit: u64::MAX,
			nul_terminate: false,
		}
	}
}

impl ModelConfig {
	/// Returns the current counter limit.
	pub fn counter_limit(&self) -> u64 {
		self.counter_limit
	}

	/// Sets the counter limit.
	///
	/// # Errors
	/// Returns an error if `limit` is zero.
	pub fn set_counter_limit(&mut self, limit: u64) -> Result<()> {
		if limit == 0 {
			return Err(Error::Config("counter limit must be at least 1".to_owned()));
		}
		self.counter_limit = limit;
		Ok(())
	}

	/// Builder-style variant of [`set_counter_limit`](Self::set_counter_limit).
	pub fn with_counter_limit(mut self, limit: u64) -> Result<Self> {
		self.set_counter_limit(limit)?;
		Ok(self)
	}

	pub fn with_order(mut self, order: ModelOrder) -> Self {
		self.order = order;
		self
	}

	pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
		self.overflow = overflow;
		self
	}

	pub fn with_nul_terminate(mut self, nul_terminate: bool) -> Self {
		self.nul_terminate = nul_terminate;
		self
	}

	/// Checks a configuration that did not go through the setters
	/// (e.g. one deserialized from a file).
	pub fn validate(&self) -> Result<()> {
		if self.counter_limit == 0 {
			return Err(Error::Config("counter limit must be at least 1".to_owned()));
		}
		Ok(())
	}
}
