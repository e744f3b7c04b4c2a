use tracing::{trace, warn};

use crate::error::{Error, Result};

use super::Symbol;
use super::transition_model::TransitionModel;

/// Feeds training chunks into a [`TransitionModel`].
///
/// Each chunk continues the chain left by the previous one: the model's
/// cursor is the context of the first byte, so `ingest(a); ingest(b)` is
/// the same as `ingest(a + b)`.
pub struct Trainer<'a> {
	model: &'a mut TransitionModel,
}

impl<'a> Trainer<'a> {
	pub fn new(model: &'a mut TransitionModel) -> Self {
		Self { model }
	}

	/// Trains on one chunk of bytes and returns the number of bytes consumed.
	///
	/// # Behavior
	/// - For each byte `x`: count `x` under the cursor's context, then make
	///   `x` the cursor
	/// - An empty chunk is a no-op
	/// - Under `OverflowPolicy::Saturate`, bytes past the counter limit are
	///   consumed but not counted
	///
	/// # Errors
	/// Under `OverflowPolicy::Reject`, returns `CounterOverflow` when the
	/// chunk does not fit; the model and its cursor are left untouched.
	pub fn ingest(&mut self, buffer: &[u8]) -> Result<usize> {
		let requested = buffer.len() as u64;
		let accepted = self.model.admit(requested)?;
		if accepted < requested {
			warn!(requested, accepted, "counter limit reached, dropping observations");
		}

		let mut cursor = self.model.cursor();
		for (i, &symbol) in buffer.iter().enumerate() {
			if (i as u64) < accepted {
				self.model.record(symbol, cursor);
			}
			cursor = symbol;
		}
		self.model.set_cursor(cursor);

		trace!(bytes = buffer.len(), cursor, grand_total = self.model.grand_total(), "chunk ingested");
		Ok(buffer.len())
	}

	/// Trains on values wider than a byte.
	///
	/// Every value is checked before anything is counted, so a rejected
	/// chunk leaves the model untouched.
	///
	/// # Errors
	/// - `InvalidArgument` naming the first value above 255
	/// - the errors of [`ingest`](Self::ingest)
	pub fn ingest_wide(&mut self, values: &[u32]) -> Result<usize> {
		let bytes = values
			.iter()
			.enumerate()
			.map(|(position, &value)| {
				Symbol::try_from(value).map_err(|_| {
					Error::InvalidArgument(format!("symbol {value} at position {position} is out of range 0..=255"))
				})
			})
			.collect::<Result<Vec<_>>>()?;
		self.ingest(&bytes)
	}
}
