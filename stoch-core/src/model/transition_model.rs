use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelOrder, OverflowPolicy};
use crate::entropy::EntropySource;
use crate::error::{Error, Result};

use super::frequency_table::FrequencyTable;
use super::sampler::pick_weighted;
use super::{ALPHABET_SIZE, Symbol, TERMINATOR};

/// Order-1 byte transition model.
///
/// Holds one [`FrequencyTable`] per possible previous byte (the context),
/// the grand total used to pick a starting context, and the training
/// cursor: the last byte trained, which becomes the context of the next
/// trained byte even across separate training calls.
///
/// # Responsibilities
/// - Route observations to the table of their context
/// - Enforce the counter limit and overflow policy
/// - Pick a starting context proportionally to context totals
/// - Merge with another model
///
/// # Invariants
/// - `contexts.len() == 256`
/// - `grand_total` equals the sum of every context total
/// - `grand_total <= config.counter_limit()`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionModel {
	/// Tables indexed by the previous symbol.
	contexts: Vec<FrequencyTable>,
	grand_total: u64,
	cursor: Symbol,
	config: ModelConfig,
}

/// Summary of a model, suitable for reporting.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelStats {
	/// Total number of observations.
	pub grand_total: u64,
	/// Contexts with at least one observation.
	pub active_contexts: usize,
	/// Distinct `(context, next)` pairs observed.
	pub distinct_transitions: usize,
	/// Last byte trained.
	pub cursor: Symbol,
	/// Observations still allowed under the counter limit.
	pub headroom: u64,
}

impl Default for TransitionModel {
	fn default() -> Self {
		Self::new(ModelConfig::default())
	}
}

impl TransitionModel {
	/// Creates an empty model.
	pub fn new(config: ModelConfig) -> Self {
		Self {
			contexts: vec![FrequencyTable::new(); ALPHABET_SIZE],
			grand_total: 0,
			cursor: TERMINATOR,
			config,
		}
	}

	/// Creates an empty model after validating `config`.
	///
	/// # Errors
	/// Returns `Error::Config` if the configuration is invalid.
	pub fn with_config(config: ModelConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self::new(config))
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn grand_total(&self) -> u64 {
		self.grand_total
	}

	/// Last byte trained (0 on a fresh or reset model).
	pub fn cursor(&self) -> Symbol {
		self.cursor
	}

	pub fn is_empty(&self) -> bool {
		self.grand_total == 0
	}

	/// Table governing the symbol that follows `context`.
	pub fn context(&self, context: Symbol) -> &FrequencyTable {
		&self.contexts[usize::from(context)]
	}

	/// Observations still allowed before the counter limit.
	pub fn headroom(&self) -> u64 {
		self.config.counter_limit() - self.grand_total
	}

	/// Context that a symbol leads to, according to the model order.
	pub fn next_context(&self, symbol: Symbol) -> Symbol {
		match self.config.order {
			ModelOrder::Zero => TERMINATOR,
			ModelOrder::First => symbol,
		}
	}

	/// Resets every context, the grand total and the training cursor.
	///
	/// This is the only reset path; there is no partial clear.
	pub fn clear_all(&mut self) {
		for table in &mut self.contexts {
			table.clear();
		}
		self.grand_total = 0;
		self.cursor = TERMINATOR;
	}

	/// Records that `symbol` followed `previous`.
	///
	/// Does not move the training cursor; see [`Trainer`](super::trainer::Trainer).
	///
	/// # Errors
	/// With `OverflowPolicy::Reject`, returns `CounterOverflow` when the
	/// model is at its counter limit. With `Saturate` the observation is
	/// silently dropped instead.
	pub fn train(&mut self, symbol: Symbol, previous: Symbol) -> Result<()> {
		if self.admit(1)? == 1 {
			self.record(symbol, previous);
		}
		Ok(())
	}

	/// Unchecked observation; callers go through [`admit`](Self::admit) first.
	pub(crate) fn record(&mut self, symbol: Symbol, previous: Symbol) {
		let context = self.next_context(previous);
		self.contexts[usize::from(context)].update(symbol);
		self.grand_total += 1;
	}

	pub(crate) fn set_cursor(&mut self, cursor: Symbol) {
		self.cursor = cursor;
	}

	/// Decides how many of `requested` observations may be recorded.
	///
	/// # Errors
	/// Returns `CounterOverflow` under `OverflowPolicy::Reject` when not all
	/// of them fit.
	pub(crate) fn admit(&self, requested: u64) -> Result<u64> {
		let available = self.headroom();
		if requested <= available {
			return Ok(requested);
		}
		match self.config.overflow {
			OverflowPolicy::Reject => Err(Error::CounterOverflow { requested, available }),
			OverflowPolicy::Saturate => Ok(available),
		}
	}

	/// Picks a starting context proportionally to each context total.
	///
	/// An untrained model, and any order-0 model, always starts from
	/// context 0 without drawing.
	///
	/// # Errors
	/// Propagates a failure of the entropy source.
	pub fn pick_start_context<R: EntropySource + ?Sized>(&self, rng: &mut R) -> Result<Symbol> {
		if self.config.order == ModelOrder::Zero {
			return Ok(TERMINATOR);
		}
		let totals = self.contexts.iter().map(FrequencyTable::total);
		let picked = pick_weighted(totals, self.grand_total, rng)?;
		Ok(picked.map_or(TERMINATOR, |index| index as Symbol))
	}

	/// Merges another model into this one.
	///
	/// # Notes
	/// - Counts of matching contexts are summed
	/// - The training cursor is kept; `other`'s cursor is ignored
	/// - Merging is all or nothing, even under `OverflowPolicy::Saturate`
	///
	/// # Errors
	/// - `InvalidArgument` if the model orders differ
	/// - `CounterOverflow` if the merged grand total would exceed the limit
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.config.order != other.config.order {
			return Err(Error::InvalidArgument(format!(
				"order mismatch: self={:?}, other={:?}",
				self.config.order, other.config.order
			)));
		}

		let available = self.headroom();
		if other.grand_total > available {
			return Err(Error::CounterOverflow { requested: other.grand_total, available });
		}

		for (mine, theirs) in self.contexts.iter_mut().zip(other.contexts.iter()) {
			mine.merge(theirs);
		}
		self.grand_total += other.grand_total;
		Ok(())
	}

	/// Returns a summary of the model.
	pub fn stats(&self) -> ModelStats {
		ModelStats {
			grand_total: self.grand_total,
			active_contexts: self.contexts.iter().filter(|t| !t.is_empty()).count(),
			distinct_transitions: self.contexts.iter().map(FrequencyTable::distinct).sum(),
			cursor: self.cursor,
			headroom: self.headroom(),
		}
	}

	/// Recomputes every sum and compares it with the stored totals.
	pub fn check_invariants(&self) -> bool {
		self.contexts.len() == ALPHABET_SIZE
			&& self.contexts.iter().all(FrequencyTable::is_consistent)
			&& self.contexts.iter().map(FrequencyTable::total).sum::<u64>() == self.grand_total
			&& self.grand_total <= self.config.counter_limit()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entropy::ScriptedEntropy;

	#[test]
	fn test_train_routes_to_previous_context() {
		let mut model = TransitionModel::default();
		model.train(b'b', b'a').unwrap();
		model.train(b'c', b'a').unwrap();
		model.train(b'a', b'b').unwrap();

		assert_eq!(model.context(b'a').count(b'b'), 1);
		assert_eq!(model.context(b'a').count(b'c'), 1);
		assert_eq!(model.context(b'a').total(), 2);
		assert_eq!(model.context(b'b').total(), 1);
		assert_eq!(model.grand_total(), 3);
		assert_eq!(model.cursor(), TERMINATOR);
		assert!(model.check_invariants());
	}

	#[test]
	fn test_clear_all_twice_matches_once() {
		let mut model = TransitionModel::default();
		model.train(1, 2).unwrap();
		model.set_cursor(1);

		model.clear_all();
		let once = model.clone();
		model.clear_all();

		assert_eq!(model, once);
		assert_eq!(model, TransitionModel::default());
	}

	#[test]
	fn test_start_context_empty_model_is_zero() {
		let model = TransitionModel::default();
		let mut rng = ScriptedEntropy::default();
		assert_eq!(model.pick_start_context(&mut rng).unwrap(), 0);
	}

	#[test]
	fn test_start_context_weighted_by_totals() {
		let mut model = TransitionModel::default();
		model.train(b'x', b'a').unwrap();
		model.train(b'x', b'b').unwrap();
		model.train(b'y', b'b').unwrap();

		// cumulative totals: 'a' -> 1, 'b' -> 3
		let mut rng = ScriptedEntropy::new([0, 1, 2]);
		assert_eq!(model.pick_start_context(&mut rng).unwrap(), b'a');
		assert_eq!(model.pick_start_context(&mut rng).unwrap(), b'b');
		assert_eq!(model.pick_start_context(&mut rng).unwrap(), b'b');
	}

	#[test]
	fn test_order_zero_uses_single_context() {
		let config = ModelConfig::default().with_order(ModelOrder::Zero);
		let mut model = TransitionModel::new(config);
		model.train(b'q', b'z').unwrap();
		model.train(b'r', b'q').unwrap();

		assert_eq!(model.context(0).total(), 2);
		assert_eq!(model.stats().active_contexts, 1);
		let mut rng = ScriptedEntropy::default();
		assert_eq!(model.pick_start_context(&mut rng).unwrap(), 0);
	}

	#[test]
	fn test_reject_at_limit() {
		let config = ModelConfig::default().with_counter_limit(2).unwrap();
		let mut model = TransitionModel::new(config);
		model.train(1, 0).unwrap();
		model.train(2, 1).unwrap();

		let err = model.train(3, 2).unwrap_err();
		assert_eq!(err, Error::CounterOverflow { requested: 1, available: 0 });
		assert_eq!(model.grand_total(), 2);
		assert!(model.check_invariants());
	}

	#[test]
	fn test_saturate_at_limit() {
		let config = ModelConfig::default()
			.with_counter_limit(1)
			.unwrap()
			.with_overflow(OverflowPolicy::Saturate);
		let mut model = TransitionModel::new(config);
		model.train(1, 0).unwrap();
		model.train(2, 1).unwrap();

		assert_eq!(model.grand_total(), 1);
		assert_eq!(model.context(1).total(), 0);
		assert!(model.check_invariants());
	}

	#[test]
	fn test_merge() {
		let mut a = TransitionModel::default();
		a.train(b'b', b'a').unwrap();
		let mut b = TransitionModel::default();
		b.train(b'b', b'a').unwrap();
		b.train(b'c', b'b').unwrap();
		b.set_cursor(b'c');

		a.merge(&b).unwrap();
		assert_eq!(a.context(b'a').count(b'b'), 2);
		assert_eq!(a.context(b'b').count(b'c'), 1);
		assert_eq!(a.grand_total(), 3);
		assert_eq!(a.cursor(), TERMINATOR);
		assert!(a.check_invariants());
	}

	#[test]
	fn test_merge_respects_limit_and_order() {
		let config = ModelConfig::default().with_counter_limit(1).unwrap();
		let mut small = TransitionModel::new(config);
		let mut big = TransitionModel::default();
		big.train(1, 0).unwrap();
		big.train(2, 1).unwrap();
		assert!(matches!(small.merge(&big), Err(Error::CounterOverflow { .. })));
		assert!(small.is_empty());

		let mut zero = TransitionModel::new(ModelConfig::default().with_order(ModelOrder::Zero));
		assert!(matches!(zero.merge(&big), Err(Error::InvalidArgument(_))));
	}

	#[test]
	fn test_stats() {
		let mut model = TransitionModel::default();
		model.train(b'b', b'a').unwrap();
		model.train(b'b', b'a').unwrap();
		model.train(b'c', b'a').unwrap();
		model.train(b'a', b'c').unwrap();
		model.set_cursor(b'a');

		let stats = model.stats();
		assert_eq!(stats.grand_total, 4);
		assert_eq!(stats.active_contexts, 2);
		assert_eq!(stats.distinct_transitions, 3);
		assert_eq!(stats.cursor, b'a');
		assert_eq!(stats.headroom, u64::MAX - 4);
	}
}
