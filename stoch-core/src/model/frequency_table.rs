use crate::entropy::EntropySource;
use crate::error::Result;

use super::sampler::pick_weighted;
use super::{ALPHABET_SIZE, Symbol};

/// Next-symbol counts for one context.
///
/// Conceptually a node of the Markov chain: outgoing edges are weighted by
/// the number of times each next symbol was observed after this context.
///
/// ## Invariants
/// - `total` equals the sum of `counts`; both are updated together and
///   `total` is never recomputed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
	/// Occurrences per next symbol, indexed by symbol value.
	counts: [u64; ALPHABET_SIZE],
	total: u64,
}

impl Default for FrequencyTable {
	fn default() -> Self {
		Self::new()
	}
}

impl FrequencyTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self {
			counts: [0; ALPHABET_SIZE],
			total: 0,
		}
	}

	/// Records one occurrence of `symbol`.
	///
	/// The caller (the transition model) guarantees headroom under its
	/// counter limit.
	pub fn update(&mut self, symbol: Symbol) {
		self.counts[usize::from(symbol)] += 1;
		self.total += 1;
	}

	/// Resets every count and the total to zero.
	pub fn clear(&mut self) {
		self.counts = [0; ALPHABET_SIZE];
		self.total = 0;
	}

	pub fn count(&self, symbol: Symbol) -> u64 {
		self.counts[usize::from(symbol)]
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn is_empty(&self) -> bool {
		self.total == 0
	}

	/// Number of symbols observed at least once.
	pub fn distinct(&self) -> usize {
		self.counts.iter().filter(|&&c| c > 0).count()
	}

	/// Iterates over `(symbol, count)` for every observed symbol.
	pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
		(0..=Symbol::MAX)
			.zip(self.counts.iter().copied())
			.filter(|&(_, count)| count > 0)
	}

	/// Draws the next symbol proportionally to its count.
	///
	/// Returns `Ok(None)` without touching the entropy source if nothing was
	/// ever recorded in this table.
	pub fn sample_one<R: EntropySource + ?Sized>(&self, rng: &mut R) -> Result<Option<Symbol>> {
		let picked = pick_weighted(self.counts.iter().copied(), self.total, rng)?;
		// Indices come from a 256-entry table
		Ok(picked.map(|index| index as Symbol))
	}

	/// Adds every count of `other` into this table.
	///
	/// Used when merging models; the caller checks the counter limit.
	pub fn merge(&mut self, other: &Self) {
		for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
			*mine += theirs;
		}
		self.total += other.total;
	}

	/// Whether `total` still matches the sum of the counts.
	pub fn is_consistent(&self) -> bool {
		self.counts.iter().sum::<u64>() == self.total
	}
}
