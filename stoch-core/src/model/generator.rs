use tracing::debug;

use crate::entropy::EntropySource;
use crate::error::{Error, Result};

use super::transition_model::TransitionModel;
use super::{Symbol, TERMINATOR};

/// Output of one generation call.
///
/// `bytes` always has the requested length. Only the first `logical_len`
/// bytes are meaningful; the rest is zero padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
	pub bytes: Vec<u8>,
	pub logical_len: usize,
}

impl Generated {
	/// The symbols emitted before the terminator.
	pub fn meaningful(&self) -> &[u8] {
		&self.bytes[..self.logical_len]
	}

	/// Whether a terminator was sampled (or forced) inside the buffer.
	pub fn terminated(&self) -> bool {
		self.logical_len < self.bytes.len()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
	Active,
	/// Absorbing for the rest of the call.
	Terminated,
}

/// Read-only view of a model that produces byte sequences.
///
/// Generation borrows the model immutably: it can never change counts or
/// the training cursor.
pub struct Generator<'a> {
	model: &'a TransitionModel,
}

impl<'a> Generator<'a> {
	pub fn new(model: &'a TransitionModel) -> Self {
		Self { model }
	}

	/// Fills `buffer` with generated symbols and returns the logical length.
	///
	/// # Behavior
	/// - Untrained model: the buffer is zeroed and the logical length is 0
	/// - Otherwise a start context is picked proportionally to context
	///   totals, then each symbol is sampled from the table of the previous
	///   one (a context with no observations yields the terminator)
	/// - The first sampled terminator ends sampling: its position is the
	///   logical length and every later position is zero
	/// - With `nul_terminate`, the last position is forced to zero
	///
	/// # Errors
	/// - `InvalidArgument` if `buffer` is empty
	/// - `RandomnessUnavailable` from the entropy source; the buffer content
	///   is then unspecified but the model is unchanged
	pub fn fill<R: EntropySource + ?Sized>(&self, buffer: &mut [u8], rng: &mut R) -> Result<usize> {
		if buffer.is_empty() {
			return Err(Error::InvalidArgument("requested size must be at least 1".to_owned()));
		}

		let size = buffer.len();
		let mut logical_len = if self.model.is_empty() {
			buffer.fill(TERMINATOR);
			0
		} else {
			self.sample_chain(buffer, rng)?
		};

		if self.model.config().nul_terminate {
			buffer[size - 1] = TERMINATOR;
			logical_len = logical_len.min(size - 1);
		}

		debug!(size, logical_len, "generated");
		Ok(logical_len)
	}

	/// Allocates a buffer of `size` bytes and fills it.
	///
	/// # Errors
	/// Same as [`fill`](Self::fill); `size == 0` is rejected before allocating.
	pub fn generate<R: EntropySource + ?Sized>(&self, size: usize, rng: &mut R) -> Result<Generated> {
		if size == 0 {
			return Err(Error::InvalidArgument("requested size must be at least 1".to_owned()));
		}
		let mut bytes = vec![TERMINATOR; size];
		let logical_len = self.fill(&mut bytes, rng)?;
		Ok(Generated { bytes, logical_len })
	}

	fn sample_chain<R: EntropySource + ?Sized>(&self, buffer: &mut [u8], rng: &mut R) -> Result<usize> {
		let mut context: Symbol = self.model.pick_start_context(rng)?;
		debug!(context, "start context");

		let mut phase = Phase::Active;
		let mut logical_len = buffer.len();
		for (i, slot) in buffer.iter_mut().enumerate() {
			match phase {
				Phase::Active => {
					let symbol = self.model.context(context).sample_one(rng)?.unwrap_or(TERMINATOR);
					*slot = symbol;
					context = self.model.next_context(symbol);
					if symbol == TERMINATOR {
						logical_len = i;
						phase = Phase::Terminated;
					}
				}
				Phase::Terminated => *slot = TERMINATOR,
			}
		}
		Ok(logical_len)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{ModelConfig, ModelOrder};
	use crate::entropy::{ScriptedEntropy, SeededEntropy};
	use crate::model::trainer::Trainer;

	fn trained(config: ModelConfig, data: &[u8]) -> TransitionModel {
		let mut model = TransitionModel::new(config);
		Trainer::new(&mut model).ingest(data).unwrap();
		model
	}

	#[test]
	fn test_empty_model_yields_zeros() {
		let model = TransitionModel::default();
		let mut rng = ScriptedEntropy::default();
		for size in [1, 2, 64] {
			let out = Generator::new(&model).generate(size, &mut rng).unwrap();
			assert_eq!(out.bytes, vec![0; size]);
			assert_eq!(out.logical_len, 0);
			assert!(out.meaningful().is_empty());
		}
	}

	#[test]
	fn test_zero_size_is_invalid() {
		let model = TransitionModel::default();
		let mut rng = ScriptedEntropy::default();
		let generator = Generator::new(&model);
		assert!(matches!(generator.generate(0, &mut rng), Err(Error::InvalidArgument(_))));
		assert!(matches!(generator.fill(&mut [], &mut rng), Err(Error::InvalidArgument(_))));
	}

	#[test]
	fn test_single_path_chain() {
		// contexts: 0 -> 'A' (3), 'A' -> 0 (3)
		let model = trained(ModelConfig::default(), b"A\0A\0A\0");
		// start draw 0 lands on context 0, then each table has a single symbol
		let mut rng = ScriptedEntropy::new([0, 0, 0]);
		let out = Generator::new(&model).generate(8, &mut rng).unwrap();

		assert_eq!(out.bytes, b"A\0\0\0\0\0\0\0".to_vec());
		assert_eq!(out.logical_len, 1);
		assert_eq!(out.meaningful(), b"A");
		assert!(out.terminated());
		// no draws after the terminator
		assert_eq!(rng.remaining(), 0);
	}

	#[test]
	fn test_no_terminator_fills_whole_buffer() {
		// "ab" loops: 0 -> a, a -> b, b -> a
		let model = trained(ModelConfig::default(), b"ababa");
		let mut rng = SeededEntropy::new(3);
		let out = Generator::new(&model).generate(16, &mut rng).unwrap();

		assert_eq!(out.logical_len, 16);
		assert!(!out.terminated());
		assert!(out.bytes.windows(2).all(|w| w[0] != w[1]));
	}

	#[test]
	fn test_unseen_context_acts_as_terminator() {
		// 'x' never precedes anything
		let model = trained(ModelConfig::default(), b"x");
		let mut rng = ScriptedEntropy::new([0, 0]);
		let out = Generator::new(&model).generate(4, &mut rng).unwrap();
		assert_eq!(out.bytes, vec![b'x', 0, 0, 0]);
		assert_eq!(out.logical_len, 1);
		assert_eq!(rng.remaining(), 0);
	}

	#[test]
	fn test_size_one() {
		let model = trained(ModelConfig::default(), b"hello\0");
		let mut rng = SeededEntropy::new(11);
		for _ in 0..50 {
			let out = Generator::new(&model).generate(1, &mut rng).unwrap();
			assert_eq!(out.bytes.len(), 1);
			assert!(out.logical_len <= 1);
		}
	}

	#[test]
	fn test_nul_terminate_forces_last_byte() {
		let model = trained(ModelConfig::default().with_nul_terminate(true), b"ababa");
		let mut rng = SeededEntropy::new(5);
		let out = Generator::new(&model).generate(6, &mut rng).unwrap();
		assert_eq!(out.bytes[5], 0);
		assert_eq!(out.logical_len, 5);
	}

	#[test]
	fn test_order_zero_does_not_chain() {
		let config = ModelConfig::default().with_order(ModelOrder::Zero);
		let model = trained(config, b"aab");
		// cumulative: 'a' -> 2, 'b' -> 3
		let mut rng = ScriptedEntropy::new([2, 0, 1, 2]);
		let out = Generator::new(&model).generate(4, &mut rng).unwrap();
		assert_eq!(out.bytes, b"baab".to_vec());
		assert_eq!(out.logical_len, 4);
	}

	#[test]
	fn test_entropy_failure_propagates() {
		let model = trained(ModelConfig::default(), b"abc");
		let mut rng = ScriptedEntropy::new([0]);
		let err = Generator::new(&model).generate(8, &mut rng).unwrap_err();
		assert!(matches!(err, Error::RandomnessUnavailable(_)));
	}

	#[test]
	fn test_same_seed_same_output() {
		let model = trained(ModelConfig::default(), b"the quick brown fox jumps over the lazy dog\0");
		let before = model.clone();
		let a = Generator::new(&model).generate(64, &mut SeededEntropy::new(99)).unwrap();
		let b = Generator::new(&model).generate(64, &mut SeededEntropy::new(99)).unwrap();
		assert_eq!(a, b);
		assert_eq!(model, before);
	}
}
