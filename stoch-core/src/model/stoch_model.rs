use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::config::ModelConfig;
use crate::entropy::EntropySource;
use crate::error::{Error, Result};

use super::generator::{Generated, Generator};
use super::trainer::Trainer;
use super::transition_model::{ModelStats, TransitionModel};

/// A model instance owned by the embedding application.
///
/// Every port call takes the same exclusive lock for its whole duration, so
/// a generation never observes a half-applied training chunk and a training
/// chunk never interleaves with a reset. The entropy source is supplied per
/// call and is not covered by the lock.
///
/// # Lifecycle
/// construct, then any number of `train` / `generate` calls, optionally
/// `reset`. Learned state lives only as long as this value.
#[derive(Debug, Default)]
pub struct StochModel {
	inner: Mutex<TransitionModel>,
}

impl StochModel {
	/// Creates an empty model.
	///
	/// # Errors
	/// Returns `Error::Config` if the configuration is invalid.
	pub fn new(config: ModelConfig) -> Result<Self> {
		let model = TransitionModel::with_config(config)?;
		Ok(Self { inner: Mutex::new(model) })
	}

	/// Wraps an existing model.
	pub fn from_model(model: TransitionModel) -> Self {
		Self { inner: Mutex::new(model) }
	}

	// Every update leaves the model consistent before it can panic, so a
	// poisoned lock still guards a valid model.
	fn lock(&self) -> MutexGuard<'_, TransitionModel> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Ingestion port: trains on one chunk and returns the bytes consumed.
	pub fn train(&self, bytes: &[u8]) -> Result<usize> {
		let mut model = self.lock();
		Trainer::new(&mut model).ingest(bytes)
	}

	/// Ingestion port for inputs wider than a byte.
	pub fn train_wide(&self, values: &[u32]) -> Result<usize> {
		let mut model = self.lock();
		Trainer::new(&mut model).ingest_wide(values)
	}

	/// Generation port: produces exactly `size` bytes.
	///
	/// # Errors
	/// - `InvalidArgument` if `size` is zero
	/// - `RandomnessUnavailable` if `rng` fails
	pub fn generate<R: EntropySource + ?Sized>(&self, size: usize, rng: &mut R) -> Result<Generated> {
		if size == 0 {
			return Err(Error::InvalidArgument("requested size must be at least 1".to_owned()));
		}
		let model = self.lock();
		Generator::new(&model).generate(size, rng)
	}

	/// Generation port writing into a caller-owned buffer.
	pub fn fill<R: EntropySource + ?Sized>(&self, buffer: &mut [u8], rng: &mut R) -> Result<usize> {
		let model = self.lock();
		Generator::new(&model).fill(buffer, rng)
	}

	/// Reset operation: clears every count and the training cursor.
	pub fn reset(&self) {
		self.lock().clear_all();
		info!("model reset");
	}

	/// Merges a separately trained model into this one.
	pub fn merge(&self, other: &TransitionModel) -> Result<()> {
		self.lock().merge(other)
	}

	pub fn stats(&self) -> ModelStats {
		self.lock().stats()
	}

	pub fn config(&self) -> ModelConfig {
		self.lock().config().clone()
	}

	/// Copy of the current model state.
	pub fn snapshot(&self) -> TransitionModel {
		self.lock().clone()
	}
}
