use std::collections::VecDeque;

use rand::rngs::{OsRng, StdRng, ThreadRng};
use rand::{Rng, RngCore, SeedableRng, TryRngCore};

use crate::error::{Error, Result};

/// Source of randomness injected into sampling.
///
/// The model never owns one: every generation call borrows the caller's
/// source, so each thread can bring its own without any shared lock.
pub trait EntropySource {
	/// Returns 64 uniformly distributed bits.
	fn next_u64(&mut self) -> Result<u64>;

	/// Returns a uniformly distributed integer in `[0, bound)`.
	///
	/// The default implementation rejects the top `2^64 mod bound` values
	/// of `next_u64` so every result is equally likely.
	///
	/// # Errors
	/// - `InvalidArgument` if `bound` is zero
	/// - whatever `next_u64` reports
	fn below(&mut self, bound: u64) -> Result<u64> {
		if bound == 0 {
			return Err(Error::InvalidArgument("sampling bound must be positive".to_owned()));
		}
		// 2^64 mod bound
		let excess = (u64::MAX % bound + 1) % bound;
		loop {
			let value = self.next_u64()?;
			if excess == 0 || value <= u64::MAX - excess {
				return Ok(value % bound);
			}
		}
	}
}

impl<T: EntropySource + ?Sized> EntropySource for &mut T {
	fn next_u64(&mut self) -> Result<u64> {
		(**self).next_u64()
	}

	fn below(&mut self, bound: u64) -> Result<u64> {
		(**self).below(bound)
	}
}

impl<T: EntropySource + ?Sized> EntropySource for Box<T> {
	fn next_u64(&mut self) -> Result<u64> {
		(**self).next_u64()
	}

	fn below(&mut self, bound: u64) -> Result<u64> {
		(**self).below(bound)
	}
}

/// Operating system entropy. The only source here that can actually fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
	fn next_u64(&mut self) -> Result<u64> {
		OsRng
			.try_next_u64()
			.map_err(|e| Error::RandomnessUnavailable(e.to_string()))
	}
}

/// rand's thread-local generator. Construct one per thread.
#[derive(Debug, Clone)]
pub struct ThreadEntropy {
	rng: ThreadRng,
}

impl ThreadEntropy {
	pub fn new() -> Self {
		Self { rng: rand::rng() }
	}
}

impl Default for ThreadEntropy {
	fn default() -> Self {
		Self::new()
	}
}

impl EntropySource for ThreadEntropy {
	fn next_u64(&mut self) -> Result<u64> {
		Ok(self.rng.next_u64())
	}

	fn below(&mut self, bound: u64) -> Result<u64> {
		if bound == 0 {
			return Err(Error::InvalidArgument("sampling bound must be positive".to_owned()));
		}
		Ok(self.rng.random_range(0..bound))
	}
}

/// Reproducible generator: the same seed always yields the same draws.
#[derive(Debug, Clone)]
pub struct SeededEntropy {
	rng: StdRng,
}

impl SeededEntropy {
	pub fn new(seed: u64) -> Self {
		Self { rng: StdRng::seed_from_u64(seed) }
	}
}

impl EntropySource for SeededEntropy {
	fn next_u64(&mut self) -> Result<u64> {
		Ok(self.rng.next_u64())
	}

	fn below(&mut self, bound: u64) -> Result<u64> {
		if bound == 0 {
			return Err(Error::InvalidArgument("sampling bound must be positive".to_owned()));
		}
		Ok(self.rng.random_range(0..bound))
	}
}

/// A fixed queue of draws, consumed front to back.
///
/// `below(bound)` returns the next queued value reduced modulo `bound`, so
/// queuing values smaller than the bound selects an exact position in the
/// cumulative distribution. Once the queue is empty every call reports
/// `RandomnessUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEntropy {
	values: VecDeque<u64>,
}

impl ScriptedEntropy {
	pub fn new<I: IntoIterator<Item = u64>>(values: I) -> Self {
		Self { values: values.into_iter().collect() }
	}

	/// Number of draws left.
	pub fn remaining(&self) -> usize {
		self.values.len()
	}
}

impl EntropySource for ScriptedEntropy {
	fn next_u64(&mut self) -> Result<u64> {
		self.values
			.pop_front()
			.ok_or_else(|| Error::RandomnessUnavailable("scripted entropy exhausted".to_owned()))
	}

	fn below(&mut self, bound: u64) -> Result<u64> {
		if bound == 0 {
			return Err(Error::InvalidArgument("sampling bound must be positive".to_owned()));
		}
		Ok(self.next_u64()? % bound)
	}
}
