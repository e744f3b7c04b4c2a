use crate::entropy::EntropySource;
use crate::error::Result;

/// Picks an index proportionally to its weight (inverse-CDF sampling).
///
/// Draws `r` uniformly in `[0, total)` and walks the weights in ascending
/// index order, returning the first index whose cumulative weight exceeds
/// `r`. Index `i` is therefore returned for exactly `weights[i]` of the
/// `total` possible draws, and a lower index wins any tie.
///
/// `total` must equal the sum of `weights`. Returns `Ok(None)` without
/// drawing anything when `total` is zero.
///
/// # Errors
/// Propagates a failure of the entropy source.
pub fn pick_weighted<I, R>(weights: I, total: u64, rng: &mut R) -> Result<Option<usize>>
where
	I: IntoIterator<Item = u64>,
	R: EntropySource + ?Sized,
{
	if total == 0 {
		return Ok(None);
	}

	let r = rng.below(total)?;

	let mut cumulative: u64 = 0;
	let mut fallback = None;
	for (index, weight) in weights.into_iter().enumerate() {
		if weight == 0 {
			continue;
		}
		cumulative += weight;
		if cumulative > r {
			return Ok(Some(index));
		}
		fallback = Some(index);
	}

	// Only reachable if `total` overstates the weights.
	Ok(fallback)
}
