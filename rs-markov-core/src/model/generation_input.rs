use std::fmt;
use std::str::FromStr;

use crate::error::{ChainError, Result};

/// Hard cap on token selections per generated sentence.
pub const DEFAULT_MAX_STEPS: usize = 42;

/// Rule used to pick the next token from a context's distribution.
///
/// # Variants
/// - `Compatible`: the historical candidate-set rule. Output matches
///   previously generated texts for a given model and seed, but it does not
///   draw tokens with their learned probability.
/// - `Weighted`: a statistically faithful weighted draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplingMode {
	#[default]
	Compatible,
	Weighted,
}

impl FromStr for SamplingMode {
	type Err = ChainError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"compatible" => Ok(Self::Compatible),
			"weighted" => Ok(Self::Weighted),
			other => Err(ChainError::invalid_parameter(format!(
				"sampling mode must be 'compatible' or 'weighted', got '{other}'"
			))),
		}
	}
}

impl fmt::Display for SamplingMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Compatible => f.write_str("compatible"),
			Self::Weighted => f.write_str("weighted"),
		}
	}
}

/// Input parameters of a generation run.
///
/// # Responsibilities
/// - Track the seed, sentence count and sampling rule
/// - Bound the work done per sentence (`max_steps`)
///
/// # Invariants
/// - `max_steps >= 1`
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationInput {
	/// Seed of the random source, applied once per run.
	pub seed: u64,

	/// Sampling rule used at every step.
	pub sampling: SamplingMode,

	/// Number of sentences to produce.
	sentence_count: usize,

	/// Maximum number of token selections per sentence.
	max_steps: usize,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			seed: 42,
			sampling: SamplingMode::Compatible,
			sentence_count: 1,
			max_steps: DEFAULT_MAX_STEPS,
		}
	}
}

impl GenerationInput {
	/// Creates an input producing `sentence_count` sentences from `seed`.
	///
	/// A count of 0 is valid and yields an empty text.
	pub fn new(seed: u64, sentence_count: usize) -> Self {
		Self { seed, sentence_count, ..Self::default() }
	}

	pub fn sentence_count(&self) -> usize {
		self.sentence_count
	}

	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Sets the number of sentences to generate.
	pub fn set_sentence_count(&mut self, sentence_count: usize) {
		self.sentence_count = sentence_count;
	}

	/// Sets the per-sentence step cap.
	///
	/// # Errors
	/// Returns an error if `max_steps` is 0.
	pub fn set_max_steps(&mut self, max_steps: usize) -> Result<()> {
		if max_steps == 0 {
			return Err(ChainError::invalid_parameter("max steps must be >= 1"));
		}
		self.max_steps = max_steps;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_follow_historical_generator() {
		let input = GenerationInput::default();
		assert_eq!(input.max_steps(), 42);
		assert_eq!(input.sampling, SamplingMode::Compatible);
	}

	#[test]
	fn rejects_zero_step_cap() {
		let mut input = GenerationInput::new(1, 3);
		assert!(input.set_max_steps(0).is_err());
		assert_eq!(input.max_steps(), DEFAULT_MAX_STEPS);
		assert_eq!(input.sentence_count(), 3);
	}

	#[test]
	fn accepts_zero_sentences() {
		let mut input = GenerationInput::new(1, 0);
		assert_eq!(input.sentence_count(), 0);
		input.set_sentence_count(4);
		assert_eq!(input.sentence_count(), 4);
	}

	#[test]
	fn parses_sampling_mode() {
		assert_eq!("weighted".parse::<SamplingMode>().unwrap(), SamplingMode::Weighted);
		assert_eq!("Compatible".parse::<SamplingMode>().unwrap(), SamplingMode::Compatible);
		assert!("uniform".parse::<SamplingMode>().is_err());
		assert_eq!(SamplingMode::Weighted.to_string(), "weighted");
	}
}
