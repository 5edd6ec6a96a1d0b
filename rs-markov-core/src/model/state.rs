use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::generation_input::SamplingMode;

/// Raw transition counts observed after one context.
///
/// A `State` is stored under its context key (tokens joined by a single
/// space) and counts how many times each next token followed it during
/// training.
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
#[derive(Clone, Debug, Default)]
pub struct State {
	/// Outgoing transitions indexed by the next token.
	/// Example: { "cat" => 2, "dog" => 1 }
	transitions: HashMap<String, usize>,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self { transitions: HashMap::new() }
	}

	/// Records an occurrence of a transition toward `next_token`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_token: &str) {
		*self.transitions.entry(next_token.to_owned()).or_insert(0) += 1;
	}

	/// Number of times `next_token` followed this context.
	pub fn count(&self, next_token: &str) -> usize {
		self.transitions.get(next_token).copied().unwrap_or(0)
	}

	/// Total number of observed transitions.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Iterates over `(next_token, occurrence)` pairs, in no particular order.
	pub fn transitions(&self) -> impl Iterator<Item = (&str, usize)> {
		self.transitions.iter().map(|(token, occurrence)| (token.as_str(), *occurrence))
	}

	/// Converts the counts into a probability distribution.
	///
	/// Every token gets `count / total`. No smoothing is applied.
	pub fn normalize(&self) -> Distribution {
		let total = self.total() as f64;
		let probabilities = self
			.transitions
			.iter()
			.map(|(token, occurrence)| (token.clone(), *occurrence as f64 / total))
			.collect();
		Distribution { probabilities }
	}
}

/// Normalized next-token distribution of one context.
///
/// This is the unit persisted by the model store; it serializes as a plain
/// `token -> probability` map. Tokens are kept sorted so that scanning order,
/// and hence seeded sampling, is stable across processes.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Distribution {
	probabilities: BTreeMap<String, f64>,
}

impl Distribution {
	/// Probability of `token`, if it was ever seen after this context.
	pub fn probability(&self, token: &str) -> Option<f64> {
		self.probabilities.get(token).copied()
	}

	/// Iterates over `(token, probability)` pairs in token order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.probabilities.iter().map(|(token, p)| (token.as_str(), *p))
	}

	pub fn len(&self) -> usize {
		self.probabilities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.probabilities.is_empty()
	}

	/// Sum of all probabilities (1.0 for a trained context).
	pub fn total(&self) -> f64 {
		self.probabilities.values().sum()
	}

	/// Picks the next token following `mode`.
	///
	/// Returns `None` if the distribution is empty.
	pub fn sample<R: Rng>(&self, mode: SamplingMode, rng: &mut R) -> Option<&str> {
		match mode {
			SamplingMode::Compatible => self.sample_compatible(rng),
			SamplingMode::Weighted => self.sample_weighted(rng),
		}
	}

	/// Candidate-set draw used by the historical generator.
	///
	/// A uniform `sample` in [0, 1) is drawn. Every token whose probability
	/// is strictly below `sample` becomes a candidate and one candidate is
	/// picked uniformly. Without candidates, the first token holding the
	/// highest probability is returned. This is not a draw from the
	/// distribution: rare tokens are favoured.
	fn sample_compatible<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		let sample: f64 = rng.random();

		let mut best_token: Option<&str> = None;
		let mut maximum = 0.0;
		let mut candidates: Vec<&str> = Vec::new();
		for (token, p) in self.iter() {
			if maximum < p {
				best_token = Some(token);
				maximum = p;
			}
			if sample > p {
				candidates.push(token);
			}
		}

		match candidates.choose(rng) {
			Some(token) => Some(*token),
			None => best_token,
		}
	}

	/// Weighted random sampling: a token is picked with its own probability.
	///
	/// Performs a single cumulative subtraction over the tokens.
	fn sample_weighted<R: Rng>(&self, rng: &mut R) -> Option<&str> {
		let mut r: f64 = rng.random();

		let mut fallback: Option<&str> = None;
		for (token, p) in self.iter() {
			if r < p {
				return Some(token);
			}
			r -= p;
			fallback = Some(token);
		}

		// Rounding can leave a tiny remainder past the last bucket
		fallback
	}
}

impl FromIterator<(String, f64)> for Distribution {
	fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
		Self { probabilities: iter.into_iter().collect() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	fn state(transitions: &[(&str, usize)]) -> State {
		let mut state = State::new();
		for (token, occurrence) in transitions {
			for _ in 0..*occurrence {
				state.add_transition(token);
			}
		}
		state
	}

	#[test]
	fn counts_transitions() {
		let state = state(&[("cat", 3), ("dog", 1)]);
		assert_eq!(state.count("cat"), 3);
		assert_eq!(state.count("dog"), 1);
		assert_eq!(state.count("cow"), 0);
		assert_eq!(state.total(), 4);
	}

	#[test]
	fn normalize_divides_by_total() {
		let distribution = state(&[("cat", 3), ("dog", 1)]).normalize();
		assert_eq!(distribution.probability("cat"), Some(0.75));
		assert_eq!(distribution.probability("dog"), Some(0.25));
		assert!((distribution.total() - 1.0).abs() < 1e-9);
	}

	#[test]
	fn single_token_is_always_picked() {
		let distribution = state(&[("cat", 5)]).normalize();
		let mut rng = ChaCha8Rng::seed_from_u64(7);
		for mode in [SamplingMode::Compatible, SamplingMode::Weighted] {
			for _ in 0..50 {
				assert_eq!(distribution.sample(mode, &mut rng), Some("cat"));
			}
		}
	}

	#[test]
	fn empty_distribution_samples_nothing() {
		let distribution = Distribution::default();
		let mut rng = ChaCha8Rng::seed_from_u64(7);
		assert_eq!(distribution.sample(SamplingMode::Compatible, &mut rng), None);
		assert_eq!(distribution.sample(SamplingMode::Weighted, &mut rng), None);
	}

	#[test]
	fn compatible_mode_favours_rare_tokens() {
		// "dog" (0.1) is a candidate whenever sample > 0.1, "cat" (0.9)
		// only when sample > 0.9, so "dog" wins most draws.
		let distribution = state(&[("cat", 9), ("dog", 1)]).normalize();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		let dogs = (0..2000)
			.filter(|_| distribution.sample(SamplingMode::Compatible, &mut rng) == Some("dog"))
			.count();
		assert!(dogs > 1500, "dog picked {dogs} times");
	}

	#[test]
	fn weighted_mode_follows_probabilities() {
		let distribution = state(&[("cat", 9), ("dog", 1)]).normalize();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		let cats = (0..2000)
			.filter(|_| distribution.sample(SamplingMode::Weighted, &mut rng) == Some("cat"))
			.count();
		assert!(cats > 1600, "cat picked {cats} times");
	}

	#[test]
	fn serializes_as_plain_map() {
		let distribution: Distribution = [("cat".to_owned(), 0.5), ("ran".to_owned(), 0.5)]
			.into_iter()
			.collect();
		let bytes = postcard::to_stdvec(&distribution).unwrap();
		let plain: BTreeMap<String, f64> = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(plain.len(), 2);
		assert_eq!(plain["cat"], 0.5);
	}
}
