use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;

use super::generation_input::GenerationInput;
use super::generator::Generator;
use super::state::{Distribution, State};
use crate::error::{ChainError, Result};
use crate::tokenizer::{self, START};

/// Normalized transition table: context key -> next-token distribution.
pub type ProbabilityTable = BTreeMap<String, Distribution>;

/// The diagnostic dump stops once it has written more successor lines than
/// this, so at most `DUMP_LIMIT + 1` lines.
const DUMP_LIMIT: usize = 1000;

/// Word-level n-gram Markov chain.
///
/// The model stores raw counts for every context of `n` tokens, the
/// normalized table derived from them, and the set of contexts that open a
/// sentence.
///
/// # Lifecycle
/// - `new(n)` then `train_sentence` any number of times, then `normalize`
///   (`train_text` does the three steps for a whole text)
/// - or `new(n)` then load a table through the model store
///
/// # Invariants
/// - `n` is always >= 2
/// - Every distribution in `table` sums to 1.0
/// - `starts` always matches the keys of `table` beginning with `START`
#[derive(Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (number of context tokens)
	n: usize, // must be >= 2

	/// Raw counts indexed by context key, kept for diagnostics.
	states: HashMap<String, State>,

	/// Normalized table used for generation and persistence.
	table: ProbabilityTable,

	/// Sentence-opening contexts, sorted.
	starts: Vec<String>,
}

impl NGramModel {
	/// Creates a new, untrained model of order `n`.
	///
	/// # Errors
	/// Returns `ChainError::InvalidParameter` if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 2 {
			return Err(ChainError::invalid_parameter(format!("n must be >= 2, got {n}")));
		}
		Ok(Self {
			n,
			states: HashMap::new(),
			table: ProbabilityTable::new(),
			starts: Vec::new(),
		})
	}

	/// Order of the model.
	pub fn order(&self) -> usize {
		self.n
	}

	/// Accumulates the transitions of one tokenized sentence.
	///
	/// Every window of `n + 1` tokens adds one occurrence of its last token
	/// after the context made of the first `n`. Sentences of `n` tokens or
	/// fewer contain no window and are skipped.
	///
	/// # Notes
	/// - Counts are cumulative; call `normalize` to refresh probabilities.
	pub fn train_sentence<S: AsRef<str>>(&mut self, sentence: &[S]) {
		if sentence.len() <= self.n {
			// Sentence too short, no n-grams to compute
			return;
		}

		for window in sentence.windows(self.n + 1) {
			let key = window[..self.n]
				.iter()
				.map(|token| token.as_ref())
				.collect::<Vec<&str>>()
				.join(" ");
			let next_token = window[self.n].as_ref();

			// Get or create the state for this context
			let state = self.states.entry(key).or_insert_with(State::new);
			state.add_transition(next_token);
		}
	}

	/// Rebuilds the normalized table from the raw counts, then the start set.
	///
	/// Idempotent as long as no sentence is trained in between. Replaces any
	/// previously loaded table.
	pub fn normalize(&mut self) {
		self.table = self
			.states
			.iter()
			.map(|(key, state)| (key.clone(), state.normalize()))
			.collect();
		self.compute_starts();
	}

	/// Tokenizes `text`, trains every sentence and normalizes.
	pub fn train_text(&mut self, text: &str) {
		let sentences = tokenizer::tokenize(text);
		for sentence in &sentences {
			self.train_sentence(sentence);
		}
		self.normalize();
		debug!(
			"trained {} sentences, {} contexts, {} starts",
			sentences.len(),
			self.states.len(),
			self.starts.len()
		);
	}

	/// Decodes `bytes` as UTF-8, then behaves like `train_text`.
	///
	/// # Errors
	/// Returns `ChainError::InputDecoding` and leaves the model untouched if
	/// the bytes are not valid UTF-8.
	pub fn train_bytes(&mut self, bytes: &[u8]) -> Result<()> {
		let text = std::str::from_utf8(bytes)?;
		self.train_text(text);
		Ok(())
	}

	/// Raw number of times `next_token` followed `context`.
	pub fn raw_count(&self, context: &str, next_token: &str) -> usize {
		self.states.get(context).map_or(0, |state| state.count(next_token))
	}

	/// Number of contexts holding raw counts.
	pub fn raw_len(&self) -> usize {
		self.states.len()
	}

	/// The normalized table.
	pub fn table(&self) -> &ProbabilityTable {
		&self.table
	}

	/// Next-token distribution of `context`.
	pub fn distribution(&self, context: &str) -> Option<&Distribution> {
		self.table.get(context)
	}

	/// Probability of `next_token` after `context`.
	pub fn probability(&self, context: &str, next_token: &str) -> Option<f64> {
		self.table.get(context)?.probability(next_token)
	}

	/// Iterates over the normalized context keys, sorted.
	pub fn contexts(&self) -> impl Iterator<Item = &str> {
		self.table.keys().map(String::as_str)
	}

	/// Contexts a sentence can start from.
	pub fn starts(&self) -> &[String] {
		&self.starts
	}

	/// Whether the model can generate (at least one start context).
	pub fn is_trained(&self) -> bool {
		!self.starts.is_empty()
	}

	/// Generates `sentence_count` sentences with the default sampling rule.
	///
	/// Shortcut for `Generator::new(self).generate(..)`.
	///
	/// # Errors
	/// Returns `ChainError::EmptyModel` if at least one sentence is requested
	/// and the model has no start context.
	pub fn generate(&self, seed: u64, sentence_count: usize) -> Result<String> {
		let input = GenerationInput::new(seed, sentence_count);
		Generator::new(self).generate(&input)
	}

	/// Installs a table read from storage and recomputes the start set.
	pub(crate) fn replace_table(&mut self, table: ProbabilityTable) {
		self.table = table;
		self.compute_starts();
	}

	/// Collects the contexts whose first token is `START`.
	fn compute_starts(&mut self) {
		self.starts = self
			.table
			.keys()
			.filter(|key| key.split(' ').next() == Some(START))
			.cloned()
			.collect();
	}
}

/// Diagnostic dump of the raw counts.
///
/// Only successors seen more than once are listed: a context line followed
/// by `\t<token>\t<count>` lines. The dump stops after 1001 successor lines.
impl fmt::Display for NGramModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<&String> = self.states.keys().collect();
		keys.sort();

		let mut written = 0;
		for key in keys {
			let mut transitions: Vec<(&str, usize)> = self.states[key]
				.transitions()
				.filter(|(_, occurrence)| *occurrence > 1)
				.collect();
			if transitions.is_empty() {
				continue;
			}
			transitions.sort();

			writeln!(f, "{key}")?;
			for (token, occurrence) in transitions {
				writeln!(f, "\t{token}\t{occurrence}")?;
				written += 1;
				if written > DUMP_LIMIT {
					return Ok(());
				}
			}
		}
		Ok(())
	}
}
