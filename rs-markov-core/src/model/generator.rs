use log::debug;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::generation_input::GenerationInput;
use super::ngram_model::NGramModel;
use crate::error::{ChainError, Result};
use crate::tokenizer::{COMMA, END, START};

/// Number of steps during which an `END` pick is ignored, so that a
/// sentence is not closed right after its start context.
const MIN_STEPS_BEFORE_END: usize = 2;

/// Sentence generator walking the chain of a trained `NGramModel`.
///
/// # Responsibilities
/// - Pick a start context uniformly from the model's start set
/// - Extend the sentence token by token until `END` or the step cap
/// - Format the tokens as a capitalized, period-terminated sentence
///
/// The generator only borrows the model; several generators may read the
/// same model at once.
#[derive(Clone, Copy, Debug)]
pub struct Generator<'a> {
	model: &'a NGramModel,
}

impl<'a> Generator<'a> {
	pub fn new(model: &'a NGramModel) -> Self {
		Self { model }
	}

	/// Generates one sentence using `rng`.
	///
	/// # Behavior
	/// - The state is the current context, starting from a random start.
	/// - Each step samples the next token with `input.sampling`.
	/// - `END` stops the sentence, except during the first steps where it is
	///   skipped and the context stays unchanged.
	/// - A comma is glued to the previous word, other tokens get a space.
	/// - At most `input.max_steps()` steps are performed.
	/// - A context unknown to the table ends the sentence early.
	///
	/// # Errors
	/// Returns `ChainError::EmptyModel` if the start set is empty.
	pub fn generate_sentence<R: Rng>(&self, input: &GenerationInput, rng: &mut R) -> Result<String> {
		let start = self.model.starts().choose(rng).ok_or(ChainError::EmptyModel)?;

		let mut result = start.clone();
		let mut context: Vec<&'a str> = start.split(' ').collect();

		for step in 0..input.max_steps() {
			let key = context.join(" ");
			let next_token = self
				.model
				.distribution(&key)
				.and_then(|distribution| distribution.sample(input.sampling, rng));
			let Some(next_token) = next_token else {
				debug!("context '{key}' has no successor, sentence stopped");
				break;
			};

			if next_token == END {
				if step >= MIN_STEPS_BEFORE_END {
					break;
				}
				continue;
			}

			if next_token != COMMA {
				result.push(' ');
			}
			result.push_str(next_token);

			// Slide the context: drop its first token, append the new one
			context.remove(0);
			context.push(next_token);
		}

		Ok(Self::format_sentence(&result))
	}

	/// Generates `input.sentence_count()` sentences joined by single spaces.
	///
	/// The random source is seeded once from `input.seed`, so the output is
	/// fully determined by the model and the input.
	///
	/// A sentence count of 0 gives an empty text, whatever the model.
	///
	/// # Errors
	/// Returns `ChainError::EmptyModel` if at least one sentence is requested
	/// and the start set is empty.
	pub fn generate(&self, input: &GenerationInput) -> Result<String> {
		if input.sentence_count() == 0 {
			return Ok(String::new());
		}
		if !self.model.is_trained() {
			return Err(ChainError::EmptyModel);
		}

		let mut rng = ChaCha8Rng::seed_from_u64(input.seed);
		let sentences = (0..input.sentence_count())
			.map(|_| self.generate_sentence(input, &mut rng))
			.collect::<Result<Vec<_>>>()?;

		Ok(sentences.join(" "))
	}

	/// Turns `"# the cat sat,"` into `"The cat sat."`.
	fn format_sentence(raw: &str) -> String {
		let raw = raw.strip_suffix(COMMA).unwrap_or(raw);
		let body = raw.strip_prefix(START).unwrap_or(raw).trim_start();

		let mut chars = body.chars();
		let mut sentence: String = match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => String::new(),
		};
		sentence.push_str(END);
		sentence
	}
}
