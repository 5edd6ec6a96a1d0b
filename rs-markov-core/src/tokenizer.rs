use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

/// Sentinel token opening every sentence.
pub const START: &str = "#";

/// Sentinel token closing every sentence.
pub const END: &str = ".";

/// Punctuation kept as a token of its own.
pub const COMMA: &str = ",";

/// Sentence delimiters: period, semicolon, colon, exclamation and question
/// marks, quotes, parentheses, brackets and a spaced dash. Ellipsis splits
/// into empty fragments which are dropped later.
static SENTENCE_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"[.;:!?"()\[\]]| - "#).expect("sentence delimiter pattern is valid")
});

/// Splits raw text into sentences of word tokens.
///
/// Each sentence is lowercased, wrapped as `START word... END`, and words
/// carrying a trailing comma are split into the word and a separate comma
/// token. Fragments without any word are dropped.
///
/// Example: `"The cat sat, then ran."` gives
/// `["#", "the", "cat", "sat", ",", "then", "ran", "."]`.
pub fn tokenize(text: &str) -> Vec<Vec<String>> {
	let text = text.replace('\n', " ");

	SENTENCE_DELIMITERS
		.split(&text)
		.filter_map(|fragment| {
			let fragment = fragment.to_lowercase();
			let mut words = fragment.split_whitespace().peekable();
			// Sentinel-only sentences are never emitted
			words.peek()?;

			let mut sentence = vec![START.to_owned()];
			for word in words {
				match word.strip_suffix(COMMA) {
					Some(bare) => {
						if !bare.is_empty() {
							sentence.push(bare.to_owned());
						}
						sentence.push(COMMA.to_owned());
					}
					None => sentence.push(word.to_owned()),
				}
			}
			sentence.push(END.to_owned());
			Some(sentence)
		})
		.collect()
}

/// Decodes `bytes` as UTF-8 and tokenizes the result.
///
/// # Errors
/// Returns `ChainError::InputDecoding` on malformed UTF-8. No partial
/// recovery is attempted.
pub fn tokenize_bytes(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
	let text = std::str::from_utf8(bytes)?;
	Ok(tokenize(text))
}
