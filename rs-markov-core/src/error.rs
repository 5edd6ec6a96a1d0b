use std::str::Utf8Error;

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors produced while building, persisting, or sampling a Markov chain.
#[derive(Debug, Error)]
pub enum ChainError {
	/// A parameter violates a hard precondition (ex. order `n < 2`).
	#[error("invalid parameter: {reason}")]
	InvalidParameter { reason: String },

	/// Corpus bytes could not be decoded as UTF-8.
	#[error("input decoding failed: {source}")]
	InputDecoding {
		#[from]
		source: Utf8Error,
	},

	/// Generation was requested from a model without any sentence start.
	#[error("model has no sentence start, train or load it first")]
	EmptyModel,

	/// I/O error while reading or writing a model file.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// A decoded table breaks the probability invariants.
	#[error("corrupt model: {reason}")]
	CorruptModel { reason: String },

	/// The persisted table could not be encoded or decoded.
	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),
}

impl ChainError {
	/// Builds an `InvalidParameter` error.
	pub fn invalid_parameter(reason: impl Into<String>) -> Self {
		Self::InvalidParameter { reason: reason.into() }
	}

	/// Builds a `CorruptModel` error.
	pub fn corrupt_model(reason: impl Into<String>) -> Self {
		Self::CorruptModel { reason: reason.into() }
	}
}
