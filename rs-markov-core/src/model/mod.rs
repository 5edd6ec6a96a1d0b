//! Top-level module for the Markov chain.
//!
//! - Fixed-order word n-gram model (`NGramModel`)
//! - Per-context counts and distributions (`State`, `Distribution`)
//! - Generation settings (`GenerationInput`)
//! - Sentence generation (`Generator`)
//! - Model persistence (`store`)

/// Sentence generation from a trained model.
///
/// Walks the chain from a random start context with a seeded random source.
pub mod generator;

/// Generation parameters: seed, sentence count, step cap, sampling rule.
pub mod generation_input;

/// Fixed-order word n-gram model (`n >= 2`).
///
/// Handles sentence ingestion, transition counting, normalization
/// and the start set.
pub mod ngram_model;

/// Per-context transition counts and normalized distributions.
pub mod state;

/// Saving and loading of the normalized table (`postcard` format).
mod store;
