//! Word-level n-gram Markov chain text generation library.
//!
//! This crate provides:
//! - Sentence tokenization with start/end sentinels
//! - Order-N transition counting and per-context normalization
//! - Seeded, reproducible sentence generation
//! - Persistence of the normalized model
//! - Small I/O helpers for corpus directories and output files

/// Error type shared by every module.
pub mod error;

/// Splitting raw text into sentence token lists.
pub mod tokenizer;

/// Markov chain model, generation and persistence.
pub mod model;

/// I/O utilities (corpus loading, output writing).
pub mod io;

pub use error::{ChainError, Result};
pub use model::generation_input::{GenerationInput, SamplingMode};
pub use model::generator::Generator;
pub use model::ngram_model::{NGramModel, ProbabilityTable};
