use std::fs;
use std::path::Path;

use log::{debug, warn};

use super::ngram_model::{NGramModel, ProbabilityTable};
use crate::error::{ChainError, Result};

/// Tolerance on the probability sum of a persisted distribution.
const SUM_TOLERANCE: f64 = 1e-9;

impl NGramModel {
	/// Serializes the normalized table with `postcard`.
	///
	/// Raw counts and the order are not part of the artifact.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self.table())?)
	}

	/// Writes the normalized table to `path`.
	///
	/// # Errors
	/// Returns an error if encoding or writing fails.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = self.to_bytes()?;
		fs::write(path, &bytes)?;
		debug!("saved {} contexts ({} bytes) to {}", self.table().len(), bytes.len(), path.display());
		Ok(())
	}

	/// Replaces the normalized table with the one encoded in `bytes`.
	///
	/// The table is fully decoded and checked before being installed, so a
	/// failure leaves the model untouched. On success the start set is
	/// recomputed.
	///
	/// # Errors
	/// - `ChainError::Serialization` if the bytes are not a table
	/// - `ChainError::CorruptModel` if a distribution is empty or does not
	///   sum to 1.0
	pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
		let table: ProbabilityTable = postcard::from_bytes(bytes)?;
		Self::check_table(&table)?;
		self.replace_table(table);
		Ok(())
	}

	/// Reads the normalized table stored at `path`.
	///
	/// Same as `load` but keeps the failure cause.
	pub fn try_load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
		let path = path.as_ref();
		let bytes = fs::read(path)?;
		self.load_bytes(&bytes)?;
		debug!("loaded {} contexts from {}", self.table().len(), path.display());
		Ok(())
	}

	/// Reads the normalized table stored at `path`.
	///
	/// Returns `false` and leaves the model untouched on any failure (missing
	/// file, unreadable or corrupt data); the cause is only logged.
	pub fn load<P: AsRef<Path>>(&mut self, path: P) -> bool {
		match self.try_load(&path) {
			Ok(()) => true,
			Err(e) => {
				warn!("cannot load model from {}: {e}", path.as_ref().display());
				false
			}
		}
	}

	fn check_table(table: &ProbabilityTable) -> Result<()> {
		for (context, distribution) in table {
			if distribution.is_empty() {
				return Err(ChainError::corrupt_model(format!("context '{context}' has no successor")));
			}
			if distribution.iter().any(|(_, p)| !(p > 0.0 && p <= 1.0)) {
				return Err(ChainError::corrupt_model(format!(
					"context '{context}' holds a probability outside (0, 1]"
				)));
			}
			let total = distribution.total();
			if (total - 1.0).abs() > SUM_TOLERANCE {
				return Err(ChainError::corrupt_model(format!(
					"context '{context}' sums to {total}"
				)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	fn trained() -> NGramModel {
		let mut model = NGramModel::new(2).unwrap();
		model.train_text("The cat sat. The cat ran. A dog sat, then ran.");
		model
	}

	#[test]
	fn save_then_load_restores_table_and_starts() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("db.bin");
		let model = trained();
		model.save(&path).unwrap();

		let mut loaded = NGramModel::new(2).unwrap();
		assert!(loaded.load(&path));
		assert_eq!(loaded.table(), model.table());
		assert_eq!(loaded.starts(), model.starts());
		assert_eq!(loaded.raw_len(), 0);
	}

	#[test]
	fn missing_file_is_not_loaded() {
		let dir = tempdir().unwrap();
		let mut model = trained();
		let before = model.table().clone();
		assert!(!model.load(dir.path().join("absent.bin")));
		assert_eq!(model.table(), &before);
		assert!(matches!(model.try_load(dir.path().join("absent.bin")), Err(ChainError::Io(_))));
	}

	#[test]
	fn corrupt_file_is_not_loaded() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("db.bin");
		fs::write(&path, [0xff, 0xff, 0xff, 0xff, 0xff]).unwrap();

		let mut model = trained();
		let before = model.table().clone();
		let starts = model.starts().to_vec();
		assert!(!model.load(&path));
		assert_eq!(model.table(), &before);
		assert_eq!(model.starts(), starts);
	}

	#[test]
	fn rejects_tables_that_do_not_sum_to_one() {
		let mut table = ProbabilityTable::new();
		table.insert("# a".to_owned(), [("b".to_owned(), 0.4)].into_iter().collect());
		let bytes = postcard::to_stdvec(&table).unwrap();

		let mut model = NGramModel::new(2).unwrap();
		assert!(matches!(model.load_bytes(&bytes), Err(ChainError::CorruptModel { .. })));
		assert!(!model.is_trained());
	}

	#[test]
	fn loaded_model_generates_like_the_trained_one() {
		let model = trained();
		let mut loaded = NGramModel::new(2).unwrap();
		loaded.load_bytes(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(loaded.generate(42, 5).unwrap(), model.generate(42, 5).unwrap());
	}
}
