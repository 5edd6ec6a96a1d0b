use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One corpus file: its path and its raw, not yet decoded, contents.
#[derive(Debug)]
pub struct CorpusFile {
	pub path: PathBuf,
	pub bytes: Vec<u8>,
}

/// Lists all files with a given extension in a directory.
///
/// Returns full paths, sorted. Subdirectories are ignored.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<PathBuf>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

/// Reads every `*.<extension>` file of `dir`.
///
/// Each file's full contents is one training text. Decoding is left to
/// the caller so that a malformed file can be skipped on its own.
pub fn read_corpus<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<CorpusFile>> {
	let mut corpus = Vec::new();
	for path in list_files(dir, extension)? {
		let bytes = fs::read(&path)?;
		corpus.push(CorpusFile { path, bytes });
	}
	Ok(corpus)
}

/// Writes generated text to `path`, replacing any existing file.
pub fn write_text<P: AsRef<Path>>(path: P, text: &str) -> io::Result<()> {
	fs::write(path, text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn reads_only_matching_files() {
		let dir = tempdir().unwrap();
		fs::write(dir.path().join("b.txt"), "second").unwrap();
		fs::write(dir.path().join("a.txt"), "first").unwrap();
		fs::write(dir.path().join("notes.md"), "skipped").unwrap();
		fs::create_dir(dir.path().join("nested.txt")).unwrap();

		let corpus = read_corpus(dir.path(), "txt").unwrap();
		let contents: Vec<&[u8]> = corpus.iter().map(|file| file.bytes.as_slice()).collect();
		assert_eq!(contents, [b"first".as_slice(), b"second".as_slice()]);
	}

	#[test]
	fn missing_directory_is_an_error() {
		let dir = tempdir().unwrap();
		assert!(read_corpus(dir.path().join("absent"), "txt").is_err());
	}

	#[test]
	fn writes_output_text() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("out.txt");
		write_text(&path, "The cat sat.").unwrap();
		assert_eq!(fs::read_to_string(path).unwrap(), "The cat sat.");
	}
}
