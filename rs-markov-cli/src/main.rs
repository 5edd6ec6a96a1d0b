use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::{info, warn};

use rs_markov_core::io::{read_corpus, write_text};
use rs_markov_core::{GenerationInput, Generator, NGramModel, SamplingMode};

/// Train a word n-gram Markov chain on a text corpus and generate sentences.
#[derive(Parser, Debug)]
#[command(name = "rs-markov")]
#[command(version)]
struct Args {
	/// Directory holding the training texts
	#[arg(long, default_value = "base")]
	base_dir: PathBuf,

	/// Extension of the training texts
	#[arg(long, default_value = "txt")]
	extension: String,

	/// Model file, loaded if present, written after training otherwise
	#[arg(long, default_value = "db.bin")]
	db: PathBuf,

	/// Order of the chain (number of context tokens, >= 2)
	#[arg(short = 'n', long, default_value_t = 2)]
	order: usize,

	/// Seed of the random source
	#[arg(short, long, default_value_t = 42)]
	seed: u64,

	/// Number of sentences to generate
	#[arg(short = 'c', long, default_value_t = 100)]
	sentences: usize,

	/// Sampling rule: 'compatible' or 'weighted'
	#[arg(long, default_value_t = SamplingMode::Compatible)]
	sampling: SamplingMode,

	/// File receiving the generated text
	#[arg(short, long, default_value = "out.txt")]
	output: PathBuf,

	/// Ignore the model file and train from the corpus
	#[arg(long)]
	retrain: bool,

	/// Write the raw count dump of the trained model to this file
	#[arg(long, value_name = "FILE")]
	dump: Option<PathBuf>,
}

/// Trains `model` on every readable text of the corpus directory.
///
/// Files that are not valid UTF-8 are skipped with a warning.
fn train_from_corpus(model: &mut NGramModel, args: &Args) -> anyhow::Result<()> {
	let corpus = read_corpus(&args.base_dir, &args.extension)
		.with_context(|| format!("cannot read corpus directory {}", args.base_dir.display()))?;

	let mut trained = 0;
	for file in &corpus {
		match model.train_bytes(&file.bytes) {
			Ok(()) => trained += 1,
			Err(e) => warn!("skipping {}: {e}", file.path.display()),
		}
	}
	info!("trained on {trained}/{} files from {}", corpus.len(), args.base_dir.display());

	if !model.is_trained() {
		bail!("no sentence could be learned from {}", args.base_dir.display());
	}
	Ok(())
}

fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let mut model = NGramModel::new(args.order)?;
	if !args.retrain && model.load(&args.db) {
		info!("model loaded from {}", args.db.display());
	} else {
		info!("training order-{} model", args.order);
		train_from_corpus(&mut model, &args)?;
		model
			.save(&args.db)
			.with_context(|| format!("cannot save model to {}", args.db.display()))?;
		info!("model saved to {}", args.db.display());
	}

	if let Some(dump) = &args.dump {
		write_text(dump, &model.to_string())
			.with_context(|| format!("cannot write dump to {}", dump.display()))?;
	}

	let mut input = GenerationInput::new(args.seed, args.sentences);
	input.sampling = args.sampling;

	info!("generating {} sentences (seed {}, {} sampling)", args.sentences, args.seed, args.sampling);
	let text = Generator::new(&model).generate(&input)?;
	write_text(&args.output, &text)
		.with_context(|| format!("cannot write output to {}", args.output.display()))?;
	info!("text written to {}", args.output.display());

	Ok(())
}
