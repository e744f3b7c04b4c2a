use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stoch_core::io::read_training_chunks;
use stoch_core::{EntropySource, ModelConfig, ModelOrder, SeededEntropy, StochModel, ThreadEntropy};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
	Zero,
	First,
}

impl From<Order> for ModelOrder {
	fn from(order: Order) -> Self {
		match order {
			Order::Zero => ModelOrder::Zero,
			Order::First => ModelOrder::First,
		}
	}
}

/// Trains a byte-level Markov model and prints generated samples.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
	/// Training files or directories; reads stdin when none are given
	inputs: Vec<PathBuf>,

	/// Only read files with this extension from directories
	#[arg(long)]
	extension: Option<String>,

	/// Bytes requested per sample
	#[arg(short, long, default_value_t = 80)]
	size: usize,

	/// Number of samples to print
	#[arg(short = 'n', long, default_value_t = 10)]
	count: usize,

	/// Seed for reproducible output
	#[arg(long)]
	seed: Option<u64>,

	#[arg(long, value_enum, default_value_t = Order::First)]
	order: Order,

	/// Train each line as its own zero-terminated sample
	#[arg(long)]
	lines: bool,
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let args = Args::parse();
	let model = StochModel::new(ModelConfig::default().with_order(args.order.into()))?;

	let chunks = if args.inputs.is_empty() {
		let mut data = Vec::new();
		io::stdin().read_to_end(&mut data)?;
		vec![data]
	} else {
		let mut chunks = Vec::new();
		for input in &args.inputs {
			chunks.extend(read_training_chunks(input, args.extension.as_deref())?);
		}
		chunks
	};

	for chunk in &chunks {
		if args.lines {
			// Each line ends with a terminator so generation stops at line ends
			for line in chunk.split(|&b| b == b'\n').filter(|l| !l.is_empty()) {
				model.train(line)?;
				model.train(&[0])?;
			}
		} else {
			model.train(chunk)?;
		}
	}
	info!(order = ?args.order, grand_total = model.stats().grand_total, "model trained");

	let mut rng: Box<dyn EntropySource> = match args.seed {
		Some(seed) => Box::new(SeededEntropy::new(seed)),
		None => Box::new(ThreadEntropy::new()),
	};

	let mut stdout = io::stdout().lock();
	for _ in 0..args.count {
		let generated = model.generate(args.size, &mut rng)?;
		stdout.write_all(generated.meaningful())?;
		stdout.write_all(b"\n")?;
	}

	Ok(())
}
