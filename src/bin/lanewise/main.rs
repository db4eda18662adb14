//! Lanewise CLI: generate fixed-width columns and benchmark parsing them.

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lanewise::{Backend, ElementSize, ParserConfig, Statistics};

#[derive(Debug, Parser)]
#[command(name = "lanewise")]
#[command(about = "SIMD fixed-width integer column parser", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a synthetic column, parse it and report throughput
    Bench(BenchArgs),
    /// Print the back-end selected for this CPU
    Detect,
}

#[derive(Debug, Parser)]
struct BenchArgs {
    /// Digits per field (1, 2, 4 or 8)
    #[arg(short, long, default_value = "4", value_parser = parse_width)]
    width: ElementSize,

    /// Number of fields to generate
    #[arg(short, long, default_value = "1000000")]
    count: usize,

    /// Prefix every field with '+' or '-'
    #[arg(long)]
    signed: bool,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Back-end to use
    #[arg(short, long, default_value = "auto")]
    backend: BackendArg,

    /// Print the statistics record after parsing
    #[arg(long)]
    stats: bool,

    /// Print statistics as JSON
    #[arg(long, requires = "stats")]
    json: bool,
}

#[derive(Debug, Clone, ValueEnum)]
enum BackendArg {
    /// Best back-end for this CPU
    Auto,
    /// Scalar emulation of the lane operations
    Portable,
    /// SSSE3 + SSE4.1
    Sse41,
}

impl From<BackendArg> for Option<Backend> {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => None,
            BackendArg::Portable => Some(Backend::Portable),
            BackendArg::Sse41 => Some(Backend::Sse41),
        }
    }
}

/// Parse a field width, accepting only the vectorized widths.
fn parse_width(s: &str) -> Result<ElementSize, String> {
    let digits: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid width: '{}'", s))?;
    match ElementSize::from_digits(digits) {
        ElementSize::Irregular => Err(format!("Width must be 1, 2, 4 or 8, got {}", digits)),
        size => Ok(size),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Detect => {
            println!("{}", Backend::detect());
            Ok(())
        }
        Command::Bench(args) => run_bench(args),
    }
}

fn run_bench(args: BenchArgs) -> Result<()> {
    let column = generate_column(args.width, args.count, args.signed, args.seed)?;
    let blocks = column_blocks(&column).context("Failed to build column descriptors")?;
    let expected = reference_values(&column).context("Generated column is not numeric")?;
    info!(
        bytes = column.text.len(),
        fields = column.count,
        per_window = column.per_window(),
        "generated column"
    );

    let mut config = ParserConfig::default().with_statistics(args.stats);
    config.backend = args.backend.into();
    let mut parser = lanewise::Parser::new(config);

    let text = &column.text;
    let stride = column.stride();
    let per_window = column.per_window();
    let start = Instant::now();
    let parsed: Vec<i64> = if column.signed {
        let mut out: Vec<i32> = Vec::with_capacity(column.count);
        let mut pos = 0;
        while pos < text.len() {
            let fields = ((text.len() - pos) / stride).min(per_window);
            pos = parser.parse_signed(&blocks[fields], text, pos, text.len(), &mut out);
        }
        let elapsed = start.elapsed();
        report(text.len(), column.count, elapsed);
        out.into_iter().map(i64::from).collect()
    } else {
        let mut out: Vec<u32> = Vec::with_capacity(column.count);
        let mut pos = 0;
        while pos < text.len() {
            let fields = ((text.len() - pos) / stride).min(per_window);
            pos = parser.parse_unsigned(&blocks[fields], text, pos, text.len(), &mut out);
        }
        let elapsed = start.elapsed();
        report(text.len(), column.count, elapsed);
        out.into_iter().map(i64::from).collect()
    };

    ensure!(
        parsed == expected,
        "Parsed values differ from the reference ({} vs {} fields)",
        parsed.len(),
        expected.len()
    );
    eprintln!("✓ {} values verified ({} back-end)", parsed.len(), parser.backend());

    if args.stats {
        let stats = parser.into_statistics();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print_statistics(&stats);
        }
    }

    Ok(())
}

fn report(bytes: usize, fields: usize, elapsed: std::time::Duration) {
    let secs = elapsed.as_secs_f64().max(f64::EPSILON);
    println!(
        "{} fields, {} bytes in {:.3} ms ({:.1} MB/s, {:.1} Mfields/s)",
        fields,
        bytes,
        secs * 1e3,
        bytes as f64 / secs / 1e6,
        fields as f64 / secs / 1e6
    );
}

fn print_statistics(stats: &Statistics) {
    println!("{:<8} {:>12} {:>14}", "width", "calls", "conversions");
    for size in ElementSize::FIXED {
        if let Some(counters) = stats.width(size) {
            println!(
                "{:<8} {:>12} {:>14}",
                size.digits().unwrap_or(0),
                counters.calls,
                counters.conversions
            );
        }
    }
    println!("scalar   {:>12}", stats.scalar_conversions);
    println!("total_skip histogram:");
    for (skip, &calls) in stats.total_skip_histogram().iter().enumerate() {
        if calls != 0 {
            println!("  {:>3}: {}", skip, calls);
        }
    }
    if stats.histogram_overflow() != 0 {
        println!("  >{}: {}", stats.max_total_skip(), stats.histogram_overflow());
    }
}

mod generators;
use generators::{column_blocks, generate_column, reference_values};
