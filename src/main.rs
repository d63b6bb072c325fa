use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use johnny::batch::{Batch, BatchConfig};
use johnny::config::MachineConfig;
use johnny::engine::execute_with;
use johnny::listing::listing;
use johnny::loader::load_file;
use johnny::memory::Memory;
use johnny::trace::Trace;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "johnny", about = "Johnny: a single-accumulator teaching machine")]
struct Cli {
    /// Program file, one `<MNEMONIC> <OPERAND>` per line.
    program: Option<PathBuf>,

    /// Poke a cell after loading, as ADDR=VALUE. May be repeated.
    #[arg(long = "set", value_name = "ADDR=VALUE", value_parser = parse_cell, allow_hyphen_values = true)]
    cells: Vec<(i64, i64)>,

    /// Print the memory listing before running.
    #[arg(long)]
    list: bool,

    /// Load and list only; do not execute.
    #[arg(long)]
    no_run: bool,

    /// Abort once this many instructions have been fetched.
    #[arg(long)]
    max_operations: Option<u64>,

    /// Suppress the per-instruction trace.
    #[arg(long)]
    quiet: bool,

    /// Number of memory cells.
    #[arg(long, default_value_t = johnny::config::RAM_SIZE)]
    ram_size: usize,

    /// Largest value a cell may hold.
    #[arg(long, default_value_t = johnny::config::MAX_VALUE)]
    max_value: u32,

    /// Run random programs in parallel and print throughput stats.
    #[arg(long)]
    benchmark: bool,

    /// Random seed for benchmark images.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of benchmark images.
    #[arg(long, default_value_t = 1 << 12)]
    images: usize,

    /// Random instructions per benchmark image.
    #[arg(long, default_value_t = 32)]
    program_len: usize,
}

/// Parse an "ADDR=VALUE" cell assignment.
fn parse_cell(s: &str) -> Result<(i64, i64), String> {
    let (address, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid cell assignment '{s}', expected ADDR=VALUE"))?;
    let address = address
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("Invalid cell address: {e}"))?;
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("Invalid cell value: {e}"))?;
    Ok((address, value))
}

/// One line of CLI trace output: the bare effect, without the address prefix.
fn trace_line(trace: &Trace) -> String {
    trace.effect.to_string()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let machine = MachineConfig {
        ram_size: cli.ram_size,
        max_value: cli.max_value,
    };

    if cli.benchmark {
        let config = BatchConfig {
            images: cli.images,
            program_len: cli.program_len,
            max_operations: cli.max_operations.unwrap_or(1 << 13),
            machine,
        };
        run_benchmark(config, cli.seed);
        return Ok(());
    }

    let mut memory = Memory::new(machine);
    if let Some(ref path) = cli.program {
        load_file(&mut memory, path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    for &(address, value) in &cli.cells {
        memory
            .set_cell(address, value)
            .with_context(|| format!("setting cell {address}"))?;
    }

    if cli.list {
        print!("{}", listing(&memory));
    }
    if cli.no_run {
        return Ok(());
    }
    if cli.program.is_none() && cli.cells.is_empty() {
        bail!("nothing to run: pass a program file or --set cells");
    }

    let quiet = cli.quiet;
    let outcome = execute_with(&mut memory, cli.max_operations, |trace| {
        if !quiet {
            println!("{}", trace_line(trace));
        }
    })
    .context("execution failed")?;

    println!(
        "Execution terminated successfully after {} operations.",
        outcome.operations
    );
    Ok(())
}

fn run_benchmark(config: BatchConfig, seed: u64) {
    let images = config.images;
    let mut batch = Batch::new(config, seed);

    let start = std::time::Instant::now();
    let report = batch.run();
    let elapsed = start.elapsed();

    let images_per_sec = images as f64 / elapsed.as_secs_f64();
    let ops_per_sec = report.operations as f64 / elapsed.as_secs_f64();

    eprintln!("Benchmark results:");
    eprintln!("  Images:              {images}");
    eprintln!("  Halted:              {}", report.halted);
    eprintln!("  Out of bounds:       {}", report.out_of_bounds);
    eprintln!("  Value out of range:  {}", report.value_out_of_range);
    eprintln!("  Illegal instruction: {}", report.illegal_instruction);
    eprintln!("  Operation limit:     {}", report.operation_limit);
    eprintln!("  Operations:          {}", report.operations);
    eprintln!("  Elapsed:             {elapsed:.2?}");
    eprintln!("  Images/sec:          {images_per_sec:.1}");
    eprintln!("  Operations/sec:      {ops_per_sec:.0}");
}
