use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flash_minsort::{sort_file, SortConfig};

/// Flash MinSort — zero-intermediate-write external sort for flash storage.
#[derive(Debug, Parser)]
#[command(name = "flash-minsort", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sort an existing page-formatted input file into a page-formatted output file.
    Sort {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 4096)]
        page_size: usize,
        #[arg(long, default_value_t = 16)]
        header_size: usize,
        #[arg(long, default_value_t = 16)]
        record_size: usize,
        #[arg(long)]
        num_pages: usize,
        #[arg(long)]
        num_records: usize,
        /// RAM budget in bytes for the region index.
        #[arg(long, default_value_t = 256)]
        ram_budget: usize,
    },
    /// Generate a synthetic input file of random keys, for exercising `sort`
    /// without a separately-produced input. Not part of the sorting engine
    /// itself — a benchmark-harness convenience.
    Generate {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 4096)]
        page_size: usize,
        #[arg(long, default_value_t = 16)]
        header_size: usize,
        #[arg(long, default_value_t = 16)]
        record_size: usize,
        #[arg(long)]
        num_records: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let code = err
                .downcast_ref::<flash_minsort::Error>()
                .map(|e| e.exit_code())
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Sort {
            input,
            output,
            page_size,
            header_size,
            record_size,
            num_pages,
            num_records,
            ram_budget,
        } => {
            let config = SortConfig {
                page_size,
                header_size,
                record_size,
                num_pages,
                num_records,
                ram_budget_bytes: ram_budget,
                region_index_in_scratch: false,
            };
            let report = sort_file(&input, &output, &config)?;
            println!(
                "sorted {} records across {} pages: reads={} compar={} writes={} memcpys={}",
                num_records,
                num_pages,
                report.metrics.num_reads,
                report.metrics.num_compar,
                report.metrics.num_writes,
                report.metrics.num_memcpys
            );
            Ok(())
        }
        Command::Generate {
            output,
            page_size,
            header_size,
            record_size,
            num_records,
            seed,
        } => {
            generate_input(&output, page_size, header_size, record_size, num_records, seed)?;
            Ok(())
        }
    }
}

/// Writes `num_records` records with pseudo-random `i32` keys (xorshift,
/// no external RNG crate needed for this one-off generator) into a
/// page-formatted file at `output`, padding the trailing page with zeroed
/// records past `num_records`.
fn generate_input(
    output: &PathBuf,
    page_size: usize,
    header_size: usize,
    record_size: usize,
    num_records: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let records_per_page = (page_size - header_size) / record_size;
    let num_pages = num_records.div_ceil(records_per_page).max(1);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output)?;

    let mut state = seed.max(1);
    let mut next_key = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state & 0x7fff_ffff) as i32
    };

    for page in 0..num_pages {
        let mut buf = vec![0u8; page_size];
        for slot in 0..records_per_page {
            if page * records_per_page + slot >= num_records {
                break;
            }
            let key = next_key();
            let start = header_size + slot * record_size;
            buf[start..start + 4].copy_from_slice(&key.to_le_bytes());
        }
        file.write_all(&buf)?;
    }
    Ok(())
}
