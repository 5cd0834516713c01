use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

mod bitio;
mod error;
mod lzss;
mod token;
mod window;

use lzss::{decode_file, encode_file, Summary};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an input file to an output file
    Compress {
        /// Input file path (use - for stdin)
        input: String,
        /// Output file path (use - for stdout)
        output: String,
    },
    /// Decompress an input file to an output file
    Decompress {
        /// Input file path (use - for stdin)
        input: String,
        /// Output file path (use - for stdout)
        output: String,
    },
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn report(summary: &Summary) {
    let ratio = if summary.bytes_in == 0 {
        0.0
    } else {
        summary.bytes_out as f64 / summary.bytes_in as f64 * 100.0
    };
    info!(
        "{} bytes -> {} bytes ({:.1}%), {} literals, {} matches",
        summary.bytes_in, summary.bytes_out, ratio, summary.literals, summary.matches
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that `-` output on stdout stays clean
    TermLogger::init(cli.log_level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("Failed to initialize logger")?;

    match cli.command {
        Commands::Compress { input, output } => {
            info!("Compressing {} to {} using LZSS...", input, output);
            let summary = encode_file(&input, &output)
                .with_context(|| format!("LZSS compression failed from {} to {}", input, output))?;
            report(&summary);
            info!("Compression successful.");
        }
        Commands::Decompress { input, output } => {
            info!("Decompressing {} to {} using LZSS...", input, output);
            let summary = decode_file(&input, &output)
                .with_context(|| format!("LZSS decompression failed from {} to {}", input, output))?;
            report(&summary);
            info!("Decompression successful.");
        }
    }

    Ok(())
}
