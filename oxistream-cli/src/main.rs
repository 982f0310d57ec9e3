//! OxiStream CLI - composable stream transforms from the command line.
//!
//! Encodes and decodes files (or stdin/stdout) through a chain of
//! transforms such as `lz:9,huffman,crc` or `bwt:1m,arith,crc`.

mod commands;
mod logging;
mod utils;

use clap::{Parser, Subcommand};
use oxistream::Chain;
use std::path::PathBuf;

const DEFAULT_CHAIN: &str = "lz:6,huffman,crc";

#[derive(Parser)]
#[command(name = "oxistream")]
#[command(author, version, about = "Composable stream transforms - Pure Rust")]
#[command(long_about = "
OxiStream pushes data through a chain of streaming transforms.
A chain lists transforms in encode order, separated by commas:

  crc              CRC-32 trailer
  base64[:url|:mime]
  huffman[:fast|:best|:escape]
  arith[:fast]
  lz[:0-9]
  bwt[:SIZE]       block size, e.g. 64k or 1m

Use '-' for stdin or stdout.

Examples:
  oxistream encode -c lz:9,huffman,crc notes.txt notes.oxs
  oxistream decode -c lz:9,huffman,crc notes.oxs notes.txt
  oxistream encode -c bwt:1m,arith,crc - out.oxs < data.bin
  oxistream inspect -c bwt:1m,arith,crc out.oxs
  oxistream crc file1 file2
")]
struct Cli {
    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file through a transform chain
    #[command(alias = "e")]
    Encode {
        /// Transform chain in encode order
        #[arg(short, long, default_value = DEFAULT_CHAIN)]
        chain: Chain,

        /// Input file ('-' for stdin)
        input: PathBuf,

        /// Output file ('-' for stdout)
        output: PathBuf,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decode a file produced by `encode` with the same chain
    #[command(alias = "d")]
    Decode {
        /// Transform chain in encode order
        #[arg(short, long, default_value = DEFAULT_CHAIN)]
        chain: Chain,

        /// Input file ('-' for stdin)
        input: PathBuf,

        /// Output file ('-' for stdout)
        output: PathBuf,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Print the CRC-32 of files
    Crc {
        /// Files to checksum ('-' for stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Decode a file without writing the output and report what it holds
    #[command(alias = "i")]
    Inspect {
        /// Transform chain in encode order
        #[arg(short, long, default_value = DEFAULT_CHAIN)]
        chain: Chain,

        /// Encoded file ('-' for stdin)
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            chain,
            input,
            output,
            progress,
        } => commands::cmd_encode(&chain, &input, &output, progress),
        Commands::Decode {
            chain,
            input,
            output,
            progress,
        } => commands::cmd_decode(&chain, &input, &output, progress),
        Commands::Crc { files, json } => commands::cmd_crc(&files, json),
        Commands::Inspect { chain, file, json } => commands::cmd_inspect(&chain, &file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_chain_argument() {
        let cli = Cli::try_parse_from(["oxistream", "encode", "-c", "bwt:64k,arith", "a", "b"]).unwrap();
        match cli.command {
            Commands::Encode { chain, .. } => assert_eq!(chain.to_string(), "bwt:64k,arith"),
            _ => panic!("expected encode"),
        }

        let cli = Cli::try_parse_from(["oxistream", "-vv", "decode", "a", "b"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Decode { chain, .. } => assert_eq!(chain.to_string(), DEFAULT_CHAIN),
            _ => panic!("expected decode"),
        }

        assert!(Cli::try_parse_from(["oxistream", "encode", "-c", "zip", "a", "b"]).is_err());
    }
}
