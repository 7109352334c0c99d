//! Command line front end for `merkletools-merkle`.
//!
//! Reads one leaf per line from a file or stdin, then prints the root, an
//! inclusion proof document, or a dump of every level.  Proof documents can
//! be verified later without the leaves.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use merkletools_merkle::builder::DEFAULT_PARALLEL_THRESHOLD;
use merkletools_merkle::{Hash32, MerkleTree, TreeBuilder};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "merkletools")]
#[command(about = "Build Merkle trees and generate or verify inclusion proofs")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).  `RUST_LOG`
    /// takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Minimum level width hashed in parallel
    #[arg(long, global = true, default_value_t = DEFAULT_PARALLEL_THRESHOLD)]
    parallel_threshold: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct LeafArgs {
    /// File with one leaf per line; reads stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Treat each line as a hex digest taken verbatim instead of a raw value
    /// to hash
    #[arg(long)]
    hex: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the root as hex
    Root(LeafArgs),

    /// Print a JSON proof document for one leaf
    Prove {
        #[command(flatten)]
        leaves: LeafArgs,

        /// Zero-based index of the leaf to prove
        #[arg(long)]
        index: usize,
    },

    /// Check a JSON proof document; exits 1 if it doesn't verify
    Verify {
        /// Proof document produced by `prove`; reads stdin when omitted
        #[arg(long)]
        proof: Option<PathBuf>,

        /// Leaf digest (hex) to check instead of the one in the document
        #[arg(long, conflicts_with = "value")]
        leaf: Option<String>,

        /// Raw leaf value to hash and check instead of the document's leaf
        #[arg(long)]
        value: Option<String>,

        /// Root digest (hex) to check against instead of the document's root
        #[arg(long)]
        root: Option<String>,
    },

    /// Print every level of the tree, leaves first
    Dump(LeafArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let builder = TreeBuilder::new().with_parallel_threshold(cli.parallel_threshold);
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Root(args) => {
            let tree = load_tree(&args, &builder)?;
            commands::write_root(&tree, &mut out)?;
        }
        Command::Prove { leaves, index } => {
            let tree = load_tree(&leaves, &builder)?;
            commands::write_proof(&tree, index, &mut out)?;
        }
        Command::Verify {
            proof,
            leaf,
            value,
            root,
        } => {
            let reader = open_input(proof.as_deref())?;
            let leaf = match (leaf, value) {
                (Some(hex), _) => Some(commands::LeafOverride::Hex(hex)),
                (None, Some(raw)) => Some(commands::LeafOverride::Value(raw)),
                (None, None) => None,
            };
            let ok = commands::verify(reader, leaf.as_ref(), root.as_deref(), &mut out)?;
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Dump(args) => {
            let tree = load_tree(&args, &builder)?;
            commands::write_dump(&tree, &mut out)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn load_tree(args: &LeafArgs, builder: &TreeBuilder) -> anyhow::Result<MerkleTree<Hash32>> {
    let reader = open_input(args.input.as_deref())?;
    let store = commands::read_leaves(reader, args.hex)?;
    commands::build_tree(&store, builder)
}
