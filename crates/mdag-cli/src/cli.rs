use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdag",
    about = "Content-addressed Merkle DAG for file trees",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Object store directory (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file; `mdag.toml` is used when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a file or directory and print its root hash
    Add(AddArgs),
    /// Print the content of a file under a root
    Cat(CatArgs),
    /// List the links of a directory object
    Ls(LsArgs),
    /// Show the block chain of a chunked file
    Chain(ChainArgs),
}

#[derive(Args)]
pub struct AddArgs {
    pub path: PathBuf,
    /// Also write a manifest object naming the result
    #[arg(long)]
    pub wrap: bool,
}

#[derive(Args)]
pub struct CatArgs {
    pub hash: String,
    /// File name under the root; omit when the hash is a file
    pub name: Option<String>,
}

#[derive(Args)]
pub struct LsArgs {
    pub hash: String,
}

#[derive(Args)]
pub struct ChainArgs {
    pub hash: String,
}
