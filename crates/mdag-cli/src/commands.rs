use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use mdag_core::{open_node, DagAccumulator, Node, Resolver, StoredNode, TreeBuilder};
use mdag_store::{FsKvStore, KvStore};
use mdag_types::{BlockLink, ContentHash, Link, LinkKind};
use serde_json::json;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?.with_store(cli.store);
    match cli.command {
        Command::Add(args) => cmd_add(&config, args, &cli.format),
        Command::Cat(args) => cmd_cat(&config, args),
        Command::Ls(args) => cmd_ls(&config, args, &cli.format),
        Command::Chain(args) => cmd_chain(&config, args, &cli.format),
    }
}

fn open_store(config: &CliConfig) -> anyhow::Result<FsKvStore> {
    FsKvStore::open(&config.store)
        .with_context(|| format!("opening store {}", config.store.display()))
}

fn parse_hash(config: &CliConfig, hex: &str) -> anyhow::Result<ContentHash> {
    let len = config.dag.hasher().output_len();
    ContentHash::from_hex_with_len(hex, len)
        .with_context(|| format!("invalid {} hash {hex:?}", config.dag.hash))
}

/// Result of `mdag add`.
#[derive(Debug)]
pub struct Added {
    pub name: String,
    pub root: StoredNode,
    pub manifest: Option<ContentHash>,
}

pub fn add_path(config: &CliConfig, path: &Path, wrap: bool) -> anyhow::Result<Added> {
    let store = open_store(config)?;
    let node = open_node(path, &config.ignore)
        .with_context(|| format!("opening {}", path.display()))?;
    add_node(&store, config, &node, wrap)
}

/// Store `node` once. With `wrap`, the accumulator does the storing and the
/// root is read back from the manifest it writes.
pub fn add_node(
    store: &dyn KvStore,
    config: &CliConfig,
    node: &Node,
    wrap: bool,
) -> anyhow::Result<Added> {
    let chunker = config.dag.chunker()?;
    let mut hasher = config.dag.hasher();

    if !wrap {
        let root = TreeBuilder::new(store)
            .with_chunker(chunker)
            .store_root(node, hasher.as_mut())?;
        return Ok(Added {
            name: node.name().to_string(),
            root,
            manifest: None,
        });
    }

    let mut acc = DagAccumulator::with_chunker(chunker);
    let manifest = match node {
        Node::Dir(_) => acc
            .add(store, node, hasher.as_mut())?
            .context("directory add wrote no manifest")?,
        Node::File(_) => {
            acc.push_frame();
            acc.add(store, node, hasher.as_mut())?;
            acc.seal_frame(store, hasher.as_mut())?
        }
    };
    let link = Resolver::new(store)
        .list(&manifest)?
        .into_iter()
        .next()
        .context("manifest has no entries")?;
    tracing::info!(name = node.name(), root = %link.hash, manifest = %manifest, "add complete");

    Ok(Added {
        name: node.name().to_string(),
        root: StoredNode {
            hash: link.hash,
            kind: link.kind,
            size: link.size,
        },
        manifest: Some(manifest),
    })
}

fn cmd_add(config: &CliConfig, args: AddArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let added = add_path(config, &args.path, args.wrap)?;
    match format {
        OutputFormat::Json => {
            let value = json!({
                "name": added.name,
                "hash": added.root.hash,
                "kind": added.root.kind,
                "size": added.root.size,
                "manifest": added.manifest,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!(
                "{} {} {} ({} bytes)",
                "added".green().bold(),
                added.root.kind.to_string().cyan(),
                added.name.bold(),
                added.root.size
            );
            println!("  root: {}", added.root.hash.to_string().yellow());
            if let Some(manifest) = &added.manifest {
                println!("  manifest: {}", manifest.to_string().yellow());
            }
        }
    }
    Ok(())
}

pub fn read_file(config: &CliConfig, hash: &str, name: &str) -> anyhow::Result<Vec<u8>> {
    let store = open_store(config)?;
    let root = parse_hash(config, hash)?;
    Ok(Resolver::new(&store).resolve(&root, name)?)
}

fn cmd_cat(config: &CliConfig, args: CatArgs) -> anyhow::Result<()> {
    let content = read_file(config, &args.hash, args.name.as_deref().unwrap_or(""))?;
    let mut out = std::io::stdout().lock();
    out.write_all(&content)?;
    out.flush()?;
    Ok(())
}

pub fn list_links(config: &CliConfig, hash: &str) -> anyhow::Result<Vec<Link>> {
    let store = open_store(config)?;
    let root = parse_hash(config, hash)?;
    Ok(Resolver::new(&store).list(&root)?)
}

fn cmd_ls(config: &CliConfig, args: LsArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let links = list_links(config, &args.hash)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&links)?),
        OutputFormat::Text => {
            for link in &links {
                let kind = match link.kind {
                    LinkKind::Tree => link.kind.to_string().blue(),
                    _ => link.kind.to_string().normal(),
                };
                println!(
                    "{:<4} {:>12} {} {}",
                    kind,
                    link.size,
                    link.hash.short_hex().yellow(),
                    link.name
                );
            }
        }
    }
    Ok(())
}

pub fn block_chain(config: &CliConfig, hash: &str) -> anyhow::Result<Vec<(ContentHash, BlockLink)>> {
    let store = open_store(config)?;
    let head = parse_hash(config, hash)?;
    let chain = Resolver::new(&store).walk_chain(&head)?;
    let mut keys = vec![head];
    keys.extend(chain.iter().filter_map(|l| l.next.clone()));
    Ok(keys.into_iter().zip(chain).collect())
}

fn cmd_chain(config: &CliConfig, args: ChainArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let chain = block_chain(config, &args.hash)?;
    match format {
        OutputFormat::Json => {
            let value: Vec<_> = chain
                .iter()
                .map(|(key, link)| json!({ "link": key, "block": link.block_hash, "next": link.next }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let total = chain.len();
            for (i, (key, link)) in chain.iter().enumerate() {
                println!(
                    "{:>4}  link {}  block {}",
                    total - i - 1,
                    key.short_hex().yellow(),
                    link.block_hash.short_hex().cyan()
                );
            }
            println!("{} blocks", total.to_string().bold());
        }
    }
    Ok(())
}
