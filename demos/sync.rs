//! Runs one sync attempt between two peers.
//!
//! **Usage**:
//! ```bash
//! cargo run --example sync -- \
//!     --dep "R(x, y), S(x, z, w) -> T(x, y, z), V(w, x)" \
//!     --source "R(1, 1)" --source "S(1, 1, 4)"
//! cargo run --example sync -- --rules mapping.tgd --facts-source src.facts -v
//! ```

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use tgd_chase::config::{ChaseConfig, MissingDelete};
use tgd_chase::fact::Fact;
use tgd_chase::kb::{KnowledgeBase, SyncResult};
use tgd_chase::syntax::{parse_dependencies, parse_dependency, parse_fact, parse_facts};
use tgd_chase::types::Side;

#[derive(Debug, Parser)]
#[command(author, version, about = "Chase two peers to a fixpoint")]
struct Cli {
    /// File with one dependency per line.
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Dependency `L -> R` (may be repeated).
    #[arg(long, value_name = "TGD")]
    dep: Vec<String>,

    /// File with source facts to insert, one per line.
    #[arg(long, value_name = "FILE")]
    facts_source: Option<PathBuf>,

    /// File with target facts to insert, one per line.
    #[arg(long, value_name = "FILE")]
    facts_target: Option<PathBuf>,

    /// Fact to insert on the source (may be repeated).
    #[arg(long, value_name = "FACT")]
    source: Vec<String>,

    /// Fact to insert on the target (may be repeated).
    #[arg(long, value_name = "FACT")]
    target: Vec<String>,

    /// Fact to delete on the source after the first sync (may be repeated).
    #[arg(long, value_name = "FACT")]
    delete_source: Vec<String>,

    /// Fact to delete on the target after the first sync (may be repeated).
    #[arg(long, value_name = "FACT")]
    delete_target: Vec<String>,

    /// Fail when a deletion matches nothing.
    #[arg(long)]
    reject_missing: bool,

    /// Keep pending edits after a commit.
    #[arg(long)]
    keep_pending: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    let level = if args.verbose {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let config = ChaseConfig {
        clear_pending_on_commit: !args.keep_pending,
        missing_delete: if args.reject_missing {
            MissingDelete::Reject
        } else {
            MissingDelete::Ignore
        },
    };
    let mut kb = KnowledgeBase::with_config(config);

    let mut dependencies = Vec::new();
    if let Some(path) = &args.rules {
        let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        dependencies.extend(parse_dependencies(&text).wrap_err_with(|| format!("parsing {}", path.display()))?);
    }
    for dep in &args.dep {
        dependencies.push(parse_dependency(dep).wrap_err_with(|| format!("parsing '{}'", dep))?);
    }
    kb.define_dependencies(dependencies)?;

    for (side, file, inline) in [
        (Side::Source, &args.facts_source, &args.source),
        (Side::Target, &args.facts_target, &args.target),
    ] {
        for fact in read_facts(file.as_ref(), inline)? {
            kb.local_insert(side, fact)?;
        }
    }

    println!("─── Before ───\n");
    println!("{}", kb);
    report(kb.run_sync()?);

    let deletes = [
        (Side::Source, &args.delete_source),
        (Side::Target, &args.delete_target),
    ];
    if deletes.iter().any(|(_, facts)| !facts.is_empty()) {
        for (side, facts) in deletes {
            for fact in read_facts(None, facts)? {
                kb.local_delete(side, fact)?;
            }
        }
        println!("\n─── Deleting ───\n");
        println!("{}", kb);
        report(kb.run_sync()?);
    }

    println!("\n─── After ───\n");
    println!("{}", kb);
    println!("Labeled nulls: {}", kb.null_count());

    Ok(())
}

fn read_facts(file: Option<&PathBuf>, inline: &[String]) -> Result<Vec<Fact>> {
    let mut facts = Vec::new();
    if let Some(path) = file {
        let text = std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
        facts.extend(parse_facts(&text).wrap_err_with(|| format!("parsing {}", path.display()))?);
    }
    for text in inline {
        facts.push(parse_fact(text).wrap_err_with(|| format!("parsing '{}'", text))?);
    }
    Ok(facts)
}

fn report(result: SyncResult) {
    match result {
        SyncResult::Committed => println!("Sync: committed"),
        SyncResult::RolledBack(violation) => println!("Sync: rolled back ({})", violation),
    }
}
