//! PolyScop Command Line Interface
//!
//! Usage:
//!   polyscop [OPTIONS] <input-file>
//!   polyscop --help
//!
//! Examples:
//!   polyscop matmul.scop                     # Read and pretty-print
//!   polyscop --precision=mp big.scop         # Arbitrary precision coefficients
//!   polyscop --check matmul.scop             # Verify print/read idempotence
//!   polyscop --betas matmul.scop             # Dump statement beta vectors
//!   polyscop --relation --parameters=1 d.rel # Rewrite one standalone relation

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use polyscop::beta::{check_unique_betas, extract_beta, beta_to_string};
use polyscop::codec;
use polyscop::extension::ExtensionRegistry;
use polyscop::int::Precision;
use polyscop::{Scop, ScopConfig};
use std::fs;
use std::path::PathBuf;

/// PolyScop - Polyhedral SCoP interchange tool
#[derive(Parser, Debug)]
#[command(name = "polyscop")]
#[command(author = "PolyScop Contributors")]
#[command(version)]
#[command(about = "Read, check and rewrite polyhedral SCoP files", long_about = None)]
struct Cli {
    /// Input file (.scop format)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Coefficient precision: 32, 64 or 0 (also sp, dp, mp)
    #[arg(short, long, value_parser = parse_precision)]
    precision: Option<Precision>,

    /// Do not print `##` row comments
    #[arg(long)]
    no_comments: bool,

    /// Input is one standalone relation union instead of programs
    #[arg(long, conflicts_with = "betas")]
    relation: bool,

    /// Parameter count for legacy matrix headers of a standalone relation
    #[arg(long, value_name = "N", requires = "relation")]
    parameters: Option<usize>,

    /// Check that printing the re-read output gives the same text
    #[arg(long)]
    check: bool,

    /// Print the beta vector of every scattering part instead of the program
    #[arg(long)]
    betas: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_precision(text: &str) -> std::result::Result<Precision, String> {
    text.parse().map_err(|e: polyscop::ScopError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("PolyScop v{}", polyscop::VERSION);
    debug!("Input file: {:?}", cli.input);

    let config = build_config(&cli)?;
    debug!("Config: {:?}", config);

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read input file: {:?}", cli.input))?;

    if cli.relation {
        let output = rewrite_relation(&source, &config, cli.check)
            .with_context(|| format!("Failed to rewrite {:?}", cli.input))?;
        return write_output(&cli.output, &output);
    }

    info!("Reading...");
    let registry = ExtensionRegistry::with_defaults();
    let scops = codec::read_scops_with(&source, &registry, &config)
        .with_context(|| format!("Failed to read {:?}", cli.input))?;
    info!("Read {} scop(s)", scops.len());

    let printed = codec::print_scops(&scops, &config).context("Failed to print scops")?;

    if cli.check {
        check_idempotence(&printed, &registry, &config)?;
        info!("Print/read round trip is stable");
    }

    let output = if cli.betas {
        betas_report(&scops)?
    } else {
        printed
    };
    write_output(&cli.output, &output)
}

fn build_config(cli: &Cli) -> Result<ScopConfig> {
    let mut config = ScopConfig::from_env().context("Invalid environment configuration")?;

    // Override with CLI flags
    if let Some(precision) = cli.precision {
        config = config.with_precision(precision);
    }
    if cli.no_comments {
        config = config.with_comments(false);
    }
    if let Some(n) = cli.parameters {
        config = config.with_legacy_parameters(n);
    }
    Ok(config)
}

fn rewrite_relation(source: &str, config: &ScopConfig, check: bool) -> Result<String> {
    info!("Reading relation...");
    let union = codec::read_relation(source, config)?;
    info!("Read a {}-part relation union", union.len());
    let printed = codec::print_relation(&union, config)?;
    if check {
        let reread = codec::read_relation(&printed, config)
            .context("Failed to re-read printed output")?;
        compare_outputs(&printed, &codec::print_relation(&reread, config)?)?;
        info!("Print/read round trip is stable");
    }
    Ok(printed)
}

fn check_idempotence(printed: &str, registry: &ExtensionRegistry, config: &ScopConfig) -> Result<()> {
    let reread = codec::read_scops_with(printed, registry, config)
        .context("Failed to re-read printed output")?;
    let again = codec::print_scops(&reread, config)?;
    compare_outputs(printed, &again)
}

fn compare_outputs(printed: &str, again: &str) -> Result<()> {
    if again != printed {
        let line = printed
            .lines()
            .zip(again.lines())
            .position(|(a, b)| a != b)
            .map(|i| i + 1)
            .unwrap_or_else(|| printed.lines().count().min(again.lines().count()) + 1);
        bail!("Printed output is not stable: first difference at line {}", line);
    }
    Ok(())
}

fn betas_report(scops: &[Scop]) -> Result<String> {
    let mut report = String::new();
    for (index, scop) in scops.iter().enumerate() {
        if scops.len() > 1 {
            report.push_str(&format!("# Scop {}\n", index + 1));
        }
        for (statement, part, relation) in scop.scattering_parts() {
            let beta = extract_beta(relation)
                .with_context(|| format!("Failed to extract beta of statement {}", statement + 1))?;
            report.push_str(&format!("S{}.{} {}\n", statement + 1, part + 1, beta_to_string(&beta)));
        }
        if let Err(e) = check_unique_betas(scop) {
            warn!("{}", e);
        }
    }
    Ok(report)
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
