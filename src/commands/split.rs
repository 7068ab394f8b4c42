//! Split command implementation
//!
//! Resolves the partition of a modular repository and, when a target is
//! given, writes one directory per bucket:
//! 1. Target directory check
//! 2. Metadata loading and partition resolution
//! 3. Missing-package validation
//! 4. Materialization with the chosen action
//! 5. Optional `createrepo_c` run per bucket

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use modsplit::createrepo::{CreaterepoIndexer, DEFAULT_CREATEREPO};
use modsplit::error::Error;
use modsplit::materialize::Action;
use modsplit::output::{ColorChoice, OutputConfig};
use modsplit::partition::Partition;
use modsplit::split::{self, SplitOptions, SplitOutcome, SplitReport};
use modsplit::validate;

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// The repository to split
    #[arg(value_name = "REPOSITORY")]
    pub repository: PathBuf,

    /// Method used to place package files in the split repositories
    #[arg(long, value_enum, default_value_t = Action::Hardlink)]
    pub action: Action,

    /// Target directory for the split repositories (must be absent or empty)
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Continue even when package files referenced by the metadata are missing
    #[arg(long)]
    pub skip_missing: bool,

    /// Create repository metadata in every split repository
    #[arg(long)]
    pub create_repos: bool,

    /// Command used to create repository metadata
    #[arg(
        long,
        value_name = "CMD",
        env = "MODSPLIT_CREATEREPO",
        default_value = DEFAULT_CREATEREPO
    )]
    pub createrepo_cmd: String,

    /// Show the partition without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// With --dry-run, print the partition as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the split command
pub fn execute(args: SplitArgs, color: ColorChoice) -> Result<()> {
    let out = OutputConfig::new(color).quiet(args.quiet || args.json);

    if args.dry_run {
        return dry_run(&args, &out);
    }

    let options = SplitOptions {
        repository: args.repository.clone(),
        target: args.target.clone(),
        action: args.action,
        skip_missing: args.skip_missing,
        create_repos: args.create_repos,
    };
    let indexer = CreaterepoIndexer::new(&args.createrepo_cmd);

    out.status(
        "🔍",
        "[SCAN]",
        &format!("Splitting repository: {}", args.repository.display()),
    );

    match split::execute(&options, &indexer) {
        Ok(SplitOutcome::NotModular) => {
            print_not_modular(&out);
            Ok(())
        }
        Ok(SplitOutcome::Split(report)) => {
            print_report(&out, &options, &report);
            Ok(())
        }
        Err(e @ Error::MissingPackages { .. }) => {
            out.status("❌", "[ERR]", "Package files were missing");
            out.detail("Use --skip-missing to split anyway");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn dry_run(args: &SplitArgs, out: &OutputConfig) -> Result<()> {
    let root = split::repository_root(&args.repository)?;
    let partition = match split::resolve(&root)? {
        Some(partition) => partition,
        None => {
            print_not_modular(out);
            return Ok(());
        }
    };

    let report = validate::validate(&root, &partition);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&partition)?);
    } else {
        out.status("🔎", "[DRY-RUN]", "No changes will be made");
        print_partition(out, &partition);
    }

    if !args.skip_missing {
        report.into_result()?;
    }
    Ok(())
}

fn print_not_modular(out: &OutputConfig) {
    out.status("ℹ️", "[INFO]", "This repository has no modules defined.");
    out.detail("modsplit only works on repositories with modules.");
}

fn print_partition(out: &OutputConfig, partition: &Partition) {
    out.status(
        "📊",
        "[INFO]",
        &format!("{} bucket(s):", partition.len()),
    );
    for (key, paths) in partition.buckets() {
        out.detail(&format!("{}: {} package(s)", key, paths.len()));
    }
}

fn print_report(out: &OutputConfig, options: &SplitOptions, report: &SplitReport) {
    print_partition(out, &report.partition);

    if !report.validation.is_ok() {
        out.status(
            "⚠️",
            "[WARN]",
            &format!(
                "{} missing package file(s) skipped",
                report.validation.missing.len()
            ),
        );
    }

    match &options.target {
        Some(target) => {
            let placed: usize = report.buckets.iter().map(|bucket| bucket.placed).sum();
            out.status(
                "✅",
                "[OK]",
                &format!(
                    "Wrote {} bucket(s) with {} file(s) to {} using {}",
                    report.buckets.len(),
                    placed,
                    target.display(),
                    options.action
                ),
            );
        }
        None => out.status("✅", "[OK]", "Repository is consistent (no --target given, nothing written)"),
    }

    if !report.indexed.is_empty() {
        let failed: Vec<&PathBuf> = report
            .indexed
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(dir, _)| dir)
            .collect();
        if failed.is_empty() {
            out.status(
                "📦",
                "[REPO]",
                &format!("Created repository metadata for {} bucket(s)", report.indexed.len()),
            );
        } else {
            out.status(
                "⚠️",
                "[WARN]",
                &format!("Repository metadata creation failed for {} bucket(s):", failed.len()),
            );
            for dir in failed {
                out.detail(&dir.display().to_string());
            }
        }
    }
}
