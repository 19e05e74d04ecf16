//! Sequential run loop over the configured pairs

use console::style;
use s3seed_core::{
    copy_file, copy_tree, describe_local, parse_pairs, CopyTask, Error, ObjectStore, Operation,
    Outcome, RunConfig, TransferStatus,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Counters folded from every task outcome
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub simulated: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed | Outcome::SkippedMalformed => self.failed += 1,
            Outcome::Simulated => self.simulated += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Print the final tally
    pub fn print(&self, dry_run: bool) {
        println!();
        println!("Summary:");
        println!("  Total pairs: {}", self.total);
        println!("  Succeeded: {}", self.succeeded);
        println!("  Failed: {}", self.failed);
        if dry_run {
            println!("  Simulated (dry run): {}", self.simulated);
        }
    }
}

/// Copy orchestrator
pub struct Runner<'a> {
    config: &'a RunConfig,
    store: &'a dyn ObjectStore,
}

impl<'a> Runner<'a> {
    pub fn new(config: &'a RunConfig, store: &'a dyn ObjectStore) -> Self {
        Self { config, store }
    }

    /// Process every pair in order; never stops early
    pub async fn run(&self) -> RunSummary {
        let entries = parse_pairs(&self.config.pairs);
        let mut summary = RunSummary {
            total: entries.len(),
            ..Default::default()
        };

        if self.config.dry_run {
            println!("Dry run: no data will be transferred");
        }

        for (index, entry) in entries.into_iter().enumerate() {
            let outcome = match entry {
                Ok(task) => {
                    println!(
                        "[{}/{}] {} -> {}",
                        index + 1,
                        summary.total,
                        task.source,
                        task.destination
                    );
                    tracing::info!(pair = index + 1, source = %task.source, destination = %task.destination, "Processing pair");
                    self.process(&task).await
                }
                Err(e) => {
                    eprintln!("[{}/{}] {} {}", index + 1, summary.total, style("❌").red(), e);
                    Outcome::SkippedMalformed
                }
            };
            summary.record(outcome);
        }

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Run finished"
        );
        summary
    }

    async fn process(&self, task: &CopyTask) -> Outcome {
        if let Err(e) = task.validate() {
            eprintln!("  {} {}", style("❌").red(), e);
            return Outcome::SkippedMalformed;
        }

        let plan = task.plan();
        let dry_run = self.config.dry_run;
        tracing::debug!(operation = %plan.operation, dry_run, "Selected operation");

        if let Some(dir) = &plan.create_dir {
            if dry_run {
                tracing::debug!(dir = %dir.display(), "Skipping directory creation (dry run)");
            } else if let Err(e) = tokio::fs::create_dir_all(dir).await {
                eprintln!(
                    "  {} Failed to create directory {}: {}",
                    style("❌").red(),
                    dir.display(),
                    e
                );
                return Outcome::Failed;
            }
        }

        let status = self.execute(task, plan.operation).await;

        if status.success() {
            if dry_run {
                return Outcome::Simulated;
            }
            println!(
                "  {} Copied {} -> {}",
                style("✅").green(),
                task.source,
                task.destination
            );
            Outcome::Succeeded
        } else {
            let err = Error::TransferFailed {
                from: task.source.clone(),
                to: task.destination.clone(),
                status: status.code(),
            };
            eprintln!("  {} {}", style("❌").red(), err);
            Outcome::Failed
        }
    }

    async fn execute(&self, task: &CopyTask, operation: Operation) -> TransferStatus {
        let dry_run = self.config.dry_run;
        let (src, dst) = (task.source.as_str(), task.destination.as_str());

        let result = match operation {
            Operation::SyncTree => self.store.sync_tree(src, dst, dry_run).await,
            Operation::CopyObject => self.store.copy_object(src, dst, dry_run).await,
            Operation::LocalTree | Operation::LocalFile if dry_run => {
                println!("  Would execute: {}", describe_local(operation, src, dst));
                Ok(TransferStatus::SUCCESS)
            }
            Operation::LocalTree | Operation::LocalFile => run_local(operation, src, dst).await,
        };

        match result {
            Ok(status) => status,
            Err(e) => {
                eprintln!("  {} {}", style("❌").red(), e);
                TransferStatus::FAILURE
            }
        }
    }
}

async fn run_local(operation: Operation, src: &str, dst: &str) -> s3seed_core::Result<TransferStatus> {
    let src = PathBuf::from(src);
    let dst = dst.to_string();

    tokio::task::spawn_blocking(move || {
        if operation == Operation::LocalTree {
            copy_tree(&src, PathBuf::from(&dst).as_path()).map(|_| ())
        } else {
            copy_file(&src, &dst).map(|_| ())
        }
    })
    .await
    .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    Ok(TransferStatus::SUCCESS)
}
