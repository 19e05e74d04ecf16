//! Transfers through the external `aws` command-line client

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::store::{ObjectStore, TransferStatus};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Flag the client understands as "simulate, do not transfer"
const DRYRUN_FLAG: &str = "--dryrun";

/// `aws s3 cp` / `aws s3 sync` runner
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    global_args: Vec<String>,
}

impl AwsCli {
    /// Locate the client program, either as a path or on `PATH`
    pub fn locate(program: &str) -> Result<Self> {
        let resolved = which::which(program).map_err(|e| {
            Error::ToolUnavailable(format!(
                "'{}' is not an executable program ({}); install the AWS CLI or set client.aws_bin",
                program, e
            ))
        })?;
        tracing::debug!(program = %resolved.display(), "Located object-store client");

        Ok(Self {
            program: resolved,
            global_args: Vec::new(),
        })
    }

    /// Locate the program named in the client settings and apply its options
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut cli = Self::locate(&config.aws_bin)?;
        if let Some(url) = &config.endpoint_url {
            cli = cli.with_endpoint_url(url);
        }
        if let Some(region) = &config.region {
            cli = cli.with_region(region);
        }
        Ok(cli)
    }

    pub fn with_endpoint_url(mut self, url: &str) -> Self {
        self.global_args.push("--endpoint-url".to_string());
        self.global_args.push(url.to_string());
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.global_args.push("--region".to_string());
        self.global_args.push(region.to_string());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one `s3` subcommand
    pub fn args(&self, subcommand: &str, source: &str, destination: &str, dry_run: bool) -> Vec<String> {
        let mut args = self.global_args.clone();
        args.extend(
            ["s3", subcommand, source, destination]
                .iter()
                .map(|s| s.to_string()),
        );
        if dry_run {
            args.push(DRYRUN_FLAG.to_string());
        }
        args
    }

    async fn run(
        &self,
        subcommand: &str,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus> {
        let args = self.args(subcommand, source, destination, dry_run);
        let command_line = format!("{} {}", self.program.display(), args.join(" "));

        if dry_run {
            println!("  Would run: {}", command_line);
        } else {
            tracing::info!(command = %command_line, "Running transfer");
        }

        let status = Command::new(&self.program).args(&args).status().await?;

        // Terminated by a signal
        Ok(TransferStatus(status.code().unwrap_or(-1)))
    }
}

#[async_trait]
impl ObjectStore for AwsCli {
    async fn copy_object(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus> {
        self.run("cp", source, destination, dry_run).await
    }

    async fn sync_tree(
        &self,
        source: &str,
        destination: &str,
        dry_run: bool,
    ) -> Result<TransferStatus> {
        self.run("sync", source, destination, dry_run).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_locate_missing_program() {
        let result = AwsCli::locate("s3seed-no-such-client");
        assert!(matches!(result, Err(Error::ToolUnavailable(_))));

        let result = AwsCli::locate("/nonexistent/dir/aws");
        assert!(matches!(result, Err(Error::ToolUnavailable(_))));
    }

    #[test]
    fn test_locate_non_executable_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("aws");
        std::fs::write(&client, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&client, std::fs::Permissions::from_mode(0o644)).unwrap();

        let result = AwsCli::locate(client.to_str().unwrap());
        assert!(matches!(result, Err(Error::ToolUnavailable(_))));
    }

    #[test]
    fn test_locate_on_path() {
        let cli = AwsCli::locate("sh").unwrap();
        assert!(cli.program().is_absolute());
        assert!(cli.program().ends_with("sh"));
    }

    #[test]
    fn test_args() {
        let cli = AwsCli::locate("sh")
            .unwrap()
            .with_endpoint_url("http://minio:9000")
            .with_region("us-east-1");

        assert_eq!(
            cli.args("cp", "s3://b/f.zip", "/app/data/", false),
            vec![
                "--endpoint-url",
                "http://minio:9000",
                "--region",
                "us-east-1",
                "s3",
                "cp",
                "s3://b/f.zip",
                "/app/data/"
            ]
        );
        assert_eq!(
            cli.args("sync", "s3://b/dir/", "/app/dir", true).last().unwrap(),
            "--dryrun"
        );
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            aws_bin: "sh".to_string(),
            region: Some("eu-west-3".to_string()),
            ..Default::default()
        };
        let cli = AwsCli::from_config(&config).unwrap();
        let args = cli.args("cp", "a", "b", false);
        assert_eq!(&args[..2], &["--region", "eu-west-3"]);
    }

    #[tokio::test]
    async fn test_exit_status_is_reported() {
        let ok = AwsCli::locate("true").unwrap();
        let status = ok.copy_object("s3://b/k", "/tmp/k", false).await.unwrap();
        assert!(status.success());

        let failing = AwsCli::locate("false").unwrap();
        let status = failing.sync_tree("s3://b/p/", "/tmp/p", false).await.unwrap();
        assert_eq!(status, TransferStatus(1));
    }
}
