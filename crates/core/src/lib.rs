//! s3seed-core - Core library for s3seed
//!
//! This library parses `source:destination` pair lists, classifies each
//! endpoint as an S3 URL or a local path, picks the transfer operation and
//! carries it out through the external AWS CLI, the native S3 SDK, or the
//! local filesystem.

pub mod aws_cli;
pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod pair;
pub mod plan;
pub mod store;

// Re-export commonly used types
pub use aws_cli::AwsCli;
pub use client::{ObjectInfo, SdkStore};
pub use config::{
    default_config_path, load_config, load_optional_config, Backend, ClientConfig, ConfigFile,
    CopyConfig, LoggingConfig, Overrides, RunConfig, PAIRS_ENV_VAR,
};
pub use error::{Error, Result};
pub use local::{copy_file, copy_tree, describe_local};
pub use pair::{is_remote, parse_pairs, split_pair, CopyTask, Outcome, S3_SCHEME};
pub use plan::{Operation, Plan};
pub use store::{ObjectStore, S3Url, TransferStatus};
