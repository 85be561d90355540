use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single external command invocation.
#[derive(Error, Debug)]
pub(crate) enum CommandError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: String },
}

/// Failure to obtain the set of network names at all.
#[derive(Error, Debug)]
pub(crate) enum CollectError {
    #[error("Unsupported OS: {0}")]
    UnsupportedPlatform(String),

    #[error("Unable to retrieve Wi-Fi profiles ({0})")]
    ProfileListing(#[source] CommandError),

    #[error("MacOS password retrieval error: {0}")]
    NetworkListing(#[source] CommandError),

    #[error("Network information unavailable. Try running with sudo. ({0})")]
    WirelessScan(#[source] CommandError),

    #[error("Linux password retrieval error: {}: {source}", path.display())]
    ConnectionDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to query iwd known networks: {0}")]
    Iwd(String),

    #[error("scan stopped unexpectedly")]
    WorkerDied,
}

#[derive(Error, Debug)]
pub(crate) enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("nothing to export, run a scan first")]
    Empty,
}

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
