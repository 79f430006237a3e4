use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Mongo,
    Memory,
}

/// HTTP service for a todo list.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    #[arg(long, default_value = "0.0.0.0:9000")]
    pub listen: SocketAddr,

    #[arg(long, value_enum, default_value_t = Backend::Mongo)]
    pub backend: Backend,

    #[arg(long, default_value = "mongodb://localhost:27017")]
    pub mongo_uri: String,

    #[arg(long, default_value = "go-todo")]
    pub database: String,

    #[arg(long, default_value = "todo")]
    pub collection: String,

    /// Snapshot file for the memory backend.
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    #[arg(long, default_value = "static/home.tpl")]
    pub template: PathBuf,

    /// PEM certificate; serves HTTPS together with `--tls-key`.
    #[arg(long, requires = "tls_key")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,
}

impl Args {
    pub fn tls(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.tls_cert.as_ref().zip(self.tls_key.as_ref())
    }
}
