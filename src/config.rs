use crate::error::Error;
use crate::redirect::RedirectMap;
use crate::table::AllowSet;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub type SharedConfig = Arc<Config>;

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Path to the (optionally gzip compressed) ip2asn range table.
    pub database_path: PathBuf,
    /// Path to the `target,asn,url` redirect file.
    pub redirects_path: PathBuf,
    /// Load every ASN from the range table instead of only those named in the redirect file.
    #[serde(default)]
    pub load_all: bool,
    pub http_bind_addr: SocketAddr,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub http_timeout: Duration,
}

impl Config {
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    /// The filter to build the range table with for the given redirects.
    pub fn allow_set(&self, redirects: &RedirectMap) -> AllowSet {
        if self.load_all {
            return AllowSet::load_all();
        }
        redirects.allow_set()
    }
}
