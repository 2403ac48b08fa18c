// Copyright 2025 iorgate Contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed run configuration.
//!
//! Loaded once from a TOML file and overlaid with `IORGATE__<SECTION>__<KEY>`
//! environment variables. Baselines are looked up by test id rather than by
//! building parameter paths at run time.
//!
//! ```toml
//! workdir = "/tmp/iorgate"
//!
//! [server]
//! hosts = ["server-1", "server-2"]
//! start_command = "daos_server start -g {group} --hosts {hosts}"
//! stop_command = "daos_server stop --hosts {hosts}"
//!
//! [clients]
//! hosts = ["client-1", "client-2"]
//!
//! [pool]
//! size = 536870912
//! svcn = 1
//! create_command = "dmg pool create --size {size} --nsvc {svcn} --group {setname}"
//! destroy_command = "dmg pool destroy --pool {uuid} --force"
//!
//! [ior]
//! transfer_size = "1m"
//! record_size = "1k"
//! stripe_size = "1m"
//! stripe_count = 1024
//! async_io = 16
//! object_class = "LARGE"
//! slots = 16
//!
//! [validation]
//! deviation_percent = 5.0
//!
//! [baselines.testID_1]
//! write = 1400
//! read = 1600
//! ```

use crate::error::{Error, Result};
use crate::summary::SummaryLayout;
use crate::tolerance::{Baseline, ComparisonMode};
use crate::validator::Validator;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "IORGATE";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Data written per client host, split across its slots.
const CLIENT_DATA_MIB: u64 = 24 * 1024;

/// Whether a run is expected to pass validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedOutcome {
    /// The run must produce a passing verdict.
    #[default]
    Pass,
    /// The run must regress or fail to complete.
    Fail,
}

/// Storage server group and lifecycle commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server group name.
    #[serde(default = "default_group")]
    pub group: String,
    /// Server hosts.
    pub hosts: Vec<String>,
    /// Start command template; `{group}` and `{hosts}` are substituted.
    pub start_command: String,
    /// Stop command template; `{group}` and `{hosts}` are substituted.
    pub stop_command: String,
    /// Time limit for each start or stop command.
    #[serde(default = "default_lifecycle_timeout_secs")]
    pub timeout_secs: u64,
}

/// Benchmark client hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client hosts.
    pub hosts: Vec<String>,
}

/// Pool parameters and lifecycle commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Pool access mode.
    #[serde(default = "default_mode")]
    pub mode: u32,
    /// Pool size in bytes.
    pub size: u64,
    /// Server group the pool is created in.
    #[serde(default = "default_group")]
    pub setname: String,
    /// Number of pool service replicas.
    #[serde(default = "default_svcn")]
    pub svcn: u32,
    /// Create command template; `{mode}`, `{size}`, `{setname}`, `{svcn}`.
    pub create_command: String,
    /// Destroy command template; `{uuid}` and `{setname}`.
    pub destroy_command: String,
    /// Time limit for each create or destroy command.
    #[serde(default = "default_lifecycle_timeout_secs")]
    pub timeout_secs: u64,
}

/// Benchmark parameters passed through to the launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IorConfig {
    /// MPI launcher executable.
    #[serde(default = "default_launcher")]
    pub launcher: String,
    /// Benchmark executable.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Extra benchmark flags, whitespace-separated.
    #[serde(default = "default_flags")]
    pub flags: String,
    /// Number of repetitions.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Transfer size, e.g. `1m`.
    pub transfer_size: String,
    /// Record size, e.g. `1k`.
    pub record_size: String,
    /// Stripe size, e.g. `8m`.
    pub stripe_size: String,
    /// Stripe count.
    pub stripe_count: u32,
    /// Asynchronous I/O depth.
    pub async_io: u32,
    /// Object class.
    pub object_class: String,
    /// Benchmark processes per client host.
    pub slots: u32,
    /// Per-process block size; derived from `slots` when unset.
    #[serde(default)]
    pub block_size: Option<String>,
    /// Process-level timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl IorConfig {
    /// Block size for each benchmark process.
    ///
    /// Without an explicit value, each client host writes 24 GiB split
    /// evenly across its slots: 8 slots give `3g`, 16 give `1536m`.
    pub fn block_size(&self) -> Result<String> {
        if let Some(block_size) = &self.block_size {
            parse_size(block_size)?;
            return Ok(block_size.clone());
        }
        if self.slots == 0 {
            return Err(Error::invalid_config("ior.slots must be at least 1"));
        }
        let slots = u64::from(self.slots);
        if CLIENT_DATA_MIB % slots != 0 {
            return Err(Error::invalid_config(format!(
                "cannot split {CLIENT_DATA_MIB}m evenly across {slots} slots; set ior.block_size"
            )));
        }
        let mib = CLIENT_DATA_MIB / slots;
        if mib % 1024 == 0 {
            Ok(format!("{}g", mib / 1024))
        } else {
            Ok(format!("{mib}m"))
        }
    }

    /// Transfer size, raised to the stripe size for 8 MiB stripes.
    pub fn transfer_size(&self) -> Result<String> {
        if parse_size(&self.stripe_size)? == 8 * MIB {
            return Ok(self.stripe_size.clone());
        }
        parse_size(&self.transfer_size)?;
        Ok(self.transfer_size.clone())
    }
}

/// Tolerance and expectation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Symmetric tolerance in percent.
    pub deviation_percent: f64,
    /// Comparison mode.
    #[serde(default)]
    pub comparison: ComparisonMode,
    /// Summary block layout.
    #[serde(default)]
    pub summary: SummaryLayout,
    /// Expected outcome of the run.
    #[serde(default)]
    pub expected_outcome: ExpectedOutcome,
}

/// Expected bandwidth for one test id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    /// Expected mean write bandwidth.
    pub write: f64,
    /// Expected mean read bandwidth.
    pub read: f64,
}

/// Complete configuration for one benchmark validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory for host files and captured benchmark output.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Storage servers.
    pub server: ServerConfig,
    /// Benchmark clients.
    pub clients: ClientConfig,
    /// Pool parameters.
    pub pool: PoolConfig,
    /// Benchmark parameters.
    pub ior: IorConfig,
    /// Validation settings.
    pub validation: ValidationConfig,
    /// Baselines keyed by test id.
    #[serde(default)]
    pub baselines: BTreeMap<String, BaselineEntry>,
}

impl RunConfig {
    /// Load from a TOML file with environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_env(path.as_ref(), env_source())
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(env)
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parse from TOML text without environment overrides.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Baseline for a test id, using the configured deviation.
    pub fn baseline(&self, test_id: &str) -> Result<Baseline> {
        let entry = self
            .baselines
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(test_id))
            .map(|(_, entry)| entry)
            .ok_or_else(|| Error::invalid_config(format!("no baseline for test id {test_id:?}")))?;
        Baseline::new(entry.write, entry.read, self.validation.deviation_percent)
    }

    /// Validator for a test id.
    pub fn validator(&self, test_id: &str) -> Result<Validator> {
        Ok(Validator::new(self.baseline(test_id)?)
            .with_mode(self.validation.comparison)
            .with_layout(self.validation.summary.clone()))
    }

    /// Check everything that can be checked before touching the cluster.
    pub fn validate(&self, test_id: &str) -> Result<()> {
        self.validator(test_id)?.bands()?;
        if self.server.hosts.is_empty() {
            return Err(Error::invalid_config("server.hosts is empty"));
        }
        if self.clients.hosts.is_empty() {
            return Err(Error::invalid_config("clients.hosts is empty"));
        }
        if self.pool.svcn == 0 {
            return Err(Error::invalid_config("pool.svcn must be at least 1"));
        }
        if self.ior.iterations == 0 {
            return Err(Error::invalid_config("ior.iterations must be at least 1"));
        }
        if self.ior.timeout_secs == 0 {
            return Err(Error::invalid_config("ior.timeout_secs must be at least 1"));
        }
        if self.server.timeout_secs == 0 || self.pool.timeout_secs == 0 {
            return Err(Error::invalid_config(
                "server.timeout_secs and pool.timeout_secs must be at least 1",
            ));
        }
        if self.validation.summary.marker.is_empty() {
            return Err(Error::invalid_config("validation.summary.marker is empty"));
        }
        self.ior.block_size()?;
        self.ior.transfer_size()?;
        parse_size(&self.ior.record_size)?;
        Ok(())
    }
}

/// Parse a benchmark size such as `8b`, `1k`, `1536m` or `3g` into bytes.
///
/// Suffixes are binary multiples; a bare number or a `b` suffix is bytes.
pub fn parse_size(size: &str) -> Result<u64> {
    let size = size.trim();
    let split = size
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(size.len());
    let (digits, suffix) = size.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| Error::invalid_config(format!("invalid size {size:?}")))?;
    let multiplier = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" => KIB,
        "m" => MIB,
        "g" => GIB,
        _ => return Err(Error::invalid_config(format!("invalid size suffix in {size:?}"))),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| Error::invalid_config(format!("size {size:?} overflows")))
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_group() -> String {
    "daos_server".to_string()
}

fn default_mode() -> u32 {
    146
}

fn default_svcn() -> u32 {
    1
}

fn default_launcher() -> String {
    "orterun".to_string()
}

fn default_binary() -> String {
    "ior".to_string()
}

fn default_flags() -> String {
    "-w -r".to_string()
}

fn default_iterations() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_lifecycle_timeout_secs() -> u64 {
    600
}
