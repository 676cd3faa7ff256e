//! Daemon configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for a covault daemon, loadable from a TOML file.
///
/// The owner list and threshold only matter on first boot: once a roster is
/// stored, the store's copy is authoritative and a conflicting configured
/// roster is refused at startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Owner addresses, `0x`-prefixed.
    pub owners: Vec<String>,
    /// Approvals (or rejections) required to finalize a transaction.
    pub required_approvals: usize,
    /// Directory for the LMDB environment.
    pub data_dir: PathBuf,
    /// RPC server port.
    pub rpc_port: u16,
    /// Keep all state in memory, nothing on disk.
    pub ephemeral: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            required_approvals: 0,
            data_dir: PathBuf::from("./covault_data"),
            rpc_port: 7077,
            ephemeral: false,
        }
    }
}
