use crate::core::domain::{ObjectId, SuiAddress};
use crate::core::errors::VaultError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Default gas budget for deposit and withdraw, in MIST.
pub const DEFAULT_GAS_BUDGET: u64 = 300_000_000;

/// Config file read when neither `--config` nor `CONFIG_PATH` is given.
pub const DEFAULT_CONFIG_PATH: &str = "sui-vault.toml";

/// Full node connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "NetworkConfig::default_name")]
    pub name: String,

    #[serde(default = "NetworkConfig::default_rpc_url")]
    pub rpc_url: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "NetworkConfig::default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl NetworkConfig {
    fn default_name() -> String { "testnet".to_string() }
    fn default_rpc_url() -> String { "https://wallet-rpc.testnet.sui.io/".to_string() }
    fn default_request_timeout() -> u64 { 30 }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            rpc_url: Self::default_rpc_url(),
            request_timeout_secs: Self::default_request_timeout(),
        }
    }
}

/// On-chain object references of the deployed vault.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRecord {
    #[serde(default)]
    pub package_id: ObjectId,

    /// Shared balance-storage object passed to every vault entry point
    #[serde(default)]
    pub balance_storage: ObjectId,

    /// Sender substituted for reads when no wallet is connected
    #[serde(default)]
    pub address_zero: SuiAddress,
}

impl Default for ObjectRecord {
    fn default() -> Self {
        Self {
            package_id: ObjectId::ZERO,
            balance_storage: ObjectId::ZERO,
            address_zero: SuiAddress::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    #[serde(default = "GasConfig::default_budget")]
    pub budget: u64,
}

impl GasConfig {
    fn default_budget() -> u64 { DEFAULT_GAS_BUDGET }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self { budget: Self::default_budget() }
    }
}

/// External signer command. `{address}` and `{tx_bytes}` in `args` are
/// substituted before the program runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignerConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl SignerConfig {
    /// Parse a whitespace separated command line, e.g. from an env var.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletSettings {
    /// Connected account. `None` means disconnected.
    #[serde(default)]
    pub address: Option<SuiAddress>,

    #[serde(default)]
    pub signer: Option<SignerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "WatchConfig::default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl WatchConfig {
    fn default_poll_interval() -> u64 { 5 }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { poll_interval_secs: Self::default_poll_interval() }
    }
}

/// Vault client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub objects: ObjectRecord,

    #[serde(default)]
    pub gas: GasConfig,

    #[serde(default)]
    pub wallet: WalletSettings,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl VaultConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, VaultError> {
        toml::from_str(content).map_err(|e| VaultError::Config(e.to_string()))
    }

    /// Load from `path` (or `CONFIG_PATH`, or `sui-vault.toml`), apply
    /// environment overrides, then validate. A missing file falls back to
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, VaultError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("CONFIG_PATH").ok().map(Into::into))
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => {
                info!(path = %path.display(), "Loaded vault configuration");
                Self::from_toml_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(VaultError::Config(format!("{}: {}", path.display(), e)));
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `SUI_VAULT_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), VaultError> {
        if let Ok(url) = std::env::var("SUI_VAULT_RPC_URL") {
            self.network.rpc_url = url;
        }
        if let Ok(addr) = std::env::var("SUI_VAULT_ADDRESS") {
            self.wallet.address = Some(addr.parse()?);
        }
        if let Ok(id) = std::env::var("SUI_VAULT_PACKAGE_ID") {
            self.objects.package_id = id.parse()?;
        }
        if let Ok(id) = std::env::var("SUI_VAULT_STORAGE_ID") {
            self.objects.balance_storage = id.parse()?;
        }
        if let Ok(cmd) = std::env::var("SUI_VAULT_SIGNER") {
            self.wallet.signer = SignerConfig::from_command_line(&cmd);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), VaultError> {
        if self.objects.package_id.is_zero() {
            return Err(VaultError::Config("objects.package_id is not set".to_string()));
        }
        if self.objects.balance_storage.is_zero() {
            return Err(VaultError::Config("objects.balance_storage is not set".to_string()));
        }
        if self.gas.budget == 0 {
            return Err(VaultError::Config("gas.budget must be positive".to_string()));
        }
        reqwest::Url::parse(self.network.rpc_url.trim()).map_err(|e| {
            VaultError::Config(format!("invalid rpc_url '{}': {}", self.network.rpc_url, e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    const SAMPLE: &str = r#"
        [network]
        rpc_url = "http://127.0.0.1:9000"

        [objects]
        package_id = "0xabc"
        balance_storage = "0xdef"

        [wallet]
        address = "0x1234"

        [wallet.signer]
        program = "sui"
        args = ["keytool", "sign", "--address", "{address}", "--data", "{tx_bytes}", "--json"]
    "#;

    #[test]
    fn parses_sample() {
        let cfg = VaultConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.network.rpc_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.network.name, "testnet");
        assert_eq!(cfg.objects.package_id, "0xabc".parse::<SuiAddress>().unwrap());
        assert_eq!(cfg.objects.address_zero, SuiAddress::ZERO);
        assert_eq!(cfg.gas.budget, DEFAULT_GAS_BUDGET);
        assert_eq!(cfg.wallet.address, Some("0x1234".parse::<SuiAddress>().unwrap()));
        assert_eq!(cfg.wallet.signer.as_ref().unwrap().args.len(), 7);
        assert_eq!(cfg.watch.poll_interval_secs, 5);
        cfg.validate().unwrap();
    }

    #[test]
    fn defaults_fail_validation_without_objects() {
        let cfg = VaultConfig::default();
        assert!(matches!(cfg.validate(), Err(VaultError::Config(_))));
    }

    #[test]
    fn rejects_bad_object_id() {
        let doc = "[objects]\npackage_id = \"0xnothex\"\n";
        assert!(VaultConfig::from_toml_str(doc).is_err());
    }

    #[test]
    fn signer_command_line() {
        let s = SignerConfig::from_command_line("my-signer --key work").unwrap();
        assert_eq!(s.program, "my-signer");
        assert_eq!(s.args, vec!["--key".to_string(), "work".to_string()]);
        assert!(SignerConfig::from_command_line("   ").is_none());
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        std::env::set_var("SUI_VAULT_RPC_URL", "http://localhost:1234");
        std::env::set_var("SUI_VAULT_ADDRESS", "0x99");
        let mut cfg = VaultConfig::from_toml_str(SAMPLE).unwrap();
        cfg.apply_env_overrides().unwrap();
        std::env::remove_var("SUI_VAULT_RPC_URL");
        std::env::remove_var("SUI_VAULT_ADDRESS");

        assert_eq!(cfg.network.rpc_url, "http://localhost:1234");
        assert_eq!(cfg.wallet.address, Some("0x99".parse::<SuiAddress>().unwrap()));
    }

    #[test]
    #[serial]
    fn load_reads_file_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let cfg = VaultConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.objects.balance_storage, "0xdef".parse::<SuiAddress>().unwrap());
    }

    #[test]
    #[serial]
    fn load_missing_file_uses_defaults_then_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(VaultConfig::load(Some(&path)), Err(VaultError::Config(_))));
    }
}
