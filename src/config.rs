use alloy::primitives::Address;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub rpc_http: String,
    /// Address of the payroll contract emitting the batch events.
    pub payroll_contract: String,
    /// ERC-20 token paid out by the payroll contract.
    pub token_contract: String,
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub rpc_max_retries: u32,
}

fn default_token_decimals() -> u8 {
    6
}

impl ChainConfig {
    pub fn payroll_address(&self) -> eyre::Result<Address> {
        parse_address(&self.payroll_contract, "payroll_contract")
    }

    pub fn token_address(&self) -> eyre::Result<Address> {
        parse_address(&self.token_contract, "token_contract")
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }

    pub fn explorer_address_url(&self, address: &str) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }

    pub fn explorer_block_url(&self, block_number: u64) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{}/block/{}", base.trim_end_matches('/'), block_number))
    }
}

// ============================================================
// History Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Wallet whose history is loaded at startup.
    pub owner: Option<String>,
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
    /// Chain height assumed when the node cannot report its tip.
    #[serde(default = "default_fallback_block_height")]
    pub fallback_block_height: u64,
    #[serde(default = "default_interval_secs")]
    pub pending_poll_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub health_check_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            owner: None,
            lookback_blocks: default_lookback_blocks(),
            fallback_block_height: default_fallback_block_height(),
            pending_poll_secs: default_interval_secs(),
            health_check_secs: default_interval_secs(),
        }
    }
}

impl HistoryConfig {
    pub fn owner_address(&self) -> eyre::Result<Option<Address>> {
        self.owner
            .as_deref()
            .map(|owner| parse_address(owner, "owner"))
            .transpose()
    }
}

fn default_lookback_blocks() -> u64 {
    10_000
}

fn default_fallback_block_height() -> u64 {
    1_000_000
}

fn default_interval_secs() -> u64 {
    30
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn parse_address(value: &str, field: &str) -> eyre::Result<Address> {
    if !value.starts_with("0x") || value.len() != 42 {
        return Err(eyre::eyre!("Invalid address '{}' for {}", value, field));
    }
    Address::from_str(value).map_err(|e| eyre::eyre!("Invalid address '{}' for {}: {}", value, field, e))
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        self.chain.payroll_address()?;
        self.chain.token_address()?;
        self.history.owner_address()?;

        if self.chain.token_decimals > 36 {
            return Err(eyre::eyre!(
                "token_decimals {} on chain '{}' is out of range",
                self.chain.token_decimals,
                self.chain.name
            ));
        }
        if self.history.pending_poll_secs == 0 || self.history.health_check_secs == 0 {
            return Err(eyre::eyre!("Polling intervals must be at least one second"));
        }
        Ok(())
    }
}
