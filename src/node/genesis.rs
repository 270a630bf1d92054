//! Genesis configuration and state installation.
//!
//! The genesis file fixes the chain parameters (fee rate, initial oracle
//! price), the token metadata, and a set of deterministic funded development
//! accounts, so every local run starts from the same enumerable signers.
//! Amounts are decimal strings: TOML integers cannot carry wei magnitudes.

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::crypto::{Address, Keypair};
use crate::programs::{PriceOracle, StableCoin, TokenLedger};
use crate::runtime::env::{oracle_address, stablecoin_address, token_address};
use crate::state::{Account, AccountCache};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub chain: ChainConfig,
    pub token: TokenConfig,
    pub dev: DevConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Stablecoin fee rate, in whole percent
    pub fee_rate_percentage: u64,
    /// Initial oracle ETH/USD rate
    pub initial_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    /// Initial supply minted to the deployer, in base units (decimal string)
    pub initial_supply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// Number of funded development accounts
    pub accounts: u8,
    /// Funding per account in wei (decimal string)
    pub funding_wei: String,
}

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

impl GenesisConfig {
    /// Default development genesis: 10 funded signers, the Oxyr token, a 3%
    /// fee stablecoin, and the oracle at 4000.
    pub fn default_dev() -> Self {
        Self {
            chain: ChainConfig { fee_rate_percentage: 3, initial_price: 4000 },
            token: TokenConfig {
                name: "Oxyr".to_string(),
                symbol: "OXY".to_string(),
                initial_supply: (100 * WEI_PER_ETH).to_string(),
            },
            dev: DevConfig {
                accounts: 10,
                funding_wei: (10_000 * WEI_PER_ETH).to_string(),
            },
        }
    }

    /// Load genesis config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("reading genesis file {}", path.as_ref().display()))?;
        let cfg: GenesisConfig = toml::from_str(&data)?;
        Ok(cfg)
    }

    /// Write the config as TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = toml::to_string_pretty(self)?;
        fs::write(&path, data)
            .with_context(|| format!("writing genesis file {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn initial_supply(&self) -> Result<u128> {
        self.token.initial_supply.parse::<u128>().context("token.initial_supply")
    }

    pub fn funding_wei(&self) -> Result<u128> {
        self.dev.funding_wei.parse::<u128>().context("dev.funding_wei")
    }
}

/// Addresses produced by genesis installation.
#[derive(Debug, Clone)]
pub struct GenesisInfo {
    /// Dev account 0: token deployer and oracle owner
    pub deployer: Address,
    pub dev_addresses: Vec<Address>,
}

/// Install the genesis state into an empty account cache: funded dev
/// accounts plus the three program accounts.
pub fn install(cfg: &GenesisConfig, cache: &AccountCache) -> Result<GenesisInfo> {
    let funding = cfg.funding_wei()?;
    let mut dev_addresses = Vec::with_capacity(cfg.dev.accounts as usize);
    for i in 0..cfg.dev.accounts {
        let addr = Keypair::dev(i).address();
        cache.insert(addr.clone(), Account::user(funding))?;
        dev_addresses.push(addr);
    }
    let deployer = dev_addresses
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("genesis needs at least one dev account"))?;

    let mut token = TokenLedger::new(&cfg.token.name, &cfg.token.symbol);
    token
        .mint(&deployer, cfg.initial_supply()?)
        .map_err(|e| anyhow::anyhow!("genesis mint: {}", e))?;
    cache.insert(token_address(), Account::program(bincode::serialize(&token)?))?;

    let oracle = PriceOracle::new(deployer.clone(), cfg.chain.initial_price as u128);
    cache.insert(oracle_address(), Account::program(bincode::serialize(&oracle)?))?;

    let stablecoin = StableCoin::new(cfg.chain.fee_rate_percentage as u128, oracle_address());
    cache.insert(stablecoin_address(), Account::program(bincode::serialize(&stablecoin)?))?;

    cache.flush()?;
    Ok(GenesisInfo { deployer, dev_addresses })
}
