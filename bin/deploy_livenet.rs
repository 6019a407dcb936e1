//! Deploy the lending pool to Casper livenet/testnet using Odra livenet environment.
//!
//! Usage:
//!   cargo run --bin deploy_livenet --release
//!
//! Requires .env file with:
//!   ODRA_CASPER_LIVENET_SECRET_KEY_PATH=/path/to/secret_key.pem
//!   ODRA_CASPER_LIVENET_NODE_ADDRESS=https://node.testnet.casper.network
//!   ODRA_CASPER_LIVENET_CHAIN_NAME=casper-test
//!   ODRA_CASPER_LIVENET_PAYMENT_AMOUNT=200000000000
//!
//! Pool settings come from LENDING_CONFIG_PATH (a JSON file) when set,
//! otherwise from the environment:
//!   LENDING_LOAN_ASSET=hash-...
//!   LENDING_COLLATERAL_ASSET=hash-...
//!   LENDING_ANNUAL_INTEREST_BPS=500
//!   LENDING_COLLATERAL_RATIO_PCT=150
//!   LENDING_LIQUIDATION_THRESHOLD_PCT=120
//!   LENDING_LIQUIDATION_BONUS_BPS=500

use std::str::FromStr;

use odra::host::{Deployer, HostRef};
use odra::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use collateral_lending_contracts::errors::LendingError;
use collateral_lending_contracts::lending_pool::{LendingPool, LendingPoolInitArgs};
use collateral_lending_contracts::types::RiskParameters;

const DEFAULT_PAYMENT_AMOUNT: u64 = 200_000_000_000;

#[derive(Debug, Error)]
enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} is not a valid address: {value}")]
    InvalidAddress { name: &'static str, value: String },
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid risk parameters: {0}")]
    Parameters(LendingError),
}

/// Deployment settings
#[derive(Debug, Deserialize)]
struct DeployConfig {
    loan_asset: String,
    collateral_asset: String,
    #[serde(default = "default_interest_bps")]
    annual_interest_bps: u64,
    #[serde(default = "default_collateral_ratio_pct")]
    collateral_ratio_pct: u64,
    #[serde(default = "default_liquidation_threshold_pct")]
    liquidation_threshold_pct: u64,
    #[serde(default = "default_liquidation_bonus_bps")]
    liquidation_bonus_bps: u64,
    #[serde(default)]
    payment_amount: Option<u64>,
}

fn default_interest_bps() -> u64 {
    500
}

fn default_collateral_ratio_pct() -> u64 {
    150
}

fn default_liquidation_threshold_pct() -> u64 {
    120
}

fn default_liquidation_bonus_bps() -> u64 {
    500
}

impl DeployConfig {
    fn load() -> Result<Self, ConfigError> {
        match std::env::var("LENDING_CONFIG_PATH") {
            Ok(path) => Self::from_file(&path),
            Err(_) => Self::from_env(),
        }
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            loan_asset: required_var("LENDING_LOAN_ASSET")?,
            collateral_asset: required_var("LENDING_COLLATERAL_ASSET")?,
            annual_interest_bps: number_var("LENDING_ANNUAL_INTEREST_BPS", default_interest_bps())?,
            collateral_ratio_pct: number_var(
                "LENDING_COLLATERAL_RATIO_PCT",
                default_collateral_ratio_pct(),
            )?,
            liquidation_threshold_pct: number_var(
                "LENDING_LIQUIDATION_THRESHOLD_PCT",
                default_liquidation_threshold_pct(),
            )?,
            liquidation_bonus_bps: number_var(
                "LENDING_LIQUIDATION_BONUS_BPS",
                default_liquidation_bonus_bps(),
            )?,
            payment_amount: None,
        })
    }

    fn params(&self) -> Result<RiskParameters, ConfigError> {
        let params = RiskParameters::new(
            self.annual_interest_bps,
            self.collateral_ratio_pct,
            self.liquidation_threshold_pct,
            self.liquidation_bonus_bps,
        );
        params.validate().map_err(ConfigError::Parameters)?;
        Ok(params)
    }

    fn payment_amount(&self) -> Result<u64, ConfigError> {
        match self.payment_amount {
            Some(amount) => Ok(amount),
            None => number_var("ODRA_CASPER_LIVENET_PAYMENT_AMOUNT", DEFAULT_PAYMENT_AMOUNT),
        }
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn number_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}

fn parse_address(name: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|_| ConfigError::InvalidAddress {
        name,
        value: value.to_string(),
    })
}

fn main() {
    // Load environment from .env file
    dotenv::dotenv().ok();

    if let Err(error) = run() {
        eprintln!("Deployment aborted: {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ConfigError> {
    println!("=== Collateral Lending Livenet Deployment ===");
    println!();

    let config = DeployConfig::load()?;
    let loan_asset = parse_address("loan_asset", &config.loan_asset)?;
    let collateral_asset = parse_address("collateral_asset", &config.collateral_asset)?;
    let params = config.params()?;

    println!("Loan asset:            {:?}", loan_asset);
    println!("Collateral asset:      {:?}", collateral_asset);
    println!("Annual interest:       {} bps", params.annual_interest_bps);
    println!("Collateral ratio:      {}%", params.collateral_ratio_pct);
    println!("Liquidation threshold: {}%", params.liquidation_threshold_pct);
    println!("Liquidation bonus:     {} bps", params.liquidation_bonus_bps);
    println!();

    // Initialize Odra livenet environment
    let env = odra_casper_livenet_env::env();

    // Configure payment amount for deployments/calls (required for Casper 2.0 txs)
    env.set_gas(config.payment_amount()?);

    let deployer = env.caller();
    println!("Deployer: {:?}", deployer);
    println!();

    println!("Deploying LendingPool...");
    let pool = LendingPool::deploy(
        &env,
        LendingPoolInitArgs {
            loan_asset,
            collateral_asset,
            params,
        },
    );
    println!("LendingPool deployed at: {:?}", pool.address().clone());

    println!();
    println!("=== Deployment Complete ===");
    println!();
    println!("Lenders and borrowers must approve the pool on both tokens before depositing.");
    Ok(())
}
