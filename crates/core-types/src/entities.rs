use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A mining algorithm such as scrypt. Pools and miner software both map onto it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Algorithm {
    pub id: i64,
    pub name: String,
}

/// A tracked coin, keyed externally by its CoinGecko id.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Coin {
    pub id: i64,
    pub coingecko_id: String,
    pub name: String,
    pub symbol: String,
    /// When the coin was first tracked.
    pub added: DateTime<Utc>,
}

/// A point sample of a coin's USD price. Not a candle.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct CoinPrice {
    pub id: i64,
    pub coin_id: i64,
    pub instant: DateTime<Utc>,
    pub price: Decimal,
}

/// A pool-hosting operator such as ZergPool.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub website: String,
    /// Fee as a percentage, e.g. `0.5` for 0.5%.
    pub fee: Decimal,
}

/// A mining pool for exactly one algorithm at one provider.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Pool {
    pub id: i64,
    pub provider_id: i64,
    pub algorithm_id: i64,
    /// Display name; does not necessarily match the algorithm name.
    pub name: String,
    /// Host part of the stratum address.
    pub url: String,
    pub port: i32,
    /// Hash-rate scale factor: 1 = MH/s, 0.001 = kH/s, 1000 = GH/s.
    pub mh_factor: f64,
}

impl Pool {
    /// Renders the stratum address miners connect to.
    pub fn stratum_url(&self) -> String {
        format!("stratum+tcp://{}:{}", self.url, self.port)
    }
}

/// A point-in-time observation of a pool.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct PoolStats {
    pub id: i64,
    pub pool_id: i64,
    pub instant: DateTime<Utc>,
    /// Shared hashrate of the whole pool.
    pub current_hashrate: i64,
    pub workers: i32,
    /// Forward-looking profit per day.
    pub profit_estimate: Decimal,
    /// Actual profit per day over the trailing 24 hours.
    pub profit_actual_24h: Decimal,
    /// The coin price used in the estimate, usually bitcoin.
    pub coin_price_id: Option<i64>,
}

/// A uniquely named mining device.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Miner {
    pub id: i64,
    pub name: String,
    /// The software/algorithm pairing currently (or last) active on the miner.
    pub miner_software_algo_id: Option<i64>,
}

/// A mining program. The `*_param` fields hold parameter names such as `--algo`,
/// never their values.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MinerSoftware {
    pub id: i64,
    pub name: String,
    pub website: String,
    /// Must prefix the executable name; used to identify the running process.
    pub executable_prefix: String,
    pub algo_param: String,
    pub pool_param: String,
    pub wallet_param: String,
    pub password_param: String,
    pub log_file_param: String,
    /// Raw parameters appended to the command line as-is.
    pub other_params: String,
    /// Number of initial output lines that are unreliable and skipped.
    pub discard_lines: i32,
}

/// Maps an algorithm onto the name a piece of miner software uses for it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MinerSoftwareAlgo {
    pub id: i64,
    pub miner_software_id: i64,
    pub algorithm_id: i64,
    /// Software-specific algorithm name. Blank means "use the algorithm's name".
    pub name: String,
    pub extra_params: String,
    /// Never pick this pairing during automated optimisation.
    pub excluded: bool,
}

impl MinerSoftwareAlgo {
    /// The algorithm name to hand to the software on its command line.
    pub fn effective_name<'a>(&'a self, algorithm: &'a Algorithm) -> &'a str {
        if self.name.trim().is_empty() {
            &algorithm.name
        } else {
            &self.name
        }
    }

    pub fn is_selectable(&self) -> bool {
        !self.excluded
    }
}

/// Where a miner has a given piece of software installed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MinerMinerSoftware {
    pub id: i64,
    pub miner_id: i64,
    pub miner_software_id: i64,
    pub file_path: String,
}

/// A point-in-time hash-rate observation for a miner running some software on some algorithm.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct MinerStats {
    pub id: i64,
    pub miner_id: i64,
    pub miner_software_id: i64,
    pub algorithm_id: i64,
    pub instant: DateTime<Utc>,
    pub work_per_second: f64,
    /// Same convention as [`Pool::mh_factor`].
    pub mh_factor: f64,
}

/// A named version marker. The row named `"database"` is the schema marker.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub name: String,
    pub version: i64,
}

// ==============================================================================
// Observation inserts
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoinPrice {
    pub coin_id: i64,
    pub instant: DateTime<Utc>,
    pub price: Decimal,
}

impl NewCoinPrice {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.price.is_sign_negative() {
            return Err(CoreError::InvalidInput(
                "price".to_string(),
                format!("must not be negative, got {}", self.price),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPoolStats {
    pub pool_id: i64,
    pub instant: DateTime<Utc>,
    pub current_hashrate: i64,
    pub workers: i32,
    pub profit_estimate: Decimal,
    pub profit_actual_24h: Decimal,
    pub coin_price_id: Option<i64>,
}

impl NewPoolStats {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.current_hashrate < 0 {
            return Err(CoreError::InvalidInput(
                "current_hashrate".to_string(),
                format!("must not be negative, got {}", self.current_hashrate),
            ));
        }
        if self.workers < 0 {
            return Err(CoreError::InvalidInput(
                "workers".to_string(),
                format!("must not be negative, got {}", self.workers),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMinerStats {
    pub miner_id: i64,
    pub miner_software_id: i64,
    pub algorithm_id: i64,
    pub instant: DateTime<Utc>,
    pub work_per_second: f64,
    pub mh_factor: f64,
}

impl NewMinerStats {
    /// Hash rate normalised to MH/s.
    pub fn megahashes_per_second(&self) -> f64 {
        self.work_per_second * self.mh_factor
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.work_per_second.is_finite() || self.work_per_second < 0.0 {
            return Err(CoreError::InvalidInput(
                "work_per_second".to_string(),
                format!("must be a finite, non-negative rate, got {}", self.work_per_second),
            ));
        }
        validate_mh_factor(self.mh_factor)
    }
}

/// Scale factors must be strictly positive.
fn validate_mh_factor(mh_factor: f64) -> Result<(), CoreError> {
    if !mh_factor.is_finite() || mh_factor <= 0.0 {
        return Err(CoreError::InvalidInput(
            "mh_factor".to_string(),
            format!("must be a finite, positive factor, got {}", mh_factor),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pool(url: &str, port: i32) -> Pool {
        Pool {
            id: 1,
            provider_id: 1,
            algorithm_id: 7,
            name: "x16r".to_string(),
            url: url.to_string(),
            port,
            mh_factor: 1.0,
        }
    }

    #[test]
    fn stratum_url_joins_host_and_port() {
        assert_eq!(
            pool("pool.example.com", 3333).stratum_url(),
            "stratum+tcp://pool.example.com:3333"
        );
    }

    #[test]
    fn effective_name_falls_back_to_algorithm() {
        let algorithm = Algorithm { id: 3, name: "lyra2z330".to_string() };
        let mut pairing = MinerSoftwareAlgo {
            id: 1,
            miner_software_id: 2,
            algorithm_id: 3,
            name: "  ".to_string(),
            extra_params: String::new(),
            excluded: false,
        };
        assert_eq!(pairing.effective_name(&algorithm), "lyra2z330");

        pairing.name = "lyra2z330v2".to_string();
        assert_eq!(pairing.effective_name(&algorithm), "lyra2z330v2");
    }

    #[test]
    fn excluded_pairings_are_not_selectable() {
        let pairing = MinerSoftwareAlgo {
            id: 1,
            miner_software_id: 2,
            algorithm_id: 3,
            name: String::new(),
            extra_params: String::new(),
            excluded: true,
        };
        assert!(!pairing.is_selectable());
    }

    #[test]
    fn miner_stats_normalise_to_megahashes() {
        let stats = NewMinerStats {
            miner_id: 1,
            miner_software_id: 1,
            algorithm_id: 1,
            instant: Utc::now(),
            work_per_second: 2500.0,
            mh_factor: 0.001,
        };
        assert!((stats.megahashes_per_second() - 2.5).abs() < 1e-9);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn miner_stats_reject_zero_scale_factor() {
        let stats = NewMinerStats {
            miner_id: 1,
            miner_software_id: 1,
            algorithm_id: 1,
            instant: Utc::now(),
            work_per_second: 10.0,
            mh_factor: 0.0,
        };
        assert!(matches!(stats.validate(), Err(CoreError::InvalidInput(field, _)) if field == "mh_factor"));
    }

    #[test]
    fn negative_price_is_rejected() {
        let price = NewCoinPrice { coin_id: 1, instant: Utc::now(), price: dec!(-1.5) };
        assert!(price.validate().is_err());

        let price = NewCoinPrice { price: dec!(42000.12), ..price };
        assert!(price.validate().is_ok());
    }

    #[test]
    fn pool_stats_reject_negative_workers() {
        let stats = NewPoolStats {
            pool_id: 1,
            instant: Utc::now(),
            current_hashrate: 1_000,
            workers: -1,
            profit_estimate: dec!(0.0001),
            profit_actual_24h: dec!(0.0002),
            coin_price_id: None,
        };
        assert!(stats.validate().is_err());
    }
}
