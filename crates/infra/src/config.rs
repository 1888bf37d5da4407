//! Point-of-sale configuration loaded from the environment.

use thiserror::Error;

use shopkeep_core::TaxRate;

pub const TAX_RATE_VAR: &str = "SHOPKEEP_TAX_RATE";
pub const CURRENCY_VAR: &str = "SHOPKEEP_CURRENCY";
pub const PAGE_SIZE_VAR: &str = "SHOPKEEP_PAGE_SIZE";

const DEFAULT_TAX_RATE: &str = "0.10";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosConfig {
    pub tax_rate: TaxRate,
    /// ISO currency code shown next to amounts.
    pub currency: String,
    /// Default page size of list screens.
    pub page_size: usize,
}

impl PosConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup. Unset (or blank) variables fall back
    /// to defaults; malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

        let tax_rate = match get(TAX_RATE_VAR) {
            Some(raw) => raw.parse::<TaxRate>().map_err(|e| ConfigError::Invalid {
                var: TAX_RATE_VAR,
                reason: e.to_string(),
            })?,
            None => {
                tracing::info!("{TAX_RATE_VAR} not set; using default {DEFAULT_TAX_RATE}");
                DEFAULT_TAX_RATE
                    .parse::<TaxRate>()
                    .map_err(|e| ConfigError::Invalid {
                        var: TAX_RATE_VAR,
                        reason: e.to_string(),
                    })?
            }
        };

        let currency = match get(CURRENCY_VAR) {
            Some(raw) => {
                let code = raw.trim().to_ascii_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigError::Invalid {
                        var: CURRENCY_VAR,
                        reason: format!("'{raw}' is not a 3-letter currency code"),
                    });
                }
                code
            }
            None => DEFAULT_CURRENCY.to_string(),
        };

        let page_size = match get(PAGE_SIZE_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: PAGE_SIZE_VAR,
                        reason: format!("'{raw}' is not a positive integer"),
                    });
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            tax_rate,
            currency,
            page_size,
        })
    }
}
