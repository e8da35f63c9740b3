use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

/// ISO 4217 code, e.g. `EUR`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_uppercase())
    }
}

/// Monetary amount in minor units of `currency`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, References)]
pub struct RetailPrice {
    amount: i64,
    currency: CurrencyCode,
}

impl RetailPrice {
    pub fn new(amount: impl Into<i64>, currency: CurrencyCode) -> Self {
        Self {
            amount: amount.into(),
            currency,
        }
    }
}

/// Purchase cost in minor units of the library's accounting currency.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Fromln, AsRefln)]
pub struct CostPrice(i64);

impl CostPrice {
    pub fn new(amount: impl Into<i64>) -> Self {
        Self(amount.into())
    }
}
