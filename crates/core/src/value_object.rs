//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::error::{DomainError, DomainResult};

/// Monetary amount as sent by the client.
///
/// The JSON number is kept verbatim so `10` is stored and returned as `10`
/// and `9.99` as `9.99` (no float re-rendering).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Number);

impl Price {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    /// Prices must be finite and non-negative.
    pub fn check(&self, field: &str) -> DomainResult<()> {
        let v = self.as_f64();
        if !v.is_finite() || v < 0.0 {
            return Err(DomainError::validation(format!(
                "{field} must be a non-negative number"
            )));
        }
        Ok(())
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Self(Number::from(value))
    }
}

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(Number::from(value))
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .map(Self)
            .ok_or_else(|| DomainError::validation("price must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_price_serializes_without_fraction() {
        let p = Price::from(10u64);
        assert_eq!(serde_json::to_string(&p).unwrap(), "10");
    }

    #[test]
    fn fractional_price_round_trips() {
        let p: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "9.99");
        assert!(p.check("price").is_ok());
    }

    #[test]
    fn negative_price_fails_check() {
        let p = Price::from(-1i64);
        let err = p.check("price").unwrap_err();
        assert_eq!(err, DomainError::validation("price must be a non-negative number"));
    }

    #[test]
    fn non_finite_price_is_unrepresentable() {
        assert!(Price::try_from(f64::INFINITY).is_err());
        assert!(Price::try_from(f64::NAN).is_err());
    }
}
