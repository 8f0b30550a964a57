use std::str::FromStr;

use crate::domain::errors::ValidationError;

/// A finite, non-negative item price
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::InvalidPrice(value.to_string()));
        }

        if value < 0.0 {
            return Err(ValidationError::NegativePrice(value));
        }

        // normalize -0.0
        Ok(Self(value.abs()))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    /// Coerce form text into a price
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidPrice(s.to_string()))?;
        Price::new(value)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prices() {
        assert_eq!("10".parse::<Price>().unwrap().value(), 10.0);
        assert_eq!(" 12.5 ".parse::<Price>().unwrap().value(), 12.5);
        assert_eq!("0".parse::<Price>().unwrap().value(), 0.0);
        assert_eq!("-0".parse::<Price>().unwrap().value(), 0.0);
    }

    #[test]
    fn test_parse_invalid_prices() {
        assert!(matches!(
            "-1".parse::<Price>(),
            Err(ValidationError::NegativePrice(_))
        ));
        assert!(matches!(
            "ten".parse::<Price>(),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            "".parse::<Price>(),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!("NaN".parse::<Price>().is_err());
        assert!("inf".parse::<Price>().is_err());
    }
}
