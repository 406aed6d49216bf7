use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fraction in `[0, 1]`, typically a fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    /// `30` basis points is `0.003`.
    pub fn from_bps(bps: u32) -> Self {
        Self(Decimal::from(bps) / Decimal::from(10_000))
    }

    /// The complement `1 - self`, e.g. the share of an input left after fees.
    pub fn complement(&self) -> Self {
        Self(Decimal::ONE - self.0)
    }

    /// Value scaled to a percentage, `0.0035` becomes `0.35`.
    pub fn as_percent(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_bps() {
        assert_eq!(Percentage::from_bps(35).0, dec!(0.0035));
        assert_eq!(Percentage::from_bps(35).complement().0, dec!(0.9965));
        assert_eq!(Percentage::from_bps(35).as_percent(), dec!(0.35));
    }
}
