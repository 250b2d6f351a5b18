use std::fmt;

/// Fixed-point rupee amount with 2 decimal places, stored as scaled paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 100;

    pub const ZERO: Amount = Amount(0);

    pub fn from_float(value: f64) -> Self {
        Amount((value * Self::SCALE as f64).round() as i64)
    }

    pub const fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    /// Strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_scaled_preserves_value() {
        let amount = Amount::from_scaled(123456);
        assert_eq!(amount, Amount(123456));
    }

    #[test]
    fn from_float_converts_correctly() {
        assert_eq!(Amount::from_float(100.0), Amount::from_scaled(10_000));
        assert_eq!(Amount::from_float(1.5), Amount::from_scaled(150));
        assert_eq!(Amount::from_float(0.01), Amount::from_scaled(1));
    }

    #[test]
    fn from_float_rounds_correctly() {
        assert_eq!(Amount::from_float(1.234), Amount::from_scaled(123));
        assert_eq!(Amount::from_float(1.235), Amount::from_scaled(124));
    }

    #[test]
    fn from_float_handles_negative() {
        assert_eq!(Amount::from_float(-50.25), Amount::from_scaled(-5025));
    }

    #[test]
    fn display_formats_positive() {
        assert_eq!(Amount::from_scaled(10_000).to_string(), "100.00");
        assert_eq!(Amount::from_scaled(150).to_string(), "1.50");
        assert_eq!(Amount::from_scaled(1).to_string(), "0.01");
        assert_eq!(Amount::from_scaled(0).to_string(), "0.00");
    }

    #[test]
    fn display_formats_negative() {
        assert_eq!(Amount::from_scaled(-5025).to_string(), "-50.25");
        assert_eq!(Amount::from_scaled(-1).to_string(), "-0.01");
    }

    #[test]
    fn default_is_zero() {
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn is_positive_excludes_zero_and_negative() {
        assert!(Amount::from_scaled(1).is_positive());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::from_scaled(-1).is_positive());
    }

    #[test]
    fn add() {
        let a = Amount::from_scaled(100);
        let b = Amount::from_scaled(50);
        assert_eq!(a + b, Amount::from_scaled(150));
    }

    #[test]
    fn add_assign() {
        let mut a = Amount::from_scaled(100);
        a += Amount::from_scaled(50);
        assert_eq!(a, Amount::from_scaled(150));
    }

    #[test]
    fn sub_assign() {
        let mut a = Amount::from_scaled(100);
        a -= Amount::from_scaled(30);
        assert_eq!(a, Amount::from_scaled(70));
    }

    #[test]
    fn ordering() {
        let small = Amount::from_scaled(100);
        let large = Amount::from_scaled(200);
        assert!(small < large);
        assert!(large > small);
    }

    #[test]
    fn negative_ordering() {
        let negative = Amount::from_scaled(-100);
        let positive = Amount::from_scaled(100);
        assert!(negative < Amount::ZERO);
        assert!(Amount::ZERO < positive);
        assert!(negative < positive);
    }
}
