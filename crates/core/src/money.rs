use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exact decimal amount. Never rounded, so comparisons behave like `bccomp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn abs(self) -> Self {
        Amount(self.0.abs())
    }

    /// Shortest decimal text for this amount: `1500.00` → `1500`, `-0.50` → `-0.5`.
    pub fn to_plain_string(self) -> String {
        self.0.normalize().to_string()
    }
}

/// Rewrites `s` so that `.` is the only decimal mark and grouping marks are gone.
///
/// With both `,` and `.` present, whichever comes last is the decimal mark.
/// A lone `,` followed by one or two digits is a decimal mark; any other
/// `,` groups thousands.
fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(comma), None) => {
            let fraction = &s[comma + 1..];
            let single = s.matches(',').count() == 1;
            if single && (1..=2).contains(&fraction.len()) {
                s.replacen(',', ".", 1)
            } else {
                s.replace(',', "")
            }
        }
        (None, _) => s.to_string(),
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    /// Accepts an optional sign and either `1,234.56` or `1.234,56` notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(&normalize_separators(s.trim())).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
