//! Shared primitive types used across the entire cost pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar dollar year (basis year or escalation target).
pub type DollarYear = i32;

/// Zero-based index of one Monte-Carlo sample.
pub type SampleIndex = u64;

/// A Code-of-Accounts identifier.
///
/// Numeric accounts are stored in their shortest decimal form so that
/// `"20"`, `"20.0"` and `20` all name the same account, and prefix tests
/// (`"222"` matches `222.13`) work on the text the catalog author wrote.
/// Summary rows (`"OCC"`, `"LCOE"`, ...) keep their label verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Self(format!("{v}")),
            _ => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl From<&str> for AccountId {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rollup groups, keyed on the leading digit of the account code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountGroup {
    /// 1x / 2x: pre-construction and direct capital.
    Base,
    /// 3x / 4x / 5x: indirect, training and supplementary capital.
    Other,
    /// 6x: financing.
    Finance,
    /// 7x / 8x: annualized O&M and fuel.
    Annual,
}

impl AccountGroup {
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Self::Base    => &["1", "2"],
            Self::Other   => &["3", "4", "5"],
            Self::Finance => &["6"],
            Self::Annual  => &["7", "8"],
        }
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.prefixes().iter().any(|p| account.starts_with(p))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Base    => "base",
            Self::Other   => "other",
            Self::Finance => "finance",
            Self::Annual  => "annual",
        }
    }
}

/// The two estimated-cost columns every row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostColumn {
    Foak,
    Noak,
}

impl CostColumn {
    pub const BOTH: [CostColumn; 2] = [Self::Foak, Self::Noak];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Foak => "FOAK",
            Self::Noak => "NOAK",
        }
    }

    /// Column header, e.g. `FOAK Estimated Cost ($2024)`.
    pub fn header(&self, year: DollarYear) -> String {
        format!("{} Estimated Cost (${year})", self.label())
    }

    pub fn std_header(&self, year: DollarYear) -> String {
        format!("{} Estimated Cost std (${year})", self.label())
    }
}
