use std::fmt;

use serde::{Deserialize, Serialize};

/// The two currencies every booking and movement amount is recorded in.
///
/// `*_local` columns hold pesos and `*_foreign` columns hold dollars, both as
/// hundredths (see [`crate::MoneyCents`]). The record's exchange rate relates
/// the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ars,
    Usd,
}

impl Currency {
    pub const LOCAL: Currency = Currency::Ars;
    pub const FOREIGN: Currency = Currency::Usd;

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
        }
    }

    /// Column name for a per-currency field, e.g. `tenant_ARS`.
    #[must_use]
    pub fn column(self, field: &str) -> String {
        format!("{field}_{}", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
