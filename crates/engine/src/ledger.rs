//! The booking ledger: per-category amounts in both currencies and the
//! derived totals.
//!
//! The tenant charge is the only inflow; every other category is money paid
//! out to the owner or to service providers:
//!
//! ```text
//! total = tenant - (owner + cleaning + reception + commission + advertising)
//! ```
//!
//! The formula is applied independently to the local and the foreign column.
//! Absent categories count as zero. Totals are never taken from the caller.

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// One category amount in local and foreign currency. Each side is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountPair {
    pub local: Option<MoneyCents>,
    pub foreign: Option<MoneyCents>,
}

impl AmountPair {
    #[must_use]
    pub fn new(local: Option<MoneyCents>, foreign: Option<MoneyCents>) -> Self {
        Self { local, foreign }
    }
}

/// Ledger categories of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCategory {
    Tenant,
    Owner,
    Cleaning,
    Reception,
    Commission,
    Advertising,
}

impl LedgerCategory {
    pub const ALL: [LedgerCategory; 6] = [
        Self::Tenant,
        Self::Owner,
        Self::Cleaning,
        Self::Reception,
        Self::Commission,
        Self::Advertising,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Owner => "owner",
            Self::Cleaning => "cleaning",
            Self::Reception => "reception",
            Self::Commission => "commission",
            Self::Advertising => "advertising",
        }
    }

    /// `true` for money received from the tenant.
    pub fn is_inflow(self) -> bool {
        self == Self::Tenant
    }
}

/// Category amounts of a booking, as entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingAmounts {
    pub tenant: AmountPair,
    pub owner: AmountPair,
    pub cleaning: AmountPair,
    pub reception: AmountPair,
    pub commission: AmountPair,
    pub advertising: AmountPair,
}

impl BookingAmounts {
    pub fn get(&self, category: LedgerCategory) -> AmountPair {
        match category {
            LedgerCategory::Tenant => self.tenant,
            LedgerCategory::Owner => self.owner,
            LedgerCategory::Cleaning => self.cleaning,
            LedgerCategory::Reception => self.reception,
            LedgerCategory::Commission => self.commission,
            LedgerCategory::Advertising => self.advertising,
        }
    }

    pub fn set(&mut self, category: LedgerCategory, pair: AmountPair) {
        let slot = match category {
            LedgerCategory::Tenant => &mut self.tenant,
            LedgerCategory::Owner => &mut self.owner,
            LedgerCategory::Cleaning => &mut self.cleaning,
            LedgerCategory::Reception => &mut self.reception,
            LedgerCategory::Commission => &mut self.commission,
            LedgerCategory::Advertising => &mut self.advertising,
        };
        *slot = pair;
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(
        mut self,
        category: LedgerCategory,
        local: Option<MoneyCents>,
        foreign: Option<MoneyCents>,
    ) -> Self {
        self.set(category, AmountPair::new(local, foreign));
        self
    }
}

/// Category amounts plus the derived totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub amounts: BookingAmounts,
    pub total_local: MoneyCents,
    pub total_foreign: MoneyCents,
}

/// Computes the ledger totals from the category amounts.
///
/// Pure: the same amounts always give the same ledger. Overflow of the
/// intermediate sums is rejected with [`EngineError::Validation`].
///
/// ```rust
/// use engine::{BookingAmounts, LedgerCategory, MoneyCents, compute_ledger};
///
/// let amounts = BookingAmounts::default()
///     .with(LedgerCategory::Tenant, Some(MoneyCents::new(100_000)), None)
///     .with(LedgerCategory::Owner, Some(MoneyCents::new(60_000)), None)
///     .with(LedgerCategory::Cleaning, Some(MoneyCents::new(5_000)), None);
/// let ledger = compute_ledger(amounts).unwrap();
/// assert_eq!(ledger.total_local, MoneyCents::new(35_000));
/// assert_eq!(ledger.total_foreign, MoneyCents::ZERO);
/// ```
pub fn compute_ledger(amounts: BookingAmounts) -> ResultEngine<Ledger> {
    let total_local = side_total(&amounts, |pair| pair.local)?;
    let total_foreign = side_total(&amounts, |pair| pair.foreign)?;
    Ok(Ledger {
        amounts,
        total_local,
        total_foreign,
    })
}

fn side_total(
    amounts: &BookingAmounts,
    side: impl Fn(AmountPair) -> Option<MoneyCents>,
) -> ResultEngine<MoneyCents> {
    let mut inflow = MoneyCents::ZERO;
    let mut outflow = MoneyCents::ZERO;
    for category in LedgerCategory::ALL {
        let value = side(amounts.get(category)).unwrap_or(MoneyCents::ZERO);
        let bucket = if category.is_inflow() {
            &mut inflow
        } else {
            &mut outflow
        };
        *bucket = bucket.checked_add(value).ok_or_else(overflow)?;
    }
    inflow.checked_sub(outflow).ok_or_else(overflow)
}

fn overflow() -> EngineError {
    EngineError::Validation("ledger amounts are too large".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: i64) -> Option<MoneyCents> {
        Some(MoneyCents::new(value))
    }

    #[test]
    fn tenant_minus_outflows() {
        let amounts = BookingAmounts::default()
            .with(LedgerCategory::Tenant, cents(100_000), cents(10_000))
            .with(LedgerCategory::Owner, cents(60_000), cents(6_000))
            .with(LedgerCategory::Cleaning, cents(5_000), None);

        let ledger = compute_ledger(amounts).unwrap();

        assert_eq!(ledger.total_local, MoneyCents::new(35_000));
        assert_eq!(ledger.total_foreign, MoneyCents::new(4_000));
        assert_eq!(ledger.amounts, amounts);
    }

    #[test]
    fn every_outflow_category_is_subtracted() {
        let mut amounts = BookingAmounts::default();
        for category in LedgerCategory::ALL {
            amounts.set(category, AmountPair::new(cents(100), None));
        }

        let ledger = compute_ledger(amounts).unwrap();

        assert_eq!(ledger.total_local, MoneyCents::new(100 - 5 * 100));
    }

    #[test]
    fn empty_ledger_is_zero() {
        let ledger = compute_ledger(BookingAmounts::default()).unwrap();
        assert_eq!(ledger.total_local, MoneyCents::ZERO);
        assert_eq!(ledger.total_foreign, MoneyCents::ZERO);
    }

    #[test]
    fn recomputation_is_stable() {
        let amounts = BookingAmounts::default()
            .with(LedgerCategory::Tenant, cents(7_77), cents(1_00))
            .with(LedgerCategory::Commission, cents(77), None);

        let first = compute_ledger(amounts).unwrap();
        let second = compute_ledger(first.amounts).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn overflow_is_a_validation_error() {
        let amounts = BookingAmounts::default()
            .with(LedgerCategory::Owner, cents(i64::MAX), None)
            .with(LedgerCategory::Cleaning, cents(1), None);

        let err = compute_ledger(amounts).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
