//! Command structs for engine operations.
//!
//! These types group parameters for write operations (bookings, movements,
//! owners, users), keeping call sites readable and avoiding long argument
//! lists. Nothing is validated here; the engine checks drafts on write.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{BookingAmounts, ExchangeRate, LedgerCategory, MoneyCents, Role};

/// How a booking names its unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitRef {
    Id(Uuid),
    Code(String),
}

/// Booking as submitted for creation or update.
///
/// Every field is optional so that a missing value is reported by the
/// validator with a precise message instead of failing at deserialization.
#[derive(Clone, Debug, Default)]
pub struct BookingDraft {
    pub unit: Option<UnitRef>,
    /// Create unknown unit/garage codes instead of rejecting them.
    pub create_missing: bool,
    pub garage: Option<String>,
    pub tenant: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub state: Option<String>,
    pub exchange_rate: Option<ExchangeRate>,
    pub note: Option<String>,
    pub amounts: BookingAmounts,
}

impl BookingDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unit_code(mut self, code: impl Into<String>) -> Self {
        self.unit = Some(UnitRef::Code(code.into()));
        self
    }

    #[must_use]
    pub fn unit_id(mut self, id: Uuid) -> Self {
        self.unit = Some(UnitRef::Id(id));
        self
    }

    #[must_use]
    pub fn create_missing(mut self, create: bool) -> Self {
        self.create_missing = create;
        self
    }

    #[must_use]
    pub fn garage(mut self, code: impl Into<String>) -> Self {
        self.garage = Some(code.into());
        self
    }

    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    #[must_use]
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn exchange_rate(mut self, rate: ExchangeRate) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn amounts(mut self, amounts: BookingAmounts) -> Self {
        self.amounts = amounts;
        self
    }

    #[must_use]
    pub fn amount(
        mut self,
        category: LedgerCategory,
        local: Option<MoneyCents>,
        foreign: Option<MoneyCents>,
    ) -> Self {
        self.amounts = self.amounts.with(category, local, foreign);
        self
    }
}

/// Standalone movement as submitted.
#[derive(Clone, Debug)]
pub struct MovementDraft {
    pub type_id: String,
    pub amount_local: Option<MoneyCents>,
    pub amount_foreign: Option<MoneyCents>,
    pub exchange_rate: Option<ExchangeRate>,
    pub note: Option<String>,
    /// Defaults to today when absent.
    pub date: Option<NaiveDate>,
    pub owner_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
}

impl MovementDraft {
    #[must_use]
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            amount_local: None,
            amount_foreign: None,
            exchange_rate: None,
            note: None,
            date: None,
            owner_id: None,
            booking_id: None,
        }
    }

    #[must_use]
    pub fn amount_local(mut self, amount: MoneyCents) -> Self {
        self.amount_local = Some(amount);
        self
    }

    #[must_use]
    pub fn amount_foreign(mut self, amount: MoneyCents) -> Self {
        self.amount_foreign = Some(amount);
        self
    }

    #[must_use]
    pub fn exchange_rate(mut self, rate: ExchangeRate) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner_id: Uuid) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    #[must_use]
    pub fn booking(mut self, booking_id: Uuid) -> Self {
        self.booking_id = Some(booking_id);
        self
    }
}

/// Create or replace an owner.
#[derive(Clone, Debug)]
pub struct NewOwner {
    pub name: String,
    pub national_id: Option<String>,
    pub phone: Option<String>,
}

impl NewOwner {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            national_id: None,
            phone: None,
        }
    }

    #[must_use]
    pub fn national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Create a user. The password is hashed by the engine.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl NewUser {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }
}

/// Partial user update. `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}
