//! Booking and accounting engine for Estadías.
//!
//! The engine owns the rules that decide whether a booking is legal and how
//! its multi-currency amounts are derived:
//!
//! - the reference-data resolver (unit/garage codes, owners, catalogs),
//! - the booking validator (dates, rate, references, state permissions,
//!   no-overlap per unit),
//! - the ledger computator ([`compute_ledger`]).
//!
//! Persistence goes through sea-orm; every write runs in one DB transaction.

pub use commands::{BookingDraft, MovementDraft, NewOwner, NewUser, UnitRef, UserUpdate};
pub use currency::Currency;
pub use error::EngineError;
pub use ledger::{AmountPair, BookingAmounts, Ledger, LedgerCategory, compute_ledger};
pub use money::{ExchangeRate, MoneyCents};
pub use ops::{
    BookingListFilter, Engine, EngineBuilder, MovementListFilter, OverlapCheck, ResolveMode,
};
pub use roles::{Actor, Role};

pub use bookings::Booking;
pub use catalog::{BookingState, Garage, MovementType, Owner, Unit};
pub use movements::Movement;
pub use notes::Note;
pub use users::User;

mod commands;
mod currency;
mod error;
mod ledger;
mod money;
mod ops;
mod roles;
mod util;

pub mod bookings;
pub mod catalog;
pub mod movements;
pub mod notes;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// Default booking state for new bookings.
pub const DEFAULT_STATE: &str = "active";

/// State used by reports for finished bookings.
pub const CLOSED_STATE: &str = "closed";
