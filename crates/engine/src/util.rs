//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{BookingDraft, EngineError, ExchangeRate, MovementDraft, ResultEngine, UnitRef};

/// Booking fields that passed the shape checks (required fields, date order,
/// positive rate). References are not resolved yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BookingShape {
    pub unit: UnitRef,
    pub tenant: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub exchange_rate: ExchangeRate,
}

/// First three validator steps, in order, stopping at the first failure.
pub(crate) fn check_booking_shape(draft: &BookingDraft) -> ResultEngine<BookingShape> {
    let unit = match &draft.unit {
        Some(UnitRef::Id(id)) => UnitRef::Id(*id),
        Some(UnitRef::Code(code)) => UnitRef::Code(
            normalize_code(code).ok_or_else(|| missing("unit"))?,
        ),
        None => return Err(missing("unit")),
    };
    let tenant = normalize_optional_text(draft.tenant.as_deref()).ok_or_else(|| missing("tenant"))?;
    let start_date = draft.start_date.ok_or_else(|| missing("start_date"))?;
    let end_date = draft.end_date.ok_or_else(|| missing("end_date"))?;

    if start_date > end_date {
        return Err(EngineError::Validation(format!(
            "start_date {start_date} is after end_date {end_date}"
        )));
    }

    let exchange_rate = require_positive_rate(draft.exchange_rate)?;

    Ok(BookingShape {
        unit,
        tenant,
        start_date,
        end_date,
        exchange_rate,
    })
}

/// Checks a movement that does not depend on stored data: positive rate and
/// at least one amount.
pub(crate) fn check_movement_shape(draft: &MovementDraft) -> ResultEngine<ExchangeRate> {
    if draft.type_id.trim().is_empty() {
        return Err(missing("type"));
    }
    let rate = require_positive_rate(draft.exchange_rate)?;
    if draft.amount_local.is_none() && draft.amount_foreign.is_none() {
        return Err(EngineError::Validation(
            "a movement needs a local or a foreign amount".to_string(),
        ));
    }
    Ok(rate)
}

/// Some movement types (owner payout, cleaning, ...) must name an owner.
pub(crate) fn check_movement_owner(
    type_id: &str,
    requires_owner: bool,
    owner_id: Option<Uuid>,
) -> ResultEngine<()> {
    if requires_owner && owner_id.is_none() {
        return Err(EngineError::Validation(format!(
            "movement type '{type_id}' requires an owner"
        )));
    }
    Ok(())
}

fn require_positive_rate(rate: Option<ExchangeRate>) -> ResultEngine<ExchangeRate> {
    match rate {
        Some(rate) if rate.is_positive() => Ok(rate),
        Some(rate) => Err(EngineError::Validation(format!(
            "exchange_rate must be > 0, got {rate}"
        ))),
        None => Err(missing("exchange_rate")),
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::Validation(format!("missing required field: {field}"))
}

/// Trim and ASCII-uppercase a unit/garage code. Empty codes become `None`.
pub(crate) fn normalize_code(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft() -> BookingDraft {
        BookingDraft::new()
            .unit_code(" b216 ")
            .tenant("Pérez")
            .dates(date(2025, 3, 1), date(2025, 3, 10))
            .exchange_rate(ExchangeRate::from_hundredths(100_000))
    }

    #[test]
    fn shape_normalizes_unit_code() {
        let shape = check_booking_shape(&draft()).unwrap();
        assert_eq!(shape.unit, UnitRef::Code("B216".to_string()));
        assert_eq!(shape.tenant, "Pérez");
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let mut d = draft();
        d.unit = None;
        d.tenant = None;
        assert_eq!(
            check_booking_shape(&d).unwrap_err(),
            EngineError::Validation("missing required field: unit".to_string())
        );

        let mut d = draft();
        d.tenant = Some("   ".to_string());
        assert_eq!(
            check_booking_shape(&d).unwrap_err(),
            EngineError::Validation("missing required field: tenant".to_string())
        );

        let mut d = draft();
        d.end_date = None;
        assert_eq!(
            check_booking_shape(&d).unwrap_err(),
            EngineError::Validation("missing required field: end_date".to_string())
        );
    }

    #[test]
    fn same_day_booking_is_legal() {
        let d = draft().dates(date(2025, 3, 1), date(2025, 3, 1));
        assert!(check_booking_shape(&d).is_ok());
    }

    #[test]
    fn reversed_dates_fail_before_rate() {
        let d = draft()
            .dates(date(2025, 3, 10), date(2025, 3, 1))
            .exchange_rate(ExchangeRate::from_hundredths(0));
        let err = check_booking_shape(&d).unwrap_err();
        assert!(err.to_string().contains("after end_date"));
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        for hundredths in [0, -100] {
            let d = draft().exchange_rate(ExchangeRate::from_hundredths(hundredths));
            assert!(matches!(
                check_booking_shape(&d),
                Err(EngineError::Validation(_))
            ));
        }
        let mut d = draft();
        d.exchange_rate = None;
        assert_eq!(
            check_booking_shape(&d).unwrap_err(),
            EngineError::Validation("missing required field: exchange_rate".to_string())
        );
    }

    #[test]
    fn movement_needs_an_amount() {
        let d = MovementDraft::new("cleaning").exchange_rate(ExchangeRate::from_hundredths(100));
        assert!(matches!(
            check_movement_shape(&d),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn owner_requirement() {
        assert!(check_movement_owner("owner", true, None).is_err());
        assert!(check_movement_owner("owner", true, Some(Uuid::new_v4())).is_ok());
        assert!(check_movement_owner("commission", false, None).is_ok());
    }

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  c-12a "), Some("C-12A".to_string()));
        assert_eq!(normalize_code("   "), None);
    }
}
