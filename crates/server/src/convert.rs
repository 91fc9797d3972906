//! Conversions between wire types and engine types.

use api_types::{
    Decimal,
    booking::{AmountPair as WirePair, Amounts, BookingView},
    catalog::{CodeView, MovementTypeView, OwnerView, StateView},
    movement::MovementView,
    note::NoteView,
    user::{Role as WireRole, UserView},
};
use engine::{
    AmountPair, Booking, BookingAmounts, BookingState, ExchangeRate, Garage, LedgerCategory,
    MoneyCents, Movement, MovementType, Note, Owner, Role, Unit, User,
};

use crate::ServerError;

pub fn money(value: &Decimal) -> Result<MoneyCents, ServerError> {
    Ok(value.as_str().parse::<MoneyCents>()?)
}

pub fn optional_money(value: Option<&Decimal>) -> Result<Option<MoneyCents>, ServerError> {
    value.map(money).transpose()
}

pub fn rate(value: &Decimal) -> Result<ExchangeRate, ServerError> {
    Ok(value.as_str().parse::<ExchangeRate>()?)
}

pub fn decimal(value: MoneyCents) -> Decimal {
    Decimal(value.to_string())
}

pub fn role_to_wire(role: Role) -> WireRole {
    match role {
        Role::Operator => WireRole::Operator,
        Role::Admin => WireRole::Admin,
        Role::Superuser => WireRole::Superuser,
    }
}

pub fn role_from_wire(role: WireRole) -> Role {
    match role {
        WireRole::Operator => Role::Operator,
        WireRole::Admin => Role::Admin,
        WireRole::Superuser => Role::Superuser,
    }
}

const LEGACY_STATES: [(&str, &str); 2] = [("act", "active"), ("cerr", "closed")];

const LEGACY_MOVEMENT_TYPES: [(&str, &str); 6] = [
    ("inqu", "tenant"),
    ("prop", "owner"),
    ("limp", "cleaning"),
    ("rece", "reception"),
    ("comi", "commission"),
    ("publ", "advertising"),
];

fn legacy_id(table: &[(&str, &str)], id: String) -> String {
    let key = id.trim();
    match table.iter().find(|(old, _)| key.eq_ignore_ascii_case(old)) {
        Some((old, canonical)) => {
            tracing::debug!(legacy = old, canonical, "mapped legacy catalog id");
            (*canonical).to_string()
        }
        None => id,
    }
}

/// Maps the short state ids of older clients (`Act`, `Cerr`).
pub fn state_id_from_wire(id: String) -> String {
    legacy_id(&LEGACY_STATES, id)
}

/// Maps the short movement type ids of older clients (`Inqu`, `Prop`, ...).
pub fn movement_type_from_wire(id: String) -> String {
    legacy_id(&LEGACY_MOVEMENT_TYPES, id)
}

fn pair_from_wire(pair: &WirePair) -> Result<AmountPair, ServerError> {
    Ok(AmountPair::new(
        optional_money(pair.local.as_ref())?,
        optional_money(pair.foreign.as_ref())?,
    ))
}

fn pair_to_wire(pair: AmountPair) -> WirePair {
    WirePair {
        local: pair.local.map(decimal),
        foreign: pair.foreign.map(decimal),
    }
}

fn wire_slot(amounts: &Amounts, category: LedgerCategory) -> &WirePair {
    match category {
        LedgerCategory::Tenant => &amounts.tenant,
        LedgerCategory::Owner => &amounts.owner,
        LedgerCategory::Cleaning => &amounts.cleaning,
        LedgerCategory::Reception => &amounts.reception,
        LedgerCategory::Commission => &amounts.commission,
        LedgerCategory::Advertising => &amounts.advertising,
    }
}

fn wire_slot_mut(amounts: &mut Amounts, category: LedgerCategory) -> &mut WirePair {
    match category {
        LedgerCategory::Tenant => &mut amounts.tenant,
        LedgerCategory::Owner => &mut amounts.owner,
        LedgerCategory::Cleaning => &mut amounts.cleaning,
        LedgerCategory::Reception => &mut amounts.reception,
        LedgerCategory::Commission => &mut amounts.commission,
        LedgerCategory::Advertising => &mut amounts.advertising,
    }
}

pub fn amounts_from_wire(amounts: &Amounts) -> Result<BookingAmounts, ServerError> {
    let mut out = BookingAmounts::default();
    for category in LedgerCategory::ALL {
        out.set(category, pair_from_wire(wire_slot(amounts, category))?);
    }
    Ok(out)
}

pub fn amounts_to_wire(amounts: &BookingAmounts) -> Amounts {
    let mut out = Amounts::default();
    for category in LedgerCategory::ALL {
        *wire_slot_mut(&mut out, category) = pair_to_wire(amounts.get(category));
    }
    out
}

pub fn booking_view(booking: Booking, today: chrono::NaiveDate) -> BookingView {
    BookingView {
        past: booking.is_past(today),
        id: booking.id,
        unit_id: booking.unit_id,
        unit_code: booking.unit_code,
        garage_id: booking.garage_id,
        garage_code: booking.garage_code,
        tenant: booking.tenant,
        start_date: booking.start_date,
        end_date: booking.end_date,
        state_id: booking.state_id,
        exchange_rate: Decimal(booking.exchange_rate.to_string()),
        note: booking.note,
        created_by: booking.created_by,
        created_at: booking.created_at,
        amounts: amounts_to_wire(&booking.ledger.amounts),
        total_local: decimal(booking.ledger.total_local),
        total_foreign: decimal(booking.ledger.total_foreign),
    }
}

pub fn movement_view(movement: Movement) -> MovementView {
    MovementView {
        id: movement.id,
        type_id: movement.type_id,
        amount_local: movement.amount_local.map(decimal),
        amount_foreign: movement.amount_foreign.map(decimal),
        exchange_rate: Decimal(movement.exchange_rate.to_string()),
        note: movement.note,
        date: movement.date,
        created_by: movement.created_by,
        owner_id: movement.owner_id,
        booking_id: movement.booking_id,
    }
}

pub fn note_view(note: Note) -> NoteView {
    NoteView {
        id: note.id,
        booking_id: note.booking_id,
        comment: note.comment,
        date: note.date,
        created_by: note.created_by,
    }
}

pub fn user_view(user: User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        role: role_to_wire(user.role),
    }
}

pub fn unit_view(unit: Unit) -> CodeView {
    CodeView {
        id: unit.id,
        code: unit.code,
        owner_id: unit.owner_id,
    }
}

pub fn garage_view(garage: Garage) -> CodeView {
    CodeView {
        id: garage.id,
        code: garage.code,
        owner_id: garage.owner_id,
    }
}

pub fn owner_view(owner: Owner) -> OwnerView {
    OwnerView {
        id: owner.id,
        name: owner.name,
        national_id: owner.national_id,
        phone: owner.phone,
    }
}

pub fn state_view(state: BookingState) -> StateView {
    StateView {
        id: state.id,
        name: state.name,
    }
}

pub fn movement_type_view(kind: MovementType) -> MovementTypeView {
    MovementTypeView {
        id: kind.id,
        name: kind.name,
        requires_owner: kind.requires_owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_survive_the_wire() {
        let amounts = BookingAmounts::default()
            .with(LedgerCategory::Tenant, Some(MoneyCents::new(100_000)), None)
            .with(LedgerCategory::Advertising, None, Some(MoneyCents::new(250)));
        let wire = amounts_to_wire(&amounts);
        assert_eq!(wire.tenant.local, Some(Decimal("1000.00".to_string())));
        assert_eq!(wire.advertising.foreign, Some(Decimal("2.50".to_string())));
        assert_eq!(amounts_from_wire(&wire).unwrap(), amounts);
    }

    #[test]
    fn bad_amount_is_rejected() {
        assert!(matches!(
            money(&Decimal("12.345".to_string())),
            Err(ServerError::Engine(engine::EngineError::InvalidAmount(_)))
        ));
    }

    #[test]
    fn legacy_catalog_ids_map_to_canonical_ones() {
        assert_eq!(state_id_from_wire("Act".to_string()), "active");
        assert_eq!(state_id_from_wire(" CERR ".to_string()), "closed");
        assert_eq!(state_id_from_wire("archived".to_string()), "archived");
        assert_eq!(movement_type_from_wire("Prop".to_string()), "owner");
        assert_eq!(movement_type_from_wire("Rece".to_string()), "reception");
        assert_eq!(movement_type_from_wire("cleaning".to_string()), "cleaning");
    }
}
