//! Bookings API endpoints.
//!
//! Request bodies come in two shapes (see [`BookingInput`]); both are
//! normalized here into one [`BookingDraft`] before reaching the engine.

use api_types::booking::{BookingInput, BookingQuery, BookingView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Local;
use engine::{
    Actor, AmountPair, BookingAmounts, BookingDraft, BookingListFilter, LedgerCategory, UnitRef,
};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{amounts_from_wire, booking_view, optional_money, rate, state_id_from_wire},
    extract::{JsonBody, PathParam, QueryParams},
    server::ServerState,
};

pub async fn create(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<BookingInput>,
) -> Result<(StatusCode, Json<BookingView>), ServerError> {
    let draft = draft_from_input(payload)?;
    let booking = state.engine.create_booking(&actor, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(booking_view(booking, Local::now().date_naive())),
    ))
}

pub async fn update(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<BookingInput>,
) -> Result<Json<BookingView>, ServerError> {
    let draft = draft_from_input(payload)?;
    let booking = state.engine.update_booking(&actor, id, draft).await?;
    Ok(Json(booking_view(booking, Local::now().date_naive())))
}

pub async fn delete(
    Extension(actor): Extension<Actor>,
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_booking(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    State(state): State<ServerState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<BookingView>, ServerError> {
    let booking = state.engine.booking(id).await?;
    Ok(Json(booking_view(booking, Local::now().date_naive())))
}

pub async fn list(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<BookingQuery>,
) -> Result<Json<Vec<BookingView>>, ServerError> {
    let today = Local::now().date_naive();
    let bookings = state.engine.bookings(&list_filter(query)).await?;
    Ok(Json(
        bookings
            .into_iter()
            .map(|booking| booking_view(booking, today))
            .collect(),
    ))
}

pub(crate) fn list_filter(query: BookingQuery) -> BookingListFilter {
    BookingListFilter {
        from: query.from,
        to: query.to,
        state: query.state.map(state_id_from_wire),
        unit_code: query.unit,
        past: query.past,
    }
}

/// Normalizes either request shape into a draft.
///
/// Flat legacy amounts override the nested ones category by category. Client
/// totals are dropped: the engine always derives them.
pub(crate) fn draft_from_input(input: BookingInput) -> Result<BookingDraft, ServerError> {
    if input.total_local.is_some() || input.total_foreign.is_some() {
        tracing::debug!("ignoring client-supplied booking totals");
    }

    let mut amounts = match &input.amounts {
        Some(amounts) => amounts_from_wire(amounts)?,
        None => BookingAmounts::default(),
    };
    let legacy = [
        (
            LedgerCategory::Tenant,
            &input.legacy_tenant_local,
            &input.legacy_tenant_foreign,
        ),
        (
            LedgerCategory::Owner,
            &input.legacy_owner_local,
            &input.legacy_owner_foreign,
        ),
        (
            LedgerCategory::Cleaning,
            &input.legacy_cleaning_local,
            &input.legacy_cleaning_foreign,
        ),
        (
            LedgerCategory::Reception,
            &input.legacy_reception_local,
            &input.legacy_reception_foreign,
        ),
        (
            LedgerCategory::Commission,
            &input.legacy_commission_local,
            &input.legacy_commission_foreign,
        ),
        (
            LedgerCategory::Advertising,
            &input.legacy_advertising_local,
            &input.legacy_advertising_foreign,
        ),
    ];
    for (category, local, foreign) in legacy {
        if local.is_none() && foreign.is_none() {
            continue;
        }
        let current = amounts.get(category);
        amounts.set(
            category,
            AmountPair::new(
                optional_money(local.as_ref())?.or(current.local),
                optional_money(foreign.as_ref())?.or(current.foreign),
            ),
        );
    }

    let unit = match (input.unit_id, input.unit) {
        (Some(id), _) => Some(UnitRef::Id(id)),
        (None, Some(code)) => Some(UnitRef::Code(code)),
        (None, None) => None,
    };

    Ok(BookingDraft {
        unit,
        create_missing: input.create_missing,
        garage: input.garage,
        tenant: input.tenant,
        start_date: input.start_date,
        end_date: input.end_date,
        state: input.state.map(state_id_from_wire),
        exchange_rate: input.exchange_rate.as_ref().map(rate).transpose()?,
        note: input.note,
        amounts,
    })
}
