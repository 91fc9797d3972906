//! CSV exports of bookings, movements and the catalogs.
//!
//! Booking and movement filters are the same as the JSON listings. Catalogs
//! are exported whole, one table per request.

use api_types::{booking::BookingQuery, movement::MovementQuery};
use axum::{extract::State, http::header, response::IntoResponse};
use chrono::Local;
use csv::Writer;
use engine::{Booking, Currency, EngineError, LedgerCategory, MoneyCents, Movement};
use uuid::Uuid;

use crate::{
    ServerError, bookings,
    extract::{PathParam, QueryParams},
    movements,
    server::ServerState,
};

pub async fn bookings_csv(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<BookingQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let rows = state.engine.bookings(&bookings::list_filter(query)).await?;
    let data = write_bookings(&rows, Local::now().date_naive())?;
    Ok(csv_response(data, "bookings.csv"))
}

pub async fn movements_csv(
    State(state): State<ServerState>,
    QueryParams(query): QueryParams<MovementQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let rows = state
        .engine
        .movements(&movements::list_filter(query))
        .await?;
    let data = write_movements(&rows)?;
    Ok(csv_response(data, "movements.csv"))
}

const CODE_COLUMNS: &[&str] = &["id", "code", "owner_id"];
const OWNER_COLUMNS: &[&str] = &["id", "name", "national_id", "phone"];
const STATE_COLUMNS: &[&str] = &["id", "name"];
const MOVEMENT_TYPE_COLUMNS: &[&str] = &["id", "name", "requires_owner"];

/// `GET /export/{table}` for `units`, `garages`, `owners`, `states` and
/// `movement-types`.
pub async fn catalog_csv(
    State(state): State<ServerState>,
    PathParam(table): PathParam<String>,
) -> Result<impl IntoResponse, ServerError> {
    let engine = &state.engine;
    let (columns, rows): (&[&str], Vec<Vec<String>>) = match table.as_str() {
        "units" => (
            CODE_COLUMNS,
            engine
                .units()
                .await?
                .into_iter()
                .map(|u| vec![u.id.to_string(), u.code, optional_id(u.owner_id)])
                .collect(),
        ),
        "garages" => (
            CODE_COLUMNS,
            engine
                .garages()
                .await?
                .into_iter()
                .map(|g| vec![g.id.to_string(), g.code, optional_id(g.owner_id)])
                .collect(),
        ),
        "owners" => (
            OWNER_COLUMNS,
            engine
                .owners()
                .await?
                .into_iter()
                .map(|o| {
                    vec![
                        o.id.to_string(),
                        o.name,
                        o.national_id.unwrap_or_default(),
                        o.phone.unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        "states" => (
            STATE_COLUMNS,
            engine
                .booking_states()
                .await?
                .into_iter()
                .map(|s| vec![s.id, s.name])
                .collect(),
        ),
        "movement-types" => (
            MOVEMENT_TYPE_COLUMNS,
            engine
                .movement_types()
                .await?
                .into_iter()
                .map(|t| vec![t.id, t.name, t.requires_owner.to_string()])
                .collect(),
        ),
        other => {
            return Err(EngineError::KeyNotFound(format!("export {other}")).into());
        }
    };
    let data = write_table(columns, &rows)?;
    Ok(csv_response(data, &format!("{table}.csv")))
}

fn csv_response(data: Vec<u8>, file_name: &str) -> impl IntoResponse + use<> {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        data,
    )
}

fn export_error(err: impl std::fmt::Display) -> ServerError {
    tracing::error!("failed to write export: {err}");
    ServerError::Internal("export failed".to_string())
}

fn optional_id(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn write_table(header: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, ServerError> {
    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(header).map_err(export_error)?;
    for row in rows {
        writer.write_record(row).map_err(export_error)?;
    }
    writer.into_inner().map_err(export_error)
}

fn amount(value: Option<MoneyCents>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_bookings(rows: &[Booking], today: chrono::NaiveDate) -> Result<Vec<u8>, ServerError> {
    let mut header = vec![
        "id".to_string(),
        "unit".to_string(),
        "garage".to_string(),
        "tenant".to_string(),
        "start_date".to_string(),
        "end_date".to_string(),
        "state".to_string(),
        "past".to_string(),
        "exchange_rate".to_string(),
    ];
    for category in LedgerCategory::ALL {
        header.push(Currency::LOCAL.column(category.as_str()));
        header.push(Currency::FOREIGN.column(category.as_str()));
    }
    header.push(Currency::LOCAL.column("total"));
    header.push(Currency::FOREIGN.column("total"));
    header.push("note".to_string());

    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(&header).map_err(export_error)?;
    for booking in rows {
        let mut record = vec![
            booking.id.to_string(),
            booking.unit_code.clone(),
            booking.garage_code.clone().unwrap_or_default(),
            booking.tenant.clone(),
            booking.start_date.to_string(),
            booking.end_date.to_string(),
            booking.state_id.clone(),
            booking.is_past(today).to_string(),
            booking.exchange_rate.to_string(),
        ];
        for category in LedgerCategory::ALL {
            let pair = booking.ledger.amounts.get(category);
            record.push(amount(pair.local));
            record.push(amount(pair.foreign));
        }
        record.push(booking.ledger.total_local.to_string());
        record.push(booking.ledger.total_foreign.to_string());
        record.push(booking.note.clone().unwrap_or_default());
        writer.write_record(&record).map_err(export_error)?;
    }
    writer.into_inner().map_err(export_error)
}

fn write_movements(rows: &[Movement]) -> Result<Vec<u8>, ServerError> {
    let mut writer = Writer::from_writer(vec![]);
    writer
        .write_record([
            "id".to_string(),
            "date".to_string(),
            "type".to_string(),
            Currency::LOCAL.column("amount"),
            Currency::FOREIGN.column("amount"),
            "exchange_rate".to_string(),
            "owner_id".to_string(),
            "booking_id".to_string(),
            "note".to_string(),
        ])
        .map_err(export_error)?;
    for movement in rows {
        writer
            .write_record([
                movement.id.to_string(),
                movement.date.to_string(),
                movement.type_id.clone(),
                amount(movement.amount_local),
                amount(movement.amount_foreign),
                movement.exchange_rate.to_string(),
                optional_id(movement.owner_id),
                optional_id(movement.booking_id),
                movement.note.clone().unwrap_or_default(),
            ])
            .map_err(export_error)?;
    }
    writer.into_inner().map_err(export_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engine::ExchangeRate;

    #[test]
    fn movement_export_has_currency_headers() {
        let movement = Movement {
            id: Uuid::nil(),
            type_id: "owner_payout".to_string(),
            amount_local: Some(MoneyCents::new(35_000)),
            amount_foreign: None,
            exchange_rate: ExchangeRate::from_hundredths(100_000),
            note: Some("march, payout".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            created_by: None,
            owner_id: None,
            booking_id: None,
        };
        let data = String::from_utf8(write_movements(&[movement]).unwrap()).unwrap();
        let mut lines = data.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,date,type,amount_ARS,amount_USD,exchange_rate,owner_id,booking_id,note"
        );
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "{},2025-03-31,owner_payout,350.00,,1000.00,,,\"march, payout\"",
                Uuid::nil()
            )
        );
    }

    #[test]
    fn table_export_quotes_fields() {
        let rows = vec![vec![
            "1".to_string(),
            "Gómez, Ana".to_string(),
            String::new(),
        ]];
        let data = String::from_utf8(write_table(&["id", "name", "phone"], &rows).unwrap()).unwrap();
        assert_eq!(data, "id,name,phone\n1,\"Gómez, Ana\",\n");
    }
}
