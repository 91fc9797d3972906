use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Decimal amount as it travels on the wire.
///
/// Accepted as a JSON string (`"350.50"`, `"350,5"`) or number (`350.5`),
/// always emitted as a string with two decimals. Parsing and range checks
/// happen on the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Decimal(pub String);

impl Decimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Decimal {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Integer(value) => Self(value.to_string()),
            Raw::Float(value) => Self(value.to_string()),
        })
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    /// Role of a user.
    ///
    /// The server treats roles as:
    /// - `operator`: bookings, movements and notes.
    /// - `admin`: also booking states and catalog maintenance.
    /// - `superuser`: also user management.
    ///
    /// Legacy names (`normal`, `operador`, `programador`) are accepted on
    /// input.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        #[serde(alias = "normal", alias = "operador")]
        Operator,
        Admin,
        #[serde(alias = "programador")]
        Superuser,
    }

    impl Role {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Operator => "operator",
                Self::Admin => "admin",
                Self::Superuser => "superuser",
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        #[serde(alias = "nombre")]
        pub name: String,
        pub email: String,
        pub password: String,
        #[serde(alias = "rol")]
        pub role: Role,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        #[serde(alias = "nombre")]
        pub name: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
        #[serde(alias = "rol")]
        pub role: Option<Role>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub role: Role,
    }
}

pub mod auth {
    use super::*;
    use crate::user::{Role, UserView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: UserView,
    }

    /// Identity decoded from the bearer token.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Me {
        pub id: Uuid,
        pub email: String,
        pub name: String,
        pub role: Role,
    }
}

pub mod booking {
    use super::*;

    /// One ledger category in both currencies.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct AmountPair {
        pub local: Option<Decimal>,
        pub foreign: Option<Decimal>,
    }

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct Amounts {
        pub tenant: AmountPair,
        pub owner: AmountPair,
        pub cleaning: AmountPair,
        pub reception: AmountPair,
        pub commission: AmountPair,
        pub advertising: AmountPair,
    }

    /// Booking create/update body.
    ///
    /// Two shapes are accepted: the nested `amounts` object and the legacy
    /// flat `importe_<category>_<ars|usd>` fields. Flat fields win when both
    /// are present. Client totals (`total_*`, `importe_total*`) are read but
    /// never stored.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct BookingInput {
        #[serde(alias = "departamento")]
        pub unit: Option<String>,
        #[serde(alias = "departamento_id")]
        pub unit_id: Option<Uuid>,
        /// Create unknown unit/garage codes.
        pub create_missing: bool,
        #[serde(alias = "cochera")]
        pub garage: Option<String>,
        #[serde(alias = "inquilino")]
        pub tenant: Option<String>,
        #[serde(alias = "fecha_desde")]
        pub start_date: Option<NaiveDate>,
        #[serde(alias = "fecha_hasta")]
        pub end_date: Option<NaiveDate>,
        #[serde(alias = "estado_id")]
        pub state: Option<String>,
        #[serde(alias = "cotizacion")]
        pub exchange_rate: Option<Decimal>,
        #[serde(alias = "nota", alias = "observaciones", alias = "concepto")]
        pub note: Option<String>,
        pub amounts: Option<Amounts>,

        #[serde(rename = "importe_inquilino_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_tenant_local: Option<Decimal>,
        #[serde(rename = "importe_inquilino_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_tenant_foreign: Option<Decimal>,
        #[serde(rename = "importe_propietario_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_owner_local: Option<Decimal>,
        #[serde(rename = "importe_propietario_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_owner_foreign: Option<Decimal>,
        #[serde(rename = "importe_limpieza_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_cleaning_local: Option<Decimal>,
        #[serde(rename = "importe_limpieza_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_cleaning_foreign: Option<Decimal>,
        #[serde(rename = "importe_recepcion_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_reception_local: Option<Decimal>,
        #[serde(rename = "importe_recepcion_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_reception_foreign: Option<Decimal>,
        #[serde(rename = "importe_comision_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_commission_local: Option<Decimal>,
        #[serde(rename = "importe_comision_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_commission_foreign: Option<Decimal>,
        #[serde(rename = "importe_publicidad_ars", skip_serializing_if = "Option::is_none")]
        pub legacy_advertising_local: Option<Decimal>,
        #[serde(rename = "importe_publicidad_usd", skip_serializing_if = "Option::is_none")]
        pub legacy_advertising_foreign: Option<Decimal>,

        #[serde(
            alias = "importe_total",
            alias = "importe_total_ars",
            skip_serializing_if = "Option::is_none"
        )]
        pub total_local: Option<Decimal>,
        #[serde(alias = "importe_total_usd", skip_serializing_if = "Option::is_none")]
        pub total_foreign: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BookingView {
        pub id: Uuid,
        pub unit_id: Uuid,
        pub unit_code: String,
        pub garage_id: Option<Uuid>,
        pub garage_code: Option<String>,
        pub tenant: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub state_id: String,
        /// `end_date` is before today.
        pub past: bool,
        pub exchange_rate: Decimal,
        pub note: Option<String>,
        pub created_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub amounts: Amounts,
        pub total_local: Decimal,
        pub total_foreign: Decimal,
    }

    /// Listing and export filters.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct BookingQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub state: Option<String>,
        pub unit: Option<String>,
        pub past: Option<bool>,
    }
}

pub mod movement {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct MovementInput {
        #[serde(alias = "tipo_id", alias = "cod_tipo")]
        pub type_id: String,
        #[serde(alias = "importe_ars")]
        pub amount_local: Option<Decimal>,
        #[serde(alias = "importe_usd")]
        pub amount_foreign: Option<Decimal>,
        #[serde(alias = "cotizacion")]
        pub exchange_rate: Option<Decimal>,
        #[serde(alias = "nota", alias = "concepto")]
        pub note: Option<String>,
        #[serde(alias = "fecha")]
        pub date: Option<NaiveDate>,
        #[serde(alias = "propietario_id")]
        pub owner_id: Option<Uuid>,
        #[serde(alias = "estadia_id")]
        pub booking_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub id: Uuid,
        pub type_id: String,
        pub amount_local: Option<Decimal>,
        pub amount_foreign: Option<Decimal>,
        pub exchange_rate: Decimal,
        pub note: Option<String>,
        pub date: NaiveDate,
        pub created_by: Option<Uuid>,
        pub owner_id: Option<Uuid>,
        pub booking_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct MovementQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        #[serde(rename = "type")]
        pub type_id: Option<String>,
        pub owner_id: Option<Uuid>,
        pub booking_id: Option<Uuid>,
    }
}

pub mod catalog {
    use super::*;

    /// Unit or garage creation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CodeNew {
        #[serde(alias = "codigo")]
        pub code: String,
        #[serde(default, alias = "propietario_id")]
        pub owner_id: Option<Uuid>,
    }

    /// Find-or-create by code.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResolveRequest {
        #[serde(alias = "codigo")]
        pub code: String,
        #[serde(default)]
        pub create_missing: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ResolvedId {
        pub id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CodeView {
        pub id: Uuid,
        pub code: String,
        pub owner_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerInput {
        #[serde(alias = "nombre")]
        pub name: String,
        #[serde(default, alias = "dni", alias = "cuit")]
        pub national_id: Option<String>,
        #[serde(default, alias = "telefono")]
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerView {
        pub id: Uuid,
        pub name: String,
        pub national_id: Option<String>,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StateNew {
        pub id: String,
        #[serde(alias = "nombre")]
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StateView {
        pub id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementTypeNew {
        pub id: String,
        #[serde(alias = "nombre")]
        pub name: String,
        #[serde(default)]
        pub requires_owner: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementTypeView {
        pub id: String,
        pub name: String,
        pub requires_owner: bool,
    }
}

pub mod note {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteNew {
        #[serde(alias = "comentario")]
        pub comment: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteView {
        pub id: Uuid,
        pub booking_id: Uuid,
        pub comment: String,
        pub date: NaiveDate,
        pub created_by: Option<Uuid>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_accepts_numbers_and_strings() {
        let values: Vec<Decimal> = serde_json::from_str(r#"["350.50", 1000, 12.5]"#).unwrap();
        assert_eq!(values[0].as_str(), "350.50");
        assert_eq!(values[1].as_str(), "1000");
        assert_eq!(values[2].as_str(), "12.5");
        assert_eq!(
            serde_json::to_string(&Decimal("350.00".to_string())).unwrap(),
            r#""350.00""#
        );
    }

    #[test]
    fn legacy_booking_shape_deserializes() {
        let input: booking::BookingInput = serde_json::from_str(
            r#"{
                "departamento": "B216",
                "inquilino": "Pérez",
                "fecha_desde": "2025-03-01",
                "fecha_hasta": "2025-03-10",
                "cotizacion": 1000,
                "importe_inquilino_ars": "1000",
                "importe_total": "999"
            }"#,
        )
        .unwrap();
        assert_eq!(input.unit.as_deref(), Some("B216"));
        assert_eq!(input.tenant.as_deref(), Some("Pérez"));
        assert_eq!(
            input.legacy_tenant_local,
            Some(Decimal("1000".to_string()))
        );
        assert_eq!(input.total_local, Some(Decimal("999".to_string())));
        assert!(input.amounts.is_none());
    }

    #[test]
    fn legacy_role_names() {
        let roles: Vec<user::Role> =
            serde_json::from_str(r#"["normal", "operador", "admin", "programador"]"#).unwrap();
        assert_eq!(
            roles,
            [
                user::Role::Operator,
                user::Role::Operator,
                user::Role::Admin,
                user::Role::Superuser
            ]
        );
    }
}
