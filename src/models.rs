//! Data models for the monitoring store.

use std::ops::RangeInclusive;

use serde::Serialize;

// ---

/// Accepted lamps-on counts. Zero lamps is a valid reading.
pub const LAMPS_ON_RANGE: RangeInclusive<i64> = 0..=10;

/// Accepted occupancy counts. Zero is rejected.
pub const OCCUPANCY_RANGE: RangeInclusive<i64> = 1..=10;

/// The append-only measurement tables.
///
/// Table names are interpolated into SQL, so they only ever come from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementTable {
    // ---
    Temperature,
    Humidity,
    Illumination,
    Occupancy,
    LampsOn,
    Consumption,
    Cost,
}

impl MeasurementTable {
    // ---
    pub const ALL: [MeasurementTable; 7] = [
        MeasurementTable::Temperature,
        MeasurementTable::Humidity,
        MeasurementTable::Illumination,
        MeasurementTable::Occupancy,
        MeasurementTable::LampsOn,
        MeasurementTable::Consumption,
        MeasurementTable::Cost,
    ];

    pub const fn table_name(self) -> &'static str {
        match self {
            MeasurementTable::Temperature => "temperatura",
            MeasurementTable::Humidity => "umidade",
            MeasurementTable::Illumination => "iluminacao",
            MeasurementTable::Occupancy => "ocupacao",
            MeasurementTable::LampsOn => "luzesLigadas",
            MeasurementTable::Consumption => "consumo",
            MeasurementTable::Cost => "custo",
        }
    }

    /// Lamps-on is the only table whose values are whole counts.
    pub const fn column_type(self) -> &'static str {
        match self {
            MeasurementTable::LampsOn => "INTEGER",
            _ => "REAL",
        }
    }
}

/// One timestamped scalar reading.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Measurement {
    // ---
    pub id: i64,
    pub value: f64,
    pub timestamp: String,
}

/// Static technician record, serialized with its stored column names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Technician {
    // ---
    #[serde(rename = "Nome")]
    pub name: Option<String>,
    #[serde(rename = "Ocupacao")]
    pub role: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Room {
    pub nome: String,
}

/// Stored login account. `password` holds the bcrypt hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthAccount {
    // ---
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

/// Account fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    // ---
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&AuthAccount> for PublicUser {
    fn from(account: &AuthAccount) -> Self {
        PublicUser {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_lamps_on_range_bounds() {
        // ---
        assert!(LAMPS_ON_RANGE.contains(&0));
        assert!(LAMPS_ON_RANGE.contains(&10));
        assert!(!LAMPS_ON_RANGE.contains(&-1));
        assert!(!LAMPS_ON_RANGE.contains(&11));
    }

    #[test]
    fn test_occupancy_range_excludes_zero() {
        // ---
        assert!(!OCCUPANCY_RANGE.contains(&0));
        assert!(OCCUPANCY_RANGE.contains(&1));
        assert!(OCCUPANCY_RANGE.contains(&10));
        assert!(!OCCUPANCY_RANGE.contains(&11));
    }

    #[test]
    fn test_table_names_are_unique() {
        // ---
        let mut names: Vec<_> = MeasurementTable::ALL.iter().map(|t| t.table_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MeasurementTable::ALL.len());
    }

    #[test]
    fn test_technician_serializes_with_column_names() {
        // ---
        let tech = Technician {
            name: Some("Ana".to_string()),
            role: Some("Eletricista".to_string()),
            email: None,
            status: Some("Ativo".to_string()),
        };
        let json = serde_json::to_value(&tech).unwrap();

        assert_eq!(json["Nome"], "Ana");
        assert_eq!(json["Ocupacao"], "Eletricista");
        assert!(json["Email"].is_null());
        assert_eq!(json["Status"], "Ativo");
    }
}
