//! Combined "latest snapshot" of the monitored space.

use serde::{Serialize, Serializer};

use crate::models::MeasurementTable;
use crate::store::Store;

// ---

/// Value reported in place of a reading when a table has no rows.
pub const NO_DATA: &str = "Sem dados";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapshotValue {
    Value(f64),
    NoData,
}

impl Serialize for SnapshotValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SnapshotValue::Value(v) => serializer.serialize_f64(*v),
            SnapshotValue::NoData => serializer.serialize_str(NO_DATA),
        }
    }
}

/// Newest lamps-on count plus running totals of consumption and cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    // ---
    #[serde(rename = "luzesLigadas")]
    pub lamps_on: SnapshotValue,
    #[serde(rename = "consumo")]
    pub consumption: f64,
    #[serde(rename = "custo")]
    pub cost: f64,
}

/// Run the three reads concurrently; any failure fails the whole snapshot.
pub async fn latest_snapshot(store: &Store) -> Result<Snapshot, sqlx::Error> {
    // ---
    let (lamps_on, consumption, cost) = tokio::try_join!(
        store.latest(MeasurementTable::LampsOn),
        store.sum(MeasurementTable::Consumption),
        store.sum(MeasurementTable::Cost),
    )?;

    Ok(Snapshot {
        lamps_on: lamps_on.map_or(SnapshotValue::NoData, |m| SnapshotValue::Value(m.value)),
        consumption,
        cost,
    })
}
