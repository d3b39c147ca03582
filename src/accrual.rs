//! Periodic cost and consumption accrual.
//!
//! Every period the job reads the newest lamps-on count and appends one
//! consumption row and one cost row derived from it. Cycles are independent:
//! a failed cycle is logged and skipped, with no retry and no catch-up.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::models::MeasurementTable;
use crate::store::Store;

// ---

/// Cost units charged per lamp, before the time multiplier.
const UNIT_COST: f64 = 2.0;

/// Per-minute multiplier applied to the base cost.
const TIME_MULTIPLIER: f64 = 0.6;

/// Lamp index that is never charged.
const EXEMPT_INDEX: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    pub lamps_on: u32,
    pub consumption: f64,
    pub cost: f64,
}

/// A cycle's failing statement and the store error it hit.
#[derive(Debug, Error)]
#[error("failed to {step}: {source}")]
pub struct CycleError {
    pub step: &'static str,
    #[source]
    pub source: sqlx::Error,
}

fn at(step: &'static str) -> impl FnOnce(sqlx::Error) -> CycleError {
    move |source| CycleError { step, source }
}

/// Derive consumption and cost from a lamps-on count.
///
/// Each lamp index in `0..lamps_on` adds [`UNIT_COST`], except index 1.
/// `cost = lamps_on + 0.6 * base_cost`; `consumption = lamps_on`.
pub fn accrue(lamps_on: u32) -> Accrual {
    // ---
    let base_cost: f64 = (0..lamps_on)
        .filter(|&i| i != EXEMPT_INDEX)
        .map(|_| UNIT_COST)
        .sum();

    let n = f64::from(lamps_on);
    Accrual {
        lamps_on,
        consumption: n,
        cost: n + TIME_MULTIPLIER * base_cost,
    }
}

/// Owns everything one accrual cycle needs. Built once at startup.
#[derive(Clone)]
pub struct AccrualJob {
    store: Store,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl AccrualJob {
    // ---
    pub fn new(store: Store, clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self {
            store,
            clock,
            period,
        }
    }

    /// Run a single cycle: read lamps-on, append consumption and cost.
    pub async fn run_cycle(&self) -> Result<Accrual, CycleError> {
        // ---
        let latest = self
            .store
            .latest(MeasurementTable::LampsOn)
            .await
            .map_err(at("read lamps-on"))?;
        let lamps_on = latest.map_or(0, |m| lamps_count(m.value));

        let accrual = accrue(lamps_on);
        debug!(
            lamps_on = accrual.lamps_on,
            consumption = accrual.consumption,
            cost = accrual.cost,
            "Accrual computed"
        );

        self.store
            .append(MeasurementTable::Cost, accrual.cost, &self.clock.timestamp())
            .await
            .map_err(at("save cost"))?;
        self.store
            .append(
                MeasurementTable::Consumption,
                accrual.consumption,
                &self.clock.timestamp(),
            )
            .await
            .map_err(at("save consumption"))?;

        Ok(accrual)
    }

    /// Start the timer task. The first cycle runs one period after start.
    pub fn spawn(self) -> JoinHandle<()> {
        // ---
        info!("Accrual job starting, period {:?}", self.period);
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.run_cycle().await {
                    Ok(accrual) => info!(
                        "Accrual cycle stored: lamps_on={} consumption={} cost={}",
                        accrual.lamps_on, accrual.consumption, accrual.cost
                    ),
                    Err(e) => error!(step = e.step, "Accrual cycle skipped: {}", e),
                }
            }
        })
    }
}

/// Stored lamps-on values are counts; anything negative counts as none.
fn lamps_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_accrue_zero_lamps() {
        // ---
        let a = accrue(0);
        assert_eq!(a.consumption, 0.0);
        assert_eq!(a.cost, 0.0);
    }

    #[test]
    fn test_accrue_exempts_only_index_one() {
        // ---
        // n=1: only index 0 exists, so it is charged
        assert!(approx_eq(accrue(1).cost, 1.0 + 0.6 * 2.0));
        // n=2: index 1 exempt
        assert!(approx_eq(accrue(2).cost, 2.0 + 0.6 * 2.0));
        assert!(approx_eq(accrue(5).cost, 5.0 + 0.6 * 8.0));
        assert!(approx_eq(accrue(10).cost, 10.0 + 0.6 * 18.0));
    }

    #[test]
    fn test_accrue_matches_closed_form_from_two_lamps() {
        // ---
        for n in 2..=10u32 {
            let expected = f64::from(n) + 0.6 * 2.0 * f64::from(n - 1);
            assert!(approx_eq(accrue(n).cost, expected), "n={n}");
            assert_eq!(accrue(n).consumption, f64::from(n));
        }
    }

    #[test]
    fn test_lamps_count_clamps_bad_values() {
        // ---
        assert_eq!(lamps_count(3.0), 3);
        assert_eq!(lamps_count(-2.0), 0);
        assert_eq!(lamps_count(f64::NAN), 0);
    }

    fn job(store: &Store) -> (AccrualJob, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 10, 14, 12, 0, 0).unwrap(),
        ));
        let job = AccrualJob::new(store.clone(), clock.clone(), Duration::from_secs(60));
        (job, clock)
    }

    #[tokio::test]
    async fn test_cycle_with_three_lamps() {
        // ---
        let store = Store::in_memory().await.unwrap();
        store
            .append(MeasurementTable::LampsOn, 3.0, "2024-10-14T11:59:00.000Z")
            .await
            .unwrap();

        let (job, _) = job(&store);
        let accrual = job.run_cycle().await.unwrap();
        assert!(approx_eq(accrual.cost, 5.4));

        let costs = store.list(MeasurementTable::Cost, crate::store::Order::NewestFirst).await.unwrap();
        assert_eq!(costs.len(), 1);
        assert!(approx_eq(costs[0].value, 5.4));
        assert_eq!(costs[0].timestamp, "2024-10-14T12:00:00.000Z");

        let consumption = store
            .list(MeasurementTable::Consumption, crate::store::Order::NewestFirst)
            .await
            .unwrap();
        assert_eq!(consumption.len(), 1);
        assert_eq!(consumption[0].value, 3.0);
    }

    #[tokio::test]
    async fn test_cycle_without_lamps_data_records_zero() {
        // ---
        let store = Store::in_memory().await.unwrap();
        let (job, _) = job(&store);

        let accrual = job.run_cycle().await.unwrap();
        assert_eq!(accrual.lamps_on, 0);
        assert_eq!(store.sum(MeasurementTable::Cost).await.unwrap(), 0.0);
        assert_eq!(store.list(MeasurementTable::Cost, crate::store::Order::NewestFirst).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_uses_newest_timestamp() {
        // ---
        let store = Store::in_memory().await.unwrap();
        store
            .append(MeasurementTable::LampsOn, 2.0, "2024-10-14T11:59:00.000Z")
            .await
            .unwrap();
        store
            .append(MeasurementTable::LampsOn, 9.0, "2024-10-14T11:00:00.000Z")
            .await
            .unwrap();

        let (job, _) = job(&store);
        assert_eq!(job.run_cycle().await.unwrap().lamps_on, 2);
    }

    #[tokio::test]
    async fn test_cycles_accumulate() {
        // ---
        let store = Store::in_memory().await.unwrap();
        store
            .append(MeasurementTable::LampsOn, 3.0, "2024-10-14T11:59:00.000Z")
            .await
            .unwrap();

        let (job, clock) = job(&store);
        job.run_cycle().await.unwrap();
        clock.advance(chrono::Duration::seconds(60));
        job.run_cycle().await.unwrap();

        assert_eq!(store.sum(MeasurementTable::Consumption).await.unwrap(), 6.0);
        assert!(approx_eq(store.sum(MeasurementTable::Cost).await.unwrap(), 10.8));
    }

    #[tokio::test]
    async fn test_failed_cycle_leaves_next_cycle_unaffected() {
        // ---
        let store = Store::in_memory().await.unwrap();
        sqlx::query("DROP TABLE luzesLigadas").execute(store.pool()).await.unwrap();

        let (job, _) = job(&store);
        let err = job.run_cycle().await.unwrap_err();
        assert_eq!(err.step, "read lamps-on");
        assert_eq!(store.sum(MeasurementTable::Cost).await.unwrap(), 0.0);

        crate::schema::create_schema(store.pool()).await.unwrap();
        assert_eq!(job.run_cycle().await.unwrap().lamps_on, 0);
    }

    #[tokio::test]
    async fn test_failed_insert_names_its_table() {
        // ---
        let store = Store::in_memory().await.unwrap();
        store
            .append(MeasurementTable::LampsOn, 3.0, "2024-10-14T11:59:00.000Z")
            .await
            .unwrap();
        sqlx::query("DROP TABLE consumo").execute(store.pool()).await.unwrap();

        let (job, _) = job(&store);
        let err = job.run_cycle().await.unwrap_err();
        assert_eq!(err.step, "save consumption");
        assert!(err.to_string().starts_with("failed to save consumption: "));
    }

    #[tokio::test]
    async fn test_spawned_job_fires_on_its_timer() {
        // ---
        let store = Store::in_memory().await.unwrap();
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 14, 12, 0, 0).unwrap()));
        let handle = AccrualJob::new(store.clone(), clock, Duration::from_millis(40)).spawn();

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        let cycles = store
            .list(MeasurementTable::Consumption, crate::store::Order::OldestFirst)
            .await
            .unwrap()
            .len();
        assert!(cycles >= 1, "expected at least one cycle, got {cycles}");
    }
}
