#![deny(warnings)]

//! Session runtime for the pharma supply chain simulation.
//!
//! A [`SimulationClock`] owns one session: the world state, its history,
//! the disruption log and the KPI sequences. Front ends drive it with
//! [`SimulationClock::advance_week`] and [`SimulationClock::reset`] and read
//! [`SimSnapshot`]s back.

mod clock;
mod kpi;

pub use clock::{ChartSeries, ClockError, DecisionsRejected, Phase, SimulationClock, TickReport};
pub use kpi::{KpiRecorder, Trend};

use rand::Rng;
use serde::{Deserialize, Serialize};
use sim_core::{Decisions, EventRecord, HistorySnapshot, InventoryLedger, KpiSample};
use tracing::info;

/// Read-only view of a session for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub week: u32,
    pub funds: i64,
    /// Funds minus the initial funds.
    pub profit: i64,
    pub inventory: InventoryLedger,
    pub demand: u64,
    pub latest_kpi: Option<KpiSample>,
    pub turnover: Option<Trend>,
    pub fill_rate: Option<Trend>,
    /// Revenue summed over every recorded tick.
    pub total_revenue: i64,
    /// Tail of the event log inside the display window.
    pub recent_events: Vec<EventRecord>,
    pub history: Vec<HistorySnapshot>,
}

impl<R: Rng> SimulationClock<R> {
    /// Copy out everything a renderer needs.
    pub fn snapshot(&self) -> SimSnapshot {
        let s = self.state();
        SimSnapshot {
            week: s.week,
            funds: s.funds.balance(),
            profit: self.profit(),
            inventory: s.inventory,
            demand: s.demand,
            latest_kpi: self.kpis().latest(),
            turnover: self.kpis().turnover_trend(),
            fill_rate: self.kpis().fill_rate_trend(),
            total_revenue: self.kpis().total_revenue(),
            recent_events: self.recent_events().to_vec(),
            history: self.history().to_vec(),
        }
    }
}

/// Counters from a multi-week run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub weeks_run: u32,
    /// Weeks whose decision batch was refused.
    pub rejected_batches: u32,
    pub disruptions: u32,
}

/// Advance `weeks` times with the same decision batch.
pub fn run_weeks<R: Rng>(
    clock: &mut SimulationClock<R>,
    weeks: u32,
    decisions: &Decisions,
) -> (SimSnapshot, RunStats) {
    let mut stats = RunStats::default();
    for _ in 0..weeks {
        let tick = match clock.advance_week(decisions) {
            Ok(tick) => tick,
            Err(rejected) => {
                stats.rejected_batches += 1;
                rejected.tick
            }
        };
        if tick.disruption.is_some() {
            stats.disruptions += 1;
        }
        stats.weeks_run += 1;
    }
    info!(
        weeks = stats.weeks_run,
        rejected = stats.rejected_batches,
        disruptions = stats.disruptions,
        "run finished"
    );
    (clock.snapshot(), stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::SimConfig;

    #[test]
    fn run_counts_rejections() {
        let cfg = SimConfig {
            event_probability: 0.0,
            demand_variation: 0.0,
            ..SimConfig::default()
        };
        let mut clock = SimulationClock::new(cfg).unwrap();
        // raw stock runs out after 5 weeks of converting 1000
        let batch = Decisions {
            raw_to_api: 1000,
            ..Decisions::default()
        };
        let (snap, stats) = run_weeks(&mut clock, 8, &batch);
        assert_eq!(stats.weeks_run, 8);
        assert_eq!(stats.rejected_batches, 3);
        assert_eq!(stats.disruptions, 0);
        assert_eq!(snap.week, 9);
        assert_eq!(snap.inventory.raw_materials, 0);
        assert_eq!(snap.history.len(), 8);
    }

    #[test]
    fn snapshot_serializes() {
        let mut clock = SimulationClock::new(SimConfig::default()).unwrap();
        let (snap, _) = run_weeks(&mut clock, 3, &Decisions::default());
        let json = serde_json::to_string(&snap).unwrap();
        let back: SimSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.week, 4);
        assert_eq!(back.history.len(), 3);
        assert_eq!(back.profit, snap.funds - 1_000_000);
    }
}
