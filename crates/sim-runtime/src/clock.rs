//! The weekly tick: one [`SimulationClock`] owns a whole session.

use crate::kpi::KpiRecorder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sim_core::{
    apply_decisions, validate_config, DecisionError, DecisionReceipt, Decisions, EventRecord,
    HistorySnapshot, KpiSample, SimConfig, ValidationError, WorldState,
};
use sim_econ::{
    apply_disruption, kpi_sample, settle_sales, DemandModel, DisruptionEffect, DisruptionKind,
    RandomEventModel, Settlement,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Lifecycle of a session. `reset` returns to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
}

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Everything that happened in one advanced week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Week number after advancing.
    pub week: u32,
    pub disruption: Option<DisruptionKind>,
    pub effect: Option<DisruptionEffect>,
    pub event: Option<EventRecord>,
    pub settlement: Settlement,
    pub kpi: KpiSample,
    /// `None` when the tick is carried by a [`DecisionsRejected`] error.
    pub decisions: Option<DecisionReceipt>,
}

/// The week advanced and committed, but the decision batch did not apply.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("decisions rejected in week {week}: {source}")]
pub struct DecisionsRejected {
    pub week: u32,
    /// The committed tick, with `decisions` left `None`.
    pub tick: TickReport,
    pub source: DecisionError,
}

/// Time series for charting, aligned on the history's week axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Week of each history snapshot.
    pub weeks: Vec<u32>,
    /// Demand and stock levels at the start of each week.
    pub demand: Vec<u64>,
    pub raw_materials: Vec<u64>,
    pub api: Vec<u64>,
    pub finished_products: Vec<u64>,
    /// Revenue booked by the tick that ended in each week; 0 for the first.
    pub revenue: Vec<i64>,
    /// Inventory value observed by the tick that ended in each week; 0 for the first.
    pub inventory_cost: Vec<i64>,
}

fn shifted(series: &[i64], len: usize) -> Vec<i64> {
    let mut out = Vec::with_capacity(len);
    out.push(0);
    out.extend_from_slice(series);
    out.resize(len, 0);
    out
}

/// Orchestrates the weekly state transition of one session.
///
/// Generic over the random source so tests can inject a stub; the default
/// is a seeded [`ChaCha8Rng`].
#[derive(Debug)]
pub struct SimulationClock<R = ChaCha8Rng> {
    cfg: SimConfig,
    state: WorldState,
    phase: Phase,
    history: Vec<HistorySnapshot>,
    events: Vec<EventRecord>,
    kpis: KpiRecorder,
    event_model: RandomEventModel,
    demand_model: DemandModel,
    rng: R,
}

impl SimulationClock<ChaCha8Rng> {
    /// New session seeded from `cfg.rng_seed`.
    pub fn new(cfg: SimConfig) -> Result<Self, ClockError> {
        let rng = ChaCha8Rng::seed_from_u64(cfg.rng_seed);
        Self::with_rng(cfg, rng)
    }
}

impl<R: Rng> SimulationClock<R> {
    /// New session drawing from `rng`; `cfg` is validated first.
    pub fn with_rng(cfg: SimConfig, rng: R) -> Result<Self, ClockError> {
        validate_config(&cfg)?;
        Ok(Self {
            state: WorldState::initial(&cfg),
            phase: Phase::Idle,
            history: Vec::new(),
            events: Vec::new(),
            kpis: KpiRecorder::new(),
            event_model: RandomEventModel::from_config(&cfg),
            demand_model: DemandModel::from_config(&cfg),
            rng,
            cfg,
        })
    }

    /// Configuration the session was built with.
    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Live world state.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// `Running` once the first week has advanced.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// One snapshot per advanced week, taken before the tick.
    pub fn history(&self) -> &[HistorySnapshot] {
        &self.history
    }

    /// Full disruption log, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// The last `n` events, oldest first.
    pub fn events_tail(&self, n: usize) -> &[EventRecord] {
        let start = self.events.len().saturating_sub(n);
        &self.events[start..]
    }

    /// Events inside the configured display window.
    pub fn recent_events(&self) -> &[EventRecord] {
        self.events_tail(self.cfg.event_log_window)
    }

    /// Per-tick KPI series.
    pub fn kpis(&self) -> &KpiRecorder {
        &self.kpis
    }

    /// Funds gained or lost since the session started.
    pub fn profit(&self) -> i64 {
        self.state
            .funds
            .balance()
            .saturating_sub(self.cfg.initial.funds)
    }

    /// Advance one week, then apply `decisions`.
    ///
    /// The week always commits. When the batch is rejected the error carries
    /// the committed tick and the ledgers hold the post-settlement state.
    pub fn advance_week(&mut self, decisions: &Decisions) -> Result<TickReport, DecisionsRejected> {
        self.history.push(self.state.snapshot());
        self.state.week = self.state.week.saturating_add(1);
        self.phase = Phase::Running;
        let week = self.state.week;

        let disruption = self.event_model.maybe_trigger(&mut self.rng);
        let mut effect = None;
        let mut event = None;
        if let Some(kind) = disruption {
            effect = Some(apply_disruption(kind, &mut self.state));
            let record = EventRecord {
                week,
                label: kind.label().to_string(),
                description: kind.description().to_string(),
            };
            info!(week, event = %record, "supply chain disruption");
            self.events.push(record.clone());
            event = Some(record);
        }

        self.state.demand = self
            .demand_model
            .advance(self.state.demand, disruption, &mut self.rng);

        let inventory_value = self.state.inventory.valuation(&self.cfg.prices);
        let settlement = settle_sales(&mut self.state, self.cfg.prices.unit_price);
        let kpi = kpi_sample(&settlement, inventory_value);
        self.kpis.record(kpi);
        debug!(
            week,
            demand = settlement.demand,
            sold = settlement.sold,
            revenue = settlement.revenue,
            funds = self.state.funds.balance(),
            "week settled"
        );

        let mut tick = TickReport {
            week,
            disruption,
            effect,
            event,
            settlement,
            kpi,
            decisions: None,
        };
        match self.execute_decisions(decisions) {
            Ok(receipt) => {
                tick.decisions = Some(receipt);
                Ok(tick)
            }
            Err(source) => Err(DecisionsRejected { week, tick, source }),
        }
    }

    /// Apply a decision batch to the current state without advancing time.
    pub fn execute_decisions(
        &mut self,
        decisions: &Decisions,
    ) -> Result<DecisionReceipt, DecisionError> {
        apply_decisions(
            &mut self.state.inventory,
            &mut self.state.funds,
            decisions,
            &self.cfg,
        )
        .map_err(|e| {
            warn!(week = self.state.week, error = %e, "decision batch rejected");
            e
        })
    }

    /// Chart data, available once history holds at least two weeks.
    pub fn chart_series(&self) -> Option<ChartSeries> {
        if self.history.len() < 2 {
            return None;
        }
        let h = &self.history;
        let len = h.len();
        Some(ChartSeries {
            weeks: h.iter().map(|s| s.week).collect(),
            demand: h.iter().map(|s| s.demand).collect(),
            raw_materials: h.iter().map(|s| s.inventory.raw_materials).collect(),
            api: h.iter().map(|s| s.inventory.api).collect(),
            finished_products: h.iter().map(|s| s.inventory.finished_products).collect(),
            revenue: shifted(self.kpis.revenue(), len),
            inventory_cost: shifted(self.kpis.inventory_value(), len),
        })
    }
}

impl<R: Rng + SeedableRng> SimulationClock<R> {
    /// Discard all accumulated state and reseed the random source.
    pub fn reset(&mut self) {
        self.state = WorldState::initial(&self.cfg);
        self.phase = Phase::Idle;
        self.history.clear();
        self.events.clear();
        self.kpis.clear();
        self.rng = R::seed_from_u64(self.cfg.rng_seed);
        info!(seed = self.cfg.rng_seed, "simulation reset");
    }
}
