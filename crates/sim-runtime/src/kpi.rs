//! Per-tick KPI history with running aggregates.

use serde::{Deserialize, Serialize};
use sim_core::KpiSample;

/// Running mean of a series and the latest value's distance from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub mean: f64,
    /// `None` until at least two samples exist.
    pub delta: Option<f64>,
}

fn trend(series: &[f64]) -> Option<Trend> {
    let last = *series.last()?;
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    let delta = (series.len() > 1).then(|| last - mean);
    Some(Trend { mean, delta })
}

fn running_sum(series: &[i64]) -> Vec<i64> {
    series
        .iter()
        .scan(0i64, |acc, v| {
            *acc = acc.saturating_add(*v);
            Some(*acc)
        })
        .collect()
}

/// Four index-aligned sequences, one entry per recorded tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiRecorder {
    inventory_turnover: Vec<f64>,
    fill_rate: Vec<f64>,
    inventory_value: Vec<i64>,
    revenue: Vec<i64>,
}

impl KpiRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tick's sample to all four series.
    pub fn record(&mut self, sample: KpiSample) {
        self.inventory_turnover.push(sample.inventory_turnover);
        self.fill_rate.push(sample.fill_rate);
        self.inventory_value.push(sample.inventory_value);
        self.revenue.push(sample.revenue);
    }

    /// Drop every recorded sample.
    pub fn clear(&mut self) {
        self.inventory_turnover.clear();
        self.fill_rate.clear();
        self.inventory_value.clear();
        self.revenue.clear();
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> usize {
        self.revenue.len()
    }

    /// `true` before the first tick.
    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
    }

    /// Sample recorded at `index`, in tick order.
    pub fn sample(&self, index: usize) -> Option<KpiSample> {
        Some(KpiSample {
            inventory_turnover: *self.inventory_turnover.get(index)?,
            fill_rate: *self.fill_rate.get(index)?,
            inventory_value: *self.inventory_value.get(index)?,
            revenue: *self.revenue.get(index)?,
        })
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<KpiSample> {
        self.len().checked_sub(1).and_then(|i| self.sample(i))
    }

    /// Turnover per tick.
    pub fn inventory_turnover(&self) -> &[f64] {
        &self.inventory_turnover
    }

    /// Fill rate per tick.
    pub fn fill_rate(&self) -> &[f64] {
        &self.fill_rate
    }

    /// Pre-settlement inventory value per tick.
    pub fn inventory_value(&self) -> &[i64] {
        &self.inventory_value
    }

    /// Revenue per tick.
    pub fn revenue(&self) -> &[i64] {
        &self.revenue
    }

    /// Mean turnover and the latest value's delta from it.
    pub fn turnover_trend(&self) -> Option<Trend> {
        trend(&self.inventory_turnover)
    }

    /// Mean fill rate and the latest value's delta from it.
    pub fn fill_rate_trend(&self) -> Option<Trend> {
        trend(&self.fill_rate)
    }

    /// Revenue summed over all ticks.
    pub fn total_revenue(&self) -> i64 {
        self.revenue.iter().fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    /// Inventory value summed over all ticks.
    pub fn total_inventory_value(&self) -> i64 {
        self.inventory_value
            .iter()
            .fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    /// Running revenue total after each tick.
    pub fn cumulative_revenue(&self) -> Vec<i64> {
        running_sum(&self.revenue)
    }

    /// Running inventory value total after each tick.
    pub fn cumulative_inventory_value(&self) -> Vec<i64> {
        running_sum(&self.inventory_value)
    }
}
