#![deny(warnings)]

//! Core domain models and invariants for the pharma supply chain simulation.
//!
//! This crate defines the serializable world state, the two ledgers
//! (inventory and funds), decision batches and the configuration, with
//! validation helpers that guarantee the basic invariants:
//! - inventory quantities never drop below zero
//! - purchases never drive funds negative
//! - a decision batch is applied fully or not at all

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The three goods of the fixed supply chain topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Good {
    /// Purchased inputs.
    RawMaterials,
    /// Active pharmaceutical ingredient, produced from raw materials.
    Api,
    /// Sellable product, produced from API.
    FinishedProducts,
}

impl Good {
    /// All goods in supply chain order.
    pub const ALL: [Good; 3] = [Good::RawMaterials, Good::Api, Good::FinishedProducts];

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Good::RawMaterials => "raw_materials",
            Good::Api => "api",
            Good::FinishedProducts => "finished_products",
        }
    }
}

impl fmt::Display for Good {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiply a quantity by an exact decimal rate and truncate toward zero.
///
/// Saturates at `u64::MAX` instead of overflowing.
pub fn scale_units(units: u64, rate: Decimal) -> u64 {
    let Some(scaled) = Decimal::from(units).checked_mul(rate) else {
        return if rate.is_sign_negative() { 0 } else { u64::MAX };
    };
    let scaled = scaled.trunc();
    if scaled.is_sign_negative() {
        return 0;
    }
    scaled.to_u64().unwrap_or(u64::MAX)
}

/// Quantities held for each good. Unsigned by construction; every decrement
/// is either checked or clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLedger {
    /// Purchased raw material units.
    pub raw_materials: u64,
    /// API units awaiting formulation.
    pub api: u64,
    /// Units available for sale.
    pub finished_products: u64,
}

impl InventoryLedger {
    /// Ledger holding the given quantities.
    pub fn new(raw_materials: u64, api: u64, finished_products: u64) -> Self {
        Self {
            raw_materials,
            api,
            finished_products,
        }
    }

    /// Current quantity of `good`.
    pub fn get(&self, good: Good) -> u64 {
        match good {
            Good::RawMaterials => self.raw_materials,
            Good::Api => self.api,
            Good::FinishedProducts => self.finished_products,
        }
    }

    fn slot_mut(&mut self, good: Good) -> &mut u64 {
        match good {
            Good::RawMaterials => &mut self.raw_materials,
            Good::Api => &mut self.api,
            Good::FinishedProducts => &mut self.finished_products,
        }
    }

    /// Add units of a good, saturating.
    pub fn add(&mut self, good: Good, amount: u64) {
        let slot = self.slot_mut(good);
        *slot = slot.saturating_add(amount);
    }

    /// Remove up to `amount` units and return how many were actually removed.
    pub fn remove_up_to(&mut self, good: Good, amount: u64) -> u64 {
        let slot = self.slot_mut(good);
        let removed = amount.min(*slot);
        *slot -= removed;
        removed
    }

    /// Replace the quantity of `good` with `trunc(quantity * rate)`.
    ///
    /// Returns the number of units lost (zero when `rate >= 1`).
    pub fn scale(&mut self, good: Good, rate: Decimal) -> u64 {
        let slot = self.slot_mut(good);
        let before = *slot;
        *slot = scale_units(before, rate);
        before.saturating_sub(*slot)
    }

    /// Transform `amount` units of `from` into `floor(amount * efficiency)`
    /// units of `to`. Rejected without mutation when stock is insufficient.
    ///
    /// Returns the number of units produced.
    pub fn convert(
        &mut self,
        from: Good,
        to: Good,
        amount: u64,
        efficiency: Decimal,
    ) -> Result<u64, InvalidDecision> {
        let available = self.get(from);
        if amount > available {
            return Err(InvalidDecision::ExceedsStock {
                good: from,
                requested: amount,
                available,
            });
        }
        *self.slot_mut(from) -= amount;
        let produced = scale_units(amount, efficiency);
        self.add(to, produced);
        Ok(produced)
    }

    /// Book value of the inventory at the given per-unit prices.
    pub fn valuation(&self, prices: &PriceList) -> i64 {
        let value = |units: u64, price: i64| -> i64 {
            i64::try_from(units)
                .unwrap_or(i64::MAX)
                .saturating_mul(price)
        };
        value(self.raw_materials, prices.raw_material_cost)
            .saturating_add(value(self.api, prices.api_value))
            .saturating_add(value(self.finished_products, prices.finished_value))
    }
}

/// Available funds in currency units.
///
/// Purchases go through [`FinancialLedger::try_debit`], which refuses to go
/// below zero. External shocks use [`FinancialLedger::debit`], which has no
/// floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialLedger(i64);

impl FinancialLedger {
    /// Ledger opened with `funds`.
    pub fn new(funds: i64) -> Self {
        Self(funds)
    }

    /// Current balance; negative only after an external shock.
    pub fn balance(&self) -> i64 {
        self.0
    }

    /// Add revenue, saturating.
    pub fn credit(&mut self, amount: i64) {
        self.0 = self.0.saturating_add(amount);
    }

    /// Unconditional debit; may leave the balance negative.
    pub fn debit(&mut self, amount: i64) {
        self.0 = self.0.saturating_sub(amount);
    }

    /// Debit only if `cost` is covered by the current balance.
    pub fn try_debit(&mut self, cost: i64) -> Result<(), DecisionError> {
        if cost > self.0 {
            return Err(DecisionError::InsufficientFunds {
                cost,
                available: self.0,
            });
        }
        self.0 -= cost;
        Ok(())
    }
}

/// Mutable world state for one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// Week counter, starting at 1.
    pub week: u32,
    /// Available funds.
    pub funds: FinancialLedger,
    /// Stock of each good.
    pub inventory: InventoryLedger,
    /// Market demand for the current period, in units.
    pub demand: u64,
}

impl WorldState {
    /// Fresh state from the configured starting values.
    pub fn initial(cfg: &SimConfig) -> Self {
        let init = &cfg.initial;
        Self {
            week: 1,
            funds: FinancialLedger::new(init.funds),
            inventory: InventoryLedger::new(init.raw_materials, init.api, init.finished_products),
            demand: init.demand,
        }
    }

    /// Immutable copy for the history log.
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            week: self.week,
            funds: self.funds.balance(),
            inventory: self.inventory,
            demand: self.demand,
        }
    }
}

/// State recorded at the start of a tick, before its effects apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Week the tick started from.
    pub week: u32,
    /// Balance going into the tick.
    pub funds: i64,
    /// Copy of the inventory going into the tick.
    pub inventory: InventoryLedger,
    /// Demand going into the tick.
    pub demand: u64,
}

/// One entry of the append-only disruption log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Week in which the disruption hit.
    pub week: u32,
    /// Short name, e.g. "Cold Chain Failure".
    pub label: String,
    /// Human-readable effect.
    pub description: String,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Week {}: {} - {}", self.week, self.label, self.description)
    }
}

/// Performance indicators observed for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiSample {
    /// Units sold relative to finished stock before settlement.
    pub inventory_turnover: f64,
    /// Share of demand served, in [0, 1].
    pub fill_rate: f64,
    /// Book value of pre-settlement inventory.
    pub inventory_value: i64,
    /// Sales revenue booked in the tick.
    pub revenue: i64,
}

/// Production and purchasing decisions for one tick, as submitted by a
/// front end. Signed so that out-of-range input is reported rather than
/// silently unrepresentable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decisions {
    /// Raw material units to convert into API.
    pub raw_to_api: i64,
    /// API units to convert into finished products.
    pub api_to_finished: i64,
    /// Raw material units to purchase.
    pub raw_materials_to_buy: i64,
}

/// What an accepted decision batch did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionReceipt {
    /// API units yielded by the raw material conversion.
    pub api_produced: u64,
    /// Finished units yielded by the API conversion.
    pub finished_produced: u64,
    /// Raw material units added by the purchase.
    pub raw_materials_bought: u64,
    /// Amount debited for the purchase.
    pub purchase_cost: i64,
}

/// Reasons a decision batch is rejected before any mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidDecision {
    /// An amount was below zero.
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: i64 },
    /// A conversion asked for more stock than is held.
    #[error("cannot use {requested} units of {good}: only {available} available")]
    ExceedsStock {
        good: Good,
        requested: u64,
        available: u64,
    },
    /// A purchase above the per-week ceiling.
    #[error("{field} of {value} exceeds the limit of {limit}")]
    AboveLimit {
        field: &'static str,
        value: i64,
        limit: i64,
    },
    /// The purchase cost does not fit in `i64`.
    #[error("{field} overflows currency arithmetic")]
    Overflow { field: &'static str },
}

/// Failure of a decision batch. The batch is never partially applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// Purchase cost exceeds the available balance.
    #[error("insufficient funds: purchase costs {cost} but only {available} available")]
    InsufficientFunds { cost: i64, available: i64 },
    /// Input rejected before any mutation.
    #[error("invalid decision: {0}")]
    Invalid(#[from] InvalidDecision),
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, InvalidDecision> {
    u64::try_from(value).map_err(|_| InvalidDecision::Negative { field, value })
}

/// Apply a decision batch to the ledgers: raw→API conversion, then
/// API→finished conversion, then the raw material purchase.
///
/// Works on copies and commits only when every step succeeds.
pub fn apply_decisions(
    inventory: &mut InventoryLedger,
    funds: &mut FinancialLedger,
    decisions: &Decisions,
    cfg: &SimConfig,
) -> Result<DecisionReceipt, DecisionError> {
    let raw_to_api = non_negative("raw_to_api", decisions.raw_to_api)?;
    let api_to_finished = non_negative("api_to_finished", decisions.api_to_finished)?;
    let to_buy = non_negative("raw_materials_to_buy", decisions.raw_materials_to_buy)?;
    if decisions.raw_materials_to_buy > cfg.max_purchase_per_week {
        return Err(InvalidDecision::AboveLimit {
            field: "raw_materials_to_buy",
            value: decisions.raw_materials_to_buy,
            limit: cfg.max_purchase_per_week,
        }
        .into());
    }
    let cost = decisions
        .raw_materials_to_buy
        .checked_mul(cfg.prices.raw_material_cost)
        .ok_or(InvalidDecision::Overflow {
            field: "raw_materials_to_buy",
        })?;

    let mut staged_inventory = *inventory;
    let mut staged_funds = *funds;
    let api_produced = staged_inventory.convert(
        Good::RawMaterials,
        Good::Api,
        raw_to_api,
        cfg.conversion.raw_to_api,
    )?;
    let finished_produced = staged_inventory.convert(
        Good::Api,
        Good::FinishedProducts,
        api_to_finished,
        cfg.conversion.api_to_finished,
    )?;
    staged_funds.try_debit(cost)?;
    staged_inventory.add(Good::RawMaterials, to_buy);

    *inventory = staged_inventory;
    *funds = staged_funds;
    Ok(DecisionReceipt {
        api_produced,
        finished_produced,
        raw_materials_bought: to_buy,
        purchase_cost: cost,
    })
}

/// Starting values of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialState {
    /// Opening balance (>= 0).
    pub funds: i64,
    /// Opening raw material stock.
    pub raw_materials: u64,
    /// Opening API stock.
    pub api: u64,
    /// Opening finished product stock.
    pub finished_products: u64,
    /// Demand in the first week.
    pub demand: u64,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            funds: 1_000_000,
            raw_materials: 5_000,
            api: 3_000,
            finished_products: 2_000,
            demand: 500,
        }
    }
}

/// Conversion yields between supply chain stages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRates {
    /// API yield per raw material unit, in (0, 1].
    pub raw_to_api: Decimal,
    /// Finished yield per API unit, in (0, 1].
    pub api_to_finished: Decimal,
}

impl Default for ConversionRates {
    fn default() -> Self {
        Self {
            raw_to_api: Decimal::new(80, 2),
            api_to_finished: Decimal::new(90, 2),
        }
    }
}

/// Per-unit prices. Raw materials are bought at `raw_material_cost`;
/// API and finished stock are valued at `api_value` / `finished_value`
/// and finished products sell at `unit_price`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceList {
    /// Purchase cost and book value of a raw material unit.
    pub raw_material_cost: i64,
    /// Book value of an API unit.
    pub api_value: i64,
    /// Book value of a finished unit.
    pub finished_value: i64,
    /// Sale price of a finished unit.
    pub unit_price: i64,
}

impl Default for PriceList {
    fn default() -> Self {
        Self {
            raw_material_cost: 10,
            api_value: 50,
            finished_value: 200,
            unit_price: 300,
        }
    }
}

/// Simulation configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
    /// Starting values of a session.
    pub initial: InitialState,
    /// Chance of a disruption per week, in [0, 1].
    pub event_probability: f64,
    /// Half-width of the uniform demand drift factor around 1.0, in [0, 1).
    pub demand_variation: f64,
    /// Demand multiplier applied by a demand spike.
    pub demand_spike: Decimal,
    /// Stage yields.
    pub conversion: ConversionRates,
    /// Unit costs, book values and sale price.
    pub prices: PriceList,
    /// Upper bound on raw materials bought in a single batch.
    pub max_purchase_per_week: i64,
    /// Number of recent events shown by front ends.
    pub event_log_window: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            initial: InitialState::default(),
            event_probability: 0.30,
            demand_variation: 0.10,
            demand_spike: Decimal::new(130, 2),
            conversion: ConversionRates::default(),
            prices: PriceList::default(),
            max_purchase_per_week: 5_000,
            event_log_window: 5,
        }
    }
}

/// Validation errors for configuration invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid: {0}")]
    NegativeMoney(&'static str),
    /// Conversion yield must be within (0, 1].
    #[error("conversion rate {0} must be within (0, 1]")]
    InvalidRate(&'static str),
    /// Probability must be within [0, 1].
    #[error("event probability {0} must be within [0, 1]")]
    InvalidProbability(f64),
    /// Demand variation must be within [0, 1).
    #[error("demand variation {0} must be within [0, 1)")]
    InvalidVariation(f64),
    /// Demand spike must not shrink demand.
    #[error("demand spike multiplier must be >= 1")]
    InvalidSpike,
    /// Event window must show at least one event.
    #[error("event log window must be > 0")]
    EmptyWindow,
}

fn validate_rate(name: &'static str, rate: Decimal) -> Result<(), ValidationError> {
    if rate <= Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::InvalidRate(name));
    }
    Ok(())
}

/// Validate the price list.
pub fn validate_prices(p: &PriceList) -> Result<(), ValidationError> {
    let fields = [
        ("raw_material_cost", p.raw_material_cost),
        ("api_value", p.api_value),
        ("finished_value", p.finished_value),
        ("unit_price", p.unit_price),
    ];
    for (name, value) in fields {
        if value < 0 {
            return Err(ValidationError::NegativeMoney(name));
        }
    }
    Ok(())
}

/// Validate a full configuration.
pub fn validate_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if cfg.initial.funds < 0 {
        return Err(ValidationError::NegativeMoney("initial.funds"));
    }
    validate_prices(&cfg.prices)?;
    validate_rate("raw_to_api", cfg.conversion.raw_to_api)?;
    validate_rate("api_to_finished", cfg.conversion.api_to_finished)?;
    if !(0.0..=1.0).contains(&cfg.event_probability) {
        return Err(ValidationError::InvalidProbability(cfg.event_probability));
    }
    if !(0.0..1.0).contains(&cfg.demand_variation) {
        return Err(ValidationError::InvalidVariation(cfg.demand_variation));
    }
    if cfg.demand_spike < Decimal::ONE {
        return Err(ValidationError::InvalidSpike);
    }
    if cfg.max_purchase_per_week < 0 {
        return Err(ValidationError::NegativeMoney("max_purchase_per_week"));
    }
    if cfg.event_log_window == 0 {
        return Err(ValidationError::EmptyWindow);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decisions(raw_to_api: i64, api_to_finished: i64, buy: i64) -> Decisions {
        Decisions {
            raw_to_api,
            api_to_finished,
            raw_materials_to_buy: buy,
        }
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&SimConfig::default()).unwrap();
        let s = WorldState::initial(&SimConfig::default());
        assert_eq!(s.week, 1);
        assert_eq!(s.funds.balance(), 1_000_000);
        assert_eq!(s.inventory, InventoryLedger::new(5000, 3000, 2000));
        assert_eq!(s.demand, 500);
    }

    #[test]
    fn convert_floors_output() {
        let mut inv = InventoryLedger::new(5000, 3000, 2000);
        let made = inv
            .convert(Good::RawMaterials, Good::Api, 100, Decimal::new(8, 1))
            .unwrap();
        assert_eq!(made, 80);
        assert_eq!(inv.raw_materials, 4900);
        assert_eq!(inv.api, 3080);

        let made = inv
            .convert(Good::Api, Good::FinishedProducts, 7, Decimal::new(9, 1))
            .unwrap();
        assert_eq!(made, 6);
    }

    #[test]
    fn convert_rejects_excess_without_mutation() {
        let mut inv = InventoryLedger::new(10, 0, 0);
        let err = inv
            .convert(Good::RawMaterials, Good::Api, 11, Decimal::new(8, 1))
            .unwrap_err();
        assert_eq!(
            err,
            InvalidDecision::ExceedsStock {
                good: Good::RawMaterials,
                requested: 11,
                available: 10
            }
        );
        assert_eq!(inv, InventoryLedger::new(10, 0, 0));
    }

    #[test]
    fn scale_and_clamped_removal() {
        let mut inv = InventoryLedger::new(0, 0, 2000);
        assert_eq!(inv.scale(Good::FinishedProducts, Decimal::new(90, 2)), 200);
        assert_eq!(inv.finished_products, 1800);
        assert_eq!(inv.remove_up_to(Good::FinishedProducts, 5000), 1800);
        assert_eq!(inv.finished_products, 0);
    }

    #[test]
    fn scaling_saturates_on_decimal_overflow() {
        assert_eq!(scale_units(u64::MAX, Decimal::from(10u64.pow(12))), u64::MAX);
        assert_eq!(scale_units(100_000_000_000_000_000, Decimal::from(10u64.pow(12))), u64::MAX);
        assert_eq!(scale_units(u64::MAX, Decimal::ONE), u64::MAX);
        assert_eq!(scale_units(0, Decimal::MAX), 0);
    }

    #[test]
    fn valuation_uses_price_list() {
        let inv = InventoryLedger::new(5000, 3000, 2000);
        assert_eq!(inv.valuation(&PriceList::default()), 50_000 + 150_000 + 400_000);
    }

    #[test]
    fn unaffordable_purchase_rejects_whole_batch() {
        let cfg = SimConfig::default();
        let mut inv = InventoryLedger::new(5000, 3000, 2000);
        let mut funds = FinancialLedger::new(500);
        let err = apply_decisions(&mut inv, &mut funds, &decisions(100, 50, 100), &cfg).unwrap_err();
        assert_eq!(
            err,
            DecisionError::InsufficientFunds {
                cost: 1000,
                available: 500
            }
        );
        assert_eq!(inv, InventoryLedger::new(5000, 3000, 2000));
        assert_eq!(funds.balance(), 500);
    }

    #[test]
    fn accepted_batch_applies_in_order() {
        let cfg = SimConfig::default();
        let mut inv = InventoryLedger::new(100, 0, 0);
        let mut funds = FinancialLedger::new(1000);
        // second conversion consumes API made by the first
        let receipt = apply_decisions(&mut inv, &mut funds, &decisions(100, 80, 100), &cfg).unwrap();
        assert_eq!(receipt.api_produced, 80);
        assert_eq!(receipt.finished_produced, 72);
        assert_eq!(receipt.purchase_cost, 1000);
        assert_eq!(inv, InventoryLedger::new(100, 0, 72));
        assert_eq!(funds.balance(), 0);
    }

    #[test]
    fn invalid_inputs_are_rejected_before_mutation() {
        let cfg = SimConfig::default();
        let mut inv = InventoryLedger::new(100, 10, 0);
        let mut funds = FinancialLedger::new(1_000_000);
        let cases = [
            decisions(-1, 0, 0),
            decisions(0, -5, 0),
            decisions(0, 0, -3),
            decisions(101, 0, 0),
            decisions(0, 11, 0),
            decisions(0, 0, 5001),
        ];
        for d in cases {
            let err = apply_decisions(&mut inv, &mut funds, &d, &cfg).unwrap_err();
            assert!(matches!(err, DecisionError::Invalid(_)), "{d:?} -> {err}");
            assert_eq!(inv, InventoryLedger::new(100, 10, 0));
            assert_eq!(funds.balance(), 1_000_000);
        }
    }

    #[test]
    fn event_debit_has_no_floor() {
        let mut funds = FinancialLedger::new(100);
        funds.debit(250);
        assert_eq!(funds.balance(), -150);
        assert!(funds.try_debit(1).is_err());
        assert!(funds.try_debit(0).is_err());
    }

    #[test]
    fn world_snapshot_roundtrip() {
        let s = WorldState::initial(&SimConfig::default());
        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: WorldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(json.contains("\"finished_products\": 2000"));
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let mut cfg = SimConfig::default();
        cfg.event_probability = 1.5;
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::InvalidProbability(1.5))
        );
        let mut cfg = SimConfig::default();
        cfg.conversion.raw_to_api = Decimal::ZERO;
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::InvalidRate("raw_to_api"))
        );
        let mut cfg = SimConfig::default();
        cfg.prices.unit_price = -1;
        assert_eq!(
            validate_config(&cfg),
            Err(ValidationError::NegativeMoney("unit_price"))
        );
    }

    #[test]
    fn event_record_display() {
        let e = EventRecord {
            week: 3,
            label: "Demand Spike".into(),
            description: "Demand increased by 30%".into(),
        };
        assert_eq!(e.to_string(), "Week 3: Demand Spike - Demand increased by 30%");
    }

    proptest! {
        #[test]
        fn batches_never_underflow(raw in 0u64..10_000, api in 0u64..10_000, funds in 0i64..100_000,
                                   a in -10i64..12_000, b in -10i64..12_000, c in -10i64..6_000) {
            let cfg = SimConfig::default();
            let mut inv = InventoryLedger::new(raw, api, 0);
            let mut ledger = FinancialLedger::new(funds);
            let before = (inv, ledger);
            match apply_decisions(&mut inv, &mut ledger, &decisions(a, b, c), &cfg) {
                Ok(r) => {
                    prop_assert!(ledger.balance() >= 0);
                    prop_assert_eq!(inv.raw_materials, raw - a as u64 + r.raw_materials_bought);
                }
                Err(_) => prop_assert_eq!((inv, ledger), before),
            }
        }

        #[test]
        fn scaling_never_grows_below_one(units in 0u64..1_000_000, pct in 0i64..=100) {
            let out = scale_units(units, Decimal::new(pct, 2));
            prop_assert!(out <= units);
        }
    }
}
