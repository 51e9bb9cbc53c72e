//! The bar loop.

use crate::config::EngineConfig;
use crate::domain::{Annotation, BandedBar, BarSeries, TradeRecord};
use crate::engine::rules::{entry_signal, exit_decision, ExitDecision};
use crate::engine::state::{OpenPosition, SimulationState};
use crate::engine::trade_extraction::extract_trades;
use crate::error::ConfigError;

/// Output of one simulation run: one annotation per input bar, plus the
/// state left after the last bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub annotations: Vec<Annotation>,
    pub final_state: SimulationState,
}

impl SimulationRun {
    /// Cumulative realized equity after the last close.
    pub fn final_equity(&self) -> f64 {
        self.final_state.ledger.cumulative_equity()
    }

    pub fn has_open_position(&self) -> bool {
        !self.final_state.is_flat()
    }

    /// Pair every bar of `series` with its annotation.
    pub fn annotated<'a>(
        &'a self,
        series: &'a BarSeries,
    ) -> impl Iterator<Item = (&'a BandedBar, &'a Annotation)> + 'a {
        series.iter().zip(self.annotations.iter())
    }

    /// Completed round trips, in order.
    pub fn trades(&self, series: &BarSeries) -> Vec<TradeRecord> {
        extract_trades(series, &self.annotations)
    }
}

/// Run the strategy over `series`.
///
/// The configuration is validated up front; after that the run cannot fail.
/// Identical input and configuration always produce identical output.
pub fn simulate(series: &BarSeries, config: &EngineConfig) -> Result<SimulationRun, ConfigError> {
    config.validate()?;

    let mut state = SimulationState::new();
    let annotations = series
        .iter()
        .enumerate()
        .map(|(index, bar)| step(&mut state, index, bar, config))
        .collect();

    tracing::info!(
        bars = series.len(),
        active_bars = state.active_bars,
        trades_opened = state.trades_opened,
        trades = state.trades_closed,
        equity = state.ledger.cumulative_equity(),
        "simulation complete"
    );
    if let Some(open) = &state.position {
        tracing::warn!(
            entry_bar = open.entry_bar,
            entry_price = open.entry_price,
            "series ended with an open position"
        );
    }

    Ok(SimulationRun {
        annotations,
        final_state: state,
    })
}

/// Advance `state` by one bar and return the annotation for it.
pub fn step(
    state: &mut SimulationState,
    index: usize,
    bar: &BandedBar,
    config: &EngineConfig,
) -> Annotation {
    let mut annotation = Annotation::default();
    let session = &config.session;

    if !session.is_active(bar.time()) {
        return annotation;
    }
    state.active_bars += 1;

    match state.position {
        None => {
            let Some(entry) = entry_signal(bar, session) else {
                return annotation;
            };
            let commission = state.ledger.open(entry.price, config.commission_rate);
            state.position = Some(OpenPosition {
                entry_bar: index,
                entry_price: entry.price,
                stop_loss: entry.stop_loss,
                take_profit: entry.take_profit,
            });
            state.trades_opened += 1;

            annotation.buy_price = Some(entry.price);
            annotation.sl_line = Some(entry.stop_loss);
            annotation.tp_line = Some(entry.take_profit);
            annotation.commission = Some(commission);
            annotation.position = Some(1);

            tracing::debug!(
                bar = index,
                date = %bar.bar.date,
                price = entry.price,
                stop_loss = entry.stop_loss,
                take_profit = entry.take_profit,
                "opened long"
            );
        }
        Some(mut open) => match exit_decision(bar, &open, session) {
            ExitDecision::Close { reason, price } => {
                let settlement = state.ledger.close(price, config.commission_rate);
                state.position = None;
                state.trades_closed += 1;

                annotation.set_exit(reason, price);
                annotation.commission = Some(settlement.commission);
                annotation.equity = Some(settlement.equity);
                annotation.position = Some(0);

                tracing::debug!(
                    bar = index,
                    date = %bar.bar.date,
                    ?reason,
                    price,
                    delta = settlement.equity_delta,
                    equity = settlement.equity,
                    "closed long"
                );
            }
            ExitDecision::Hold {
                stop_loss,
                take_profit,
            } => {
                open.stop_loss = stop_loss;
                open.take_profit = take_profit;
                state.position = Some(open);

                annotation.sl_line = Some(stop_loss);
                annotation.tp_line = Some(take_profit);
                annotation.position = Some(1);
            }
        },
    }

    annotation
}
