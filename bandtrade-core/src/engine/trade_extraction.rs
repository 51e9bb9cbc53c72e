//! Trade extraction: pairs entry and exit annotations into round trips.
//!
//! Pure post-processing after the bar loop: annotations + bars → trades.

use chrono::NaiveDateTime;

use crate::domain::{Annotation, BarSeries, TradeRecord};
use crate::rounding::{round_to, EQUITY_DECIMALS};

struct OpenTrade {
    bar: usize,
    date: NaiveDateTime,
    price: f64,
    commission: f64,
}

/// Extract completed trades. An entry without a later exit (position still
/// open at the end of the series) produces no record.
pub fn extract_trades(series: &BarSeries, annotations: &[Annotation]) -> Vec<TradeRecord> {
    let mut trades = Vec::new();
    let mut open: Option<OpenTrade> = None;
    let mut last_equity = 0.0;

    for (index, (bar, annotation)) in series.iter().zip(annotations).enumerate() {
        if let Some(price) = annotation.buy_price {
            open = Some(OpenTrade {
                bar: index,
                date: bar.bar.date,
                price,
                commission: annotation.commission.unwrap_or(0.0),
            });
            continue;
        }

        let (Some(reason), Some(exit_price)) = (annotation.exit_reason(), annotation.sell_price())
        else {
            continue;
        };
        let Some(entry) = open.take() else {
            continue;
        };

        let exit_commission = annotation.commission.unwrap_or(0.0);
        let equity_after = annotation.equity.unwrap_or(last_equity);
        trades.push(TradeRecord {
            entry_bar: entry.bar,
            entry_date: entry.date,
            entry_price: entry.price,
            entry_commission: entry.commission,
            exit_bar: index,
            exit_date: bar.bar.date,
            exit_price,
            exit_commission,
            exit_reason: reason,
            net_pnl: (exit_price - entry.price) - (entry.commission + exit_commission),
            equity_delta: round_to(equity_after - last_equity, EQUITY_DECIMALS),
            equity_after,
            bars_held: index - entry.bar,
        });
        last_equity = equity_after;
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BandedBar, Bands, Bar, ExitReason};
    use chrono::NaiveDate;

    fn series(n: usize) -> BarSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        BarSeries::new(
            (0..n)
                .map(|i| {
                    BandedBar::new(
                        Bar::new(base + chrono::Duration::minutes(i as i64), 1.0, 1.0, 1.0, 1.0),
                        Bands::default(),
                    )
                })
                .collect(),
        )
        .unwrap()
    }

    fn buy(price: f64, commission: f64) -> Annotation {
        Annotation {
            buy_price: Some(price),
            commission: Some(commission),
            position: Some(1),
            ..Default::default()
        }
    }

    fn sell(reason: ExitReason, price: f64, commission: f64, equity: f64) -> Annotation {
        let mut a = Annotation {
            commission: Some(commission),
            equity: Some(equity),
            position: Some(0),
            ..Default::default()
        };
        a.set_exit(reason, price);
        a
    }

    #[test]
    fn pairs_entries_with_exits() {
        let annotations = vec![
            buy(100.0, 0.05),
            Annotation::default(),
            sell(ExitReason::TakeProfit, 104.0, 0.05, 4.0),
            buy(104.0, 0.05),
            sell(ExitReason::StopLoss, 102.0, 0.05, 2.0),
        ];
        let trades = extract_trades(&series(5), &annotations);
        assert_eq!(trades.len(), 2);

        assert_eq!(trades[0].entry_bar, 0);
        assert_eq!(trades[0].exit_bar, 2);
        assert_eq!(trades[0].bars_held, 2);
        assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit);
        assert!((trades[0].net_pnl - 3.9).abs() < 1e-9);
        assert_eq!(trades[0].equity_delta, 4.0);

        assert_eq!(trades[1].exit_reason, ExitReason::StopLoss);
        assert!((trades[1].net_pnl - -2.1).abs() < 1e-9);
        assert_eq!(trades[1].equity_delta, -2.0);
        assert_eq!(trades[1].equity_after, 2.0);
    }

    #[test]
    fn open_trade_at_end_is_not_reported() {
        let annotations = vec![buy(100.0, 0.05), Annotation::default()];
        assert!(extract_trades(&series(2), &annotations).is_empty());
    }
}
