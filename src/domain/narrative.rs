//! Plain-text run summary.

use super::metrics::Metrics;

/// Drawdowns at or below this read as a confident day.
const CONFIDENT_MAX_DRAWDOWN: f64 = 0.15;

pub fn make_day_summary(metrics: &Metrics, capsules_written: usize, verdict: &str) -> String {
    let mood = if metrics.max_drawdown <= CONFIDENT_MAX_DRAWDOWN {
        "confident"
    } else {
        "cautious"
    };
    format!(
        "Day Summary - The Engine felt {mood}.\n\
         Sharpe: {sharpe:.2}  MaxDD: {max_dd:.2}%  Trades: {trades}  FinalEquity: {equity:.2}\n\
         Verdict: {verdict} (capsules: {capsules_written})\n",
        sharpe = metrics.sharpe,
        max_dd = metrics.max_drawdown * 100.0,
        trades = metrics.num_trades,
        equity = metrics.final_equity,
    )
}
