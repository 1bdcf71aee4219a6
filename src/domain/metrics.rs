//! Performance metrics over the closed-trade ledger and equity curve.

use serde::Serialize;

use super::portfolio::{EquityPoint, Portfolio};
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Every key is always present; a run without trades yields zeros with
/// both balances equal to the initial balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of trades with profit > 0.
    pub win_rate: f64,
    pub total_profit: f64,
    /// Gross loss as a positive amount.
    pub total_loss: f64,
    pub net_profit: f64,
    pub profit_factor: f64,
    pub average_win: f64,
    /// Signed, so never positive.
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    /// Longest time below a previous equity peak, in days.
    pub max_drawdown_duration: f64,
    /// Percent of the bar span spent holding a position.
    pub time_in_market: f64,
    /// Hours.
    pub average_trade_duration: f64,
    pub consecutive_wins: usize,
    pub consecutive_losses: usize,
    pub expectancy: f64,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub return_percent: f64,
}

impl Metrics {
    pub fn empty(initial_balance: f64) -> Self {
        Metrics {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_profit: 0.0,
            total_loss: 0.0,
            net_profit: 0.0,
            profit_factor: 0.0,
            average_win: 0.0,
            average_loss: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            max_drawdown: 0.0,
            max_drawdown_percent: 0.0,
            max_drawdown_duration: 0.0,
            time_in_market: 0.0,
            average_trade_duration: 0.0,
            consecutive_wins: 0,
            consecutive_losses: 0,
            expectancy: 0.0,
            initial_balance,
            final_balance: initial_balance,
            return_percent: 0.0,
        }
    }

    /// `span_seconds` is the time between the first and last bar of the run.
    pub fn compute(portfolio: &Portfolio, span_seconds: i64) -> Self {
        let trades = &portfolio.closed_trades;
        let initial_balance = portfolio.initial_balance;

        if trades.is_empty() {
            return Metrics::empty(initial_balance);
        }

        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_profit = 0.0_f64;
        let mut signed_loss = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_duration = 0i64;

        for trade in trades {
            if trade.profit > 0.0 {
                winning_trades += 1;
                total_profit += trade.profit;
                largest_win = largest_win.max(trade.profit);
            } else {
                losing_trades += 1;
                signed_loss += trade.profit;
                largest_loss = largest_loss.min(trade.profit);
            }
            total_duration += trade.duration_seconds;
        }

        let total_trades = trades.len();
        let total_loss = signed_loss.abs();
        let net_profit = portfolio.balance - initial_balance;

        let win_rate = winning_trades as f64 / total_trades as f64 * 100.0;
        let profit_factor = if total_loss > 0.0 {
            total_profit / total_loss
        } else {
            0.0
        };
        let average_win = if winning_trades > 0 {
            total_profit / winning_trades as f64
        } else {
            0.0
        };
        let average_loss = if losing_trades > 0 {
            -total_loss / losing_trades as f64
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_percent) =
            compute_drawdown(&portfolio.equity_curve, initial_balance);
        let max_drawdown_duration = compute_drawdown_duration(&portfolio.equity_curve);

        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(trades);

        let return_percent = if initial_balance != 0.0 {
            net_profit / initial_balance * 100.0
        } else {
            0.0
        };
        let calmar_ratio = if max_drawdown_percent > 0.0 {
            (return_percent / max_drawdown_percent).abs()
        } else {
            0.0
        };

        let (consecutive_wins, consecutive_losses) = compute_streaks(trades);

        let win_fraction = win_rate / 100.0;
        let expectancy = win_fraction * average_win + (1.0 - win_fraction) * average_loss;

        let time_in_market = if span_seconds > 0 {
            total_duration as f64 / span_seconds as f64 * 100.0
        } else {
            0.0
        };
        let average_trade_duration = total_duration as f64 / total_trades as f64 / SECONDS_PER_HOUR;

        Metrics {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            total_profit,
            total_loss,
            net_profit,
            profit_factor,
            average_win,
            average_loss,
            largest_win,
            largest_loss,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown,
            max_drawdown_percent,
            max_drawdown_duration,
            time_in_market,
            average_trade_duration,
            consecutive_wins,
            consecutive_losses,
            expectancy,
            initial_balance,
            final_balance: portfolio.balance,
            return_percent,
        }
    }
}

/// Absolute and percent drawdown; the running peak starts at `initial_balance`.
fn compute_drawdown(equity_curve: &[EquityPoint], initial_balance: f64) -> (f64, f64) {
    let mut peak = initial_balance;
    let mut max_dd = 0.0_f64;
    let mut max_dd_pct = 0.0_f64;

    for point in equity_curve {
        peak = peak.max(point.equity);
        let dd = peak - point.equity;
        let dd_pct = if peak > 0.0 { dd / peak * 100.0 } else { 0.0 };
        max_dd = max_dd.max(dd);
        max_dd_pct = max_dd_pct.max(dd_pct);
    }

    (max_dd, max_dd_pct)
}

fn compute_drawdown_duration(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut peak_time = first.time;
    let mut longest = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            peak_time = point.time;
        } else {
            longest = longest.max((point.time - peak_time).num_seconds());
        }
    }

    longest as f64 / SECONDS_PER_DAY
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Sharpe and Sortino over per-trade percent returns, annualized by sqrt(252).
///
/// Sortino falls back to Sharpe when fewer than two returns are negative or
/// their deviation is zero.
fn compute_risk_adjusted(trades: &[ClosedTrade]) -> (f64, f64) {
    let returns: Vec<f64> = trades.iter().map(|t| t.profit_percent).collect();
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();

    let stddev = population_std(&returns);
    let sharpe = if stddev > 0.0 {
        mean / stddev * annualize
    } else {
        0.0
    };

    let negative: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside = if negative.len() > 1 {
        population_std(&negative)
    } else {
        0.0
    };
    let sortino = if downside > 0.0 {
        mean / downside * annualize
    } else {
        sharpe
    };

    (sharpe, sortino)
}

/// Longest runs of winners and of non-winners, in ledger order.
fn compute_streaks(trades: &[ClosedTrade]) -> (usize, usize) {
    let mut wins = 0usize;
    let mut losses = 0usize;
    let mut max_wins = 0usize;
    let mut max_losses = 0usize;

    for trade in trades {
        if trade.profit > 0.0 {
            wins += 1;
            losses = 0;
            max_wins = max_wins.max(wins);
        } else {
            losses += 1;
            wins = 0;
            max_losses = max_losses.max(losses);
        }
    }

    (max_wins, max_losses)
}
