//! Plain-text ranking report.

use std::fmt::Write as _;

use crate::ranker::RankedStrategy;

/// Render the ranked batch as a plain-text report: one summary line per
/// strategy plus an aggregate score-range footer.
pub fn generate_report(ranked: &[RankedStrategy]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Strategy Ranking Report ===");
    let _ = writeln!(
        out,
        "Generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Strategies: {}", ranked.len());
    let _ = writeln!(out);

    if ranked.is_empty() {
        let _ = writeln!(out, "No strategies to rank.");
        return out;
    }

    for entry in ranked {
        let _ = writeln!(
            out,
            "#{:<3} {:<28} score {:.4} (raw {:.4})",
            entry.rank,
            display_name(entry),
            entry.final_score,
            entry.raw_score
        );
        let _ = writeln!(
            out,
            "     sharpe {:.2} | cagr {:.1}% | dd {:.1}% | trades {} | win {:.1}% | pf {:.2}",
            entry.metrics.sharpe_ratio,
            entry.metrics.cagr * 100.0,
            entry.metrics.max_drawdown * 100.0,
            entry.metrics.total_trades,
            entry.metrics.win_rate * 100.0,
            entry.metrics.profit_factor
        );
        for penalty in &entry.penalties {
            let _ = writeln!(out, "     ! {penalty}");
        }
    }

    let best = ranked.first().map(|e| e.final_score).unwrap_or(0.0);
    let worst = ranked.last().map(|e| e.final_score).unwrap_or(0.0);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Score range: {best:.4} (best) to {worst:.4} (worst), spread {:.4}",
        best - worst
    );

    out
}

fn display_name(entry: &RankedStrategy) -> &str {
    if entry.name.is_empty() {
        &entry.strategy_id
    } else {
        &entry.name
    }
}
