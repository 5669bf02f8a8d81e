//! Internal rate of return for irregularly timed cashflows.

use folio_core::types::CashflowEntry;

const DAYS_PER_YEAR: f64 = 365.2425;
const SECS_PER_YEAR: f64 = DAYS_PER_YEAR * 86_400.0;
const TOLERANCE: f64 = 1e-7;
const MAX_ITERATIONS: usize = 100;

/// Newton-Raphson solve of `sum(amount / (1+r)^years) = 0`, with years
/// measured from the earliest cashflow.
///
/// `None` when fewer than two cashflows exist, when an evaluation leaves the
/// finite domain, when the rate walks to or past -100%, or when the
/// iteration budget runs out before the tolerance is met.
pub fn xirr(cashflows: &[CashflowEntry]) -> Option<f64> {
    if cashflows.len() < 2 {
        return None;
    }

    let mut flows: Vec<(f64, f64)> = cashflows
        .iter()
        .map(|cf| (cf.date.timestamp() as f64, cf.amount))
        .collect();
    flows.sort_by(|a, b| a.0.total_cmp(&b.0));

    let t0 = flows[0].0;
    let flows: Vec<(f64, f64)> = flows
        .into_iter()
        .map(|(t, a)| ((t - t0) / SECS_PER_YEAR, a))
        .collect();

    let f = |r: f64| -> f64 {
        flows
            .iter()
            .map(|(years, amount)| amount / (1.0 + r).powf(*years))
            .sum()
    };
    let df = |r: f64| -> f64 {
        flows
            .iter()
            .map(|(years, amount)| -years * amount / (1.0 + r).powf(years + 1.0))
            .sum()
    };

    let mut r: f64 = 0.10;
    for _ in 0..MAX_ITERATIONS {
        let fr = f(r);
        let dfr = df(r);
        if !fr.is_finite() || !dfr.is_finite() || dfr == 0.0 {
            return None;
        }
        let next = r - fr / dfr;
        if (next - r).abs() < TOLERANCE {
            return Some(next);
        }
        r = next;
        if r <= -0.999_999 {
            return None;
        }
    }
    None
}
