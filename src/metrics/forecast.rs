//! Weekly revenue forecast.
//!
//! Revenue is fitted with ordinary least squares against the week offset from
//! the first historical week. Offsets come from real calendar distance, so a
//! week with no completions still counts as elapsed time. Projections are
//! clamped at zero.

use crate::metrics::types::RevenuePoint;
use crate::week::WeekKey;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trend {
    Flat(f64),
    Linear { slope: f64, intercept: f64 },
}

impl Trend {
    /// Fit `(week offset, revenue)` samples. Fewer than two samples, or no
    /// spread in x, gives a flat line at the mean.
    fn fit(samples: &[(f64, f64)]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Trend::Flat(0.0);
        }
        let n_f = n as f64;
        let mean_x = samples.iter().map(|(x, _)| x / n_f).sum::<f64>();
        let mean_y = samples.iter().map(|(_, y)| y / n_f).sum::<f64>();
        if n == 1 {
            return Trend::Flat(mean_y);
        }

        let (sxx, sxy) = samples.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });
        if sxx == 0.0 {
            return Trend::Flat(mean_y);
        }

        let slope = sxy / sxx;
        Trend::Linear {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    }

    fn at(&self, x: f64) -> f64 {
        let y = match *self {
            Trend::Flat(y) => y,
            Trend::Linear { slope, intercept } => intercept + slope * x,
        };
        if y.is_nan() {
            0.0
        } else {
            y.clamp(0.0, f64::MAX)
        }
    }
}

/// Project `horizon` weeks of revenue.
///
/// Projected weeks follow the last week of `history`; with no history they
/// follow `anchor`. History need not be sorted. Non-finite revenue counts as
/// zero. Returns exactly `horizon` points unless the projection would run
/// past [`WeekKey::MAX`], where it stops.
pub fn forecast(history: &[RevenuePoint], horizon: usize, anchor: WeekKey) -> Vec<RevenuePoint> {
    if horizon == 0 {
        return Vec::new();
    }

    let mut points: Vec<(WeekKey, f64)> = history
        .iter()
        .map(|p| {
            let revenue = if p.revenue.is_finite() { p.revenue } else { 0.0 };
            (p.week, revenue)
        })
        .collect();
    points.sort_by_key(|(week, _)| *week);

    // x = 0 at the first historical week; projection starts the week after
    // the last one
    let (origin, last) = match (points.first(), points.last()) {
        (Some((first, _)), Some((last, _))) => (*first, *last),
        _ => (anchor, anchor),
    };

    let samples: Vec<(f64, f64)> = points
        .iter()
        .map(|(week, revenue)| (origin.weeks_until(week) as f64, *revenue))
        .collect();
    let trend = Trend::fit(&samples);
    log::trace!("Forecast trend {trend:?} from {} weeks", samples.len());

    let out: Vec<RevenuePoint> = std::iter::successors(last.next(), WeekKey::next)
        .take(horizon)
        .map(|week| RevenuePoint {
            week,
            revenue: trend.at(origin.weeks_until(&week) as f64),
        })
        .collect();
    if out.len() < horizon {
        log::warn!(
            "Forecast stopped at {} after {} of {horizon} weeks",
            WeekKey::MAX,
            out.len()
        );
    }
    out
}
