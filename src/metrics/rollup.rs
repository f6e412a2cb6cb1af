use crate::config::GradeThresholds;
use crate::metrics::saturating_sum;
use crate::metrics::types::{Metrics, PerformanceGrade, RoiBucket};
use crate::model::TaskRecord;

pub const ROI_LOW: &str = "<200";
pub const ROI_MID: &str = "200–500";
pub const ROI_HIGH: &str = ">500";
pub const ROI_NA: &str = "N/A";

/// Summary statistics over the whole task list.
///
/// Revenue and hours come from Done tasks only. ROI averages every task with
/// a finite ROI. Any ratio with an empty denominator is 0. Sums that would
/// overflow saturate at `f64::MAX`.
pub fn compute_metrics<T: AsRef<TaskRecord>>(tasks: &[T], grade: &GradeThresholds) -> Metrics {
    let total_count = tasks.len();
    let done: Vec<&TaskRecord> = tasks
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| t.is_done())
        .collect();

    let total_revenue = saturating_sum(done.iter().map(|t| t.revenue.summable()));
    let total_time_taken = saturating_sum(done.iter().filter_map(|t| t.time_taken.positive()));

    let time_efficiency_pct = if total_count > 0 {
        done.len() as f64 / total_count as f64 * 100.0
    } else {
        0.0
    };

    let revenue_per_hour = if total_time_taken > 0.0 {
        (total_revenue / total_time_taken).min(f64::MAX)
    } else {
        0.0
    };

    let rois: Vec<f64> = tasks
        .iter()
        .filter_map(|t| t.as_ref().roi.finite())
        .collect();
    let average_roi = mean(&rois);

    Metrics {
        total_revenue,
        time_efficiency_pct,
        revenue_per_hour,
        average_roi,
        performance_grade: performance_grade(average_roi, total_time_taken, grade),
        total_time_taken,
    }
}

/// Letter grade from average ROI, with an A reserved for datasets that have
/// tracked at least `a_min_hours`. Never decreases as either input grows.
/// NaN ROI grades F; NaN hours never qualify for an A.
pub fn performance_grade(
    average_roi: f64,
    total_time_taken: f64,
    thresholds: &GradeThresholds,
) -> PerformanceGrade {
    let by_roi = if average_roi >= thresholds.a_roi {
        PerformanceGrade::A
    } else if average_roi >= thresholds.b_roi {
        PerformanceGrade::B
    } else if average_roi >= thresholds.c_roi {
        PerformanceGrade::C
    } else if average_roi >= thresholds.d_roi {
        PerformanceGrade::D
    } else {
        PerformanceGrade::F
    };

    let enough_hours = total_time_taken >= thresholds.a_min_hours;
    if by_roi == PerformanceGrade::A && !enough_hours {
        PerformanceGrade::B
    } else {
        by_roi
    }
}

/// Histogram of ROI values: `<200`, `200–500` (inclusive), `>500`, and `N/A`
/// for missing or non-finite ROI. Counts sum to the number of tasks.
pub fn compute_roi_distribution<T: AsRef<TaskRecord>>(tasks: &[T]) -> Vec<RoiBucket> {
    let mut counts = [0u64; 4];
    for task in tasks {
        let slot = match task.as_ref().roi.finite() {
            Some(roi) if roi < 200.0 => 0,
            Some(roi) if roi <= 500.0 => 1,
            Some(_) => 2,
            None => 3,
        };
        counts[slot] += 1;
    }
    [ROI_LOW, ROI_MID, ROI_HIGH, ROI_NA]
        .into_iter()
        .zip(counts)
        .map(|(label, count)| RoiBucket { label, count })
        .collect()
}

/// Mean of finite values, 0 when empty. Falls back to summing pre-divided
/// terms when the plain sum overflows.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}
