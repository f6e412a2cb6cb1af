pub mod forecast;
pub mod rollup;
pub mod types;

pub use forecast::forecast;
pub use rollup::{compute_metrics, compute_roi_distribution, performance_grade};
pub use types::*;

use std::collections::BTreeMap;

use crate::config::{AnalyticsConfig, PipelineWeights};
use crate::date_util::week_of;
use crate::model::{Priority, Status, TaskRecord};
use crate::week::WeekKey;

/// Count tasks per pipeline stage.
pub fn compute_funnel<T: AsRef<TaskRecord>>(tasks: &[T]) -> Funnel {
    let mut funnel = Funnel::default();
    for task in tasks {
        match task.as_ref().status {
            Status::Todo => funnel.todo += 1,
            Status::InProgress => funnel.in_progress += 1,
            Status::Done => funnel.done += 1,
        }
    }
    funnel
}

/// Group Done tasks by completion week, oldest week first. Weeks without a
/// completion are omitted, so the series may have gaps.
pub fn compute_throughput<T: AsRef<TaskRecord>>(tasks: &[T]) -> Vec<WeeklyThroughput> {
    let mut by_week: BTreeMap<WeekKey, (u64, f64)> = BTreeMap::new();
    for task in tasks.iter().map(AsRef::as_ref).filter(|t| t.is_done()) {
        let Some(done_at) = task.completion() else {
            log::warn!("Skipping Done task {} with no completion time", task.id);
            continue;
        };
        let entry = by_week.entry(week_of(done_at)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 = saturating_add(entry.1, task.revenue.summable());
    }
    by_week
        .into_iter()
        .map(|(week, (count, revenue))| WeeklyThroughput {
            week,
            count,
            revenue,
        })
        .collect()
}

/// Probability-weighted revenue still sitting in open tasks.
pub fn compute_weighted_pipeline<T: AsRef<TaskRecord>>(
    tasks: &[T],
    weights: &PipelineWeights,
) -> f64 {
    saturating_sum(
        tasks
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| t.status.is_open())
            .map(|t| t.revenue.summable() * weights.weight(t.status, t.priority)),
    )
}

/// Cycle-time statistics per priority.
pub fn compute_velocity<T: AsRef<TaskRecord>>(tasks: &[T]) -> Velocity {
    let cycle_days = |priority: Priority| -> Vec<f64> {
        tasks
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| t.priority == priority)
            .filter_map(|t| t.cycle_days())
            .collect()
    };
    Velocity {
        high: velocity_from_days(cycle_days(Priority::High)),
        medium: velocity_from_days(cycle_days(Priority::Medium)),
        low: velocity_from_days(cycle_days(Priority::Low)),
    }
}

/// Revenue per priority across all tasks, always in High, Medium, Low order.
pub fn compute_revenue_by_priority<T: AsRef<TaskRecord>>(tasks: &[T]) -> Vec<PriorityRevenue> {
    Priority::ALL
        .into_iter()
        .map(|priority| PriorityRevenue {
            priority,
            revenue: saturating_sum(
                tasks
                    .iter()
                    .map(AsRef::as_ref)
                    .filter(|t| t.priority == priority)
                    .map(|t| t.revenue.summable()),
            ),
        })
        .collect()
}

/// Revenue per stage across all tasks, always in Todo, In Progress, Done order.
pub fn compute_revenue_by_status<T: AsRef<TaskRecord>>(tasks: &[T]) -> Vec<StatusRevenue> {
    Status::ALL
        .into_iter()
        .map(|status| StatusRevenue {
            status,
            revenue: saturating_sum(
                tasks
                    .iter()
                    .map(AsRef::as_ref)
                    .filter(|t| t.status == status)
                    .map(|t| t.revenue.summable()),
            ),
        })
        .collect()
}

/// Compute every view. `anchor` is the week a forecast starts after when
/// there is no completion history.
pub fn compute_report<T: AsRef<TaskRecord>>(
    tasks: &[T],
    config: &AnalyticsConfig,
    anchor: WeekKey,
) -> AnalyticsReport {
    log::debug!("Computing analytics report over {} tasks", tasks.len());

    let throughput = compute_throughput(tasks);
    let history: Vec<RevenuePoint> = throughput.iter().map(RevenuePoint::from).collect();
    let forecast = forecast(&history, config.forecast_weeks, anchor);

    AnalyticsReport {
        funnel: compute_funnel(tasks),
        throughput,
        weighted_pipeline: compute_weighted_pipeline(tasks, &config.pipeline_weights),
        forecast,
        velocity: compute_velocity(tasks),
        metrics: compute_metrics(tasks, &config.grade),
        roi_distribution: compute_roi_distribution(tasks),
        revenue_by_priority: compute_revenue_by_priority(tasks),
        revenue_by_status: compute_revenue_by_status(tasks),
    }
}

/// Sum of non-negative values. Overflow saturates at `f64::MAX`.
pub(crate) fn saturating_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, saturating_add)
}

fn saturating_add(total: f64, value: f64) -> f64 {
    (total + value).min(f64::MAX)
}

fn velocity_from_days(mut days: Vec<f64>) -> PriorityVelocity {
    if days.is_empty() {
        return PriorityVelocity::default();
    }
    days.sort_by(f64::total_cmp);

    let n = days.len();
    let avg = days.iter().sum::<f64>() / n as f64;

    #[allow(clippy::manual_is_multiple_of)]
    let median = if n % 2 == 0 {
        (days[n / 2 - 1] + days[n / 2]) / 2.0
    } else {
        days[n / 2]
    };

    let p90_idx = ((n as f64) * 0.9).ceil() as usize;
    let p90_idx = p90_idx.min(n).max(1) - 1;

    PriorityVelocity {
        avg_days: avg,
        median_days: median,
        p90_days: days[p90_idx],
        completed: n as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::model::{DerivedTask, Numeric};

    fn day(d: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap() + Duration::days(d)
    }

    fn todo(id: &str) -> TaskRecord {
        TaskRecord::new(id, Priority::Medium, day(0))
    }

    fn done(id: &str, priority: Priority, created: i64, completed: i64) -> TaskRecord {
        TaskRecord::new(id, priority, day(created)).completed(day(completed))
    }

    #[test]
    fn test_funnel_scenario() {
        let tasks = vec![
            todo("t1").revenue(Numeric::NONE),
            done("t2", Priority::High, 0, 1).revenue(100.0),
            done("t3", Priority::Low, 0, 2).revenue(200.0),
        ];
        let funnel = compute_funnel(&tasks);
        assert_eq!(
            funnel,
            Funnel {
                todo: 1,
                in_progress: 0,
                done: 2
            }
        );
        assert_eq!(funnel.total(), tasks.len() as u64);
    }

    #[test]
    fn test_funnel_empty() {
        let tasks: Vec<TaskRecord> = vec![];
        assert_eq!(compute_funnel(&tasks), Funnel::default());
    }

    #[test]
    fn test_funnel_partitions_mixed_list() {
        let tasks: Vec<TaskRecord> = (0..10)
            .map(|i| match i % 3 {
                0 => todo(&format!("t{i}")),
                1 => todo(&format!("t{i}")).status(Status::InProgress),
                _ => done(&format!("t{i}"), Priority::Low, 0, i),
            })
            .collect();
        let funnel = compute_funnel(&tasks);
        assert_eq!(funnel.total(), 10);
        assert_eq!(funnel.in_progress, 3);
        assert_eq!(funnel.done, 3);
    }

    #[test]
    fn test_throughput_groups_and_orders_weeks() {
        // day(0) is Monday 2025-01-06 (W02)
        let tasks = vec![
            done("a", Priority::High, 0, 15).revenue(50.0), // W04
            done("b", Priority::High, 0, 0).revenue(100.0), // W02
            done("c", Priority::Low, 0, 6).revenue(f64::NAN), // W02 (Sunday)
            done("d", Priority::Low, 0, 1).revenue(-10.0), // W02
            todo("e").revenue(1000.0),
        ];
        let weekly = compute_throughput(&tasks);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].week.to_key(), "2025-W02");
        assert_eq!(weekly[0].count, 3);
        assert_eq!(weekly[0].revenue, 100.0);
        // W03 has no completions and is omitted
        assert_eq!(weekly[1].week.to_key(), "2025-W04");
        assert_eq!(weekly[1].count, 1);
        assert_eq!(weekly[1].revenue, 50.0);
    }

    #[test]
    fn test_throughput_sums_match_done_tasks() {
        let tasks: Vec<TaskRecord> = (0..20)
            .map(|i| {
                let t = done(&format!("t{i}"), Priority::Medium, 0, i * 3).revenue(i as f64 * 10.0);
                if i % 4 == 0 {
                    t.status(Status::Todo)
                } else {
                    t
                }
            })
            .collect();
        let weekly = compute_throughput(&tasks);
        let metrics = compute_metrics(&tasks, &Default::default());
        let count: u64 = weekly.iter().map(|w| w.count).sum();
        let revenue: f64 = weekly.iter().map(|w| w.revenue).sum();
        assert_eq!(count, compute_funnel(&tasks).done);
        assert_eq!(revenue, metrics.total_revenue);
        assert!(weekly.windows(2).all(|w| w[0].week < w[1].week));
    }

    #[test]
    fn test_throughput_skips_done_without_completion() {
        let mut broken = todo("x");
        broken.status = Status::Done;
        let tasks = vec![broken, done("ok", Priority::High, 0, 1)];
        let weekly = compute_throughput(&tasks);
        assert_eq!(weekly.iter().map(|w| w.count).sum::<u64>(), 1);
    }

    #[test]
    fn test_weighted_pipeline() {
        let weights = PipelineWeights::default();
        let tasks = vec![
            todo("a").revenue(1000.0),                                // 1000 * 0.25 * 0.85
            TaskRecord::new("b", Priority::High, day(0))
                .status(Status::InProgress)
                .revenue(500.0), // 500 * 0.6 * 1.0
            done("c", Priority::High, 0, 1).revenue(9999.0),         // excluded
            todo("d").revenue(Numeric::NONE),
        ];
        let value = compute_weighted_pipeline(&tasks, &weights);
        let expected = 1000.0 * 0.25 * 0.85 + 500.0 * 0.6;
        assert!((value - expected).abs() < 1e-9, "{value} vs {expected}");
        assert!(value <= 1500.0);
    }

    #[test]
    fn test_weighted_pipeline_custom_weights() {
        let weights = PipelineWeights {
            todo: 1.0,
            in_progress: 1.0,
            high: 1.0,
            medium: 1.0,
            low: 1.0,
        };
        let tasks = vec![todo("a").revenue(300.0), todo("b").revenue(200.0)];
        assert_eq!(compute_weighted_pipeline(&tasks, &weights), 500.0);
    }

    #[test]
    fn test_weighted_pipeline_clamps_weights() {
        let weights = PipelineWeights {
            todo: 3.0,
            ..PipelineWeights::default()
        };
        let tasks = vec![TaskRecord::new("a", Priority::High, day(0)).revenue(100.0)];
        assert_eq!(compute_weighted_pipeline(&tasks, &weights), 100.0);
    }

    #[test]
    fn test_revenue_sums_saturate() {
        let tasks = vec![
            done("a", Priority::High, 0, 1).revenue(1e308),
            done("b", Priority::High, 0, 2).revenue(1e308),
            todo("c").revenue(1e308).status(Status::InProgress),
            todo("d").revenue(1e308).status(Status::InProgress),
        ];
        let config = AnalyticsConfig {
            pipeline_weights: PipelineWeights {
                in_progress: 1.0,
                medium: 1.0,
                ..PipelineWeights::default()
            },
            ..AnalyticsConfig::default()
        };
        let report = compute_report(&tasks, &config, WeekKey::new(2025, 1).unwrap());

        assert_eq!(report.throughput.len(), 1);
        assert_eq!(report.throughput[0].revenue, f64::MAX);
        assert_eq!(report.metrics.total_revenue, f64::MAX);
        assert_eq!(report.weighted_pipeline, f64::MAX);
        assert_eq!(report.revenue_by_priority[0].revenue, f64::MAX);
        assert_eq!(report.revenue_by_priority[1].revenue, f64::MAX);
        assert_eq!(report.revenue_by_status[1].revenue, f64::MAX);
        assert_eq!(report.revenue_by_status[2].revenue, f64::MAX);
        assert!(report.forecast.iter().all(|p| p.revenue.is_finite()));

        let weekly = saturating_sum(report.throughput.iter().map(|w| w.revenue));
        assert_eq!(weekly, report.metrics.total_revenue);
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[test]
    fn test_velocity_scenario() {
        let tasks = vec![
            done("h", Priority::High, 0, 2),
            done("m", Priority::Medium, 1, 5),
            TaskRecord::new("l", Priority::Low, day(0)).status(Status::InProgress),
        ];
        let v = compute_velocity(&tasks);
        assert_eq!(v.high.avg_days, 2.0);
        assert_eq!(v.medium.avg_days, 4.0);
        assert_eq!(v.low.avg_days, 0.0);
        assert_eq!(v.low.completed, 0);
        assert!(!v.get(Priority::Low).avg_days.is_nan());
    }

    #[test]
    fn test_velocity_statistics() {
        let tasks: Vec<TaskRecord> = (1..=10)
            .map(|d| done(&format!("t{d}"), Priority::High, 0, d))
            .collect();
        let v = compute_velocity(&tasks);
        assert_eq!(v.high.completed, 10);
        assert_eq!(v.high.avg_days, 5.5);
        assert_eq!(v.high.median_days, 5.5);
        assert_eq!(v.high.p90_days, 9.0);
    }

    #[test]
    fn test_velocity_single_completion() {
        let v = compute_velocity(&[done("t", Priority::Medium, 0, 3)]);
        assert_eq!(v.medium.avg_days, 3.0);
        assert_eq!(v.medium.median_days, 3.0);
        assert_eq!(v.medium.p90_days, 3.0);
    }

    #[test]
    fn test_revenue_breakdowns() {
        let tasks = vec![
            todo("a").revenue(10.0),
            done("b", Priority::High, 0, 1).revenue(20.0),
            done("c", Priority::High, 0, 1).revenue(f64::NAN),
        ];
        let by_priority = compute_revenue_by_priority(&tasks);
        assert_eq!(by_priority.len(), 3);
        assert_eq!(by_priority[0].priority, Priority::High);
        assert_eq!(by_priority[0].revenue, 20.0);
        assert_eq!(by_priority[1].revenue, 10.0);
        assert_eq!(by_priority[2].revenue, 0.0);

        let by_status = compute_revenue_by_status(&tasks);
        assert_eq!(
            by_status.iter().map(|s| s.status).collect::<Vec<_>>(),
            Status::ALL.to_vec()
        );
        assert_eq!(by_status[0].revenue, 10.0);
        assert_eq!(by_status[1].revenue, 0.0);
        assert_eq!(by_status[2].revenue, 20.0);
    }

    #[test]
    fn test_report_on_derived_tasks() {
        let tasks: Vec<DerivedTask> = vec![
            done("a", Priority::High, 0, 2).revenue(100.0).time_taken(2.0).roi(150.0).into(),
            done("b", Priority::Low, 0, 9).revenue(300.0).time_taken(4.0).roi(600.0).into(),
            todo("c").revenue(400.0).roi(300.0).into(),
        ];
        let anchor = WeekKey::new(2030, 1).unwrap();
        let report = compute_report(&tasks, &AnalyticsConfig::default(), anchor);
        assert_eq!(report.funnel.done, 2);
        assert_eq!(report.throughput.len(), 2);
        assert_eq!(report.forecast.len(), 4);
        // Continues after the last history week, not the anchor
        assert_eq!(Some(report.forecast[0].week), report.throughput[1].week.next());
        assert_eq!(report.metrics.total_revenue, 400.0);
        assert_eq!(report.metrics.revenue_per_hour, 400.0 / 6.0);
        assert_eq!(report.roi_distribution.iter().map(|b| b.count).sum::<u64>(), 3);
        assert_eq!(report.velocity.high.avg_days, 2.0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["funnel"]["inProgress"], 0);
        assert_eq!(json["velocity"]["High"]["avgDays"], 2.0);
        assert_eq!(json["metrics"]["averageROI"], 350.0);
        assert_eq!(json["throughput"][0]["week"], "2025-W02");
    }

    #[test]
    fn test_report_empty() {
        let tasks: Vec<TaskRecord> = vec![];
        let anchor = WeekKey::new(2025, 10).unwrap();
        let report = compute_report(&tasks, &AnalyticsConfig::default(), anchor);
        assert_eq!(report.funnel, Funnel::default());
        assert!(report.throughput.is_empty());
        assert_eq!(report.weighted_pipeline, 0.0);
        assert_eq!(report.forecast.len(), 4);
        assert_eq!(report.forecast[0].week.to_key(), "2025-W11");
        assert!(report.forecast.iter().all(|p| p.revenue == 0.0));
    }
}
