use serde::Serialize;

use crate::model::{Priority, Status};
use crate::week::WeekKey;

/// Task counts per pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Funnel {
    pub todo: u64,
    pub in_progress: u64,
    pub done: u64,
}

impl Funnel {
    pub fn total(&self) -> u64 {
        self.todo + self.in_progress + self.done
    }
}

/// Completions and realized revenue for one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyThroughput {
    pub week: WeekKey,
    pub count: u64,
    pub revenue: f64,
}

/// Revenue for one week, historical or projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub week: WeekKey,
    pub revenue: f64,
}

impl From<&WeeklyThroughput> for RevenuePoint {
    fn from(w: &WeeklyThroughput) -> Self {
        Self {
            week: w.week,
            revenue: w.revenue,
        }
    }
}

/// Cycle-time statistics for Done tasks of one priority. All zero when there
/// are no completions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityVelocity {
    pub avg_days: f64,
    pub median_days: f64,
    pub p90_days: f64,
    pub completed: u64,
}

/// Cycle-time statistics keyed `High`, `Medium`, `Low`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Velocity {
    #[serde(rename = "High")]
    pub high: PriorityVelocity,
    #[serde(rename = "Medium")]
    pub medium: PriorityVelocity,
    #[serde(rename = "Low")]
    pub low: PriorityVelocity,
}

impl Velocity {
    pub fn get(&self, priority: Priority) -> &PriorityVelocity {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PerformanceGrade {
    A,
    B,
    C,
    D,
    F,
}

impl std::fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PerformanceGrade::A => "A",
            PerformanceGrade::B => "B",
            PerformanceGrade::C => "C",
            PerformanceGrade::D => "D",
            PerformanceGrade::F => "F",
        };
        f.write_str(s)
    }
}

/// Whole-dataset summary. Every number is finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_revenue: f64,
    pub time_efficiency_pct: f64,
    pub revenue_per_hour: f64,
    #[serde(rename = "averageROI")]
    pub average_roi: f64,
    pub performance_grade: PerformanceGrade,
    pub total_time_taken: f64,
}

/// One bar of the ROI histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoiBucket {
    pub label: &'static str,
    pub count: u64,
}

/// Summed revenue of every task with one priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityRevenue {
    pub priority: Priority,
    pub revenue: f64,
}

/// Summed revenue of every task in one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRevenue {
    pub status: Status,
    pub revenue: f64,
}

/// Every analytics view over one task list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub funnel: Funnel,
    pub throughput: Vec<WeeklyThroughput>,
    pub weighted_pipeline: f64,
    pub forecast: Vec<RevenuePoint>,
    pub velocity: Velocity,
    pub metrics: Metrics,
    pub roi_distribution: Vec<RoiBucket>,
    pub revenue_by_priority: Vec<PriorityRevenue>,
    pub revenue_by_status: Vec<StatusRevenue>,
}
