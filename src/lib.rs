pub mod config;
pub mod date_util;
pub mod error;
pub mod metrics;
pub mod model;
pub mod week;

pub use config::{AnalyticsConfig, GradeThresholds, PipelineWeights};
pub use error::{Error, Result};
pub use metrics::{
    AnalyticsReport, Funnel, Metrics, PerformanceGrade, PriorityRevenue, PriorityVelocity,
    RevenuePoint, RoiBucket, StatusRevenue, Velocity, WeeklyThroughput,
};
pub use model::{DerivedTask, Numeric, Priority, Status, TaskRecord};
pub use week::WeekKey;

/// Main entry point: analytics views over a task list under one config.
///
/// Every method is a pure function of its arguments and the config.
#[derive(Debug, Clone, Default)]
pub struct TaskAnalytics {
    config: AnalyticsConfig,
}

impl TaskAnalytics {
    /// Validate and wrap a config.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn funnel<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Funnel {
        metrics::compute_funnel(tasks)
    }

    pub fn throughput<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Vec<WeeklyThroughput> {
        metrics::compute_throughput(tasks)
    }

    pub fn weighted_pipeline<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> f64 {
        metrics::compute_weighted_pipeline(tasks, &self.config.pipeline_weights)
    }

    /// Forecast `weeks` ahead from the task list's own throughput history.
    pub fn forecast<T: AsRef<TaskRecord>>(
        &self,
        tasks: &[T],
        weeks: usize,
        anchor: WeekKey,
    ) -> Vec<RevenuePoint> {
        let history: Vec<RevenuePoint> = self
            .throughput(tasks)
            .iter()
            .map(RevenuePoint::from)
            .collect();
        metrics::forecast(&history, weeks, anchor)
    }

    pub fn velocity<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Velocity {
        metrics::compute_velocity(tasks)
    }

    pub fn metrics<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Metrics {
        metrics::compute_metrics(tasks, &self.config.grade)
    }

    pub fn roi_distribution<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Vec<RoiBucket> {
        metrics::compute_roi_distribution(tasks)
    }

    pub fn revenue_by_priority<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Vec<PriorityRevenue> {
        metrics::compute_revenue_by_priority(tasks)
    }

    pub fn revenue_by_status<T: AsRef<TaskRecord>>(&self, tasks: &[T]) -> Vec<StatusRevenue> {
        metrics::compute_revenue_by_status(tasks)
    }

    pub fn report<T: AsRef<TaskRecord>>(&self, tasks: &[T], anchor: WeekKey) -> AnalyticsReport {
        metrics::compute_report(tasks, &self.config, anchor)
    }
}
