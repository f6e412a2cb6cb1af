use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Priority, Status};

/// Probability weights applied to open-pipeline revenue.
///
/// The weight of a task is `stage weight × priority factor`. Every entry lies
/// in [0, 1], so weighted revenue never exceeds the raw open revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineWeights {
    pub todo: f64,
    pub in_progress: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for PipelineWeights {
    fn default() -> Self {
        Self {
            todo: 0.25,
            in_progress: 0.6,
            high: 1.0,
            medium: 0.85,
            low: 0.7,
        }
    }
}

impl PipelineWeights {
    /// Weight for a task in the given stage. Done tasks are not pipeline and
    /// weigh 0. Entries outside [0, 1] are clamped, NaN counts as 0.
    pub fn weight(&self, status: Status, priority: Priority) -> f64 {
        let stage = match status {
            Status::Todo => self.todo,
            Status::InProgress => self.in_progress,
            Status::Done => return 0.0,
        };
        let factor = match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        };
        unit(stage) * unit(factor)
    }

    pub fn validate(&self) -> Result<()> {
        let entries = [
            ("todo", self.todo),
            ("inProgress", self.in_progress),
            ("high", self.high),
            ("medium", self.medium),
            ("low", self.low),
        ];
        for (name, value) in entries {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "pipeline weight {name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Average-ROI cutoffs for each letter grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GradeThresholds {
    pub a_roi: f64,
    pub b_roi: f64,
    pub c_roi: f64,
    pub d_roi: f64,
    /// Tracked hours needed before an A is awarded; below this an A caps at B.
    pub a_min_hours: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a_roi: 500.0,
            b_roi: 300.0,
            c_roi: 200.0,
            d_roi: 100.0,
            a_min_hours: 10.0,
        }
    }
}

impl GradeThresholds {
    pub fn validate(&self) -> Result<()> {
        let cutoffs = [self.a_roi, self.b_roi, self.c_roi, self.d_roi, self.a_min_hours];
        if cutoffs.iter().any(|v| !v.is_finite()) {
            return Err(Error::Config("grade thresholds must be finite".into()));
        }
        if !(self.a_roi >= self.b_roi && self.b_roi >= self.c_roi && self.c_roi >= self.d_roi) {
            return Err(Error::Config(
                "grade thresholds must be ordered aRoi >= bRoi >= cRoi >= dRoi".into(),
            ));
        }
        if self.a_min_hours < 0.0 {
            return Err(Error::Config("aMinHours must not be negative".into()));
        }
        Ok(())
    }
}

/// Tunable analytics policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub pipeline_weights: PipelineWeights,
    pub grade: GradeThresholds,
    /// Weeks projected by the report forecast.
    pub forecast_weeks: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            pipeline_weights: PipelineWeights::default(),
            grade: GradeThresholds::default(),
            forecast_weeks: 4,
        }
    }
}

impl AnalyticsConfig {
    /// Default config location (`~/.taskpulse/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".taskpulse").join("config.json"))
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalyticsConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to built-in defaults when
    /// no file exists there.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.pipeline_weights.validate()?;
        self.grade.validate()
    }
}
