use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An optional numeric task field (revenue, hours, ROI).
///
/// Upstream data may leave these absent, null, or non-finite. Each computer
/// picks one of the accessors below instead of coercing the raw value.
///
/// Deserialization never fails: numbers are kept, numeric strings such as
/// `"1200"` or `"NaN"` are parsed, and anything else reads as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Numeric(Option<f64>);

impl Numeric {
    pub const NONE: Numeric = Numeric(None);

    pub fn new(value: Option<f64>) -> Self {
        Numeric(value)
    }

    pub fn raw(&self) -> Option<f64> {
        self.0
    }

    /// The value if it is a finite number. Used where invalid values are
    /// excluded from an average.
    pub fn finite(&self) -> Option<f64> {
        self.0.filter(|v| v.is_finite())
    }

    /// The value for summing: finite and non-negative, otherwise 0.
    pub fn summable(&self) -> f64 {
        match self.finite() {
            Some(v) if v >= 0.0 => v,
            _ => 0.0,
        }
    }

    /// The value if finite and strictly positive. Used for time denominators.
    pub fn positive(&self) -> Option<f64> {
        self.finite().filter(|v| *v > 0.0)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric(Some(v))
    }
}

impl From<Option<f64>> for Numeric {
    fn from(v: Option<f64>) -> Self {
        Numeric(v)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(Numeric(value))
    }
}
