use serde_json::Value;

/// Client-side view of the backend proficiency score.
#[derive(Clone, Debug, Default)]
pub struct ProficiencyState {
    pub value: Option<f64>,
    pub loading: bool,
}

impl ProficiencyState {
    /// Returns false when a request is already in flight.
    pub fn begin_refresh(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// Failures keep whatever value was shown before.
    pub fn finish(&mut self, value: Option<f64>) {
        self.loading = false;
        if value.is_some() {
            self.value = value;
        }
    }

    pub fn display(&self) -> String {
        match self.value {
            Some(v) => format!("{v:.4}"),
            None => "?".to_string(),
        }
    }
}

/// The backend reports a number, but older versions send it as a string.
pub fn parse_number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
