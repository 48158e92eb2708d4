use serde::{Deserialize, Deserializer, Serialize};

/// Substituted for any quality field that is missing or not a finite number.
pub const NEUTRAL_VALUE: f64 = 5.5;

/// CAV at or above this counts towards the high-impact share.
pub const HIGH_IMPACT_THRESHOLD: f64 = 7.0;

const RAW_WEIGHT_TOTAL: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MistakeType {
    #[default]
    None,
    /// Wrong choice, regardless of how well it was executed.
    Decision,
    /// Right choice, failed execution.
    Execution,
    /// Error forced by opponent pressure or context.
    Forced,
}

impl MistakeType {
    pub fn cap(self) -> f64 {
        match self {
            MistakeType::None => 10.0,
            MistakeType::Decision => 4.0,
            MistakeType::Execution => 8.3,
            MistakeType::Forced => 7.0,
        }
    }

    /// Parses the labels analysts type into the log. Unknown labels mean no mistake.
    pub fn from_label(raw: &str) -> Self {
        let s = raw.trim().to_ascii_lowercase();
        let compact: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        match compact.as_str() {
            "a" | "typea" | "typeadecision" | "decision" => MistakeType::Decision,
            "b" | "typeb" | "typebexecution" | "execution" => MistakeType::Execution,
            "c" | "typec" | "typecforced" | "forced" => MistakeType::Forced,
            _ => MistakeType::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MistakeType::None => "None",
            MistakeType::Decision => "Type A (Decision)",
            MistakeType::Execution => "Type B (Execution)",
            MistakeType::Forced => "Type C (Forced)",
        }
    }
}

impl<'de> Deserialize<'de> for MistakeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::String(label)) => MistakeType::from_label(&label),
            _ => MistakeType::None,
        })
    }
}

/// One logged decision point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, alias = "Phase", deserialize_with = "lenient_text")]
    pub phase: String,
    #[serde(default, alias = "DQ", deserialize_with = "lenient_number")]
    pub dq: Option<f64>,
    #[serde(default, alias = "EQ", deserialize_with = "lenient_number")]
    pub eq: Option<f64>,
    #[serde(default, alias = "CD", deserialize_with = "lenient_number")]
    pub cd: Option<f64>,
    #[serde(default, alias = "TA", deserialize_with = "lenient_number")]
    pub ta: Option<f64>,
    #[serde(default, alias = "LOP", deserialize_with = "lenient_number")]
    pub lop: Option<f64>,
    #[serde(default, alias = "Mistake Type", alias = "mistake_type")]
    pub mistake: MistakeType,
}

impl Action {
    pub fn new(dq: f64, eq: f64, cd: f64, ta: f64, lop: f64, mistake: MistakeType) -> Self {
        Self {
            phase: String::new(),
            dq: Some(dq),
            eq: Some(eq),
            cd: Some(cd),
            ta: Some(ta),
            lop: Some(lop),
            mistake,
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }
}

/// Weighted quality score before the mistake cap.
pub fn raw_score(action: &Action) -> f64 {
    let dq = field_or_neutral(action.dq);
    let eq = field_or_neutral(action.eq);
    let cd = field_or_neutral(action.cd);
    let ta = field_or_neutral(action.ta);
    let lop = field_or_neutral(action.lop);
    (2.0 * dq + 2.0 * eq + 1.5 * cd + 1.5 * ta + lop) / RAW_WEIGHT_TOTAL
}

/// Composite action value: the raw score capped by the mistake doctrine.
pub fn compute_cav(action: &Action) -> f64 {
    let cav = raw_score(action).min(action.mistake.cap());
    if cav.is_finite() {
        cav
    } else {
        tracing::debug!(phase = %action.phase, "non-finite CAV, using neutral value");
        NEUTRAL_VALUE
    }
}

fn field_or_neutral(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => NEUTRAL_VALUE,
    }
}

// Entry grids hand us numbers, numeric strings, blanks and nulls.
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mistake_labels_parse() {
        assert_eq!(MistakeType::from_label("Type A (Decision)"), MistakeType::Decision);
        assert_eq!(MistakeType::from_label("type b (execution)"), MistakeType::Execution);
        assert_eq!(MistakeType::from_label(" C "), MistakeType::Forced);
        assert_eq!(MistakeType::from_label("None"), MistakeType::None);
        assert_eq!(MistakeType::from_label("Type D (Mystery)"), MistakeType::None);
    }

    #[test]
    fn labels_round_trip_through_from_label() {
        for m in [
            MistakeType::None,
            MistakeType::Decision,
            MistakeType::Execution,
            MistakeType::Forced,
        ] {
            assert_eq!(MistakeType::from_label(m.label()), m);
        }
    }

    #[test]
    fn lenient_fields_accept_strings_and_garbage() {
        let raw = r#"{"DQ":"7.5","EQ":null,"CD":"n/a","TA":6,"Mistake Type":"Type B (Execution)"}"#;
        let action: Action = serde_json::from_str(raw).unwrap();
        assert_eq!(action.dq, Some(7.5));
        assert_eq!(action.eq, None);
        assert_eq!(action.cd, None);
        assert_eq!(action.ta, Some(6.0));
        assert_eq!(action.lop, None);
        assert_eq!(action.mistake, MistakeType::Execution);
    }
}
