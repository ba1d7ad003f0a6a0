//! Form selection state: the four dependent dropdowns plus the
//! feasibility-study input, and the payloads built from them.

use std::fmt;

use serde_json::{json, Value};

/// A dropdown option: the wire value and the label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

const fn choice(value: &'static str, label: &'static str) -> Choice {
    Choice { value, label }
}

pub const ARCHITECTURES: &[Choice] = &[
    choice("p2p", "Punto a Punto (P2P)"),
    choice("p2mp", "Punto a Multipunto (P2MP)"),
];

pub const P2P_TOPOLOGIES: &[Choice] = &[
    choice("estrella", "Estrella"),
    choice("anillo", "Anillo"),
    choice("malla", "Malla"),
];

pub const PON_TECHNOLOGIES: &[Choice] = &[
    choice("gpon", "GPON"),
    choice("epon", "EPON"),
    choice("xgpon", "XG-PON"),
    choice("10gepon", "10G-EPON"),
];

pub const SPLITS: &[Choice] = &[
    choice("1:8", "1:8"),
    choice("1:16", "1:16"),
    choice("1:32", "1:32"),
    choice("1:64", "1:64"),
];

pub const ENFOQUES: &[Choice] = &[
    choice("aereo", "Aéreo"),
    choice("subterraneo", "Subterráneo"),
    choice("mixto", "Mixto"),
];

/// Options for the dependent dropdown. Unknown architectures get none.
pub fn subconfig_options(arquitectura: &str) -> &'static [Choice] {
    match arquitectura {
        "p2p" => P2P_TOPOLOGIES,
        "p2mp" => PON_TECHNOLOGIES,
        _ => &[],
    }
}

/// Heading shown above the dependent dropdown.
pub fn subconfig_heading(arquitectura: &str) -> Option<&'static str> {
    match arquitectura {
        "p2p" => Some("Topología"),
        "p2mp" => Some("Tecnología PON"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeasibilityError {
    Empty,
    NotANumber,
    Negative,
}

impl fmt::Display for FeasibilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // one user-facing message for every local rejection
        write!(f, "Ingresa un número válido.")
    }
}

/// Empty, non-numeric, and negative inputs are all rejected locally.
pub fn validate_feasibility(input: &str) -> Result<f64, FeasibilityError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(FeasibilityError::Empty);
    }
    let n: f64 = input.parse().map_err(|_| FeasibilityError::NotANumber)?;
    if !n.is_finite() {
        return Err(FeasibilityError::NotANumber);
    }
    if n < 0.0 {
        return Err(FeasibilityError::Negative);
    }
    Ok(n)
}

/// Integral values serialize without a trailing `.0`.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// Current selections, read on demand when a payload is built.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub arquitectura: Option<Choice>,
    pub subconfig: Option<Choice>,
    pub split: Option<Choice>,
    pub enfoque: Option<Choice>,
    /// Raw text of the feasibility-study input.
    pub factibilidad: String,
}

impl FormState {
    pub fn feasibility(&self) -> Result<f64, FeasibilityError> {
        validate_feasibility(&self.factibilidad)
    }

    /// Metadata block attached to a collect payload. Missing selections and
    /// an invalid feasibility input serialize as null.
    pub fn meta(&self) -> Value {
        json!({
            "estudio_factibilidad": self.feasibility().ok().map(number),
            "split": self.split.map(|c| c.value),
            "split_label": self.split.map(|c| c.label),
            "enfoque": self.enfoque.map(|c| c.value),
            "enfoque_label": self.enfoque.map(|c| c.label),
            "arquitectura": self.arquitectura.map(|c| c.value),
            "arquitectura_label": self.arquitectura.map(|c| c.label),
            "subconfig": self.subconfig.map(|c| c.value),
            "subconfig_label": self.subconfig.map(|c| c.label),
        })
    }

    /// Settings payload for the save endpoint. Fails on an invalid
    /// feasibility input; the caller reports the validation message.
    pub fn config_payload(&self) -> Result<Value, FeasibilityError> {
        let n = self.feasibility()?;
        Ok(json!({
            "estudio_factibilidad": number(n),
            "split": self.split.map(|c| c.value),
            "split_label": self.split.map(|c| c.label),
            "enfoque": self.enfoque.map(|c| c.value),
            "enfoque_label": self.enfoque.map(|c| c.label),
            "arquitectura": self.arquitectura.map(|c| c.value),
            "arquitectura_label": self.arquitectura.map(|c| c.label),
            "subconfig": self.subconfig.map(|c| c.value),
            "subconfig_label": self.subconfig.map(|c| c.label),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p2p_yields_topologies() {
        let values: Vec<&str> = subconfig_options("p2p").iter().map(|c| c.value).collect();
        assert_eq!(values, ["estrella", "anillo", "malla"]);
        assert_eq!(subconfig_heading("p2p"), Some("Topología"));
    }

    #[test]
    fn p2mp_yields_pon_technologies() {
        let values: Vec<&str> = subconfig_options("p2mp").iter().map(|c| c.value).collect();
        assert_eq!(values, ["gpon", "epon", "xgpon", "10gepon"]);
        assert_eq!(subconfig_heading("p2mp"), Some("Tecnología PON"));
    }

    #[test]
    fn unknown_architecture_yields_nothing() {
        assert!(subconfig_options("").is_empty());
        assert!(subconfig_options("mesh").is_empty());
        assert_eq!(subconfig_heading("mesh"), None);
    }

    #[test]
    fn feasibility_rejections() {
        assert_eq!(validate_feasibility(""), Err(FeasibilityError::Empty));
        assert_eq!(validate_feasibility("   "), Err(FeasibilityError::Empty));
        assert_eq!(validate_feasibility("abc"), Err(FeasibilityError::NotANumber));
        assert_eq!(validate_feasibility("NaN"), Err(FeasibilityError::NotANumber));
        assert_eq!(validate_feasibility("-1"), Err(FeasibilityError::Negative));
    }

    #[test]
    fn feasibility_accepts_numbers() {
        assert_eq!(validate_feasibility("150"), Ok(150.0));
        assert_eq!(validate_feasibility("0"), Ok(0.0));
        assert_eq!(validate_feasibility(" 12.5 "), Ok(12.5));
    }

    #[test]
    fn meta_with_empty_form_is_all_null() {
        let meta = FormState::default().meta();
        assert!(meta["estudio_factibilidad"].is_null());
        assert!(meta["split"].is_null());
        assert!(meta["arquitectura_label"].is_null());
    }

    #[test]
    fn meta_carries_value_and_label_pairs() {
        let form = FormState {
            arquitectura: Some(ARCHITECTURES[1]),
            subconfig: Some(PON_TECHNOLOGIES[0]),
            split: Some(SPLITS[2]),
            enfoque: Some(ENFOQUES[0]),
            factibilidad: "150".to_string(),
        };
        let meta = form.meta();
        assert_eq!(meta["arquitectura"], "p2mp");
        assert_eq!(meta["arquitectura_label"], "Punto a Multipunto (P2MP)");
        assert_eq!(meta["subconfig"], "gpon");
        assert_eq!(meta["split"], "1:32");
        assert_eq!(meta["enfoque_label"], "Aéreo");
        assert_eq!(meta["estudio_factibilidad"], 150);
    }

    #[test]
    fn config_payload_requires_valid_feasibility() {
        let mut form = FormState {
            factibilidad: "-1".to_string(),
            ..FormState::default()
        };
        assert_eq!(form.config_payload(), Err(FeasibilityError::Negative));

        form.factibilidad = "80".to_string();
        let payload = form.config_payload().unwrap();
        assert_eq!(payload["estudio_factibilidad"], 80);
        assert!(payload["subconfig_label"].is_null());
    }
}
