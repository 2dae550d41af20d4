//! Module parameters: typed, validated values set from free-text console input.
//!
//! Validation happens when a value is set; the required check happens only
//! when the module is about to run (see [`ParameterStore::check_required`]).

use regex::Regex;
use serde_json::{Map, Value};
use std::net::IpAddr;
use thiserror::Error;

use crate::error::ParameterValidationError;

/// Value type of a parameter. Each kind converts a raw string into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Port,
    /// IPv4/IPv6 address or DNS host name.
    Host,
    Choice(Vec<String>),
}

impl ParameterKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer { .. } => "integer",
            Self::Boolean => "boolean",
            Self::Port => "port",
            Self::Host => "host",
            Self::Choice(_) => "choice",
        }
    }

    /// Convert `raw` into a typed value or explain why it is rejected.
    pub fn convert(&self, raw: &str) -> Result<Value, String> {
        match self {
            Self::String => Ok(Value::String(raw.to_string())),
            Self::Integer { min, max } => {
                let n: i64 = raw
                    .parse()
                    .map_err(|_| "expected an integer".to_string())?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("must be >= {}", min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("must be <= {}", max));
                    }
                }
                Ok(Value::from(n))
            }
            Self::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err("expected true/false".to_string()),
            },
            Self::Port => match raw.parse::<u16>() {
                Ok(p) if p > 0 => Ok(Value::from(p)),
                _ => Err("expected a port number between 1 and 65535".to_string()),
            },
            Self::Host => {
                if raw.parse::<IpAddr>().is_ok() || is_hostname(raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err("expected an IP address or host name".to_string())
                }
            }
            Self::Choice(choices) => {
                if choices.iter().any(|c| c == raw) {
                    Ok(Value::String(raw.to_string()))
                } else {
                    Err(format!("expected one of: {}", choices.join(", ")))
                }
            }
        }
    }
}

fn is_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// A named configuration value owned by a module.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    description: String,
    kind: ParameterKind,
    pattern: Option<Regex>,
    required: bool,
    default: Option<Value>,
    value: Option<Value>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            pattern: None,
            required: false,
            default: None,
            value: None,
        }
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Extra constraint on the raw input, checked before type conversion.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Validate `raw` as the default; the current value starts out equal to it.
    pub fn with_default(mut self, raw: &str) -> Result<Self, ParameterValidationError> {
        let value = self.validate(raw)?;
        self.default = Some(value.clone());
        self.value = Some(value);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Holds a non-empty value.
    pub fn is_set(&self) -> bool {
        match &self.value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Run the validator over a candidate string without storing anything.
    pub fn validate(&self, raw: &str) -> Result<Value, ParameterValidationError> {
        let invalid = |reason: String| ParameterValidationError::InvalidValue {
            name: self.name.clone(),
            value: raw.to_string(),
            reason,
        };
        if let Some(ref re) = self.pattern {
            if !re.is_match(raw) {
                return Err(invalid(format!("does not match pattern {}", re.as_str())));
            }
        }
        self.kind.convert(raw).map_err(invalid)
    }
}

/// Rendering used by listings: strings verbatim, unset as empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parameter '{0}' is declared more than once")]
pub struct DuplicateParameter(pub String);

/// Parameters of one module, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: Vec<Parameter>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, param: Parameter) -> Result<(), DuplicateParameter> {
        if self.get(param.name()).is_some() {
            return Err(DuplicateParameter(param.name().to_string()));
        }
        self.params.push(param);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Parameter, ParameterValidationError> {
        self.params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ParameterValidationError::UnknownParameter(name.to_string()))
    }

    /// Validate and store. On error the previous value is left untouched.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), ParameterValidationError> {
        let param = self.get_mut(name)?;
        let value = param.validate(raw)?;
        param.value = Some(value);
        Ok(())
    }

    /// Reset to the declared default (or unset when there is none).
    pub fn unset(&mut self, name: &str) -> Result<(), ParameterValidationError> {
        let param = self.get_mut(name)?;
        param.value = param.default.clone();
        Ok(())
    }

    /// First required parameter without a value, in declaration order.
    pub fn check_required(&self) -> Result<(), ParameterValidationError> {
        match self.params.iter().find(|p| p.required && !p.is_set()) {
            Some(p) => Err(ParameterValidationError::MissingRequired(p.name.clone())),
            None => Ok(()),
        }
    }

    /// Current values as a JSON object; unset parameters map to null.
    pub fn values(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.value.clone().unwrap_or(Value::Null)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        let mut store = ParameterStore::new();
        store
            .declare(Parameter::new("target", ParameterKind::Host).required(true))
            .unwrap();
        store
            .declare(
                Parameter::new("port", ParameterKind::Port)
                    .with_default("80")
                    .unwrap(),
            )
            .unwrap();
        store
            .declare(Parameter::new(
                "retries",
                ParameterKind::Integer {
                    min: Some(0),
                    max: Some(10),
                },
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_set_converts_to_typed_value() {
        let mut s = store();
        s.set("port", "8080").unwrap();
        assert_eq!(s.get("port").unwrap().value(), Some(&Value::from(8080)));
        s.set("retries", "3").unwrap();
        assert_eq!(s.values()["retries"], Value::from(3));
    }

    #[test]
    fn test_rejected_set_keeps_previous_value() {
        let mut s = store();
        s.set("port", "443").unwrap();
        let err = s.set("port", "bad").unwrap_err();
        assert!(matches!(err, ParameterValidationError::InvalidValue { ref name, .. } if name == "port"));
        assert_eq!(s.get("port").unwrap().value(), Some(&Value::from(443)));
    }

    #[test]
    fn test_unknown_parameter() {
        let mut s = store();
        assert_eq!(
            s.set("nope", "1"),
            Err(ParameterValidationError::UnknownParameter("nope".into()))
        );
    }

    #[test]
    fn test_integer_bounds() {
        let mut s = store();
        assert!(s.set("retries", "11").is_err());
        assert!(s.set("retries", "-1").is_err());
        assert!(s.set("retries", "10").is_ok());
    }

    #[test]
    fn test_check_required_only_at_run_time() {
        let mut s = store();
        assert_eq!(
            s.check_required(),
            Err(ParameterValidationError::MissingRequired("target".into()))
        );
        s.set("target", "10.0.0.1").unwrap();
        assert!(s.check_required().is_ok());
    }

    #[test]
    fn test_unset_restores_default() {
        let mut s = store();
        s.set("port", "22").unwrap();
        s.unset("port").unwrap();
        assert_eq!(s.get("port").unwrap().value(), Some(&Value::from(80)));
        s.set("target", "example.org").unwrap();
        s.unset("target").unwrap();
        assert!(!s.get("target").unwrap().is_set());
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut s = store();
        let err = s
            .declare(Parameter::new("port", ParameterKind::String))
            .unwrap_err();
        assert_eq!(err, DuplicateParameter("port".into()));
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_host_and_boolean_kinds() {
        assert!(ParameterKind::Host.convert("::1").is_ok());
        assert!(ParameterKind::Host.convert("router.local").is_ok());
        assert!(ParameterKind::Host.convert("bad host").is_err());
        assert!(ParameterKind::Host.convert("-x.com").is_err());
        assert_eq!(ParameterKind::Boolean.convert("Yes"), Ok(Value::Bool(true)));
        assert!(ParameterKind::Boolean.convert("maybe").is_err());
        assert!(ParameterKind::Port.convert("0").is_err());
    }

    #[test]
    fn test_choice_and_pattern() {
        let p = Parameter::new(
            "mode",
            ParameterKind::Choice(vec!["fast".into(), "slow".into()]),
        );
        assert!(p.validate("fast").is_ok());
        assert!(p.validate("medium").is_err());

        let p = Parameter::new("mac", ParameterKind::String)
            .with_pattern(Regex::new(r"^([0-9a-f]{2}:){5}[0-9a-f]{2}$").unwrap());
        assert!(p.validate("aa:bb:cc:dd:ee:ff").is_ok());
        assert!(p.validate("aa:bb").is_err());
    }

    #[test]
    fn test_empty_string_is_not_set() {
        let mut s = ParameterStore::new();
        s.declare(Parameter::new("name", ParameterKind::String).required(true))
            .unwrap();
        s.set("name", "").unwrap();
        assert!(s.check_required().is_err());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(None), "");
        assert_eq!(display_value(Some(&Value::from("x"))), "x");
        assert_eq!(display_value(Some(&Value::from(5))), "5");
    }
}
