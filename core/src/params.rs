//! Design-parameter context.
//!
//! The parameter set is an open key → value mapping supplied by the design
//! and physics collaborators and extended by the cost pipeline itself
//! (learning multipliers, defaults, derived periods).
//!
//! RULE: Only the preparation step mutates parameters. The sampling loop
//! receives a `FrozenParams` snapshot and can never write to it.

use crate::error::{CostError, CostResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Numeric view of the value. Booleans count as 0/1 and numeric text
    /// is parsed; lists have no scalar value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Bool(b)   => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s)   => s.trim().parse().ok(),
            Self::List(_)   => None,
        }
    }

    /// Compare against a raw catalog cell (`Optional Value` columns).
    pub fn matches(&self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            Self::Number(v) => raw.parse::<f64>().map(|r| r == *v).unwrap_or(false),
            Self::Bool(b) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "1.0"  => *b,
                "false" | "0" | "0.0" => !*b,
                _ => false,
            },
            Self::Text(s) => s == raw,
            Self::List(_) => false,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self { Self::Number(v) }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self { Self::Number(v as f64) }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self { Self::Text(v.to_string()) }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self { Self::Text(v) }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b)   => write!(f, "{b}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s)   => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// The mutable parameter set, with a revision counter bumped on every write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, ParamValue>", into = "BTreeMap<String, ParamValue>")]
pub struct DesignParams {
    values:   BTreeMap<String, ParamValue>,
    revision: u64,
}

impl From<BTreeMap<String, ParamValue>> for DesignParams {
    fn from(values: BTreeMap<String, ParamValue>) -> Self {
        Self { values, revision: 0 }
    }
}

impl From<DesignParams> for BTreeMap<String, ParamValue> {
    fn from(params: DesignParams) -> Self {
        params.values
    }
}

impl DesignParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON object of parameters from disk.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.values.iter()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
        self.revision += 1;
    }

    /// Insert `value` only if `name` is absent. Returns true if it was inserted.
    pub fn set_default(&mut self, name: &str, value: impl Into<ParamValue>) -> bool {
        if self.contains(name) {
            return false;
        }
        self.set(name, value);
        true
    }

    /// Merge another table into this one, overwriting existing keys.
    pub fn merge<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, ParamValue)>,
    {
        for (name, value) in entries {
            self.set(name, value);
        }
    }

    /// A required numeric parameter.
    pub fn number(&self, name: &str) -> CostResult<f64> {
        let value = self.get(name).ok_or_else(|| CostError::ParameterNotFound {
            name: name.to_string(),
        })?;
        value.as_f64().ok_or_else(|| CostError::ParameterNotNumeric {
            name: name.to_string(),
        })
    }

    /// An optional numeric parameter; present but non-numeric is still an error.
    pub fn number_opt(&self, name: &str) -> CostResult<Option<f64>> {
        match self.get(name) {
            None => Ok(None),
            Some(_) => self.number(name).map(Some),
        }
    }

    pub fn number_or(&self, name: &str, default: f64) -> CostResult<f64> {
        Ok(self.number_opt(name)?.unwrap_or(default))
    }

    /// True if any parameter name contains `needle`, ignoring case.
    pub fn any_key_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.values.keys().any(|k| k.to_lowercase().contains(&needle))
    }

    /// Snapshot the current state for read-only use by the sampling loop.
    pub fn freeze(self) -> FrozenParams {
        FrozenParams(Arc::new(self))
    }
}

/// Immutable, cheaply clonable parameter snapshot.
#[derive(Debug, Clone)]
pub struct FrozenParams(Arc<DesignParams>);

impl Deref for FrozenParams {
    type Target = DesignParams;

    fn deref(&self) -> &DesignParams {
        &self.0
    }
}
