//! Build option sets and the configuration systems that accept them.
//!
//! A [`BuildOptionSet`] is what the caller asks for. An [`OptionSink`] is
//! the configuration system the request is applied to; it may reject any
//! value with [`ResolveError::UnsupportedOption`] and callers treat that
//! rejection as opaque.

use std::collections::{BTreeMap, BTreeSet};

use fftpkg_platform::SimdLevel;
use serde::{Deserialize, Serialize};

use crate::error::{ResolveError, Result};

/// A single option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Choice(String),
}

impl OptionValue {
    /// Spelling handed to a configuration system.
    pub fn as_value_string(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Choice(s) => s.clone(),
        }
    }
}

/// Caller-supplied option toggles (e.g., `with_openmp`, `with_mkl`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildOptionSet {
    values: BTreeMap<String, OptionValue>,
}

impl BuildOptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bool(mut self, name: &str, value: bool) -> Self {
        self.set(name, OptionValue::Bool(value));
        self
    }

    pub fn with_choice(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, OptionValue::Choice(value.into()));
        self
    }

    pub fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Boolean value of `name`. Choices spelled `true`/`false`/`on`/`off`
    /// are accepted as well.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Choice(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Some(true),
                "false" | "off" | "no" | "0" => Some(false),
                _ => None,
            },
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.get_bool(name).unwrap_or(default)
    }

    pub fn choice(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            OptionValue::Choice(s) => Some(s),
            OptionValue::Bool(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A configuration system that accepts or rejects option values.
pub trait OptionSink {
    /// Apply `value` to `option`. Rejection is reported as
    /// [`ResolveError::UnsupportedOption`].
    fn apply(&mut self, option: &str, value: &str) -> Result<()>;
}

/// An option sink backed by a declared set of accepted values per option,
/// the way a package declares its options to the dependency manager.
#[derive(Debug, Clone, Default)]
pub struct DeclaredOptions {
    accepted: BTreeMap<String, BTreeSet<String>>,
    applied: BTreeMap<String, String>,
}

impl DeclaredOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `option` with its accepted values. Re-declaring replaces
    /// the previous set.
    pub fn declare<I, S>(mut self, option: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.insert(
            option.to_string(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Declare a boolean option.
    pub fn declare_bool(self, option: &str) -> Self {
        self.declare(option, ["true", "false"])
    }

    pub fn accepts(&self, option: &str, value: &str) -> bool {
        self.accepted
            .get(option)
            .is_some_and(|values| values.contains(value))
    }

    /// Drop SIMD levels of `option` that the host CPU cannot execute.
    pub fn restrict_simd_to_host(mut self, option: &str) -> Self {
        if let Some(values) = self.accepted.get_mut(option) {
            values.retain(|v| match v.parse::<SimdLevel>() {
                Ok(level) => level.host_supports(),
                Err(_) => true,
            });
        }
        self
    }

    /// Value most recently accepted for `option`.
    pub fn applied(&self, option: &str) -> Option<&str> {
        self.applied.get(option).map(String::as_str)
    }

    /// Every accepted assignment, in option-name order.
    pub fn applied_values(&self) -> &BTreeMap<String, String> {
        &self.applied
    }

    /// Declared options with their accepted values.
    pub fn declared(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.accepted.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl OptionSink for DeclaredOptions {
    fn apply(&mut self, option: &str, value: &str) -> Result<()> {
        if !self.accepts(option, value) {
            return Err(ResolveError::UnsupportedOption {
                option: option.to_string(),
                value: value.to_string(),
            });
        }
        self.applied.insert(option.to_string(), value.to_string());
        Ok(())
    }
}
