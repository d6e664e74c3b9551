//! Package references of the form `name/version[@user[/channel]]`.
//!
//! Versions are opaque strings: upstream packages use schemes like
//! `cci.20210511` or `0.0.0.cci.20240801` that are not semver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// A reference to a package in the dependency manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Requirement {
    pub name: String,
    pub version: String,
    pub user: Option<String>,
    pub channel: Option<String>,
}

impl Requirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            user: None,
            channel: None,
        }
    }
}

fn valid_component(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

impl FromStr for Requirement {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ResolveError::InvalidReference {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        let (package, namespace) = match s.trim().split_once('@') {
            Some((p, ns)) => (p, Some(ns)),
            None => (s.trim(), None),
        };
        let (name, version) = package
            .split_once('/')
            .ok_or_else(|| invalid("expected name/version"))?;
        if !valid_component(name) {
            return Err(invalid("bad package name"));
        }
        if !valid_component(version) {
            return Err(invalid("bad version"));
        }

        let (user, channel) = match namespace {
            None | Some("") => (None, None),
            Some(ns) => match ns.split_once('/') {
                Some((u, c)) if valid_component(u) && valid_component(c) => {
                    (Some(u.to_string()), Some(c.to_string()))
                }
                None if valid_component(ns) => (Some(ns.to_string()), None),
                _ => return Err(invalid("bad user/channel")),
            },
        };

        Ok(Requirement {
            name: name.to_string(),
            version: version.to_string(),
            user,
            channel,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)?;
        match (&self.user, &self.channel) {
            (Some(u), Some(c)) => write!(f, "@{u}/{c}"),
            (Some(u), None) => write!(f, "@{u}"),
            _ => Ok(()),
        }
    }
}

impl TryFrom<String> for Requirement {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Requirement> for String {
    fn from(r: Requirement) -> Self {
        r.to_string()
    }
}
