//! Taint query specification
//!
//! A named query: which qualified symbols produce tainted data, which must
//! never receive it, and which launder it. Matching is exact-string on the
//! demangled, typed signature; there is no wildcard or subtype matching, so
//! a specification entry either names a symbol precisely or never fires.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of one call site's callee against a specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallSiteClass {
    Source,
    Sink,
    Sanitizer,
    Plain,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecificationError {
    /// A symbol may appear in exactly one role
    #[error("symbol `{symbol}` appears in both `{first}` and `{second}` roles")]
    OverlappingRoles {
        symbol: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("invalid specification: {0}")]
    Parse(String),
}

/// The user's source/sink/sanitizer symbol sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    sources: BTreeSet<String>,
    sinks: BTreeSet<String>,
    sanitizers: BTreeSet<String>,
}

impl Specification {
    pub fn new(
        name: impl Into<String>,
        sources: BTreeSet<String>,
        sinks: BTreeSet<String>,
        sanitizers: BTreeSet<String>,
    ) -> Result<Self, SpecificationError> {
        let spec = Self {
            name: name.into(),
            sources,
            sinks,
            sanitizers,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Build from slices, for direct construction in drivers and tests
    pub fn from_symbols(
        name: impl Into<String>,
        sources: &[&str],
        sinks: &[&str],
        sanitizers: &[&str],
    ) -> Result<Self, SpecificationError> {
        Self::new(
            name,
            sources.iter().map(|s| s.to_string()).collect(),
            sinks.iter().map(|s| s.to_string()).collect(),
            sanitizers.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn from_json(text: &str) -> Result<Self, SpecificationError> {
        let spec: Self =
            serde_json::from_str(text).map_err(|e| SpecificationError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_yaml(text: &str) -> Result<Self, SpecificationError> {
        let spec: Self =
            serde_yaml::from_str(text).map_err(|e| SpecificationError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), SpecificationError> {
        let roles: [(&BTreeSet<String>, &'static str); 3] = [
            (&self.sources, "source"),
            (&self.sinks, "sink"),
            (&self.sanitizers, "sanitizer"),
        ];
        for i in 0..roles.len() {
            for j in (i + 1)..roles.len() {
                if let Some(symbol) = roles[i].0.intersection(roles[j].0).next() {
                    return Err(SpecificationError::OverlappingRoles {
                        symbol: symbol.clone(),
                        first: roles[i].1,
                        second: roles[j].1,
                    });
                }
            }
        }
        Ok(())
    }

    /// Exact-match classification of a qualified callee symbol
    pub fn classify(&self, symbol: &str) -> CallSiteClass {
        if self.sources.contains(symbol) {
            CallSiteClass::Source
        } else if self.sinks.contains(symbol) {
            CallSiteClass::Sink
        } else if self.sanitizers.contains(symbol) {
            CallSiteClass::Sanitizer
        } else {
            CallSiteClass::Plain
        }
    }

    pub fn sources(&self) -> &BTreeSet<String> {
        &self.sources
    }

    pub fn sinks(&self) -> &BTreeSet<String> {
        &self.sinks
    }

    pub fn sanitizers(&self) -> &BTreeSet<String> {
        &self.sanitizers
    }
}
