//! # Worker specifications.
//!
//! A [`WorkerSpec`] is parsed from one `<identifier>/<target>` entry, e.g.
//! `my-endpoint/localhost:3000`. A [`WorkerSet`] is the ordered, immutable
//! list of them built once at startup. Duplicate identifiers are accepted and
//! simply start two independent workers.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::workers::WorkerRef;

const DELIMITER: char = '/';

/// One `<identifier>/<target>` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkerSpec {
    identifier: String,
    target: String,
}

impl WorkerSpec {
    /// Builds a spec from its parts; both must be non-empty.
    pub fn new(identifier: impl Into<String>, target: impl Into<String>) -> Result<Self, ConfigError> {
        let (identifier, target) = (identifier.into(), target.into());
        if identifier.is_empty() || target.is_empty() {
            return Err(ConfigError::InvalidListener {
                entry: format!("{identifier}{DELIMITER}{target}"),
                reason: "identifier and target must be non-empty",
            });
        }
        Ok(Self { identifier, target })
    }

    /// The endpoint identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The address the worker forwards to.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl FromStr for WorkerSpec {
    type Err = ConfigError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ConfigError::InvalidListener {
            entry: entry.to_owned(),
            reason,
        };

        let mut parts = entry.split(DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(target), None) if !id.is_empty() && !target.is_empty() => {
                Ok(Self::new(id, target)?)
            }
            (_, _, Some(_)) => Err(invalid("expected exactly one '/'")),
            (_, None, _) => Err(invalid("expected format '<endpoint ID>/<forward addr>'")),
            _ => Err(invalid("identifier and target must be non-empty")),
        }
    }
}

impl fmt::Display for WorkerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DELIMITER}{}", self.identifier, self.target)
    }
}

/// Ordered collection of [`WorkerSpec`], never mutated after construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerSet {
    specs: Vec<WorkerSpec>,
}

impl WorkerSet {
    /// Parses every entry; fails on the first malformed one.
    pub fn parse<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = entries
            .into_iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<WorkerSpec>, _>>()?;
        Ok(Self { specs })
    }

    /// The specs, in insertion order.
    pub fn specs(&self) -> &[WorkerSpec] {
        &self.specs
    }

    /// Number of specs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Builds one worker per spec with `factory`.
    pub fn build<F>(&self, factory: F) -> Vec<WorkerRef>
    where
        F: FnMut(&WorkerSpec) -> WorkerRef,
    {
        self.specs.iter().map(factory).collect()
    }
}

impl FromIterator<WorkerSpec> for WorkerSet {
    fn from_iter<T: IntoIterator<Item = WorkerSpec>>(iter: T) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
