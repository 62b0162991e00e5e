use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::contest::NO_NAME;

#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Problem {
    #[get = "pub"]
    id: ProblemId,
    #[get = "pub"]
    name: Option<String>,
    #[get = "pub"]
    url: Url,
    #[get_copy = "pub"]
    time_limit_ms: Option<u64>,
    #[get_copy = "pub"]
    memory_limit_kbyte: Option<u64>,
    #[get_copy = "pub"]
    source_limit_kbyte: Option<u64>,
    #[get = "pub"]
    inputs: Vec<String>,
    #[get = "pub"]
    outputs: Vec<String>,
}

impl Problem {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<ProblemId>,
        name: Option<String>,
        url: Url,
        time_limit_ms: Option<u64>,
        memory_limit_kbyte: Option<u64>,
        source_limit_kbyte: Option<u64>,
        inputs: Vec<String>,
        outputs: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name,
            url,
            time_limit_ms,
            memory_limit_kbyte,
            source_limit_kbyte,
            inputs,
            outputs,
        }
    }

    /// Sample input/output pairs, index-aligned.
    pub fn samples(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inputs
            .iter()
            .zip(self.outputs.iter())
            .map(|(i, o)| (i.as_str(), o.as_str()))
    }

    /// Field projection for display, gated on verbosity.
    pub fn project(&self, verbose: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("id", self.id.to_string()),
            ("url", self.url.to_string()),
        ];
        if verbose {
            pairs.insert(
                0,
                ("name", self.name.clone().unwrap_or_else(|| NO_NAME.to_owned())),
            );
            pairs.push(("time_limit_ms", fmt_limit(self.time_limit_ms)));
            pairs.push(("memory_limit_kbyte", fmt_limit(self.memory_limit_kbyte)));
            pairs.push(("source_limit_kbyte", fmt_limit(self.source_limit_kbyte)));
            pairs.push(("samples", self.inputs.len().to_string()));
        }
        pairs
    }
}

fn fmt_limit(limit: Option<u64>) -> String {
    limit.map_or_else(|| "-".to_owned(), |value| value.to_string())
}

/// Problem identifier, compared case-insensitively.
///
/// Display keeps the raw form since some sites address problems with
/// lowercase ids in their URLs.
#[derive(Serialize, Deserialize, Debug, Clone, Eq)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn normalize(&self) -> String {
        self.0.to_uppercase()
    }
}

impl PartialEq<ProblemId> for ProblemId {
    fn eq(&self, other: &ProblemId) -> bool {
        self.normalize() == other.normalize()
    }
}

impl PartialOrd for ProblemId {
    fn partial_cmp(&self, other: &ProblemId) -> Option<Ordering> {
        Some(self.normalize().cmp(&other.normalize()))
    }
}

impl Ord for ProblemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalize().cmp(&other.normalize())
    }
}

impl Hash for ProblemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalize().hash(state);
    }
}

impl<T: Into<String>> From<T> for ProblemId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl FromStr for ProblemId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ProblemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
