use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use getset::Getters;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::regex;

/// Shown in place of a contest name that could not be extracted.
pub static NO_NAME: &str = "< no name >";

#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Contest {
    id: ContestId,
    name: String,
    url: Url,
}

impl Contest {
    pub fn new(id: impl Into<ContestId>, name: Option<String>, url: Url) -> Self {
        Self {
            id: id.into(),
            name: name.unwrap_or_else(|| NO_NAME.to_owned()),
            url,
        }
    }

    /// Field projection for display, gated on verbosity.
    pub fn project(&self, verbose: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("id", self.id.to_string()),
            ("url", self.url.to_string()),
        ];
        if verbose {
            pairs.insert(0, ("name", self.name.clone()));
        }
        pairs
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq)]
pub struct ContestId(String);

impl ContestId {
    pub fn normalize(&self) -> String {
        regex!(r"[-_]").replace_all(&self.0, "").to_lowercase()
    }
}

impl PartialEq<ContestId> for ContestId {
    fn eq(&self, other: &ContestId) -> bool {
        self.normalize() == other.normalize()
    }
}

impl PartialOrd for ContestId {
    fn partial_cmp(&self, other: &ContestId) -> Option<Ordering> {
        Some(self.normalize().cmp(&other.normalize()))
    }
}

impl Ord for ContestId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalize().cmp(&other.normalize())
    }
}

impl Hash for ContestId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalize().hash(state);
    }
}

impl<T: Into<String>> From<T> for ContestId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl FromStr for ContestId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ContestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
