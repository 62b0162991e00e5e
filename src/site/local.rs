use itertools::Itertools as _;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::Conf;
use crate::fetch::PageCache;
use crate::model::{Contest, Problem};
use crate::site::{last_token, location_path, Site, SiteSpec};
use crate::{regex, Console, Result};

/// Substituted when the location grammar yields no contest id.
static FALLBACK_CONTEST_ID: &str = "local-contest";

lazy_static! {
    static ref BASE_URL: Url = Url::parse("http://localhost").unwrap();
}

/// Contest path grammar: opaque contest segment, optional problem segment.
fn pattern_contest() -> &'static Regex {
    regex!(r"/(?P<contest>[^/]+)(?:/(?P<problem>[^/]+))?")
}

fn pattern_problem() -> &'static Regex {
    regex!(r"[^/]+")
}

/// Offline processor: no network, every identifier is taken at face value.
/// Registered first so the matcher's fall-through lands here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Local {
    spec: SiteSpec,
}

impl Local {
    pub fn new() -> Self {
        Self {
            spec: SiteSpec::new("localhost", "Local", "local", None, None, None, None),
        }
    }

    fn contest_url(contest_id: &str) -> Url {
        let path = format!("/{}", contest_id);
        BASE_URL.join(&path).unwrap_or_else(|_| BASE_URL.clone())
    }

    fn problem_url(contest_url: &Url, problem_id: &str) -> Url {
        let url = format!("{}/{}", contest_url, problem_id);
        Url::parse(&url).unwrap_or_else(|_| contest_url.clone())
    }

    fn contest_id_of(path: &str) -> String {
        pattern_contest()
            .captures(path)
            .and_then(|caps| caps.name("contest"))
            .map_or(FALLBACK_CONTEST_ID, |m| m.as_str())
            .to_owned()
    }
}

impl Default for Local {
    fn default() -> Self {
        Self::new()
    }
}

impl Site for Local {
    fn spec(&self) -> &SiteSpec {
        &self.spec
    }

    fn match_contest(&self, conf: &Conf) -> Url {
        let path = location_path(conf);
        Self::contest_url(&Self::contest_id_of(&path))
    }

    fn get_contest(
        &self,
        url: &Url,
        _cache: &mut PageCache,
        _cnsl: &mut Console,
    ) -> Result<Contest> {
        let id = Self::contest_id_of(url.path());
        Ok(Contest::new(id.as_str(), Some(id.clone()), url.clone()))
    }

    fn match_problems(
        &self,
        conf: &Conf,
        _cache: &mut PageCache,
        _cnsl: &mut Console,
    ) -> Result<Vec<Url>> {
        let contest_url = self.match_contest(conf);

        let mut ids = Vec::new();
        let path = location_path(conf);
        if let Some(raw) = pattern_contest()
            .captures(&path)
            .and_then(|caps| caps.name("problem"))
        {
            ids.push(raw.as_str().to_owned());
        }
        for token in &conf.problems {
            if let Some(raw) = last_token(pattern_problem(), token) {
                ids.push(raw.to_owned());
            }
        }

        Ok(ids
            .iter()
            .map(|id| Self::problem_url(&contest_url, id))
            .sorted()
            .dedup()
            .collect())
    }

    fn get_problems(
        &self,
        urls: &[Url],
        _cache: &mut PageCache,
        _cnsl: &mut Console,
    ) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();
        for url in urls {
            let id = match pattern_contest()
                .captures(url.path())
                .and_then(|caps| caps.name("problem"))
            {
                Some(m) => m.as_str().to_owned(),
                None => continue,
            };
            problems.push(Problem::new(
                id.as_str(),
                Some(id.clone()),
                url.clone(),
                self.spec.time_limit_ms(),
                self.spec.memory_limit_kbyte(),
                self.spec.source_limit_kbyte(),
                Vec::new(),
                Vec::new(),
            ));
        }
        Ok(problems)
    }
}
