use itertools::Itertools as _;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::Conf;
use crate::fetch::PageCache;
use crate::model::{Contest, Problem};
use crate::site::{last_token, location_path, ElementRefExt as _, Site, SiteSpec};
use crate::{regex, select, Console, Result};

lazy_static! {
    static ref BASE_URL: Url = Url::parse("http://www.spoj.com").unwrap();
}

/// Archive path grammar: problem id with an optional "/problems" prefix.
fn pattern_problem_path() -> &'static Regex {
    regex!(r"(?:/problems)?/(?P<problem>[a-zA-Z0-9]+)")
}

fn pattern_problem() -> &'static Regex {
    regex!(r"[a-zA-Z0-9]+")
}

/// Spoj is archive-style: there is no contest concept, so the contest is a
/// fixed synthetic record and problems are addressed directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spoj {
    spec: SiteSpec,
}

impl Spoj {
    pub fn new() -> Self {
        Self {
            spec: SiteSpec::new(
                "www.spoj.com",
                "Sphere online judge",
                "spoj",
                None,
                None,
                None,
                Some("[Spoj] Fetching only a subset of problems is supported!"),
            ),
        }
    }

    fn problem_url(problem_id: &str) -> Url {
        let path = format!("/problems/{}", problem_id);
        BASE_URL.join(&path).unwrap_or_else(|_| BASE_URL.clone())
    }
}

impl Default for Spoj {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracted limit cell, with the unit suffix stripped.
fn parse_scaled(text: &str, suffix: &str, scale: f64) -> Option<u64> {
    text.trim()
        .strip_suffix(suffix)?
        .trim()
        .parse::<f64>()
        .ok()
        .map(|value| (value * scale) as u64)
}

impl Site for Spoj {
    fn spec(&self) -> &SiteSpec {
        &self.spec
    }

    fn match_contest(&self, _conf: &Conf) -> Url {
        BASE_URL.clone()
    }

    fn get_contest(
        &self,
        url: &Url,
        _cache: &mut PageCache,
        _cnsl: &mut Console,
    ) -> Result<Contest> {
        Ok(Contest::new(
            "spoj-problems",
            Some("Spoj problems archive".to_owned()),
            url.clone(),
        ))
    }

    fn match_problems(
        &self,
        conf: &Conf,
        _cache: &mut PageCache,
        _cnsl: &mut Console,
    ) -> Result<Vec<Url>> {
        let mut ids = Vec::new();

        let path = location_path(conf);
        if let Some(raw) = pattern_problem_path()
            .captures(&path)
            .and_then(|caps| caps.name("problem"))
        {
            ids.push(raw.as_str().to_uppercase());
        }

        for token in &conf.problems {
            if let Some(raw) = last_token(pattern_problem(), token) {
                ids.push(raw.to_uppercase());
            }
        }

        Ok(ids
            .iter()
            .map(|id| Self::problem_url(id))
            .sorted()
            .dedup()
            .collect())
    }

    fn get_problems(
        &self,
        urls: &[Url],
        cache: &mut PageCache,
        cnsl: &mut Console,
    ) -> Result<Vec<Problem>> {
        let mut problems = Vec::new();
        for url in urls {
            let id = match pattern_problem_path()
                .captures(url.path())
                .and_then(|caps| caps.name("problem"))
            {
                Some(m) => m.as_str().to_owned(),
                None => continue,
            };
            let page = cache.get(url, cnsl)?;
            if !page.is_success() {
                cnsl.warn(&format!("Problem \"{}\" does not exist on Spoj!", id))?;
                continue;
            }
            let html = page.html();
            let name = html
                .select(select!("#problem-name"))
                .next()
                .map(|elem| elem.inner_text().trim().to_owned())
                .filter(|name| !name.is_empty());
            let time_limit_ms = html
                .select(select!("#problem-meta tbody tr:nth-child(3) td:nth-child(2)"))
                .next()
                .and_then(|elem| parse_scaled(&elem.inner_text(), "s", 1000.0));
            let source_limit_kbyte = html
                .select(select!("#problem-meta tbody tr:nth-child(4) td:nth-child(2)"))
                .next()
                .and_then(|elem| parse_scaled(&elem.inner_text(), "B", 0.001));
            let memory_limit_kbyte = html
                .select(select!("#problem-meta tbody tr:nth-child(5) td:nth-child(2)"))
                .next()
                .and_then(|elem| parse_scaled(&elem.inner_text(), "MB", 1024.0));
            let pres: Vec<String> = html
                .select(select!("#problem-body pre"))
                .map(|elem| elem.joined_text("\n").trim().to_owned())
                .collect();
            let inputs: Vec<String> = pres.iter().step_by(2).cloned().collect();
            let outputs: Vec<String> = pres.iter().skip(1).step_by(2).cloned().collect();

            // strict policy: a problem is kept only when every field came out
            let complete = name.is_some()
                && time_limit_ms.is_some()
                && source_limit_kbyte.is_some()
                && memory_limit_kbyte.is_some()
                && !inputs.is_empty()
                && !outputs.is_empty();
            if complete {
                problems.push(Problem::new(
                    id,
                    name,
                    url.clone(),
                    time_limit_ms,
                    memory_limit_kbyte,
                    source_limit_kbyte,
                    inputs,
                    outputs,
                ));
            } else {
                cnsl.warn(&format!("Problem \"{}\" not fetched successfully!", id))?;
            }
        }
        Ok(problems)
    }
}
