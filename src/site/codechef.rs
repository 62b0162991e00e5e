use std::collections::BTreeSet;

use itertools::Itertools as _;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::Conf;
use crate::fetch::PageCache;
use crate::model::{Contest, Problem};
use crate::site::{location_path, parse_limit, parse_or, ElementRefExt as _, Site, SiteSpec};
use crate::{regex, select, Console, Result};

/// Substituted when the location grammar yields no contest id.
static FALLBACK_CONTEST_ID: &str = "404";

lazy_static! {
    static ref BASE_URL: Url = Url::parse("https://www.codechef.com").unwrap();
}

/// Contest path grammar: alphanumeric contest id, optional problem id with
/// an optional "problems/" prefix.
fn pattern_contest() -> &'static Regex {
    regex!(r"/(?P<contest>[a-zA-Z0-9]+)(?:/(?:problems/)?(?P<problem>[a-zA-Z0-9]+))?")
}

fn pattern_problem() -> &'static Regex {
    regex!(r"[a-zA-Z0-9]+")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codechef {
    spec: SiteSpec,
}

impl Codechef {
    pub fn new() -> Self {
        Self {
            spec: SiteSpec::new(
                "www.codechef.com",
                "CodeChef",
                "codechef",
                None,
                Some(262_144),
                Some(50),
                Some("[CodeChef] Fetching test inputs/outputs not supported!"),
            ),
        }
    }

    /// CodeChef problems are coded with free alphanumeric sequences, so raw
    /// tokens resolve against the contest's available ids: a positive
    /// integer is a 1-based ordinal, a multi-letter token must literally
    /// match an available id (uppercased), and a single letter is a 0-based
    /// alphabetic ordinal. The result is deduplicated and sorted.
    fn select_ids(tokens: &[String], available: &[String]) -> Vec<String> {
        let mut selected = BTreeSet::new();
        for token in tokens {
            let mut index = None;
            if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
                index = token.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            } else if token.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => {
                        index = Some(c.to_ascii_lowercase() as usize - 'a' as usize);
                    }
                    (Some(_), Some(_)) => {
                        let upper = token.to_uppercase();
                        if available.contains(&upper) {
                            selected.insert(upper);
                        }
                    }
                    _ => {}
                }
            }
            if let Some(index) = index {
                if let Some(id) = available.get(index) {
                    selected.insert(id.clone());
                }
            }
        }
        selected.into_iter().collect()
    }

    fn contest_url(contest_id: &str) -> Url {
        let path = format!("/{}", contest_id.to_uppercase());
        BASE_URL.join(&path).unwrap_or_else(|_| BASE_URL.clone())
    }

    fn problem_url(contest_url: &Url, problem_id: &str) -> Url {
        parse_or(
            &format!("{}/problems/{}", contest_url, problem_id),
            contest_url,
        )
    }

    fn contest_id_of(path: &str) -> String {
        pattern_contest()
            .captures(path)
            .and_then(|caps| caps.name("contest"))
            .map_or(FALLBACK_CONTEST_ID, |m| m.as_str())
            .to_owned()
    }
}

impl Default for Codechef {
    fn default() -> Self {
        Self::new()
    }
}

impl Site for Codechef {
    fn spec(&self) -> &SiteSpec {
        &self.spec
    }

    fn match_contest(&self, conf: &Conf) -> Url {
        let path = location_path(conf);
        Self::contest_url(&Self::contest_id_of(&path))
    }

    fn get_contest(&self, url: &Url, cache: &mut PageCache, cnsl: &mut Console) -> Result<Contest> {
        let id = Self::contest_id_of(url.path());
        let page = cache.get(url, cnsl)?;
        let mut name = None;
        if page.is_success() {
            let html = page.html();
            name = html
                .select(select!("head title"))
                .next()
                .map(|elem| elem.inner_text().trim().to_owned())
                .filter(|name| !name.is_empty());
        }
        Ok(Contest::new(id, name, url.clone()))
    }

    fn match_problems(
        &self,
        conf: &Conf,
        cache: &mut PageCache,
        cnsl: &mut Console,
    ) -> Result<Vec<Url>> {
        let contest_url = self.match_contest(conf);

        let page = cache.get(&contest_url, cnsl)?;
        if !page.is_success() {
            cnsl.warn(&format!("Unable to fetch: {}", contest_url))?;
            return Ok(vec![]);
        }
        let html = page.html();
        let available: Vec<String> = html
            .select(select!(".problems .problemrow [title^=\"Submit\"]"))
            .map(|elem| elem.inner_text().trim().to_owned())
            .collect();

        let mut tokens = Vec::new();
        let path = location_path(conf);
        if let Some(raw) = pattern_contest()
            .captures(&path)
            .and_then(|caps| caps.name("problem"))
        {
            tokens.push(raw.as_str().to_owned());
        }
        for problem in &conf.problems {
            tokens.extend(
                pattern_problem()
                    .find_iter(problem)
                    .map(|m| m.as_str().to_owned()),
            );
        }

        let ids = if tokens.is_empty() {
            available.clone()
        } else {
            Self::select_ids(&tokens, &available)
        };

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
        cache: &mut PageCache,
        cnsl: &mut Console,
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
            let page = cache.get(url, cnsl)?;
            if !page.is_success() {
                continue;
            }
            let html = page.html();
            let name = html
                .select(select!(".problem-info .title"))
                .next()
                .map(|elem| elem.inner_text().trim().to_owned())
                .filter(|name| !name.is_empty());
            let time_limit_ms = html
                .select(select!(".problem-info .time-limit"))
                .next()
                .and_then(|elem| parse_limit(&elem.inner_text(), 1000.0))
                .or_else(|| self.spec.time_limit_ms());
            let memory_limit_kbyte = html
                .select(select!(".problem-info .memory-limit"))
                .next()
                .and_then(|elem| parse_limit(&elem.inner_text(), 1024.0))
                .or_else(|| self.spec.memory_limit_kbyte());
            problems.push(Problem::new(
                id,
                name,
                url.clone(),
                time_limit_ms,
                memory_limit_kbyte,
                self.spec.source_limit_kbyte(),
                // sample extraction is not supported for this site
                Vec::new(),
                Vec::new(),
            ));
        }
        Ok(problems)
    }
}
