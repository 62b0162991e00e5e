use std::io::Write as _;

use getset::{CopyGetters, Getters};
use regex::Regex;
use scraper::ElementRef;
use serde::Serialize;
use url::Url;

mod codechef;
mod codeforces;
mod local;
mod rosalind;
mod spoj;

pub use codechef::Codechef;
pub use codeforces::Codeforces;
pub use local::Local;
pub use rosalind::Rosalind;
pub use spoj::Spoj;

use crate::config::Conf;
use crate::fetch::PageCache;
use crate::model::{Contest, Problem};
use crate::{Console, Result};

/// Static description of a site processor.
#[derive(Serialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteSpec {
    /// Stable lowercase key used by the matcher, conventionally the hostname.
    #[get = "pub"]
    url_key: String,
    #[get = "pub"]
    name: String,
    #[get = "pub"]
    id: String,
    #[get_copy = "pub"]
    time_limit_ms: Option<u64>,
    #[get_copy = "pub"]
    memory_limit_kbyte: Option<u64>,
    #[get_copy = "pub"]
    source_limit_kbyte: Option<u64>,
    #[serde(skip)]
    info: Option<String>,
}

impl SiteSpec {
    #[allow(clippy::too_many_arguments)]
    fn new(
        url_key: &str,
        name: &str,
        id: &str,
        time_limit_ms: Option<u64>,
        memory_limit_kbyte: Option<u64>,
        source_limit_kbyte: Option<u64>,
        info: Option<&str>,
    ) -> Self {
        Self {
            url_key: url_key.to_owned(),
            name: name.to_owned(),
            id: id.to_owned(),
            time_limit_ms,
            memory_limit_kbyte,
            source_limit_kbyte,
            info: info.map(str::to_owned),
        }
    }

    /// Notice printed once per run after the site is selected.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Field projection for display, gated on verbosity.
    pub fn project(&self, verbose: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("id", self.id.clone()),
            ("url", self.url_key.clone()),
        ];
        if verbose {
            pairs.insert(0, ("name", self.name.clone()));
            pairs.push(("time_limit_ms", fmt_limit(self.time_limit_ms)));
            pairs.push(("memory_limit_kbyte", fmt_limit(self.memory_limit_kbyte)));
            pairs.push(("source_limit_kbyte", fmt_limit(self.source_limit_kbyte)));
        }
        pairs
    }
}

fn fmt_limit(limit: Option<u64>) -> String {
    limit.map_or_else(|| "-".to_owned(), |value| value.to_string())
}

/// Uniform contract every site processor implements.
///
/// `match_contest` and `match_problems` resolve the user's loosely-specified
/// location into canonical URLs; `get_contest` and `get_problems` turn those
/// URLs into structured records, fetching through the shared page cache.
pub trait Site {
    fn spec(&self) -> &SiteSpec;

    /// Resolves `conf.location` into the canonical contest URL.
    ///
    /// Total over arbitrary location strings and performs no network I/O:
    /// when the site's grammar does not match, a documented sentinel contest
    /// id is substituted instead.
    fn match_contest(&self, conf: &Conf) -> Url;

    /// Builds the contest record for a URL produced by `match_contest`.
    ///
    /// The contest id is always derived from the URL itself; only the name
    /// comes from the fetched page and degrades to a sentinel when the page
    /// is missing or the extraction comes up empty.
    fn get_contest(&self, url: &Url, cache: &mut PageCache, cnsl: &mut Console) -> Result<Contest>;

    /// Resolves the problem URLs the user intends to fetch, deduplicated and
    /// lexicographically sorted.
    fn match_problems(
        &self,
        conf: &Conf,
        cache: &mut PageCache,
        cnsl: &mut Console,
    ) -> Result<Vec<Url>>;

    /// Fetches and extracts problem records, in the order of `urls`.
    ///
    /// Whether a partially extracted problem is kept or dropped (with a
    /// warning) depends on the site's minimum-viable-record policy.
    fn get_problems(
        &self,
        urls: &[Url],
        cache: &mut PageCache,
        cnsl: &mut Console,
    ) -> Result<Vec<Problem>>;
}

/// Ordered collection of site processors.
pub struct Registry {
    sites: Vec<Box<dyn Site>>,
}

impl Registry {
    /// Built-in processors. Local comes first so that the matcher's
    /// fall-through always lands on a site that works offline.
    pub fn builtin() -> Self {
        Self {
            sites: vec![
                Box::new(Local::new()),
                Box::new(Codeforces::new()),
                Box::new(Codechef::new()),
                Box::new(Spoj::new()),
                Box::new(Rosalind::new()),
            ],
        }
    }

    /// Registry with user-supplied processors taking precedence: a built-in
    /// whose id matches a user site's id is shadowed out at registration
    /// time.
    pub fn with_sites(user_sites: Vec<Box<dyn Site>>) -> Self {
        let mut sites = user_sites;
        for site in Self::builtin().sites {
            if !sites.iter().any(|s| s.spec().id() == site.spec().id()) {
                sites.push(site);
            }
        }
        Self { sites }
    }

    pub fn sites(&self) -> impl Iterator<Item = &dyn Site> {
        self.sites.iter().map(AsRef::as_ref)
    }

    /// Selects exactly one processor for a location string.
    ///
    /// Uses an LCS similarity ratio between the location and each site's
    /// `url_key`; ties keep the earlier registry entry, so an unmatchable
    /// location falls back to the first (local) processor.
    pub fn match_site(&self, location: &str) -> &dyn Site {
        let location = location.to_lowercase();
        let mut best_idx = 0;
        let mut best_ratio = -1.0;
        for (idx, site) in self.sites.iter().enumerate() {
            let ratio = lcs_ratio(&location, &site.spec().url_key().to_lowercase());
            if ratio > best_ratio {
                best_idx = idx;
                best_ratio = ratio;
            }
        }
        self.sites[best_idx].as_ref()
    }
}

/// Similarity in `[0, 1]`: `2 * lcs(a, b) / (|a| + |b|)`.
fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let mut row = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut prev = 0;
        for (j, cb) in b.iter().enumerate() {
            let cur = row[j + 1];
            row[j + 1] = if ca == cb {
                prev + 1
            } else {
                row[j + 1].max(row[j])
            };
            prev = cur;
        }
    }
    2.0 * row[b.len()] as f64 / (a.len() + b.len()) as f64
}

/// Runs the whole pipeline for one merged configuration.
pub fn resolve(
    registry: &Registry,
    conf: &Conf,
    cache: &mut PageCache,
    cnsl: &mut Console,
) -> Result<(SiteSpec, Contest, Vec<Problem>)> {
    let site = registry.match_site(&conf.location);
    if let Some(info) = site.spec().info() {
        writeln!(cnsl, "{}", info)?;
    }
    let contest_url = site.match_contest(conf);
    let contest = site.get_contest(&contest_url, cache, cnsl)?;
    let urls = site.match_problems(conf, cache, cnsl)?;
    let problems = site.get_problems(&urls, cache, cnsl)?;
    Ok((site.spec().clone(), contest, problems))
}

/// Path component of the location URL, defaulting to "/".
pub(crate) fn location_path(conf: &Conf) -> String {
    Url::parse(&conf.location)
        .map(|url| url.path().to_owned())
        .unwrap_or_else(|_| "/".to_owned())
}

/// Last match of `pattern` in a raw user token, as the sites read multi-part
/// tokens like "425/C".
pub(crate) fn last_token<'a>(pattern: &Regex, raw: &'a str) -> Option<&'a str> {
    pattern.find_iter(raw).last().map(|m| m.as_str())
}

/// First float token of an extracted limit string, scaled and truncated.
pub(crate) fn parse_limit(text: &str, scale: f64) -> Option<u64> {
    text.split_whitespace()
        .find_map(|token| token.parse::<f64>().ok())
        .map(|value| (value * scale) as u64)
}

/// URL from a site template; templates produce parseable URLs, but the
/// fallback keeps URL construction total for arbitrary captured ids.
pub(crate) fn parse_or(s: &str, fallback: &Url) -> Url {
    Url::parse(s).unwrap_or_else(|_| fallback.clone())
}

pub(crate) trait ElementRefExt {
    fn inner_text(&self) -> String;

    fn joined_text(&self, sep: &str) -> String;
}

impl ElementRefExt for ElementRef<'_> {
    fn inner_text(&self) -> String {
        self.text().fold(String::new(), |mut ret, s| {
            ret.push_str(s);
            ret
        })
    }

    fn joined_text(&self, sep: &str) -> String {
        self.text().collect::<Vec<_>>().join(sep)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn conf(location: &str, problems: &[&str]) -> Conf {
        Conf {
            location: location.to_owned(),
            problems: problems.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn test_lcs_ratio() {
        assert_eq!(lcs_ratio("", ""), 1.0);
        assert_eq!(lcs_ratio("abc", "abc"), 1.0);
        assert_eq!(lcs_ratio("abc", "xyz"), 0.0);
        let ratio = lcs_ratio("http://codeforces.com/contest/425", "codeforces.com");
        assert!(ratio > lcs_ratio("http://codeforces.com/contest/425", "localhost"));
    }

    #[test]
    fn test_match_site_by_hostname() {
        let registry = Registry::builtin();
        let tests = &[
            ("http://codeforces.com/contest/425/C", "codeforces"),
            ("http://www.codechef.com/OCT15", "codechef"),
            ("http://www.spoj.com/problems/TEST", "spoj"),
            ("http://rosalind.info/problems/rsub", "rosalind"),
            ("http://localhost/old-contest/52", "local"),
        ];
        for (location, expected) in tests {
            let site = registry.match_site(location);
            assert_eq!(site.spec().id(), *expected, "location: {}", location);
        }
    }

    #[test]
    fn test_match_site_deterministic_fallback() {
        let registry = Registry::builtin();
        let first = registry.match_site("http://unknown.example").spec().id().clone();
        for _ in 0..3 {
            let again = registry.match_site("http://unknown.example").spec().id().clone();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_registry_shadowing() {
        struct Shadow(SiteSpec);

        impl Site for Shadow {
            fn spec(&self) -> &SiteSpec {
                &self.0
            }

            fn match_contest(&self, _conf: &Conf) -> Url {
                Url::parse("http://example.com/").unwrap()
            }

            fn get_contest(
                &self,
                url: &Url,
                _cache: &mut PageCache,
                _cnsl: &mut Console,
            ) -> Result<Contest> {
                Ok(Contest::new("shadow", None, url.clone()))
            }

            fn match_problems(
                &self,
                _conf: &Conf,
                _cache: &mut PageCache,
                _cnsl: &mut Console,
            ) -> Result<Vec<Url>> {
                Ok(vec![])
            }

            fn get_problems(
                &self,
                _urls: &[Url],
                _cache: &mut PageCache,
                _cnsl: &mut Console,
            ) -> Result<Vec<Problem>> {
                Ok(vec![])
            }
        }

        let shadow = Shadow(SiteSpec::new(
            "codeforces.com",
            "My Codeforces",
            "codeforces",
            None,
            None,
            None,
            None,
        ));
        let registry = Registry::with_sites(vec![Box::new(shadow)]);
        assert_eq!(registry.sites().count(), 5);
        let selected = registry.match_site("http://codeforces.com/contest/1");
        assert_eq!(selected.spec().name(), "My Codeforces");
    }

    #[test]
    fn test_location_path_total() {
        let tests = &[
            ("http://codeforces.com/contest/425/C", "/contest/425/C"),
            ("http://codeforces.com", "/"),
            ("http://", "/"),
            ("not a url at all", "/"),
            ("", "/"),
        ];
        for (location, expected) in tests {
            assert_eq!(&location_path(&conf(location, &[])), expected);
        }
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit("2 seconds", 1000.0), Some(2000));
        assert_eq!(parse_limit("time limit per test 0.5 seconds", 1000.0), Some(500));
        assert_eq!(parse_limit("256 megabytes", 1024.0), Some(262144));
        assert_eq!(parse_limit("no numbers here", 1000.0), None);
    }
}
