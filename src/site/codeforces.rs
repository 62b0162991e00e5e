use itertools::Itertools as _;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::config::Conf;
use crate::fetch::PageCache;
use crate::model::{Contest, Problem};
use crate::site::{
    last_token, location_path, parse_limit, parse_or, ElementRefExt as _, Site, SiteSpec,
};
use crate::{regex, select, Console, Result};

/// Substituted when the location grammar yields no contest id.
static FALLBACK_CONTEST_ID: &str = "999999";

lazy_static! {
    static ref BASE_URL: Url = Url::parse("http://codeforces.com").unwrap();
}

/// Contest path grammar: optional "/contest" prefix, numeric contest id,
/// optional problem id with an optional "/problem" prefix.
fn pattern_contest() -> &'static Regex {
    regex!(r"(?:/contest)?/(?P<contest>[0-9]+)(?:(?:/problem)?/(?P<problem>[a-zA-Z0-9]+))?")
}

fn pattern_problem() -> &'static Regex {
    regex!(r"[a-zA-Z0-9]+")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codeforces {
    spec: SiteSpec,
}

impl Codeforces {
    pub fn new() -> Self {
        Self {
            spec: SiteSpec::new(
                "codeforces.com",
                "Codeforces",
                "codeforces",
                None,
                None,
                Some(64),
                None,
            ),
        }
    }

    /// Codeforces problems are indexed with uppercase latin letters. Accepts
    /// a single letter in either case, or a positive integer mapped to the
    /// n-th letter (1 -> A). Anything else does not encode.
    fn resolve_problem_id(raw: &str) -> Option<String> {
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Some(c.to_ascii_uppercase().to_string());
            }
        }
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            let n: u32 = raw.parse().ok()?;
            if (1..=26).contains(&n) {
                return Some(char::from(b'A' + (n - 1) as u8).to_string());
            }
        }
        None
    }

    fn contest_url(contest_id: &str) -> Url {
        let path = format!("/contest/{}", contest_id);
        BASE_URL.join(&path).unwrap_or_else(|_| BASE_URL.clone())
    }

    fn problem_url(contest_url: &Url, problem_id: &str) -> Url {
        parse_or(&format!("{}/problem/{}", contest_url, problem_id), contest_url)
    }

    fn contest_id_of(path: &str) -> String {
        pattern_contest()
            .captures(path)
            .and_then(|caps| caps.name("contest"))
            .map_or(FALLBACK_CONTEST_ID, |m| m.as_str())
            .to_owned()
    }
}

impl Default for Codeforces {
    fn default() -> Self {
        Self::new()
    }
}

impl Site for Codeforces {
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
                .select(select!("#sidebar a[href*=\"contest\"]"))
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

        // available problem ids, from the contest page
        let page = cache.get(&contest_url, cnsl)?;
        let mut available = Vec::new();
        if page.is_success() {
            let html = page.html();
            available = html
                .select(select!("#pageContent .id a"))
                .map(|elem| elem.inner_text().trim().to_owned())
                .collect();
        }

        // single problem embedded in the location
        let mut ids = Vec::new();
        let path = location_path(conf);
        if let Some(raw) = pattern_contest()
            .captures(&path)
            .and_then(|caps| caps.name("problem"))
        {
            if let Some(id) = Self::resolve_problem_id(raw.as_str()) {
                ids.push(id);
            }
        }

        // explicit problem tokens; unencodable tokens drop silently
        for token in &conf.problems {
            if let Some(raw) = last_token(pattern_problem(), token) {
                if let Some(id) = Self::resolve_problem_id(raw) {
                    ids.push(id);
                }
            }
        }

        // nothing selected means everything selected
        if ids.is_empty() {
            ids = available.clone();
        }

        let mut urls = Vec::new();
        for id in &ids {
            if available.contains(id) {
                urls.push(Self::problem_url(&contest_url, id));
            } else {
                cnsl.warn(&format!(
                    "Problem \"{}\" does not exist in {}",
                    id, contest_url
                ))?;
            }
        }
        Ok(urls.into_iter().sorted().dedup().collect())
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
                .select(select!("#pageContent .header .title"))
                .next()
                .map(|elem| elem.inner_text().trim().to_owned())
                .filter(|name| !name.is_empty());
            let time_limit_ms = html
                .select(select!("#pageContent .time-limit"))
                .next()
                .and_then(|elem| parse_limit(&elem.inner_text(), 1000.0))
                .or_else(|| self.spec.time_limit_ms());
            let memory_limit_kbyte = html
                .select(select!("#pageContent .memory-limit"))
                .next()
                .and_then(|elem| parse_limit(&elem.inner_text(), 1024.0))
                .or_else(|| self.spec.memory_limit_kbyte());
            let inputs = html
                .select(select!("#pageContent .sample-tests .input pre"))
                .map(|elem| elem.joined_text("\n"))
                .collect();
            let outputs = html
                .select(select!("#pageContent .sample-tests .output pre"))
                .map(|elem| elem.joined_text("\n"))
                .collect();
            problems.push(Problem::new(
                id,
                name,
                url.clone(),
                time_limit_ms,
                memory_limit_kbyte,
                self.spec.source_limit_kbyte(),
                inputs,
                outputs,
            ));
        }
        Ok(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetch;
    use crate::site::tests::conf;

    static CONTEST_PAGE: &str = r#"<html><body>
        <div id="sidebar"><a href="/contest/425">Codeforces Round #243</a></div>
        <div id="pageContent">
          <table>
            <tr><td class="id"><a href="/contest/425/problem/A">A</a></td></tr>
            <tr><td class="id"><a href="/contest/425/problem/B">B</a></td></tr>
            <tr><td class="id"><a href="/contest/425/problem/C">C</a></td></tr>
          </table>
        </div>
    </body></html>"#;

    static PROBLEM_PAGE: &str = r#"<html><body>
        <div id="pageContent">
          <div class="header"><div class="title">C. Sereja and Swaps</div></div>
          <div class="time-limit">2 seconds</div>
          <div class="memory-limit">256 megabytes</div>
          <div class="sample-tests">
            <div class="input"><pre>4 1
1 2 3 4</pre></div>
            <div class="output"><pre>10</pre></div>
          </div>
        </div>
    </body></html>"#;

    #[test]
    fn test_resolve_problem_id() {
        let tests = &[
            ("A", Some("A")),
            ("z", Some("Z")),
            ("3", Some("C")),
            (".", None),
            ("0", None),
            ("27", None),
            ("abc", None),
            ("", None),
        ];
        for (raw, expected) in tests {
            let actual = Codeforces::resolve_problem_id(raw);
            assert_eq!(actual.as_deref(), *expected, "raw: {:?}", raw);
        }
    }

    #[test]
    fn test_match_contest() {
        let site = Codeforces::new();
        let tests = &[
            (
                "http://codeforces.com/contest/425/C",
                "http://codeforces.com/contest/425",
            ),
            (
                "http://codeforces.com/512/problem/a",
                "http://codeforces.com/contest/512",
            ),
            (
                "http://codeforces.com/",
                "http://codeforces.com/contest/999999",
            ),
            ("", "http://codeforces.com/contest/999999"),
            ("no slash anywhere", "http://codeforces.com/contest/999999"),
        ];
        for (location, expected) in tests {
            let url = site.match_contest(&conf(location, &[]));
            assert_eq!(url.as_str(), *expected, "location: {:?}", location);
        }
    }

    #[test]
    fn test_get_contest() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page("http://codeforces.com/contest/425", 200, CONTEST_PAGE);
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        let url = Url::parse("http://codeforces.com/contest/425")?;
        let contest = site.get_contest(&url, &mut cache, &mut cnsl)?;
        assert_eq!(contest.id().as_ref(), "425");
        assert_eq!(contest.name(), "Codeforces Round #243");
        Ok(())
    }

    #[test]
    fn test_get_contest_offline_keeps_id() -> Result<()> {
        let site = Codeforces::new();
        let mut cache = PageCache::new(StubFetch::new());
        let mut cnsl = Console::sink();

        let url = Url::parse("http://codeforces.com/contest/425")?;
        let contest = site.get_contest(&url, &mut cache, &mut cnsl)?;
        assert_eq!(contest.id().as_ref(), "425");
        assert_eq!(contest.name(), crate::model::NO_NAME);
        Ok(())
    }

    #[test]
    fn test_match_problems_from_location() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page("http://codeforces.com/contest/425", 200, CONTEST_PAGE);
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        let urls = site.match_problems(
            &conf("http://codeforces.com/contest/425/C", &[]),
            &mut cache,
            &mut cnsl,
        )?;
        let urls: Vec<_> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, vec!["http://codeforces.com/contest/425/problem/C"]);
        Ok(())
    }

    #[test]
    fn test_match_problems_select_all_and_tokens() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page("http://codeforces.com/contest/425", 200, CONTEST_PAGE);
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        // no explicit selection: every available problem
        let urls = site.match_problems(
            &conf("http://codeforces.com/contest/425", &[]),
            &mut cache,
            &mut cnsl,
        )?;
        assert_eq!(urls.len(), 3);

        // tokens resolve through the letter encoding, dedup + sort
        let urls = site.match_problems(
            &conf("http://codeforces.com/contest/425", &["b", "2", "1"]),
            &mut cache,
            &mut cnsl,
        )?;
        let urls: Vec<_> = urls.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "http://codeforces.com/contest/425/problem/A",
                "http://codeforces.com/contest/425/problem/B",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_match_problems_warns_on_unavailable() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page("http://codeforces.com/contest/425", 200, CONTEST_PAGE);
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::buf();

        let urls = site.match_problems(
            &conf("http://codeforces.com/contest/425", &["z"]),
            &mut cache,
            &mut cnsl,
        )?;
        assert!(urls.is_empty());
        let output = cnsl.take_output()?;
        assert!(output.contains("WARN"));
        assert!(output.contains("\"Z\""));
        Ok(())
    }

    #[test]
    fn test_get_problems() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page(
            "http://codeforces.com/contest/425/problem/C",
            200,
            PROBLEM_PAGE,
        );
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        let urls = vec![Url::parse("http://codeforces.com/contest/425/problem/C")?];
        let problems = site.get_problems(&urls, &mut cache, &mut cnsl)?;
        assert_eq!(problems.len(), 1);
        let problem = &problems[0];
        assert_eq!(problem.id().as_ref(), "C");
        assert_eq!(problem.name().as_deref(), Some("C. Sereja and Swaps"));
        assert_eq!(problem.time_limit_ms(), Some(2000));
        assert_eq!(problem.memory_limit_kbyte(), Some(262144));
        assert_eq!(problem.source_limit_kbyte(), Some(64));
        assert_eq!(problem.inputs(), &vec!["4 1\n1 2 3 4".to_owned()]);
        assert_eq!(problem.outputs(), &vec!["10".to_owned()]);
        Ok(())
    }

    #[test]
    fn test_get_problems_keeps_partial_record() -> Result<()> {
        let site = Codeforces::new();
        let fetch = StubFetch::new().page(
            "http://codeforces.com/contest/425/problem/C",
            200,
            r#"<html><body><div id="pageContent">
                <div class="header"><div class="title">C. Sereja and Swaps</div></div>
            </div></body></html>"#,
        );
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        // lenient policy: a page without samples still yields a record
        let urls = vec![Url::parse("http://codeforces.com/contest/425/problem/C")?];
        let problems = site.get_problems(&urls, &mut cache, &mut cnsl)?;
        assert_eq!(problems.len(), 1);
        assert!(problems[0].inputs().is_empty());
        assert!(problems[0].outputs().is_empty());
        Ok(())
    }

    #[test]
    fn test_get_problems_skips_missing_page() -> Result<()> {
        let site = Codeforces::new();
        let mut cache = PageCache::new(StubFetch::new());
        let mut cnsl = Console::sink();

        let urls = vec![Url::parse("http://codeforces.com/contest/425/problem/C")?];
        let problems = site.get_problems(&urls, &mut cache, &mut cnsl)?;
        assert!(problems.is_empty());
        Ok(())
    }
}
