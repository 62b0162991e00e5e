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
    static ref BASE_URL: Url = Url::parse("http://rosalind.info").unwrap();
}

/// Archive path grammar: alphabetic problem id with an optional "/problems"
/// prefix and an optional trailing slash.
fn pattern_problem_path() -> &'static Regex {
    regex!(r"(?:/problems)?/(?P<problem>[a-zA-Z]+)/?")
}

fn pattern_problem() -> &'static Regex {
    regex!(r"[a-zA-Z]+")
}

/// Rosalind is archive-style and addresses problems with lowercase ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rosalind {
    spec: SiteSpec,
}

impl Rosalind {
    pub fn new() -> Self {
        Self {
            spec: SiteSpec::new(
                "rosalind.info",
                "Rosalind",
                "rosalind",
                None,
                None,
                None,
                None,
            ),
        }
    }

    fn problem_url(problem_id: &str) -> Url {
        let path = format!("/problems/{}/", problem_id);
        BASE_URL.join(&path).unwrap_or_else(|_| BASE_URL.clone())
    }
}

impl Default for Rosalind {
    fn default() -> Self {
        Self::new()
    }
}

impl Site for Rosalind {
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
            "rosalind-problems",
            Some("Rosalind problems archive".to_owned()),
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
            ids.push(raw.as_str().to_lowercase());
        }

        for token in &conf.problems {
            if let Some(raw) = last_token(pattern_problem(), token) {
                ids.push(raw.to_lowercase());
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
                cnsl.warn(&format!("Problem \"{}\" does not exist on Rosalind!", id))?;
                continue;
            }
            let html = page.html();
            let name = html
                .select(select!("h1"))
                .next()
                .map(|elem| elem.inner_text().trim().to_owned())
                .filter(|name| !name.is_empty());
            // single sample dataset/output per problem
            let inputs: Vec<String> = html
                .select(select!("#sample-dataset + div pre"))
                .next()
                .map(|elem| vec![elem.joined_text("\n").trim().to_owned()])
                .unwrap_or_default();
            let outputs: Vec<String> = html
                .select(select!("#sample-output + div pre"))
                .next()
                .map(|elem| vec![elem.joined_text("\n").trim().to_owned()])
                .unwrap_or_default();

            let complete = name.is_some() && !inputs.is_empty() && !outputs.is_empty();
            if complete {
                problems.push(Problem::new(
                    id,
                    name,
                    url.clone(),
                    self.spec.time_limit_ms(),
                    self.spec.memory_limit_kbyte(),
                    self.spec.source_limit_kbyte(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetch;
    use crate::site::tests::conf;

    static PROBLEM_PAGE: &str = r#"<html><body>
        <h1>Complementing a Strand of DNA</h1>
        <h2 id="sample-dataset">Sample Dataset</h2>
        <div class="codehilite"><pre>AAAACCCGGT</pre></div>
        <h2 id="sample-output">Sample Output</h2>
        <div class="codehilite"><pre>ACCGGGTTTT</pre></div>
    </body></html>"#;

    #[test]
    fn test_match_problems_lowercases_ids() -> Result<()> {
        let site = Rosalind::new();
        let mut cache = PageCache::new(StubFetch::new());
        let mut cnsl = Console::sink();

        let urls = site.match_problems(
            &conf("http://rosalind.info/problems/RSUB", &["wfmd", "REVC"]),
            &mut cache,
            &mut cnsl,
        )?;
        let urls: Vec<_> = urls.iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "http://rosalind.info/problems/revc/",
                "http://rosalind.info/problems/rsub/",
                "http://rosalind.info/problems/wfmd/",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_match_problems_empty_without_ids() -> Result<()> {
        let site = Rosalind::new();
        let mut cache = PageCache::new(StubFetch::new());
        let mut cnsl = Console::sink();

        let urls = site.match_problems(&conf("http://rosalind.info", &[]), &mut cache, &mut cnsl)?;
        assert!(urls.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_problems() -> Result<()> {
        let site = Rosalind::new();
        let fetch =
            StubFetch::new().page("http://rosalind.info/problems/revc/", 200, PROBLEM_PAGE);
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::sink();

        let urls = vec![Url::parse("http://rosalind.info/problems/revc/")?];
        let problems = site.get_problems(&urls, &mut cache, &mut cnsl)?;
        assert_eq!(problems.len(), 1);
        let problem = &problems[0];
        assert_eq!(problem.id().as_ref(), "revc");
        assert_eq!(
            problem.name().as_deref(),
            Some("Complementing a Strand of DNA")
        );
        assert_eq!(problem.inputs(), &vec!["AAAACCCGGT".to_owned()]);
        assert_eq!(problem.outputs(), &vec!["ACCGGGTTTT".to_owned()]);
        Ok(())
    }

    #[test]
    fn test_get_problems_drops_incomplete() -> Result<()> {
        let site = Rosalind::new();
        let fetch = StubFetch::new().page(
            "http://rosalind.info/problems/revc/",
            200,
            "<html><body><h1>Name only</h1></body></html>",
        );
        let mut cache = PageCache::new(fetch);
        let mut cnsl = Console::buf();

        let urls = vec![Url::parse("http://rosalind.info/problems/revc/")?];
        let problems = site.get_problems(&urls, &mut cache, &mut cnsl)?;
        assert!(problems.is_empty());
        assert!(cnsl
            .take_output()?
            .contains("\"revc\" not fetched successfully"));
        Ok(())
    }
}
