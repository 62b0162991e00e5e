use std::fmt;

use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::config::Config;
use crate::fetch::{HttpFetch, PageCache};
use crate::model::{Contest, Problem};
use crate::site::{self, Registry, SiteSpec};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ShowOpt {
    /// URL or "site/contest" shorthand selecting the contest
    #[structopt(name = "location")]
    location: Option<String>,
    /// Problem identifiers, in the selected site's alphabet
    #[structopt(name = "problems")]
    problems: Vec<String>,
}

impl Run for ShowOpt {
    fn run(
        &self,
        global_opt: &GlobalOpt,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        let run_conf = conf.resolve_conf(self.location.as_deref(), &self.problems);
        let registry = Registry::builtin();
        let mut cache = PageCache::new(HttpFetch::new()?);
        let (site, contest, problems) = site::resolve(&registry, &run_conf, &mut cache, cnsl)?;
        Ok(Box::new(ShowOutcome {
            verbose: global_opt.verbose,
            site,
            contest,
            problems,
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShowOutcome {
    #[serde(skip)]
    verbose: bool,
    site: SiteSpec,
    contest: Contest,
    problems: Vec<Problem>,
}

impl fmt::Display for ShowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "site:")?;
        for (key, value) in self.site.project(self.verbose) {
            writeln!(f, "  {}: {}", key, value)?;
        }
        writeln!(f, "contest:")?;
        for (key, value) in self.contest.project(self.verbose) {
            writeln!(f, "  {}: {}", key, value)?;
        }
        writeln!(f, "problems:")?;
        for problem in &self.problems {
            let mut head = true;
            for (key, value) in problem.project(self.verbose) {
                let indent = if head { "  - " } else { "    " };
                writeln!(f, "{}{}: {}", indent, key, value)?;
                head = false;
            }
        }
        Ok(())
    }
}
