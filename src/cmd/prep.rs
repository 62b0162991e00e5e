use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::config::Config;
use crate::fetch::{HttpFetch, PageCache};
use crate::model::{Contest, Problem};
use crate::site::{self, Registry};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct PrepOpt {
    /// URL or "site/contest" shorthand selecting the contest
    #[structopt(name = "location")]
    location: Option<String>,
    /// Problem identifiers, in the selected site's alphabet
    #[structopt(name = "problems")]
    problems: Vec<String>,
    /// Overwrites existing sample files
    #[structopt(long, short = "w")]
    overwrite: bool,
}

impl Run for PrepOpt {
    fn run(
        &self,
        _global_opt: &GlobalOpt,
        conf: &Config,
        cnsl: &mut Console,
    ) -> Result<Box<dyn Outcome>> {
        let run_conf = conf.resolve_conf(self.location.as_deref(), &self.problems);
        let registry = Registry::builtin();
        let mut cache = PageCache::new(HttpFetch::new()?);
        let (_, contest, problems) = site::resolve(&registry, &run_conf, &mut cache, cnsl)?;

        let mut saved = 0;
        for problem in &problems {
            saved += save_samples(conf.root_dir(), &contest, problem, self.overwrite, cnsl)?;
        }

        Ok(Box::new(PrepOutcome {
            contest,
            problem_count: problems.len(),
            saved,
        }))
    }
}

/// Writes a problem's samples under `<root>/<contest-id>/<problem-id>/` as
/// `in.N.txt` / `out.N.txt`. Returns the number of files written.
fn save_samples(
    root_dir: &Path,
    contest: &Contest,
    problem: &Problem,
    overwrite: bool,
    cnsl: &mut Console,
) -> Result<usize> {
    let dir = root_dir
        .join(contest.id().as_ref())
        .join(problem.id().as_ref());
    fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create directory : {}", dir.display()))?;

    let mut saved = 0;
    for (i, (input, output)) in problem.samples().enumerate() {
        let n = i + 1;
        if save_file(&dir.join(format!("in.{}.txt", n)), input, overwrite, cnsl)? {
            saved += 1;
        }
        if save_file(&dir.join(format!("out.{}.txt", n)), output, overwrite, cnsl)? {
            saved += 1;
        }
    }
    Ok(saved)
}

fn save_file(path: &Path, content: &str, overwrite: bool, cnsl: &mut Console) -> Result<bool> {
    if path.exists() && !overwrite {
        writeln!(cnsl, "Already exists : {}", path.display())?;
        return Ok(false);
    }
    fs::write(path, content)
        .with_context(|| format!("Could not write file : {}", path.display()))?;
    writeln!(cnsl, "Saved {}", path.display())?;
    Ok(true)
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PrepOutcome {
    contest: Contest,
    problem_count: usize,
    saved: usize,
}

impl fmt::Display for PrepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Prepared {} problem(s) for contest \"{}\" ({} file(s) written)",
            self.problem_count,
            self.contest.id(),
            self.saved
        )
    }
}
