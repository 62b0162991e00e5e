#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io;

use anyhow::Context as _;
use structopt::StructOpt;
use strum::VariantNames;

mod cmd;
mod config;
mod fetch;
mod site;

pub use snatch_util::{model, regex, select, Console};

use cmd::{Cmd, Run as _};
use config::Config;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalOpt {
    /// Prints all fields of sites, contests and problems
    #[structopt(long, short = "v", global = true)]
    verbose: bool,
    #[structopt(
        name = "output",
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
}

#[derive(
    EnumString,
    EnumVariantNames,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

impl Opt {
    pub fn run(&self) -> Result<()> {
        let mut cnsl = Console::term();
        let conf = Config::load(&mut cnsl).context("Could not load config")?;
        let outcome = self.cmd.run(&self.global_opt, &conf, &mut cnsl)?;
        let stdout = io::stdout();
        outcome.print(&mut stdout.lock(), self.global_opt.output)
    }
}
