#![warn(clippy::all)]

use structopt::StructOpt;

use snatch::{Opt, Result};

fn main() -> Result<()> {
    let opt = Opt::from_args();
    opt.run()
}
