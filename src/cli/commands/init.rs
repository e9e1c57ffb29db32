//! Create and fill the database

use miette::Result;

use crate::cli::GlobalOpts;

use super::{open_session, print_ingest_summary, rebuild};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Use the embedded sample dataset instead of the live API
    #[arg(long)]
    pub sample: bool,

    /// Rebuild even if the database already contains data
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if !session.categories().is_empty() && !args.force {
        return Err(miette::miette!(
            "The database already contains data. Use `nutriswap update` to refresh it, \
or `nutriswap init --force` to start over."
        ));
    }

    let stats = rebuild(&mut session, args.sample, global)?;
    if !global.quiet {
        print_ingest_summary(&stats);
    }
    Ok(())
}
