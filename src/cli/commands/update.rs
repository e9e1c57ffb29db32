//! Refresh the database from the API

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;

use super::{confirm, open_session, print_ingest_summary, rebuild};

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Use the embedded sample dataset instead of the live API
    #[arg(long)]
    pub sample: bool,
}

pub fn run(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    if !args.yes {
        let proceed = confirm(&format!(
            "{}",
            style("Updating the database deletes all saved favorites as well. Continue?")
                .red()
                .bright()
        ))?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut session = open_session(global)?;
    let stats = rebuild(&mut session, args.sample, global)?;
    if !global.quiet {
        print_ingest_summary(&stats);
    }
    Ok(())
}
