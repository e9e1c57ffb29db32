//! Delete all saved favorites

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;

use super::{confirm, open_session};

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if session.favorites().is_empty() {
        println!("No favorites to erase.");
        return Ok(());
    }

    if !args.yes {
        let proceed = confirm("Erase all saved favorites?")?;
        if !proceed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let count = session.favorites().len();
    session
        .clear_favorites()
        .map_err(|e| miette::miette!("{}", e))?;
    if !global.quiet {
        println!("{} Erased {} favorite(s)", style("✓").green(), count);
    }
    Ok(())
}
