//! Database statistics

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;

use super::open_session;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let storage = session.storage();

    println!("{}", style("Database Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    for table in ["categories", "products", "brands", "stores", "favorites"] {
        let count = storage.count(table).map_err(|e| miette::miette!("{}", e))?;
        println!("  {:<12} {}", table, style(count).cyan());
    }
    println!(
        "  {:<12} {}",
        "last fav id",
        style(session.favorites().last_saved_id()).cyan()
    );
    Ok(())
}
