//! Interactive favorites browser

use console::style;
use dialoguer::{Confirm, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{summarize_names, truncate_str, NAME_WIDTH};
use crate::cli::table::pretty_table;
use crate::cli::GlobalOpts;
use crate::core::{Session, UnlinkOutcome};
use crate::entities::Favorite;

use super::open_session;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if session.favorites().is_empty() {
        println!("No favorites saved yet.");
        return Ok(());
    }
    session.favorites_mut().flush();

    let mut page = 0usize;
    loop {
        if session.favorites().is_empty() {
            println!("No favorites left.");
            return Ok(());
        }
        session
            .ensure_favorite_page_loaded(page)
            .map_err(|e| miette::miette!("{}", e))?;

        let (page_count, entries): (usize, Vec<Favorite>) = {
            let registry = session.favorites().registry();
            (
                registry.page_count(),
                registry.page(page).unwrap_or(&[]).to_vec(),
            )
        };
        // A removal can leave the current page index dangling
        if entries.is_empty() {
            if page > 0 {
                page -= 1;
                continue;
            }
            println!("No favorites left.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let targets: Vec<String> =
                    f.substitute_to.iter().map(|p| p.name.clone()).collect();
                vec![
                    (i + 1).to_string(),
                    truncate_str(&f.core.name, NAME_WIDTH),
                    summarize_names(&session.brand_names(&f.brands)),
                    f.core.grade.to_string(),
                    summarize_names(&targets),
                ]
            })
            .collect();
        println!(
            "\n{} — page {}/{}",
            style("Saved substitutes").bold(),
            page + 1,
            page_count
        );
        println!(
            "{}",
            pretty_table(["#", "Name", "Brands", "Nutriscore", "Substitute to"], rows)
        );

        let mut menu: Vec<String> = entries
            .iter()
            .map(|f| truncate_str(&f.core.name, NAME_WIDTH))
            .collect();
        let next_idx = (page + 1 < page_count).then(|| {
            menu.push("Next page".into());
            menu.len() - 1
        });
        let prev_idx = (page > 0).then(|| {
            menu.push("Previous page".into());
            menu.len() - 1
        });
        menu.push("Quit".into());
        let quit_idx = menu.len() - 1;

        let choice = Select::new()
            .with_prompt("Pick a favorite")
            .items(&menu)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if choice == quit_idx {
            return Ok(());
        }
        if Some(choice) == next_idx {
            page += 1;
            continue;
        }
        if Some(choice) == prev_idx {
            page -= 1;
            continue;
        }
        manage_favorite(&mut session, entries[choice].id)?;
    }
}

fn manage_favorite(session: &mut Session, favorite_id: i64) -> Result<()> {
    loop {
        let favorite = match session.favorites().find(favorite_id) {
            Some(f) => f.clone(),
            None => return Ok(()),
        };
        print_favorite(session, &favorite);

        let actions = [
            "Stop replacing one product",
            "Remove this favorite entirely",
            "Back",
        ];
        let choice = Select::new()
            .with_prompt("What now?")
            .items(&actions)
            .default(2)
            .interact()
            .into_diagnostic()?;
        match choice {
            0 => {
                let names: Vec<String> = favorite
                    .substitute_to
                    .iter()
                    .map(|p| p.name.clone())
                    .collect();
                let target = Select::new()
                    .with_prompt("Which product should it no longer replace?")
                    .items(&names)
                    .default(0)
                    .interact()
                    .into_diagnostic()?;
                let product = &favorite.substitute_to[target];
                let outcome = session
                    .remove_favorite_link(favorite_id, product.id)
                    .map_err(|e| miette::miette!("{}", e))?;
                match outcome {
                    UnlinkOutcome::Unlinked => println!(
                        "{} {} no longer replaces {}",
                        style("✓").green(),
                        favorite.core.name,
                        product.name
                    ),
                    UnlinkOutcome::RemovedLast => {
                        println!(
                            "{} That was the last link; removed {} from favorites",
                            style("✓").green(),
                            favorite.core.name
                        );
                        return Ok(());
                    }
                }
            }
            1 => {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove {} from favorites?", favorite.core.name))
                    .default(false)
                    .interact()
                    .into_diagnostic()?;
                if confirmed {
                    session
                        .remove_favorite(favorite_id)
                        .map_err(|e| miette::miette!("{}", e))?;
                    println!(
                        "{} Removed {} from favorites",
                        style("✓").green(),
                        favorite.core.name
                    );
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }
    }
}

fn print_favorite(session: &Session, favorite: &Favorite) {
    println!();
    println!("{}", style(&favorite.core.name).bold());
    println!("  Grade:  {}", favorite.core.grade);
    println!("  Url:    {}", favorite.core.url);
    println!(
        "  Brands: {}",
        session.brand_names(&favorite.brands).join(", ")
    );
    println!("  Substitute to:");
    for (i, product) in favorite.substitute_to.iter().enumerate() {
        println!("    {}: {}", i + 1, product.name);
    }
}
