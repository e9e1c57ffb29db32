//! Interactive substitute finder
//!
//! Category -> product page -> substitutes -> save as favorite. Every
//! paged view flushes its registry first so the partial tail page is
//! visible, then walks pages with next/previous entries in the menu.

use console::style;
use dialoguer::{Confirm, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{summarize_names, truncate_str, NAME_WIDTH};
use crate::cli::table::pretty_table;
use crate::cli::GlobalOpts;
use crate::core::{SaveOutcome, Session};
use crate::entities::{NutritionGrade, Substitute};

use super::{open_session, require_data};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    require_data(&session)?;

    loop {
        let mut items: Vec<String> = session
            .categories()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        items.push("Quit".into());
        let choice = Select::new()
            .with_prompt("Pick a category")
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if choice + 1 == items.len() {
            return Ok(());
        }
        let category_id = session.categories()[choice].id;
        browse_category(&mut session, category_id)?;
    }
}

/// One displayable product line.
struct ProductEntry {
    id: i64,
    name: String,
    brands: Vec<i64>,
    grade: NutritionGrade,
}

fn browse_category(session: &mut Session, category_id: i64) -> Result<()> {
    if let Some(category) = session.category_mut(category_id) {
        category.products.flush();
    }

    let mut page = 0usize;
    loop {
        session
            .ensure_page_brands(category_id, page)
            .map_err(|e| miette::miette!("{}", e))?;

        let (category_name, page_count, entries) = {
            let category = session
                .category(category_id)
                .ok_or_else(|| miette::miette!("No category with id {}", category_id))?;
            let entries: Vec<ProductEntry> = category
                .products
                .page(page)
                .unwrap_or(&[])
                .iter()
                .map(|p| ProductEntry {
                    id: p.core.id,
                    name: p.core.name.clone(),
                    brands: p.brands.clone(),
                    grade: p.core.grade,
                })
                .collect();
            (category.name.clone(), category.products.page_count(), entries)
        };
        if entries.is_empty() {
            println!("No products in this category.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                vec![
                    (i + 1).to_string(),
                    truncate_str(&entry.name, NAME_WIDTH),
                    summarize_names(&session.brand_names(&entry.brands)),
                    entry.grade.to_string(),
                ]
            })
            .collect();
        println!(
            "\n{} — page {}/{}",
            style(&category_name).bold(),
            page + 1,
            page_count
        );
        println!("{}", pretty_table(["#", "Name", "Brands", "Nutriscore"], rows));

        let mut menu: Vec<String> = entries
            .iter()
            .map(|e| truncate_str(&e.name, NAME_WIDTH))
            .collect();
        let next_idx = (page + 1 < page_count).then(|| {
            menu.push("Next page".into());
            menu.len() - 1
        });
        let prev_idx = (page > 0).then(|| {
            menu.push("Previous page".into());
            menu.len() - 1
        });
        menu.push("Back".into());
        let back_idx = menu.len() - 1;

        let choice = Select::new()
            .with_prompt("Pick a product to replace")
            .items(&menu)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if choice == back_idx {
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
        inspect_product(session, category_id, entries[choice].id)?;
    }
}

fn inspect_product(session: &mut Session, category_id: i64, product_id: i64) -> Result<()> {
    let found = session
        .find_substitutes(category_id, product_id)
        .map_err(|e| miette::miette!("{}", e))?;
    if found == 0 {
        println!(
            "{}",
            style("No healthier substitute is known for this product.").yellow()
        );
        return Ok(());
    }
    let product_core = {
        let category = session
            .category_mut(category_id)
            .ok_or_else(|| miette::miette!("No category with id {}", category_id))?;
        let product = category
            .products
            .find_mut(product_id)
            .ok_or_else(|| miette::miette!("No product with id {}", product_id))?;
        product.substitutes.flush();
        product.core.clone()
    };

    let mut page = 0usize;
    loop {
        session
            .ensure_substitute_page_loaded(category_id, product_id, page)
            .map_err(|e| miette::miette!("{}", e))?;

        let (page_count, entries): (usize, Vec<Substitute>) = {
            let category = session
                .category(category_id)
                .ok_or_else(|| miette::miette!("No category with id {}", category_id))?;
            let product = category
                .products
                .find(product_id)
                .ok_or_else(|| miette::miette!("No product with id {}", product_id))?;
            (
                product.substitutes.page_count(),
                product.substitutes.page(page).unwrap_or(&[]).to_vec(),
            )
        };
        if entries.is_empty() {
            return Ok(());
        }

        let rows: Vec<Vec<String>> = entries
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                vec![
                    (i + 1).to_string(),
                    truncate_str(&sub.core.name, NAME_WIDTH),
                    summarize_names(&session.brand_names(&sub.brands)),
                    sub.core.grade.to_string(),
                ]
            })
            .collect();
        println!(
            "\nSubstitutes for {} (grade {})",
            style(&product_core.name).bold(),
            product_core.grade
        );
        println!("{}", pretty_table(["#", "Name", "Brands", "Nutriscore"], rows));

        let mut menu: Vec<String> = entries
            .iter()
            .map(|s| truncate_str(&s.core.name, NAME_WIDTH))
            .collect();
        let next_idx = (page + 1 < page_count).then(|| {
            menu.push("Next page".into());
            menu.len() - 1
        });
        let prev_idx = (page > 0).then(|| {
            menu.push("Previous page".into());
            menu.len() - 1
        });
        menu.push("Back".into());
        let back_idx = menu.len() - 1;

        let choice = Select::new()
            .with_prompt("Pick a substitute")
            .items(&menu)
            .default(0)
            .interact()
            .into_diagnostic()?;
        if choice == back_idx {
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

        let substitute = entries[choice].clone();
        print_substitute(session, &substitute);
        let save = Confirm::new()
            .with_prompt(format!(
                "Save {} as a substitute for {}?",
                substitute.core.name, product_core.name
            ))
            .default(true)
            .interact()
            .into_diagnostic()?;
        if !save {
            continue;
        }
        match session
            .try_save_favorite(&substitute, &product_core)
            .map_err(|e| miette::miette!("{}", e))?
        {
            SaveOutcome::Saved => println!(
                "{} Saved {} as a substitute for {}",
                style("✓").green(),
                style(&substitute.core.name).cyan(),
                product_core.name
            ),
            SaveOutcome::AlreadyLinked => println!(
                "{}",
                style("Already saved as a substitute for this product.").yellow()
            ),
        }
    }
}

fn print_substitute(session: &Session, substitute: &Substitute) {
    println!();
    println!("{}", style(&substitute.core.name).bold());
    println!("  Grade:  {}", substitute.core.grade);
    println!("  Url:    {}", substitute.core.url);
    println!(
        "  Brands: {}",
        session.brand_names(&substitute.brands).join(", ")
    );
    println!(
        "  Stores: {}",
        session.store_names(&substitute.stores).join(", ")
    );
}
