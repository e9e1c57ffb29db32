//! Non-interactive listings for piping

use clap::Subcommand;
use miette::Result;

use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::Config;

use super::{open_session, require_data};

#[derive(Subcommand)]
pub enum ListCommands {
    /// List ingested categories
    Categories,
    /// List products of a category
    Products(ProductsArgs),
    /// List saved favorites
    Favorites,
}

#[derive(clap::Args, Debug)]
pub struct ProductsArgs {
    /// Category id (see `nutriswap list categories`)
    #[arg(long, short = 'c')]
    pub category: i64,
}

const CATEGORY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("ID", 6),
    ColumnDef::new("NAME", 34),
    ColumnDef::new("PRODUCTS", 10),
    ColumnDef::new("URL", 60),
];

const PRODUCT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("ID", 6),
    ColumnDef::new("NAME", 40),
    ColumnDef::new("BRANDS", 30),
    ColumnDef::new("GRADE", 6),
];

const FAVORITE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("ID", 6),
    ColumnDef::new("NAME", 40),
    ColumnDef::new("GRADE", 6),
    ColumnDef::new("SUBSTITUTE TO", 40),
    ColumnDef::new("SAVED", 12),
];

pub fn run(cmd: ListCommands, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = global.format.resolve(&config);
    let mut session = open_session(global)?;

    match cmd {
        ListCommands::Categories => {
            let rows: Vec<TableRow> = session
                .categories()
                .iter()
                .map(|c| {
                    TableRow::new()
                        .cell(CellValue::Id(c.id))
                        .cell(CellValue::Text(c.name.clone()))
                        .cell(CellValue::Number(c.products.len() as i64))
                        .cell(CellValue::Text(c.url.clone()))
                })
                .collect();
            TableFormatter::new(CATEGORY_COLUMNS, "categorie").output(rows, format, global.quiet);
        }
        ListCommands::Products(args) => {
            require_data(&session)?;
            let category_id = args.category;
            let page_count = {
                let category = session
                    .category_mut(category_id)
                    .ok_or_else(|| miette::miette!("No category with id {}", category_id))?;
                category.products.flush();
                category.products.page_count()
            };
            for page in 0..page_count {
                session
                    .ensure_page_brands(category_id, page)
                    .map_err(|e| miette::miette!("{}", e))?;
            }

            let mut rows = Vec::new();
            {
                let category = session
                    .category(category_id)
                    .ok_or_else(|| miette::miette!("No category with id {}", category_id))?;
                for product in category.products.iter() {
                    rows.push((
                        product.core.id,
                        product.core.name.clone(),
                        product.brands.clone(),
                        product.core.grade,
                    ));
                }
            }
            let rows: Vec<TableRow> = rows
                .into_iter()
                .map(|(id, name, brands, grade)| {
                    let brands = session.brand_names(&brands).join(", ");
                    TableRow::new()
                        .cell(CellValue::Id(id))
                        .cell(CellValue::Text(name))
                        .cell(CellValue::Text(brands))
                        .cell(CellValue::Grade(grade))
                })
                .collect();
            TableFormatter::new(PRODUCT_COLUMNS, "product").output(rows, format, global.quiet);
        }
        ListCommands::Favorites => {
            session.favorites_mut().flush();
            let page_count = session.favorites().registry().page_count();
            for page in 0..page_count {
                session
                    .ensure_favorite_page_loaded(page)
                    .map_err(|e| miette::miette!("{}", e))?;
            }
            let rows: Vec<TableRow> = session
                .favorites()
                .registry()
                .iter()
                .map(|f| {
                    let targets: Vec<String> =
                        f.substitute_to.iter().map(|p| p.name.clone()).collect();
                    TableRow::new()
                        .cell(CellValue::Id(f.id))
                        .cell(CellValue::Text(f.core.name.clone()))
                        .cell(CellValue::Grade(f.core.grade))
                        .cell(CellValue::Text(targets.join(", ")))
                        .cell(CellValue::Text(f.saved_at.format("%Y-%m-%d").to_string()))
                })
                .collect();
            TableFormatter::new(FAVORITE_COLUMNS, "favorite").output(rows, format, global.quiet);
        }
    }
    Ok(())
}
