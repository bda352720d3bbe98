//! Headless product list: load the catalog once and print the view as JSON.
//!
//! Usage: `apm-catalog [CATEGORY_ID] [--add]`

use std::sync::Arc;

use anyhow::{Context, Result};

use apm_catalog::{CatalogConfig, CatalogService, HttpCatalogClient, ProductListPresenter};

#[derive(Debug, Default)]
struct Args {
    category: Option<String>,
    add: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    for arg in args {
        if arg == "--add" {
            parsed.add = true;
        } else if arg.starts_with("--") {
            anyhow::bail!("unknown flag: {arg}");
        } else if parsed.category.is_some() {
            anyhow::bail!("unexpected argument: {arg}");
        } else {
            parsed.category = Some(arg);
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    apm_observability::init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = CatalogConfig::from_env().context("invalid catalog configuration")?;
    tracing::info!(api_url = %config.api_url, "loading catalog");

    let client = HttpCatalogClient::new(&config);
    let catalog = Arc::new(CatalogService::new(Arc::new(client)));
    let presenter = ProductListPresenter::new(Arc::clone(&catalog));
    let view = presenter.attach();

    catalog.load().await;

    if let Some(category) = &args.category {
        presenter
            .select_category(category)
            .with_context(|| format!("invalid category {category:?}"))?;
    }
    if args.add {
        presenter.add_product();
    }

    let snapshot = view.snapshot();
    if let Some(message) = &snapshot.error_message {
        tracing::warn!(%message, "catalog loaded with errors");
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
