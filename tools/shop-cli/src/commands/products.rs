//! Catalog listing.

use anyhow::{Context as _, Result};
use shop_commerce::checkout::OrderApi;
use shop_commerce::Currency;

use super::ProductsArgs;
use crate::context::Context;
use crate::output::price;

/// Run the products command.
pub async fn run(args: ProductsArgs, ctx: &Context) -> Result<()> {
    let currency = match args.currency {
        Some(code) => code.parse::<Currency>()?,
        None => ctx.storefront().await?.currency().get(),
    };

    let api = ctx.api()?;
    let spinner = ctx.output.spinner(&format!("Fetching catalog in {}...", currency));
    let products = api.list_products(currency).await;
    spinner.finish_and_clear();
    let products = products.context("Failed to fetch catalog")?;

    if ctx.output.is_json() {
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header(&format!("Products ({})", currency));
    if products.is_empty() {
        ctx.output.info("No products");
        return Ok(());
    }

    let widths = [16, 32, 14];
    ctx.output.table_row(&["ID", "TITLE", "PRICE"], &widths);
    for product in &products {
        ctx.output.table_row(
            &[
                product.id.as_str(),
                product.title.as_str(),
                price(product.price, currency).as_str(),
            ],
            &widths,
        );
    }

    Ok(())
}
