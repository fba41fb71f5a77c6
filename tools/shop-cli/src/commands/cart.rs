//! Cart commands.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use shop_commerce::checkout::OrderApi;
use shop_commerce::prelude::MAX_QUANTITY_PER_ITEM;
use shop_commerce::{ProductId, Storefront};

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;

    match args.command.unwrap_or(CartCommand::Show) {
        CartCommand::Show => {}
        CartCommand::Add { product, quantity } => add(&shop, &product, quantity, ctx).await?,
        CartCommand::Remove { product } => {
            if shop.cart().remove_item(&ProductId::new(product.as_str())).await? {
                ctx.output.success(&format!("Removed {}", product));
            } else {
                ctx.output.warn(&format!("{} is not in the cart", product));
            }
        }
        CartCommand::Set { product, quantity } => {
            let quantity = shop
                .cart()
                .set_quantity(&ProductId::new(product.as_str()), quantity)
                .await?;
            report_quantity(ctx, &product, quantity);
        }
        CartCommand::Inc { product } => {
            let quantity = shop.cart().increment(&ProductId::new(product.as_str())).await?;
            report_quantity(ctx, &product, quantity);
        }
        CartCommand::Dec { product } => {
            let quantity = shop.cart().decrement(&ProductId::new(product.as_str())).await?;
            report_quantity(ctx, &product, quantity);
        }
        CartCommand::Clear { yes } => {
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove all {} items from the cart?", shop.cart().count()))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.info("Cart left as is");
                    return Ok(());
                }
            }
            shop.cart().clear().await?;
            ctx.output.success("Cart cleared");
        }
    }

    show(&shop, ctx);
    Ok(())
}

/// Units to add for a requested quantity; bounded by the per-line limit.
fn units_to_add(quantity: u32) -> Result<usize> {
    if quantity == 0 {
        bail!("Quantity must be at least 1");
    }
    if quantity > MAX_QUANTITY_PER_ITEM {
        bail!("Quantity must be at most {}", MAX_QUANTITY_PER_ITEM);
    }
    Ok(quantity as usize)
}

async fn add(shop: &Storefront, product_id: &str, quantity: u32, ctx: &Context) -> Result<()> {
    let count = units_to_add(quantity)?;

    let currency = shop.currency().get();
    let api = ctx.api()?;
    let spinner = ctx.output.spinner("Looking up product...");
    let catalog = api.list_products(currency).await;
    spinner.finish_and_clear();

    let product = catalog
        .context("Failed to fetch catalog")?
        .into_iter()
        .find(|p| p.id.as_str() == product_id)
        .with_context(|| format!("Unknown product: {}", product_id))?;

    let units = vec![product.clone(); count];
    shop.cart().add_multiple(&units).await?;

    ctx.output.success(&format!(
        "Added {} x {} ({} in cart)",
        quantity,
        product.title,
        shop.cart().quantity(&product.id)
    ));
    Ok(())
}

fn report_quantity(ctx: &Context, product: &str, quantity: u32) {
    if quantity == 0 {
        ctx.output.success(&format!("Removed {}", product));
    } else {
        ctx.output.success(&format!("{} x {}", product, quantity));
    }
}

fn show(shop: &Storefront, ctx: &Context) {
    let totals = shop.totals();
    ctx.output.header(&format!("Cart ({})", totals.total.currency));
    ctx.output.cart(&shop.cart().snapshot(), &totals);
}
