//! Order placement.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use shop_commerce::checkout::{CardInput, OrderConfirmation, PaymentInput};
use shop_commerce::Currency;

use super::{CheckoutArgs, CheckoutMethod};
use crate::context::Context;
use crate::output::{price, state_badge};

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;
    let payment = match args.method {
        CheckoutMethod::Pix => PaymentInput::Pix,
        CheckoutMethod::Card {
            number,
            holder,
            expiry,
            cvv,
        } => PaymentInput::Card(CardInput {
            number,
            holder_name: holder,
            expiry,
            cvv,
        }),
    };

    let totals = shop.totals();
    if totals.item_count == 0 {
        bail!("Cart is empty");
    }

    ctx.output.header("Checkout");
    ctx.output.cart(&shop.cart().snapshot(), &totals);
    ctx.output.kv("Payment", payment.kind());

    if !args.yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", totals.total))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Checkout cancelled");
            return Ok(());
        }
    }

    let checkout = shop.checkout(ctx.api()?);
    let spinner = ctx.output.spinner("Placing order...");
    let result = checkout.submit(&payment).await;
    spinner.finish_and_clear();

    match result {
        Ok(confirmation) => {
            if ctx.output.is_json() {
                ctx.output.json(&confirmation);
            } else {
                print_confirmation(ctx, &confirmation, totals.total.currency);
            }
            Ok(())
        }
        Err(e) => {
            ctx.output.kv("State", &state_badge(checkout.state()));
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

fn print_confirmation(ctx: &Context, confirmation: &OrderConfirmation, fallback: Currency) {
    let currency = confirmation.currency.unwrap_or(fallback);

    ctx.output.success(&format!("Order {} placed", confirmation.order_number));
    ctx.output.kv("Total", &price(confirmation.total, currency));
    if let Some(discount) = confirmation.discount.filter(|d| !d.is_zero()) {
        ctx.output.kv("Discount", &price(discount, currency));
    }
    if let Some(status) = &confirmation.status {
        ctx.output.kv("Status", status);
    }
    if let Some(created_at) = confirmation.created_at {
        let local = created_at.with_timezone(&chrono::Local);
        ctx.output.kv("Placed at", &local.format("%Y-%m-%d %H:%M").to_string());
    }
}
