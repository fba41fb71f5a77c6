//! Coupon commands.

use anyhow::Result;
use shop_commerce::coupon::{find_rule, CouponOutcome};

use super::{CouponArgs, CouponCommand};
use crate::context::Context;

/// Run the coupon command.
pub async fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;

    match args.command {
        CouponCommand::Apply { code } => match shop.apply_coupon(&code).await? {
            CouponOutcome::Applied(coupon) => {
                let currency = shop.currency().get();
                let description = find_rule(&coupon.code).map(|rule| rule.description).unwrap_or("");
                ctx.output.success(&format!(
                    "Coupon {} applied: -{}",
                    coupon.code,
                    coupon.discount_amount.in_currency(currency)
                ));
                if !description.is_empty() {
                    ctx.output.kv("Offer", description);
                }
            }
            CouponOutcome::Invalid { code } => {
                ctx.output.warn(&format!("Cupom inválido: {}", code));
            }
        },
        CouponCommand::Remove => {
            shop.remove_coupon().await?;
            ctx.output.success("Coupon removed");
        }
    }

    let totals = shop.totals();
    if ctx.output.is_json() {
        ctx.output.json(&totals);
    } else {
        ctx.output.kv("Total", &totals.total.to_string());
    }
    Ok(())
}
