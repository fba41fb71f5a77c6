//! Currency preference.

use anyhow::Result;
use shop_commerce::Currency;

use super::CurrencyArgs;
use crate::context::Context;

/// Run the currency command.
pub async fn run(args: CurrencyArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront().await?;

    let currency = match args.code {
        Some(code) => {
            let currency: Currency = code.parse()?;
            shop.currency().set(currency).await?;
            ctx.output.success(&format!("Currency set to {}", currency));
            currency
        }
        None => shop.currency().get(),
    };

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "currency": currency }));
    } else {
        ctx.output.kv("Currency", &format!("{} ({})", currency, currency.symbol()));
    }
    Ok(())
}
