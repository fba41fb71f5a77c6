//! CLI command implementations.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod coupon;
pub mod currency;
pub mod products;

use clap::{Args, Subcommand};

/// Arguments for the products command.
#[derive(Args)]
pub struct ProductsArgs {
    /// Currency to list prices in (default: saved preference).
    #[arg(short, long)]
    pub currency: Option<String>,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals.
    Show,
    /// Add a catalog product.
    Add {
        /// Product ID.
        product: String,
        /// Units to add.
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Remove a product line.
    Remove {
        /// Product ID.
        product: String,
    },
    /// Set the quantity of a line. Values below 1 remove it.
    Set {
        /// Product ID.
        product: String,
        /// New quantity.
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Add one unit to a line.
    Inc {
        /// Product ID.
        product: String,
    },
    /// Take one unit from a line.
    Dec {
        /// Product ID.
        product: String,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    #[command(subcommand)]
    pub command: CouponCommand,
}

#[derive(Subcommand)]
pub enum CouponCommand {
    /// Apply a coupon code to the cart.
    Apply {
        /// Coupon code (case-insensitive).
        code: String,
    },
    /// Remove the active coupon.
    Remove,
}

/// Arguments for the currency command.
#[derive(Args)]
pub struct CurrencyArgs {
    /// Currency code to switch to. Omit to show the current one.
    pub code: Option<String>,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    #[command(subcommand)]
    pub method: CheckoutMethod,

    /// Skip confirmation prompt.
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum CheckoutMethod {
    /// Pay with a PIX instant transfer.
    Pix,
    /// Pay by card.
    Card {
        /// Card number.
        #[arg(long)]
        number: String,
        /// Name printed on the card.
        #[arg(long)]
        holder: String,
        /// Expiry as MMYY or MM/YY.
        #[arg(long)]
        expiry: String,
        /// Security code.
        #[arg(long)]
        cvv: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
