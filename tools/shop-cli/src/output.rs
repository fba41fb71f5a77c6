//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use shop_commerce::checkout::CheckoutState;
use shop_commerce::pricing::CartTotals;
use shop_commerce::prelude::{Cart, Currency};

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print the cart lines followed by the totals block.
    pub fn cart(&self, cart: &Cart, totals: &CartTotals) {
        if self.json {
            self.json(&serde_json::json!({ "lines": cart, "totals": totals }));
            return;
        }

        if cart.is_empty() {
            self.info("Cart is empty");
            return;
        }

        let widths = [16, 28, 6, 14];
        self.table_row(&["PRODUCT", "TITLE", "QTY", "LINE TOTAL"], &widths);
        for line in cart.lines() {
            let total = price(line.line_total().unwrap_or_default(), totals.total.currency);
            self.table_row(
                &[
                    line.product_id.as_str(),
                    line.title.as_str(),
                    line.quantity.to_string().as_str(),
                    total.as_str(),
                ],
                &widths,
            );
        }

        println!();
        self.kv("Items", &totals.item_count.to_string());
        self.kv("Subtotal", &totals.subtotal.to_string());
        if let Some(code) = &totals.coupon_code {
            self.kv(&format!("Coupon {}", code), &format!("-{}", totals.discount));
        }
        println!("  {}: {}", style("Total").bold(), style(totals.total).bold());
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Format an amount in a currency.
pub fn price(amount: shop_commerce::Amount, currency: Currency) -> String {
    amount.in_currency(currency).to_string()
}

/// Status badge for checkout states.
pub fn state_badge(state: CheckoutState) -> String {
    match state {
        CheckoutState::Succeeded => style(state).green().to_string(),
        CheckoutState::Validating | CheckoutState::Submitting => style(state).yellow().to_string(),
        CheckoutState::Failed => style(state).red().to_string(),
        CheckoutState::Idle => style(state).dim().to_string(),
    }
}
