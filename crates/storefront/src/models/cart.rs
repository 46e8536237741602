//! Cart lines and totals.

use aoeyaeng_core::{CartItemId, Price, ProductId};

/// One product in a member's cart.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.quantity)
    }
}

/// A member's cart with its computed total.
#[derive(Debug, Clone, Default)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub item_count: u32,
}

impl CartSummary {
    /// Sum line totals and quantities.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity));
        Self {
            lines,
            total,
            item_count,
        }
    }
}
