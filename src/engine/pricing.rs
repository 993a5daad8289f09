use crate::domain::{Money, ReservedLine};

/// Tax and delivery rules applied to a reserved cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Tax rate in basis points (1800 = 18%).
    pub tax_rate_bps: u32,
    pub delivery_fee: Money,
    /// Delivery is free when the subtotal is strictly above this amount.
    pub free_delivery_threshold: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate_bps: 1_800,
            delivery_fee: Money::from_cents(5_000),
            free_delivery_threshold: Money::from_cents(50_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery: Money,
    pub total: Money,
}

impl PricingPolicy {
    /// Prices reserved lines. `None` if any intermediate amount overflows.
    pub fn price(&self, lines: &[ReservedLine]) -> Option<PriceBreakdown> {
        let mut subtotal = Money::ZERO;
        for line in lines {
            subtotal = subtotal.checked_add(line.unit_price.checked_mul_qty(line.quantity)?)?;
        }
        let tax = subtotal.checked_apply_bps(self.tax_rate_bps)?;
        let delivery = if subtotal > self.free_delivery_threshold {
            Money::ZERO
        } else {
            self.delivery_fee
        };
        let total = subtotal.checked_add(tax)?.checked_add(delivery)?;
        Some(PriceBreakdown { subtotal, tax, delivery, total })
    }
}
