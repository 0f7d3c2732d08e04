use serde::{Deserialize, Serialize};

use tiffin_core::{DomainError, DomainResult, Money};

/// One invoice line as captured by the operator.
///
/// `price` is the amount for the whole line, not a unit price; `qty` is free
/// text ("2 plates", "1 month") and does not take part in any arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub price: Option<Money>,
}

impl InvoiceItem {
    pub fn new(name: impl Into<String>, qty: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            qty: qty.into(),
            price: Some(price),
        }
    }

    /// Contribution to the subtotal; a missing price counts as zero.
    pub fn amount(&self) -> Money {
        self.price.unwrap_or(Money::ZERO)
    }

    /// Rejects a price beyond [`Money::MAX_UNITS`]; checked whenever lines change.
    pub fn ensure_within_limit(&self, position: usize) -> DomainResult<()> {
        match self.price {
            Some(price) => price.ensure_within_limit().map(|_| ()).map_err(|e| {
                DomainError::validation(format!("item {position}: {}", e.reason()))
            }),
            None => Ok(()),
        }
    }

    /// Checks the fields required before the invoice can be submitted.
    ///
    /// `position` is the 1-based line number used in the message.
    pub fn validate(&self, position: usize) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "item {position}: name is required"
            )));
        }
        match self.price {
            None => Err(DomainError::validation(format!(
                "item {position}: price is required"
            ))),
            Some(price) if price.is_negative() => Err(DomainError::validation(format!(
                "item {position}: price cannot be negative"
            ))),
            Some(_) => Ok(()),
        }
    }
}
