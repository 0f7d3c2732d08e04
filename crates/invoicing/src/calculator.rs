//! Invoice total calculation.
//!
//! A fixed pipeline of pure functions:
//!
//! ```text
//! items ──► subtotal ──► discount ─┐
//!               │                  ├─► base total ──► (+ rounding delta) ──► final total ──► due / status
//!               └──────► tax ──────┘        ▲
//!                      additional ──────────┘
//! ```
//!
//! Nothing here is rounded except the final total, which is always a whole
//! amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffin_core::{DomainError, DomainResult, Money, PaymentMethodId, Percent};

use crate::item::InvoiceItem;
use crate::status::InvoiceStatus;

/// Step the rounding options snap to.
pub const ROUNDING_STEP: u32 = 10;

/// How the operator entered the discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountMode {
    /// Percentage of the subtotal.
    Percent,
    /// Absolute currency amount.
    Amount,
}

/// The discount exactly as entered, kept so it can be re-evaluated when the
/// subtotal changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountEntry {
    pub mode: DiscountMode,
    pub value: Decimal,
}

impl DiscountEntry {
    pub fn percent(value: Decimal) -> Self {
        Self {
            mode: DiscountMode::Percent,
            value,
        }
    }

    pub fn amount(value: Decimal) -> Self {
        Self {
            mode: DiscountMode::Amount,
            value,
        }
    }

    pub fn evaluate(&self, subtotal: Money) -> DomainResult<Money> {
        compute_discount(subtotal, self.mode, self.value)
    }
}

/// Rounding option picked by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingChoice {
    /// Down to the previous multiple of ten.
    Floor10,
    /// No adjustment.
    Exact,
    /// Up to the next multiple of ten.
    Ceil10,
}

/// The three rounding candidates for one base total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingOptions {
    pub base_total: Money,
    pub floor10: Money,
    pub exact: Money,
    pub ceil10: Money,
}

impl RoundingOptions {
    pub fn value(&self, choice: RoundingChoice) -> Money {
        match choice {
            RoundingChoice::Floor10 => self.floor10,
            RoundingChoice::Exact => self.exact,
            RoundingChoice::Ceil10 => self.ceil10,
        }
    }

    /// Signed offset from the base total for a choice; this is what gets stored.
    pub fn delta(&self, choice: RoundingChoice) -> Money {
        self.value(choice) - self.base_total
    }
}

/// Remaining balance and payment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueAndStatus {
    pub due_amount: Money,
    pub status: InvoiceStatus,
}

/// Sum of line amounts. Lines without a price contribute nothing.
pub fn compute_subtotal(items: &[InvoiceItem]) -> Money {
    items.iter().map(InvoiceItem::amount).sum()
}

/// Discount in currency for an entered value.
///
/// Rejects (never clamps) a discount larger than the subtotal.
pub fn compute_discount(subtotal: Money, mode: DiscountMode, entered: Decimal) -> DomainResult<Money> {
    if entered.is_sign_negative() && !entered.is_zero() {
        return Err(DomainError::validation("discount cannot be negative"));
    }
    let discount = match mode {
        DiscountMode::Percent => subtotal.mul_percent(Percent::new(entered)?),
        DiscountMode::Amount => Money::new(entered),
    };
    if discount > subtotal {
        return Err(DomainError::validation(format!(
            "discount ({discount}) cannot exceed the subtotal ({subtotal})"
        )));
    }
    Ok(discount)
}

pub fn compute_tax(subtotal: Money, rate: Percent) -> Money {
    subtotal.mul_percent(rate)
}

/// Pre-rounding total.
pub fn compute_base_total(subtotal: Money, discount: Money, tax: Money, additional: Money) -> Money {
    subtotal - discount + tax + additional
}

pub fn compute_rounding_options(base_total: Money) -> RoundingOptions {
    RoundingOptions {
        base_total,
        floor10: base_total.floor_to(ROUNDING_STEP),
        exact: base_total,
        ceil10: base_total.ceil_to(ROUNDING_STEP),
    }
}

/// Final payable amount, always a whole unit even for the "exact" option.
pub fn compute_final_total(base_total: Money, rounding_value: Money) -> Money {
    (base_total + rounding_value).round_whole()
}

/// Due amount and status, rejecting an advance without a payment method.
pub fn compute_due_and_status(
    final_total: Money,
    advance_amount: Money,
    payment_method: Option<&PaymentMethodId>,
) -> DomainResult<DueAndStatus> {
    if advance_amount.is_negative() {
        return Err(DomainError::validation("advance amount cannot be negative"));
    }
    if advance_amount.is_positive() && payment_method.is_none() {
        return Err(DomainError::validation(
            "select a payment method to record an advance",
        ));
    }
    Ok(classify_payment(final_total, advance_amount))
}

/// Status rules without the payment-method check.
pub fn classify_payment(final_total: Money, advance_amount: Money) -> DueAndStatus {
    let status = if advance_amount.is_zero() {
        InvoiceStatus::Unpaid
    } else if advance_amount < final_total {
        InvoiceStatus::PartPaid
    } else if advance_amount == final_total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Advance
    };
    DueAndStatus {
        due_amount: final_total - advance_amount,
        status,
    }
}

/// Inputs the totals are derived from. The discount has already been
/// evaluated against the subtotal of `items`.
#[derive(Debug, Clone, Copy)]
pub struct TotalsInput<'a> {
    pub items: &'a [InvoiceItem],
    pub discount: Money,
    pub tax_rate: Percent,
    pub additional_amount: Money,
    pub rounding_value: Money,
    pub advance_amount: Money,
}

/// Every derived figure of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax_rate: Percent,
    pub tax_amount: Money,
    pub additional_amount: Money,
    pub base_total: Money,
    pub rounding_value: Money,
    pub final_total: Money,
    pub advance_amount: Money,
    pub due_amount: Money,
    pub status: InvoiceStatus,
}

impl InvoiceTotals {
    pub fn derive(input: TotalsInput<'_>) -> Self {
        let subtotal = compute_subtotal(input.items);
        let tax_amount = compute_tax(subtotal, input.tax_rate);
        let base_total =
            compute_base_total(subtotal, input.discount, tax_amount, input.additional_amount);
        let final_total = compute_final_total(base_total, input.rounding_value);
        let due = classify_payment(final_total, input.advance_amount);

        Self {
            subtotal,
            discount: input.discount,
            tax_rate: input.tax_rate,
            tax_amount,
            additional_amount: input.additional_amount,
            base_total,
            rounding_value: input.rounding_value,
            final_total,
            advance_amount: input.advance_amount,
            due_amount: due.due_amount,
            status: due.status,
        }
    }

    pub fn rounding_options(&self) -> RoundingOptions {
        compute_rounding_options(self.base_total)
    }
}
