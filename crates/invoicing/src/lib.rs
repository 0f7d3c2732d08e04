//! Invoicing domain module: the invoice draft and its total calculation.
//!
//! This crate contains business rules for composing an invoice before it is
//! submitted, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage). The backend stays the system of record.

pub mod calculator;
pub mod draft;
pub mod item;
pub mod payload;
pub mod payment;
pub mod status;
pub mod tax;

pub use calculator::{
    DiscountEntry, DiscountMode, DueAndStatus, InvoiceTotals, RoundingChoice, RoundingOptions,
    TotalsInput, compute_base_total, compute_discount, compute_due_and_status,
    compute_final_total, compute_rounding_options, compute_subtotal, compute_tax,
};
pub use draft::{
    AddItem, BeginSubmit, CompleteSubmit, Customer, DraftCommand, DraftEvent, DraftState,
    FailSubmit, InvoiceDraft, OpenDraft, RemoveItem, RoundingSelection, SetAdditional, SetAdvance,
    SetDiscount, SetItems, SetRounding, SetTax,
};
pub use item::InvoiceItem;
pub use payload::{InvoicePayload, PayloadItem};
pub use payment::{PaymentMethod, PaymentMethodCatalog};
pub use status::InvoiceStatus;
pub use tax::{InMemoryTaxSettings, TaxConfig, TaxSettings, effective_rate, resolve_tax_rate};
