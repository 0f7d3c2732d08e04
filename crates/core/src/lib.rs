//! `tiffin-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, backend identifiers, currency amounts and the aggregate
//! traits the invoicing draft is built on.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, DraftId, InvoiceId, PaymentMethodId, RestaurantId};
pub use money::{Money, Percent};
pub use value_object::ValueObject;
