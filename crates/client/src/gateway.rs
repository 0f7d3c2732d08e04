//! Backend collaborators seen from the invoice flow.

use async_trait::async_trait;

use tiffin_core::{InvoiceId, RestaurantId};
use tiffin_invoicing::{InvoicePayload, PaymentMethodCatalog, TaxConfig};

use crate::error::TransportError;

/// Result of a create-invoice request the backend accepted (any 2xx).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedInvoice {
    /// Id of the stored invoice, when the response carried one.
    pub invoice_id: Option<InvoiceId>,
    /// Confirmation text from the backend, if any.
    pub message: Option<String>,
}

/// Creates invoices in the system of record.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn create_invoice(&self, payload: &InvoicePayload)
    -> Result<CreatedInvoice, TransportError>;
}

/// Read-only settings the draft is opened with.
#[async_trait]
pub trait SettingsGateway: Send + Sync {
    /// Tax part of the restaurant's threshold settings; `None` when the
    /// restaurant has none configured.
    async fn tax_config(&self, restaurant_id: &RestaurantId)
    -> Result<Option<TaxConfig>, TransportError>;

    async fn payment_methods(&self) -> Result<PaymentMethodCatalog, TransportError>;
}
