//! One invoice-creation attempt: open, edit, submit.

use chrono::Utc;
use rust_decimal::Decimal;

use tiffin_core::{DomainError, DraftId, InvoiceId, Money, PaymentMethodId, Percent, RestaurantId};
use tiffin_invoicing::{
    AddItem, BeginSubmit, CompleteSubmit, Customer, DiscountMode, DraftCommand, FailSubmit,
    InvoiceDraft, InvoiceItem, InvoicePayload, OpenDraft, RemoveItem, RoundingChoice,
    SetAdditional, SetAdvance, SetDiscount, SetItems, SetRounding, SetTax, effective_rate,
};

use crate::error::SessionError;
use crate::gateway::{InvoiceGateway, SettingsGateway};

/// Owns the draft for one open invoice-creation flow.
///
/// Every edit goes through the draft's reducer, so a rejected edit leaves the
/// previous draft in place. `submit` borrows the session mutably, which keeps
/// at most one create-invoice request in flight.
pub struct InvoiceSession<G> {
    gateway: G,
    draft: InvoiceDraft,
}

impl<G> InvoiceSession<G>
where
    G: InvoiceGateway + SettingsGateway,
{
    /// Load the restaurant's tax rate and the payment methods, then open the draft.
    pub async fn open(
        gateway: G,
        restaurant_id: RestaurantId,
        customer: Customer,
    ) -> Result<Self, SessionError> {
        let tax_config = gateway.tax_config(&restaurant_id).await?;
        let payment_methods = gateway.payment_methods().await?;
        let tax_rate = effective_rate(tax_config.as_ref());

        let draft = InvoiceDraft::open(OpenDraft {
            draft_id: DraftId::new(),
            restaurant_id,
            customer,
            tax_rate,
            payment_methods,
            occurred_at: Utc::now(),
        })?;

        tracing::info!(
            draft_id = %draft.id_typed(),
            tax_rate = %tax_rate,
            "invoice draft opened"
        );
        Ok(Self { gateway, draft })
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Close the flow, handing back the draft (discarded by the caller unless committed).
    pub fn into_draft(self) -> InvoiceDraft {
        self.draft
    }

    /// Apply an editing command.
    ///
    /// Submission commands are driven by [`InvoiceSession::submit`] only.
    pub fn dispatch(&mut self, command: DraftCommand) -> Result<(), SessionError> {
        match command {
            DraftCommand::Open(_)
            | DraftCommand::BeginSubmit(_)
            | DraftCommand::CompleteSubmit(_)
            | DraftCommand::FailSubmit(_) => Err(SessionError::Rejected(DomainError::conflict(
                "submission is driven by the session",
            ))),
            command => self.apply(command),
        }
    }

    pub fn set_items(&mut self, items: Vec<InvoiceItem>) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetItems(SetItems {
            items,
            occurred_at: Utc::now(),
        }))
    }

    pub fn add_item(&mut self, item: InvoiceItem) -> Result<(), SessionError> {
        self.apply(DraftCommand::AddItem(AddItem {
            item,
            occurred_at: Utc::now(),
        }))
    }

    pub fn remove_item(&mut self, index: usize) -> Result<(), SessionError> {
        self.apply(DraftCommand::RemoveItem(RemoveItem {
            index,
            occurred_at: Utc::now(),
        }))
    }

    pub fn set_discount(&mut self, mode: DiscountMode, value: Decimal) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetDiscount(SetDiscount {
            mode,
            value,
            occurred_at: Utc::now(),
        }))
    }

    pub fn set_tax(&mut self, rate: Percent) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetTax(SetTax {
            rate,
            occurred_at: Utc::now(),
        }))
    }

    pub fn set_additional(&mut self, amount: Money) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetAdditional(SetAdditional {
            amount,
            occurred_at: Utc::now(),
        }))
    }

    pub fn set_rounding(&mut self, choice: RoundingChoice) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetRounding(SetRounding {
            choice,
            occurred_at: Utc::now(),
        }))
    }

    pub fn set_advance(
        &mut self,
        amount: Money,
        payment_method: Option<PaymentMethodId>,
    ) -> Result<(), SessionError> {
        self.apply(DraftCommand::SetAdvance(SetAdvance {
            amount,
            payment_method,
            occurred_at: Utc::now(),
        }))
    }

    /// Validate, send the create-invoice request and settle the draft.
    ///
    /// Validation failures return before any request is made. Any response
    /// the backend accepted commits the draft, returning the invoice id when
    /// the response carried one. A transport failure or rejection puts the
    /// draft back into editing with all inputs intact, so the same call can
    /// simply be repeated.
    pub async fn submit(&mut self) -> Result<Option<InvoiceId>, SessionError> {
        self.apply(DraftCommand::BeginSubmit(BeginSubmit {
            occurred_at: Utc::now(),
        }))?;

        let payload = match InvoicePayload::from_draft(&self.draft) {
            Ok(payload) => payload,
            Err(err) => {
                self.fail(err.reason().to_string())?;
                return Err(err.into());
            }
        };

        tracing::info!(
            draft_id = %self.draft.id_typed(),
            final_total = %payload.final_ammount,
            status = %payload.invoice_status,
            "submitting invoice"
        );

        match self.gateway.create_invoice(&payload).await {
            Ok(created) => {
                self.apply(DraftCommand::CompleteSubmit(CompleteSubmit {
                    invoice_id: created.invoice_id.clone(),
                    occurred_at: Utc::now(),
                }))?;
                match &created.invoice_id {
                    Some(invoice_id) => tracing::info!(
                        draft_id = %self.draft.id_typed(),
                        invoice_id = %invoice_id,
                        "invoice committed"
                    ),
                    None => tracing::warn!(
                        draft_id = %self.draft.id_typed(),
                        "invoice committed without a backend id"
                    ),
                }
                Ok(created.invoice_id)
            }
            Err(err) => {
                tracing::warn!(
                    draft_id = %self.draft.id_typed(),
                    error = %err,
                    "invoice submission failed"
                );
                self.fail(err.user_message().to_string())?;
                Err(err.into())
            }
        }
    }

    fn fail(&mut self, reason: String) -> Result<(), SessionError> {
        self.apply(DraftCommand::FailSubmit(FailSubmit {
            reason,
            occurred_at: Utc::now(),
        }))
    }

    fn apply(&mut self, command: DraftCommand) -> Result<(), SessionError> {
        match self.draft.reduce(&command) {
            Ok(next) => {
                self.draft = next;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    draft_id = %self.draft.id_typed(),
                    reason = err.reason(),
                    "draft command rejected"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tiffin_core::CustomerId;
    use tiffin_invoicing::{
        DraftState, InvoiceStatus, PaymentMethod, PaymentMethodCatalog, TaxConfig,
    };

    use crate::error::TransportError;
    use crate::gateway::CreatedInvoice;

    /// In-memory backend recording every payload it receives.
    struct FakeBackend {
        tax: Option<TaxConfig>,
        invoice_id: Option<InvoiceId>,
        fail_with: Mutex<Option<TransportError>>,
        received: Mutex<Vec<InvoicePayload>>,
    }

    impl FakeBackend {
        fn new(tax: Option<u32>) -> Self {
            Self {
                tax: tax.map(|t| TaxConfig::new(Percent::from_integer(t))),
                invoice_id: Some(InvoiceId::new("inv-1").unwrap()),
                fail_with: Mutex::new(None),
                received: Mutex::new(Vec::new()),
            }
        }

        fn fail_next(&self, err: TransportError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn received(&self) -> Vec<InvoicePayload> {
            self.received.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvoiceGateway for FakeBackend {
        async fn create_invoice(
            &self,
            payload: &InvoicePayload,
        ) -> Result<CreatedInvoice, TransportError> {
            self.received.lock().unwrap().push(payload.clone());
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            Ok(CreatedInvoice {
                invoice_id: self.invoice_id.clone(),
                message: None,
            })
        }
    }

    #[async_trait]
    impl SettingsGateway for FakeBackend {
        async fn tax_config(
            &self,
            _restaurant_id: &RestaurantId,
        ) -> Result<Option<TaxConfig>, TransportError> {
            Ok(self.tax.clone())
        }

        async fn payment_methods(&self) -> Result<PaymentMethodCatalog, TransportError> {
            Ok(PaymentMethodCatalog::new([PaymentMethod::new(cash(), "Cash")]))
        }
    }

    fn cash() -> PaymentMethodId {
        PaymentMethodId::new("cash").unwrap()
    }

    fn customer() -> Customer {
        Customer::new(CustomerId::new("cust-1").unwrap(), "Meera")
    }

    fn inv_1() -> Option<InvoiceId> {
        Some(InvoiceId::new("inv-1").unwrap())
    }

    async fn open(tax: Option<u32>) -> InvoiceSession<FakeBackend> {
        open_with(FakeBackend::new(tax)).await
    }

    async fn open_with(backend: FakeBackend) -> InvoiceSession<FakeBackend> {
        InvoiceSession::open(
            backend,
            RestaurantId::new("rest-1").unwrap(),
            customer(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn open_applies_restaurant_tax_or_zero() {
        let session = open(Some(5)).await;
        assert_eq!(session.draft().totals().tax_rate, Percent::from_integer(5));

        let session = open(None).await;
        assert_eq!(session.draft().totals().tax_rate, Percent::ZERO);
    }

    #[tokio::test]
    async fn submit_commits_draft() {
        let mut session = open(Some(5)).await;
        session
            .set_items(vec![InvoiceItem::new("Monthly tiffin", "30", Money::from_major(1000))])
            .unwrap();
        session.set_advance(Money::from_major(500), Some(cash())).unwrap();

        let invoice_id = session.submit().await.unwrap();
        assert_eq!(invoice_id, inv_1());
        assert_eq!(session.draft().state(), DraftState::Committed);

        let sent = session.gateway().received();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].final_ammount, Money::from_major(1050));
        assert_eq!(sent[0].invoice_status, InvoiceStatus::PartPaid);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_backend() {
        let mut session = open(None).await;
        session
            .set_items(vec![InvoiceItem::new("", "1", Money::from_major(100))])
            .unwrap();

        let err = session.submit().await.unwrap_err();
        assert_eq!(err.user_message(), "item 1: name is required");
        assert!(session.gateway().received().is_empty());
        assert_eq!(session.draft().state(), DraftState::Editing);
    }

    #[tokio::test]
    async fn transport_failure_keeps_draft_for_retry() {
        let mut session = open(None).await;
        session
            .set_items(vec![InvoiceItem::new("Thali", "1", Money::from_major(120))])
            .unwrap();
        session.gateway().fail_next(TransportError::Network("connection reset".to_string()));

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Transport(TransportError::Network(_))));
        assert_eq!(session.draft().state(), DraftState::Editing);
        assert_eq!(session.draft().last_error(), Some(crate::GENERIC_NETWORK_ERROR));
        assert_eq!(session.draft().items().len(), 1);

        let invoice_id = session.submit().await.unwrap();
        assert_eq!(invoice_id, inv_1());
        assert_eq!(session.gateway().received().len(), 2);
    }

    #[tokio::test]
    async fn accepted_submission_without_id_commits() {
        let mut backend = FakeBackend::new(None);
        backend.invoice_id = None;
        let mut session = open_with(backend).await;
        session
            .set_items(vec![InvoiceItem::new("Thali", "1", Money::from_major(120))])
            .unwrap();

        assert_eq!(session.submit().await.unwrap(), None);
        assert_eq!(session.draft().state(), DraftState::Committed);

        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, SessionError::Rejected(DomainError::Conflict(_))));
        assert_eq!(session.gateway().received().len(), 1);
    }

    #[tokio::test]
    async fn rejected_edit_keeps_previous_values() {
        let mut session = open(None).await;
        session
            .set_items(vec![InvoiceItem::new("Thali", "1", Money::from_major(200))])
            .unwrap();
        session.set_discount(DiscountMode::Amount, Decimal::from(50)).unwrap();

        let err = session
            .set_discount(DiscountMode::Amount, Decimal::from(250))
            .unwrap_err();
        assert!(matches!(err, SessionError::Rejected(DomainError::Validation(_))));
        assert_eq!(session.draft().totals().discount, Money::from_major(50));

        let err = session.set_advance(Money::from_major(10), None).unwrap_err();
        assert_eq!(err.user_message(), "select a payment method to record an advance");
    }

    #[tokio::test]
    async fn dispatch_refuses_submission_commands() {
        let mut session = open(None).await;
        let err = session
            .dispatch(DraftCommand::BeginSubmit(BeginSubmit {
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, SessionError::Rejected(DomainError::Conflict(_))));

        session
            .dispatch(DraftCommand::SetTax(SetTax {
                rate: Percent::from_integer(12),
                occurred_at: Utc::now(),
            }))
            .unwrap();
        assert_eq!(session.draft().totals().tax_rate, Percent::from_integer(12));
    }
}
