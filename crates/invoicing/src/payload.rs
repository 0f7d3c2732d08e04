//! Body of the create-invoice request.

use serde::{Deserialize, Serialize};

use tiffin_core::{CustomerId, DomainError, DomainResult, Money, PaymentMethodId, RestaurantId};

use crate::draft::{DraftState, InvoiceDraft};
use crate::status::InvoiceStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadItem {
    pub name: String,
    pub qty: String,
    pub price: Money,
}

/// Create-invoice request body, field names as the backend expects them
/// (including its `finalAmmount` spelling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub items: Vec<PayloadItem>,
    pub sub_total: Money,
    pub tax: Money,
    pub discount: Money,
    pub additional_amount: Money,
    pub round_off_amount: Money,
    pub final_ammount: Money,
    pub invoice_status: InvoiceStatus,
    pub advance_payment: Money,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethodId>,
}

impl InvoicePayload {
    /// Build the request body from a draft whose inputs are frozen for submission.
    pub fn from_draft(draft: &InvoiceDraft) -> DomainResult<Self> {
        if draft.state() != DraftState::Submitting {
            return Err(DomainError::conflict(
                "invoice payload can only be built while submitting",
            ));
        }
        let restaurant_id = draft.restaurant_id().cloned().ok_or_else(DomainError::not_found)?;
        let customer = draft.customer().ok_or_else(DomainError::not_found)?;
        let totals = draft.totals();

        let items = draft
            .items()
            .iter()
            .map(|item| PayloadItem {
                name: item.name.trim().to_string(),
                qty: item.qty.trim().to_string(),
                price: item.amount(),
            })
            .collect();

        let payment_method = if totals.advance_amount.is_positive() {
            draft.payment_method().cloned()
        } else {
            None
        };

        Ok(Self {
            items,
            sub_total: totals.subtotal,
            tax: totals.tax_amount,
            discount: totals.discount,
            additional_amount: totals.additional_amount,
            round_off_amount: totals.rounding_value,
            final_ammount: totals.final_total,
            invoice_status: totals.status,
            advance_payment: totals.advance_amount,
            customer_id: customer.id.clone(),
            restaurant_id,
            payment_method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tiffin_core::{DraftId, Percent};
    use tiffin_events::execute;

    use crate::calculator::RoundingChoice;
    use crate::draft::{
        BeginSubmit, Customer, DraftCommand, OpenDraft, SetAdvance, SetItems, SetRounding,
    };
    use crate::item::InvoiceItem;
    use crate::payment::{PaymentMethod, PaymentMethodCatalog};

    fn submitting_draft(advance: i64) -> InvoiceDraft {
        let cash = PaymentMethodId::new("cash").unwrap();
        let mut draft = InvoiceDraft::open(OpenDraft {
            draft_id: DraftId::new(),
            restaurant_id: RestaurantId::new("rest-9").unwrap(),
            customer: Customer::new(CustomerId::new("cust-3").unwrap(), "Ravi"),
            tax_rate: Percent::from_integer(5),
            payment_methods: PaymentMethodCatalog::new([PaymentMethod::new(cash.clone(), "Cash")]),
            occurred_at: Utc::now(),
        })
        .unwrap();

        let commands = vec![
            DraftCommand::SetItems(SetItems {
                items: vec![
                    InvoiceItem::new(" Lunch plan ", "30 days", Money::from_major(900)),
                    InvoiceItem::new("Delivery", "", Money::from_major(103)),
                ],
                occurred_at: Utc::now(),
            }),
            DraftCommand::SetRounding(SetRounding {
                choice: RoundingChoice::Floor10,
                occurred_at: Utc::now(),
            }),
            DraftCommand::SetAdvance(SetAdvance {
                amount: Money::from_major(advance),
                payment_method: Some(cash),
                occurred_at: Utc::now(),
            }),
            DraftCommand::BeginSubmit(BeginSubmit {
                occurred_at: Utc::now(),
            }),
        ];
        for cmd in &commands {
            execute(&mut draft, cmd).unwrap();
        }
        draft
    }

    #[test]
    fn payload_uses_backend_field_names() {
        let payload = InvoicePayload::from_draft(&submitting_draft(500)).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        // 1003 + 50.15 tax = 1053.15, floored to 1050.
        assert_eq!(json["subTotal"].as_f64(), Some(1003.0));
        assert_eq!(json["tax"].as_f64(), Some(50.15));
        assert_eq!(json["roundOffAmount"].as_f64(), Some(-3.15));
        assert_eq!(json["finalAmmount"].as_f64(), Some(1050.0));
        assert_eq!(json["advancePayment"].as_f64(), Some(500.0));
        assert_eq!(json["invoiceStatus"], "part_paid");
        assert_eq!(json["customerId"], "cust-3");
        assert_eq!(json["restaurantId"], "rest-9");
        assert_eq!(json["paymentMethod"], "cash");
        assert_eq!(json["items"][0]["name"], "Lunch plan");
        assert_eq!(json["items"][0]["qty"], "30 days");
    }

    #[test]
    fn payment_method_omitted_without_advance() {
        let payload = InvoicePayload::from_draft(&submitting_draft(0)).unwrap();
        assert_eq!(payload.invoice_status, InvoiceStatus::Unpaid);
        assert_eq!(payload.payment_method, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("paymentMethod").is_none());
    }

    #[test]
    fn payload_requires_submitting_state() {
        let draft = InvoiceDraft::empty(DraftId::new());
        let err = InvoicePayload::from_draft(&draft).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
