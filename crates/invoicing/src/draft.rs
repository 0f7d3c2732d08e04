use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffin_core::{
    Aggregate, AggregateRoot, CustomerId, DomainError, DomainResult, DraftId, InvoiceId, Money,
    PaymentMethodId, Percent, RestaurantId,
};
use tiffin_events::{Event, execute};

use crate::calculator::{
    DiscountEntry, DiscountMode, InvoiceTotals, RoundingChoice, RoundingOptions, TotalsInput,
    compute_due_and_status, compute_subtotal,
};
use crate::item::InvoiceItem;
use crate::payment::PaymentMethodCatalog;

/// Customer the invoice is raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone: None,
        }
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        Ok(())
    }
}

/// Draft lifecycle.
///
/// `Editing → Submitting → Committed`, or `Submitting → Editing` when the
/// backend rejects the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftState {
    Editing,
    Submitting,
    Committed,
}

/// Rounding chosen by the operator, stored as a signed delta together with
/// the base total the options were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingSelection {
    pub choice: RoundingChoice,
    pub delta: Money,
    pub base_total: Money,
}

impl RoundingSelection {
    /// The delta was computed for a different base total and no longer lands
    /// on the option the operator picked. "Exact" never goes stale.
    pub fn is_stale(&self, current_base_total: Money) -> bool {
        self.choice != RoundingChoice::Exact && self.base_total != current_base_total
    }
}

/// Aggregate root: an unsaved invoice being composed for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    id: DraftId,
    restaurant_id: Option<RestaurantId>,
    customer: Option<Customer>,
    payment_methods: PaymentMethodCatalog,
    items: Vec<InvoiceItem>,
    discount_entry: Option<DiscountEntry>,
    discount: Money,
    tax_rate: Percent,
    additional_amount: Money,
    rounding: Option<RoundingSelection>,
    advance_amount: Money,
    payment_method: Option<PaymentMethodId>,
    state: DraftState,
    last_error: Option<String>,
    invoice_id: Option<InvoiceId>,
    totals: InvoiceTotals,
    version: u64,
    created: bool,
}

impl InvoiceDraft {
    /// Create an empty, not-yet-opened draft (rehydration starting point).
    pub fn empty(id: DraftId) -> Self {
        Self {
            id,
            restaurant_id: None,
            customer: None,
            payment_methods: PaymentMethodCatalog::default(),
            items: Vec::new(),
            discount_entry: None,
            discount: Money::ZERO,
            tax_rate: Percent::ZERO,
            additional_amount: Money::ZERO,
            rounding: None,
            advance_amount: Money::ZERO,
            payment_method: None,
            state: DraftState::Editing,
            last_error: None,
            invoice_id: None,
            totals: InvoiceTotals::default(),
            version: 0,
            created: false,
        }
    }

    /// Open a draft for a selected customer.
    pub fn open(cmd: OpenDraft) -> DomainResult<Self> {
        let mut draft = Self::empty(cmd.draft_id);
        execute(&mut draft, &DraftCommand::Open(cmd))?;
        Ok(draft)
    }

    /// Reducer form: returns the next draft, leaving `self` untouched.
    ///
    /// A rejected command returns the rejection and no new value, so the
    /// caller keeps the previous draft as-is.
    pub fn reduce(&self, command: &DraftCommand) -> DomainResult<Self> {
        let mut next = self.clone();
        execute(&mut next, command)?;
        Ok(next)
    }

    pub fn id_typed(&self) -> DraftId {
        self.id
    }

    pub fn restaurant_id(&self) -> Option<&RestaurantId> {
        self.restaurant_id.as_ref()
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn payment_methods(&self) -> &PaymentMethodCatalog {
        &self.payment_methods
    }

    pub fn items(&self) -> &[InvoiceItem] {
        &self.items
    }

    pub fn discount_entry(&self) -> Option<DiscountEntry> {
        self.discount_entry
    }

    pub fn rounding(&self) -> Option<RoundingSelection> {
        self.rounding
    }

    /// Options computed from the current base total; these are the only ones
    /// `SetRounding` will apply.
    pub fn rounding_options(&self) -> RoundingOptions {
        self.totals.rounding_options()
    }

    pub fn rounding_is_stale(&self) -> bool {
        self.rounding
            .is_some_and(|r| r.is_stale(self.totals.base_total))
    }

    pub fn payment_method(&self) -> Option<&PaymentMethodId> {
        self.payment_method.as_ref()
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn is_editable(&self) -> bool {
        self.created && self.state == DraftState::Editing
    }

    /// Reason of the last failed submission, cleared when a new one starts.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn invoice_id(&self) -> Option<&InvoiceId> {
        self.invoice_id.as_ref()
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }
}

impl AggregateRoot for InvoiceDraft {
    type Id = DraftId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenDraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenDraft {
    pub draft_id: DraftId,
    pub restaurant_id: RestaurantId,
    pub customer: Customer,
    /// Rate resolved from the restaurant's tax configuration (0 when none).
    pub tax_rate: Percent,
    pub payment_methods: PaymentMethodCatalog,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetItems (replace all lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetItems {
    pub items: Vec<InvoiceItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item: InvoiceItem,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem (0-based index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub index: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetDiscount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDiscount {
    pub mode: DiscountMode,
    pub value: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetTax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTax {
    pub rate: Percent,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetAdditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAdditional {
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetRounding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRounding {
    pub choice: RoundingChoice,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetAdvance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAdvance {
    pub amount: Money,
    pub payment_method: Option<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: BeginSubmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginSubmit {
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteSubmit.
///
/// The backend accepted the invoice. `invoice_id` is `None` when its response
/// did not carry one; the draft is committed either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteSubmit {
    pub invoice_id: Option<InvoiceId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: FailSubmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailSubmit {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftCommand {
    Open(OpenDraft),
    SetItems(SetItems),
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    SetDiscount(SetDiscount),
    SetTax(SetTax),
    SetAdditional(SetAdditional),
    SetRounding(SetRounding),
    SetAdvance(SetAdvance),
    BeginSubmit(BeginSubmit),
    CompleteSubmit(CompleteSubmit),
    FailSubmit(FailSubmit),
}

/// Event: DraftOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOpened {
    pub draft_id: DraftId,
    pub restaurant_id: RestaurantId,
    pub customer: Customer,
    pub tax_rate: Percent,
    pub payment_methods: PaymentMethodCatalog,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsReplaced. Carries the discount re-evaluated for the new lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsReplaced {
    pub items: Vec<InvoiceItem>,
    pub discount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: InvoiceItem,
    pub discount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub index: usize,
    pub discount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DiscountApplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub entry: DiscountEntry,
    pub discount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TaxRateSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateSet {
    pub rate: Percent,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AdditionalAmountSet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalAmountSet {
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RoundingSelected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingSelected {
    pub selection: RoundingSelection,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AdvanceRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceRecorded {
    pub amount: Money,
    pub payment_method: Option<PaymentMethodId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SubmissionStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionStarted {
    pub occurred_at: DateTime<Utc>,
}

/// Event: InvoiceCommitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCommitted {
    pub invoice_id: Option<InvoiceId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SubmissionFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFailed {
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftEvent {
    DraftOpened(DraftOpened),
    ItemsReplaced(ItemsReplaced),
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    DiscountApplied(DiscountApplied),
    TaxRateSet(TaxRateSet),
    AdditionalAmountSet(AdditionalAmountSet),
    RoundingSelected(RoundingSelected),
    AdvanceRecorded(AdvanceRecorded),
    SubmissionStarted(SubmissionStarted),
    InvoiceCommitted(InvoiceCommitted),
    SubmissionFailed(SubmissionFailed),
}

impl Event for DraftEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DraftEvent::DraftOpened(_) => "invoicing.draft.opened",
            DraftEvent::ItemsReplaced(_) => "invoicing.draft.items_replaced",
            DraftEvent::ItemAdded(_) => "invoicing.draft.item_added",
            DraftEvent::ItemRemoved(_) => "invoicing.draft.item_removed",
            DraftEvent::DiscountApplied(_) => "invoicing.draft.discount_applied",
            DraftEvent::TaxRateSet(_) => "invoicing.draft.tax_rate_set",
            DraftEvent::AdditionalAmountSet(_) => "invoicing.draft.additional_amount_set",
            DraftEvent::RoundingSelected(_) => "invoicing.draft.rounding_selected",
            DraftEvent::AdvanceRecorded(_) => "invoicing.draft.advance_recorded",
            DraftEvent::SubmissionStarted(_) => "invoicing.draft.submission_started",
            DraftEvent::InvoiceCommitted(_) => "invoicing.draft.committed",
            DraftEvent::SubmissionFailed(_) => "invoicing.draft.submission_failed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DraftEvent::DraftOpened(e) => e.occurred_at,
            DraftEvent::ItemsReplaced(e) => e.occurred_at,
            DraftEvent::ItemAdded(e) => e.occurred_at,
            DraftEvent::ItemRemoved(e) => e.occurred_at,
            DraftEvent::DiscountApplied(e) => e.occurred_at,
            DraftEvent::TaxRateSet(e) => e.occurred_at,
            DraftEvent::AdditionalAmountSet(e) => e.occurred_at,
            DraftEvent::RoundingSelected(e) => e.occurred_at,
            DraftEvent::AdvanceRecorded(e) => e.occurred_at,
            DraftEvent::SubmissionStarted(e) => e.occurred_at,
            DraftEvent::InvoiceCommitted(e) => e.occurred_at,
            DraftEvent::SubmissionFailed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for InvoiceDraft {
    type Command = DraftCommand;
    type Event = DraftEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DraftEvent::DraftOpened(e) => {
                self.id = e.draft_id;
                self.restaurant_id = Some(e.restaurant_id.clone());
                self.customer = Some(e.customer.clone());
                self.tax_rate = e.tax_rate;
                self.payment_methods = e.payment_methods.clone();
                self.state = DraftState::Editing;
                self.created = true;
            }
            DraftEvent::ItemsReplaced(e) => {
                self.items = e.items.clone();
                self.discount = e.discount;
            }
            DraftEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
                self.discount = e.discount;
            }
            DraftEvent::ItemRemoved(e) => {
                if e.index < self.items.len() {
                    self.items.remove(e.index);
                }
                self.discount = e.discount;
            }
            DraftEvent::DiscountApplied(e) => {
                self.discount_entry = Some(e.entry);
                self.discount = e.discount;
            }
            DraftEvent::TaxRateSet(e) => {
                self.tax_rate = e.rate;
            }
            DraftEvent::AdditionalAmountSet(e) => {
                self.additional_amount = e.amount;
            }
            DraftEvent::RoundingSelected(e) => {
                self.rounding = Some(e.selection);
            }
            DraftEvent::AdvanceRecorded(e) => {
                self.advance_amount = e.amount;
                self.payment_method = e.payment_method.clone();
            }
            DraftEvent::SubmissionStarted(_) => {
                self.state = DraftState::Submitting;
                self.last_error = None;
            }
            DraftEvent::InvoiceCommitted(e) => {
                self.state = DraftState::Committed;
                self.invoice_id = e.invoice_id.clone();
            }
            DraftEvent::SubmissionFailed(e) => {
                self.state = DraftState::Editing;
                self.last_error = Some(e.reason.clone());
            }
        }

        self.recompute();
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DraftCommand::Open(cmd) => self.handle_open(cmd),
            DraftCommand::SetItems(cmd) => self.handle_set_items(cmd),
            DraftCommand::AddItem(cmd) => self.handle_add_item(cmd),
            DraftCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
            DraftCommand::SetDiscount(cmd) => self.handle_set_discount(cmd),
            DraftCommand::SetTax(cmd) => self.handle_set_tax(cmd),
            DraftCommand::SetAdditional(cmd) => self.handle_set_additional(cmd),
            DraftCommand::SetRounding(cmd) => self.handle_set_rounding(cmd),
            DraftCommand::SetAdvance(cmd) => self.handle_set_advance(cmd),
            DraftCommand::BeginSubmit(cmd) => self.handle_begin_submit(cmd),
            DraftCommand::CompleteSubmit(cmd) => self.handle_complete_submit(cmd),
            DraftCommand::FailSubmit(cmd) => self.handle_fail_submit(cmd),
        }
    }
}

impl InvoiceDraft {
    fn recompute(&mut self) {
        self.totals = InvoiceTotals::derive(TotalsInput {
            items: &self.items,
            discount: self.discount,
            tax_rate: self.tax_rate,
            additional_amount: self.additional_amount,
            rounding_value: self.rounding.map(|r| r.delta).unwrap_or(Money::ZERO),
            advance_amount: self.advance_amount,
        });
    }

    fn ensure_editing(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        match self.state {
            DraftState::Editing => Ok(()),
            DraftState::Submitting => Err(DomainError::conflict(
                "invoice is being submitted; wait for the result before editing",
            )),
            DraftState::Committed => Err(DomainError::conflict("invoice has already been submitted")),
        }
    }

    fn ensure_submitting(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.state != DraftState::Submitting {
            return Err(DomainError::conflict("no submission in progress"));
        }
        Ok(())
    }

    /// Discount for a candidate set of lines. An entered discount that no
    /// longer fits the new subtotal rejects the change.
    fn discount_for(&self, items: &[InvoiceItem]) -> Result<Money, DomainError> {
        match self.discount_entry {
            Some(entry) => entry.evaluate(compute_subtotal(items)),
            None => Ok(Money::ZERO),
        }
    }

    fn handle_open(&self, cmd: &OpenDraft) -> Result<Vec<DraftEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("draft is already open"));
        }
        cmd.customer.validate()?;

        Ok(vec![DraftEvent::DraftOpened(DraftOpened {
            draft_id: cmd.draft_id,
            restaurant_id: cmd.restaurant_id.clone(),
            customer: cmd.customer.clone(),
            tax_rate: cmd.tax_rate,
            payment_methods: cmd.payment_methods.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_items(&self, cmd: &SetItems) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        for (i, item) in cmd.items.iter().enumerate() {
            item.ensure_within_limit(i + 1)?;
        }
        let discount = self.discount_for(&cmd.items)?;

        Ok(vec![DraftEvent::ItemsReplaced(ItemsReplaced {
            items: cmd.items.clone(),
            discount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        cmd.item.ensure_within_limit(self.items.len() + 1)?;
        let mut items = self.items.clone();
        items.push(cmd.item.clone());
        let discount = self.discount_for(&items)?;

        Ok(vec![DraftEvent::ItemAdded(ItemAdded {
            item: cmd.item.clone(),
            discount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        if cmd.index >= self.items.len() {
            return Err(DomainError::validation(format!(
                "item {} does not exist",
                cmd.index + 1
            )));
        }
        let mut items = self.items.clone();
        items.remove(cmd.index);
        let discount = self.discount_for(&items)?;

        Ok(vec![DraftEvent::ItemRemoved(ItemRemoved {
            index: cmd.index,
            discount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_discount(&self, cmd: &SetDiscount) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        let entry = DiscountEntry {
            mode: cmd.mode,
            value: cmd.value,
        };
        let discount = entry.evaluate(self.totals.subtotal)?;

        Ok(vec![DraftEvent::DiscountApplied(DiscountApplied {
            entry,
            discount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_tax(&self, cmd: &SetTax) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;

        Ok(vec![DraftEvent::TaxRateSet(TaxRateSet {
            rate: cmd.rate,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_additional(&self, cmd: &SetAdditional) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        if cmd.amount.is_negative() {
            return Err(DomainError::validation("additional amount cannot be negative"));
        }
        cmd.amount.ensure_within_limit()?;

        Ok(vec![DraftEvent::AdditionalAmountSet(AdditionalAmountSet {
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_rounding(&self, cmd: &SetRounding) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        let options = self.rounding_options();

        Ok(vec![DraftEvent::RoundingSelected(RoundingSelected {
            selection: RoundingSelection {
                choice: cmd.choice,
                delta: options.delta(cmd.choice),
                base_total: options.base_total,
            },
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_advance(&self, cmd: &SetAdvance) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        cmd.amount.ensure_within_limit()?;
        compute_due_and_status(self.totals.final_total, cmd.amount, cmd.payment_method.as_ref())?;
        if let Some(method) = &cmd.payment_method {
            self.payment_methods.require(method)?;
        }

        Ok(vec![DraftEvent::AdvanceRecorded(AdvanceRecorded {
            amount: cmd.amount,
            payment_method: cmd.payment_method.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_begin_submit(&self, cmd: &BeginSubmit) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_editing()?;
        self.validate_for_submission()?;

        Ok(vec![DraftEvent::SubmissionStarted(SubmissionStarted {
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete_submit(&self, cmd: &CompleteSubmit) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_submitting()?;

        Ok(vec![DraftEvent::InvoiceCommitted(InvoiceCommitted {
            invoice_id: cmd.invoice_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_fail_submit(&self, cmd: &FailSubmit) -> Result<Vec<DraftEvent>, DomainError> {
        self.ensure_submitting()?;

        Ok(vec![DraftEvent::SubmissionFailed(SubmissionFailed {
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Everything that must hold before the request leaves the client.
    pub fn validate_for_submission(&self) -> DomainResult<()> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if let Some(customer) = &self.customer {
            customer.validate()?;
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("add at least one item before submitting"));
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate(i + 1)?;
        }
        if self.discount > self.totals.subtotal {
            return Err(DomainError::validation(format!(
                "discount ({}) cannot exceed the subtotal ({})",
                self.discount, self.totals.subtotal
            )));
        }
        compute_due_and_status(
            self.totals.final_total,
            self.advance_amount,
            self.payment_method.as_ref(),
        )?;
        if self.advance_amount.is_positive() {
            if let Some(method) = &self.payment_method {
                self.payment_methods.require(method)?;
            }
        }
        if self.rounding_is_stale() {
            return Err(DomainError::validation(
                "rounding no longer matches the current total; choose a rounding option again",
            ));
        }
        Ok(())
    }
}
