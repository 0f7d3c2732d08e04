use serde::{Deserialize, Serialize};

/// Payment status of an invoice, derived from the final total and the advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Nothing paid up front.
    #[default]
    Unpaid,
    /// Some, but not all, of the final total paid up front.
    PartPaid,
    /// Advance equals the final total.
    Paid,
    /// Advance exceeds the final total; the difference is customer credit.
    Advance,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::PartPaid => "part_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Advance => "advance",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
