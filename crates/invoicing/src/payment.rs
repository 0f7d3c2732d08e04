//! Payment methods an advance can be recorded against.

use serde::{Deserialize, Serialize};

use tiffin_core::{DomainError, DomainResult, PaymentMethodId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub label: String,
}

impl PaymentMethod {
    pub fn new(id: PaymentMethodId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// The enumerable set of payment methods offered by the backend.
///
/// Ids are unique; when the source lists an id twice the first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PaymentMethod>", into = "Vec<PaymentMethod>")]
pub struct PaymentMethodCatalog {
    methods: Vec<PaymentMethod>,
}

impl PaymentMethodCatalog {
    pub fn new(methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        let mut unique: Vec<PaymentMethod> = Vec::new();
        for method in methods {
            if !unique.iter().any(|m| m.id == method.id) {
                unique.push(method);
            }
        }
        Self { methods: unique }
    }

    pub fn get(&self, id: &PaymentMethodId) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| &m.id == id)
    }

    pub fn contains(&self, id: &PaymentMethodId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a method, rejecting ids the catalog does not know.
    pub fn require(&self, id: &PaymentMethodId) -> DomainResult<&PaymentMethod> {
        self.get(id)
            .ok_or_else(|| DomainError::validation(format!("unknown payment method '{id}'")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl From<Vec<PaymentMethod>> for PaymentMethodCatalog {
    fn from(methods: Vec<PaymentMethod>) -> Self {
        Self::new(methods)
    }
}

impl From<PaymentMethodCatalog> for Vec<PaymentMethod> {
    fn from(catalog: PaymentMethodCatalog) -> Self {
        catalog.methods
    }
}
