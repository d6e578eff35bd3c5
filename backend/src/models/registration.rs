use serde::{Deserialize, Serialize};

use super::{AccountId, Day};

/// Raw registration fact as returned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRow {
    pub customer_id: AccountId,
    pub date: Day,
    /// Cost in currency subunits.
    #[serde(default)]
    pub cost: Option<f64>,
    /// Registered amount (grams).
    #[serde(default)]
    pub amount: Option<f64>,
}

impl RegistrationRow {
    pub fn new(customer_id: impl Into<String>, date: Day) -> Self {
        Self {
            customer_id: AccountId::new(customer_id),
            date,
            cost: None,
            amount: None,
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }
}
