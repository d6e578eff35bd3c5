use chrono::NaiveDate;
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{account_settings, registrations};
use crate::models::{RegistrationRow, SettingsEntry};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingsRow {
    pub account_id: String,
    pub kind: String,
    pub effective_from: NaiveDate,
    pub value: Value,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_settings)]
pub struct NewSettingsRow {
    pub account_id: String,
    pub kind: String,
    pub effective_from: NaiveDate,
    pub value: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // id is only used for ordering
pub struct RegistrationDbRow {
    pub id: i64,
    pub customer_id: String,
    pub date: NaiveDate,
    pub cost: Option<f64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistrationRow {
    pub customer_id: String,
    pub date: NaiveDate,
    pub cost: Option<f64>,
    pub amount: Option<f64>,
}

impl From<RegistrationDbRow> for RegistrationRow {
    fn from(row: RegistrationDbRow) -> Self {
        RegistrationRow {
            customer_id: row.customer_id.into(),
            date: row.date.into(),
            cost: row.cost,
            amount: row.amount,
        }
    }
}

impl From<&RegistrationRow> for NewRegistrationRow {
    fn from(row: &RegistrationRow) -> Self {
        NewRegistrationRow {
            customer_id: row.customer_id.to_string(),
            date: row.date.date(),
            cost: row.cost,
            amount: row.amount,
        }
    }
}

impl SettingsRow {
    /// Decode the JSON value into a settings entry.
    pub fn into_entry<V: serde::de::DeserializeOwned>(self) -> Result<SettingsEntry<V>, serde_json::Error> {
        let value = serde_json::from_value(self.value)?;
        Ok(SettingsEntry::new(self.effective_from.into(), value))
    }
}
