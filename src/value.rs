use crate::config::FieldMapping;
use crate::contact::column;
use crate::row::Row;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A balance in minor currency units. Text that is not an integral number is
/// kept verbatim so a dry run can report it and a live run sends it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Balance {
    Amount(i64),
    NotANumber(String),
}

impl Balance {
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let amount = Decimal::from_str(trimmed)
            .ok()
            .filter(|d| d.fract().is_zero())
            .and_then(|d| d.to_i64());

        Some(match amount {
            Some(amount) => Balance::Amount(amount),
            None => Balance::NotANumber(text.to_string()),
        })
    }

    pub fn amount(&self) -> Option<i64> {
        match self {
            Balance::Amount(amount) => Some(*amount),
            Balance::NotANumber(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateValueRequest {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Balance>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
}

impl CreateValueRequest {
    pub fn from_row(row: &Row, fields: &FieldMapping, fixed_currency: Option<&str>) -> Self {
        let currency = match fixed_currency.filter(|c| !c.is_empty()) {
            Some(currency) => currency.to_string(),
            None => column(row, &fields.currency).unwrap_or_default(),
        };

        Self {
            id: column(row, &fields.id).unwrap_or_default(),
            code: column(row, &fields.code),
            balance: column(row, &fields.balance).and_then(|text| Balance::parse(&text)),
            currency,
            contact_id: column(row, &fields.contact_id),
        }
    }

    pub fn has_valid_balance(&self) -> bool {
        !matches!(self.balance, Some(Balance::NotANumber(_)))
    }
}
