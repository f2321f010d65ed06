use crate::config::FieldMapping;
use crate::row::Row;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// The mutable subset of a contact sent when an existing contact is updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl CreateContactRequest {
    pub fn from_row(row: &Row, fields: &FieldMapping) -> Self {
        Self {
            id: column(row, &fields.id).unwrap_or_default(),
            email: column(row, &fields.email),
            first_name: column(row, &fields.first_name),
            last_name: column(row, &fields.last_name),
        }
    }

    /// Deliberately loose: anything with an `@` passes.
    pub fn has_valid_email(&self) -> bool {
        self.email.as_deref().map_or(true, |email| email.contains('@'))
    }

    pub fn to_update(&self) -> UpdateContactRequest {
        UpdateContactRequest {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Copies the mapped column out of the row. Unmapped fields and blank or
/// whitespace-only cells stay absent; other cells are copied untrimmed.
pub(crate) fn column(row: &Row, name: &Option<String>) -> Option<String> {
    name.as_deref()
        .and_then(|name| row.get(name))
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}
