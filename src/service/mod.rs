pub mod http;

use crate::contact::{CreateContactRequest, UpdateContactRequest};
use crate::error::ServiceError;
use crate::value::CreateValueRequest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpAccountService;

pub const CONTACT_ID_EXISTS: &str = "ContactIdExists";
pub const VALUE_ID_EXISTS: &str = "ValueIdExists";
pub const CONTACT_IN_USE: &str = "ContactInUse";

/// Rail used for credits and debits that move funds within the service.
pub const INTERNAL_RAIL: &str = "internal";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredValue {
    pub id: String,
    pub currency: String,
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEndpoint {
    pub rail: String,
    pub value_id: String,
}

impl LedgerEndpoint {
    pub fn internal(value_id: impl Into<String>) -> Self {
        Self {
            rail: INTERNAL_RAIL.to_string(),
            value_id: value_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditRequest {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub destination: LedgerEndpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebitRequest {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub source: LedgerEndpoint,
}

/// One page of a contact listing. `next_cursor` is opaque to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPage {
    pub items: Vec<Contact>,
    pub next_cursor: Option<String>,
}

/// Operations the importer needs from the remote account service.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn create_contact(&self, request: &CreateContactRequest)
        -> Result<Contact, ServiceError>;

    async fn update_contact(
        &self,
        id: &str,
        request: &UpdateContactRequest,
    ) -> Result<Contact, ServiceError>;

    async fn create_value(&self, request: &CreateValueRequest) -> Result<StoredValue, ServiceError>;

    /// Fetches a value including its code.
    async fn get_value(&self, id: &str) -> Result<StoredValue, ServiceError>;

    async fn credit(&self, request: &CreditRequest) -> Result<(), ServiceError>;

    async fn debit(&self, request: &DebitRequest) -> Result<(), ServiceError>;

    async fn attach_contact_to_value(
        &self,
        contact_id: &str,
        value_id: &str,
    ) -> Result<(), ServiceError>;

    async fn change_value_code(&self, value: &StoredValue, code: &str)
        -> Result<(), ServiceError>;

    /// Lists contacts starting at `cursor`, or at the first page when `None`.
    async fn list_contacts(&self, cursor: Option<&str>) -> Result<ContactPage, ServiceError>;

    async fn delete_contact(&self, contact: &Contact) -> Result<(), ServiceError>;
}
