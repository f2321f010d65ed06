#![allow(dead_code)]

use account_import::config::{EntityKind, FieldMapping, ImportConfig, Verbosity};
use account_import::contact::{CreateContactRequest, UpdateContactRequest};
use account_import::error::ServiceError;
use account_import::service::{
    AccountService, Contact, ContactPage, CreditRequest, DebitRequest, StoredValue,
    CONTACT_ID_EXISTS, CONTACT_IN_USE, VALUE_ID_EXISTS,
};
use account_import::value::{Balance, CreateValueRequest};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

pub fn data_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn contacts_config() -> ImportConfig {
    let fields = FieldMapping {
        id: Some("System ID".to_string()),
        email: Some("Email".to_string()),
        first_name: Some("First Name".to_string()),
        last_name: Some("Last Name".to_string()),
        ..Default::default()
    };
    let mut config = ImportConfig::new(EntityKind::Contact, data_file("contacts-ascii.csv"), fields);
    config.verbosity = Verbosity::Info;
    config
}

pub fn values_config() -> ImportConfig {
    let fields = FieldMapping {
        id: Some("Gift Card ID".to_string()),
        code: Some("Code".to_string()),
        balance: Some("Balance".to_string()),
        currency: Some("Currency".to_string()),
        contact_id: Some("Contact".to_string()),
        ..Default::default()
    };
    ImportConfig::new(EntityKind::Value, data_file("values.csv"), fields)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateContact(CreateContactRequest),
    UpdateContact(String, UpdateContactRequest),
    CreateValue(CreateValueRequest),
    GetValue(String),
    Credit(CreditRequest),
    Debit(DebitRequest),
    Attach { contact_id: String, value_id: String },
    ChangeCode { value_id: String, code: String },
    ListContacts(Option<String>),
    DeleteContact(String),
}

/// In-memory account service that records every call it receives.
#[derive(Default)]
pub struct MemoryService {
    calls: Mutex<Vec<Call>>,
    contacts: Mutex<HashMap<String, Contact>>,
    values: Mutex<HashMap<String, StoredValue>>,
    pages: Vec<Vec<Contact>>,
    in_use: HashSet<String>,
    broken_ids: HashSet<String>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(self, id: &str) -> Self {
        let contact = Contact {
            id: id.to_string(),
            ..Default::default()
        };
        self.contacts
            .lock()
            .unwrap()
            .insert(id.to_string(), contact);
        self
    }

    pub fn with_value(self, value: StoredValue) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(value.id.clone(), value);
        self
    }

    /// Contacts returned by `list_contacts`, one entry per page.
    pub fn with_pages(mut self, pages: Vec<Vec<&str>>) -> Self {
        self.pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|id| Contact {
                        id: id.to_string(),
                        ..Default::default()
                    })
                    .collect()
            })
            .collect();
        self
    }

    pub fn with_in_use(mut self, id: &str) -> Self {
        self.in_use.insert(id.to_string());
        self
    }

    /// Any call touching `id` fails with an unclassified fault.
    pub fn with_broken_id(mut self, id: &str) -> Self {
        self.broken_ids.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn value(&self, id: &str) -> Option<StoredValue> {
        self.values.lock().unwrap().get(id).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_broken(&self, id: &str) -> Result<(), ServiceError> {
        if self.broken_ids.contains(id) {
            return Err(ServiceError::new(500, "Internal server error", None));
        }
        Ok(())
    }

    fn adjust_balance(&self, value_id: &str, delta: i64) -> Result<(), ServiceError> {
        let mut values = self.values.lock().unwrap();
        let value = values
            .get_mut(value_id)
            .ok_or_else(|| ServiceError::new(404, "Value not found", Some("ValueNotFound")))?;
        value.balance = Some(value.balance.unwrap_or(0) + delta);
        Ok(())
    }
}

#[async_trait]
impl AccountService for MemoryService {
    async fn create_contact(
        &self,
        request: &CreateContactRequest,
    ) -> Result<Contact, ServiceError> {
        self.record(Call::CreateContact(request.clone()));
        self.check_broken(&request.id)?;

        let mut contacts = self.contacts.lock().unwrap();
        if contacts.contains_key(&request.id) {
            return Err(ServiceError::new(
                409,
                format!("A Contact with id '{}' already exists.", request.id),
                Some(CONTACT_ID_EXISTS),
            ));
        }
        let contact = Contact {
            id: request.id.clone(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        };
        contacts.insert(contact.id.clone(), contact.clone());
        Ok(contact)
    }

    async fn update_contact(
        &self,
        id: &str,
        request: &UpdateContactRequest,
    ) -> Result<Contact, ServiceError> {
        self.record(Call::UpdateContact(id.to_string(), request.clone()));
        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .get_mut(id)
            .ok_or_else(|| ServiceError::new(404, "Contact not found", Some("ContactNotFound")))?;
        contact.email = request.email.clone();
        contact.first_name = request.first_name.clone();
        contact.last_name = request.last_name.clone();
        Ok(contact.clone())
    }

    async fn create_value(&self, request: &CreateValueRequest) -> Result<StoredValue, ServiceError> {
        self.record(Call::CreateValue(request.clone()));
        self.check_broken(&request.id)?;

        let mut values = self.values.lock().unwrap();
        if values.contains_key(&request.id) {
            return Err(ServiceError::new(
                409,
                format!("A Value with id '{}' already exists.", request.id),
                Some(VALUE_ID_EXISTS),
            ));
        }
        let balance = match &request.balance {
            Some(Balance::Amount(amount)) => Some(*amount),
            Some(Balance::NotANumber(raw)) => {
                return Err(ServiceError::new(
                    422,
                    format!("requestBody.balance '{}' is not of a type(s) integer", raw),
                    None,
                ))
            }
            None => None,
        };
        let value = StoredValue {
            id: request.id.clone(),
            currency: request.currency.clone(),
            balance,
            contact_id: request.contact_id.clone(),
            code: request.code.clone(),
        };
        values.insert(value.id.clone(), value.clone());
        Ok(value)
    }

    async fn get_value(&self, id: &str) -> Result<StoredValue, ServiceError> {
        self.record(Call::GetValue(id.to_string()));
        self.value(id)
            .ok_or_else(|| ServiceError::new(404, "Value not found", Some("ValueNotFound")))
    }

    async fn credit(&self, request: &CreditRequest) -> Result<(), ServiceError> {
        self.record(Call::Credit(request.clone()));
        self.adjust_balance(&request.destination.value_id, request.amount)
    }

    async fn debit(&self, request: &DebitRequest) -> Result<(), ServiceError> {
        self.record(Call::Debit(request.clone()));
        self.adjust_balance(&request.source.value_id, -request.amount)
    }

    async fn attach_contact_to_value(
        &self,
        contact_id: &str,
        value_id: &str,
    ) -> Result<(), ServiceError> {
        self.record(Call::Attach {
            contact_id: contact_id.to_string(),
            value_id: value_id.to_string(),
        });
        self.check_broken(contact_id)?;
        if let Some(value) = self.values.lock().unwrap().get_mut(value_id) {
            value.contact_id = Some(contact_id.to_string());
        }
        Ok(())
    }

    async fn change_value_code(
        &self,
        value: &StoredValue,
        code: &str,
    ) -> Result<(), ServiceError> {
        self.record(Call::ChangeCode {
            value_id: value.id.clone(),
            code: code.to_string(),
        });
        if let Some(value) = self.values.lock().unwrap().get_mut(&value.id) {
            value.code = Some(code.to_string());
        }
        Ok(())
    }

    async fn list_contacts(&self, cursor: Option<&str>) -> Result<ContactPage, ServiceError> {
        self.record(Call::ListContacts(cursor.map(str::to_string)));
        let index = match cursor {
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ServiceError::new(400, "Bad cursor", None))?,
            None => 0,
        };

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));
        Ok(ContactPage { items, next_cursor })
    }

    async fn delete_contact(&self, contact: &Contact) -> Result<(), ServiceError> {
        self.record(Call::DeleteContact(contact.id.clone()));
        self.check_broken(&contact.id)?;
        if self.in_use.contains(&contact.id) {
            return Err(ServiceError::new(
                409,
                "The Contact is in use by a Transaction.",
                Some(CONTACT_IN_USE),
            ));
        }
        Ok(())
    }
}
