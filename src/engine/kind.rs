use crate::config::ImportConfig;
use crate::contact::CreateContactRequest;
use crate::engine::reconcile::reconcile_value;
use crate::error::{ImportError, ServiceError};
use crate::row::Row;
use crate::service::{AccountService, CONTACT_ID_EXISTS, VALUE_ID_EXISTS};
use crate::value::CreateValueRequest;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowProblem {
    MissingId,
    InvalidEmail,
    InvalidCurrency,
    InvalidBalance,
}

impl RowProblem {
    pub fn describe(&self, noun: &str) -> String {
        match self {
            RowProblem::MissingId => format!("is missing a {} ID", noun),
            RowProblem::InvalidEmail => "does not have a valid email".to_string(),
            RowProblem::InvalidCurrency => "does not have a valid currency".to_string(),
            RowProblem::InvalidBalance => "does not have a valid balance".to_string(),
        }
    }
}

/// What the import engine needs to know about one kind of record.
#[async_trait]
pub trait ImportKind: Send + Sync {
    type Request: Serialize + fmt::Debug + Send + Sync;

    /// Singular noun for diagnostics, e.g. `Contact`.
    fn noun(&self) -> &'static str;

    /// Fault code the service uses when the id is already taken.
    fn exists_code(&self) -> &'static str;

    fn map_row(&self, row: &Row, config: &ImportConfig) -> Self::Request;

    /// Local validation used by dry runs.
    fn check(&self, request: &Self::Request) -> Option<RowProblem>;

    async fn create(
        &self,
        service: &dyn AccountService,
        request: &Self::Request,
    ) -> Result<(), ServiceError>;

    /// Brings an existing remote object in line with `request`.
    async fn update(
        &self,
        service: &dyn AccountService,
        request: &Self::Request,
    ) -> Result<(), ImportError>;
}

pub struct ContactImport;

#[async_trait]
impl ImportKind for ContactImport {
    type Request = CreateContactRequest;

    fn noun(&self) -> &'static str {
        "Contact"
    }

    fn exists_code(&self) -> &'static str {
        CONTACT_ID_EXISTS
    }

    fn map_row(&self, row: &Row, config: &ImportConfig) -> CreateContactRequest {
        CreateContactRequest::from_row(row, &config.fields)
    }

    fn check(&self, request: &CreateContactRequest) -> Option<RowProblem> {
        if request.id.is_empty() {
            Some(RowProblem::MissingId)
        } else if !request.has_valid_email() {
            Some(RowProblem::InvalidEmail)
        } else {
            None
        }
    }

    async fn create(
        &self,
        service: &dyn AccountService,
        request: &CreateContactRequest,
    ) -> Result<(), ServiceError> {
        let contact = service.create_contact(request).await?;
        debug!("created contact={:?}", contact);
        Ok(())
    }

    async fn update(
        &self,
        service: &dyn AccountService,
        request: &CreateContactRequest,
    ) -> Result<(), ImportError> {
        // Only the profile fields of a contact are mutable.
        let contact = service
            .update_contact(&request.id, &request.to_update())
            .await?;
        debug!("updated contact={:?}", contact);
        Ok(())
    }
}

pub struct ValueImport;

#[async_trait]
impl ImportKind for ValueImport {
    type Request = CreateValueRequest;

    fn noun(&self) -> &'static str {
        "Value"
    }

    fn exists_code(&self) -> &'static str {
        VALUE_ID_EXISTS
    }

    fn map_row(&self, row: &Row, config: &ImportConfig) -> CreateValueRequest {
        CreateValueRequest::from_row(row, &config.fields, config.fixed_currency.as_deref())
    }

    fn check(&self, request: &CreateValueRequest) -> Option<RowProblem> {
        if request.id.is_empty() {
            Some(RowProblem::MissingId)
        } else if request.currency.is_empty() {
            Some(RowProblem::InvalidCurrency)
        } else if !request.has_valid_balance() {
            Some(RowProblem::InvalidBalance)
        } else {
            None
        }
    }

    async fn create(
        &self,
        service: &dyn AccountService,
        request: &CreateValueRequest,
    ) -> Result<(), ServiceError> {
        let value = service.create_value(request).await?;
        debug!("created value={:?}", value);
        Ok(())
    }

    async fn update(
        &self,
        service: &dyn AccountService,
        request: &CreateValueRequest,
    ) -> Result<(), ImportError> {
        reconcile_value(service, request).await
    }
}
