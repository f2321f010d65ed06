use crate::contact::{CreateContactRequest, UpdateContactRequest};
use crate::error::ServiceError;
use crate::service::{
    AccountService, Contact, ContactPage, CreditRequest, DebitRequest, StoredValue,
};
use crate::value::CreateValueRequest;

use async_trait::async_trait;
use log::debug;
use reqwest::header::LINK;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Fault body returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFault {
    message: Option<String>,
    message_code: Option<String>,
}

/// JSON-over-HTTP client for the account service.
#[derive(Clone)]
pub struct HttpAccountService {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpAccountService {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::new(0, format!("Invalid API URL {base_url}: {e}"), None))?;
        let client = Client::builder()
            .user_agent(concat!("account-import/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ServiceError::new(0, format!("Invalid API URL {}", self.base_url), None))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.api_key)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, ServiceError> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!("fault status={} body={}", status, body);
        Err(fault_from_body(status.as_u16(), &body))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ServiceError> {
        self.execute(builder)
            .await?
            .json::<T>()
            .await
            .map_err(transport_error)
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
    ServiceError::new(status, e.to_string(), None)
}

fn fault_from_body(status: u16, body: &str) -> ServiceError {
    match serde_json::from_str::<WireFault>(body) {
        Ok(fault) => ServiceError {
            status,
            message: fault
                .message
                .unwrap_or_else(|| format!("Request failed with status {status}")),
            message_code: fault.message_code,
        },
        Err(_) if body.is_empty() => {
            ServiceError::new(status, format!("Request failed with status {status}"), None)
        }
        Err(_) => ServiceError::new(status, body.to_string(), None),
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn create_contact(
        &self,
        request: &CreateContactRequest,
    ) -> Result<Contact, ServiceError> {
        let url = self.endpoint(&["v2", "contacts"])?;
        self.execute_json(self.request(Method::POST, url).json(request))
            .await
    }

    async fn update_contact(
        &self,
        id: &str,
        request: &UpdateContactRequest,
    ) -> Result<Contact, ServiceError> {
        let url = self.endpoint(&["v2", "contacts", id])?;
        self.execute_json(self.request(Method::PATCH, url).json(request))
            .await
    }

    async fn create_value(&self, request: &CreateValueRequest) -> Result<StoredValue, ServiceError> {
        let url = self.endpoint(&["v2", "values"])?;
        self.execute_json(self.request(Method::POST, url).json(request))
            .await
    }

    async fn get_value(&self, id: &str) -> Result<StoredValue, ServiceError> {
        let mut url = self.endpoint(&["v2", "values", id])?;
        url.query_pairs_mut().append_pair("showCode", "true");
        self.execute_json(self.request(Method::GET, url)).await
    }

    async fn credit(&self, request: &CreditRequest) -> Result<(), ServiceError> {
        let url = self.endpoint(&["v2", "transactions", "credit"])?;
        self.execute(self.request(Method::POST, url).json(request))
            .await?;
        Ok(())
    }

    async fn debit(&self, request: &DebitRequest) -> Result<(), ServiceError> {
        let url = self.endpoint(&["v2", "transactions", "debit"])?;
        self.execute(self.request(Method::POST, url).json(request))
            .await?;
        Ok(())
    }

    async fn attach_contact_to_value(
        &self,
        contact_id: &str,
        value_id: &str,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(&["v2", "contacts", contact_id, "values", "attach"])?;
        let body = json!({ "valueId": value_id });
        self.execute(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(())
    }

    async fn change_value_code(
        &self,
        value: &StoredValue,
        code: &str,
    ) -> Result<(), ServiceError> {
        let url = self.endpoint(&["v2", "values", value.id.as_str(), "changeCode"])?;
        let body = json!({ "code": code });
        self.execute(self.request(Method::POST, url).json(&body))
            .await?;
        Ok(())
    }

    async fn list_contacts(&self, cursor: Option<&str>) -> Result<ContactPage, ServiceError> {
        let url = match cursor {
            Some(cursor) => self.base_url.join(cursor).map_err(|e| {
                ServiceError::new(0, format!("Invalid page cursor {cursor}: {e}"), None)
            })?,
            None => self.endpoint(&["v2", "contacts"])?,
        };

        let response = self.execute(self.request(Method::GET, url)).await?;
        let next_cursor = response
            .headers()
            .get(LINK)
            .and_then(|link| link.to_str().ok())
            .and_then(next_link);
        let items = response
            .json::<Vec<Contact>>()
            .await
            .map_err(transport_error)?;

        Ok(ContactPage { items, next_cursor })
    }

    async fn delete_contact(&self, contact: &Contact) -> Result<(), ServiceError> {
        let url = self.endpoint(&["v2", "contacts", contact.id.as_str()])?;
        self.execute(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
