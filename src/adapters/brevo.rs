use crate::config::provider::ProviderConfig;
use crate::domain::model::{
    Contact, ContactBatch, SendReceipt, TransactionalEmail, DEFAULT_SEND_ERROR,
};
use crate::domain::ports::{ContactBatchOutcome, EmailProvider};
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Error code the batch endpoint returns when it cannot be used for this list.
pub const BATCH_UNSUPPORTED_CODE: &str = "document_not_found";

const CONTACTS_BATCH_PATH: &str = "/contacts/batch";
const CONTACTS_PATH: &str = "/contacts";
const SEND_PATH: &str = "/smtp/email";

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP client for a Brevo-compatible contacts and transactional email API.
#[derive(Debug, Clone)]
pub struct BrevoClient {
    http: Client,
    config: ProviderConfig,
}

impl BrevoClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("sequence-dispatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.config.endpoint(path);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .header("api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        tracing::debug!("Provider response status: {}", response.status());
        Ok(response)
    }

    /// Reads a provider error body. Bodies that are not JSON yield an empty error.
    async fn read_error(response: Response) -> ProviderErrorBody {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str(&text).unwrap_or_default()
    }
}

fn classify_batch_failure(status: StatusCode, error: ProviderErrorBody) -> ContactBatchOutcome {
    if error.code.as_deref() == Some(BATCH_UNSUPPORTED_CODE) {
        return ContactBatchOutcome::Unsupported;
    }

    let message = error
        .message
        .clone()
        .or_else(|| error.code.clone())
        .unwrap_or_else(|| format!("HTTP {}", status));

    ContactBatchOutcome::Failed {
        message,
        code: error.code,
    }
}

#[async_trait]
impl EmailProvider for BrevoClient {
    async fn upsert_contacts(&self, batch: &ContactBatch) -> Result<ContactBatchOutcome> {
        let response = self.post(CONTACTS_BATCH_PATH, batch).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(ContactBatchOutcome::Created);
        }

        let error = Self::read_error(response).await;
        tracing::warn!(
            "Contact batch rejected ({}): code={:?} message={:?}",
            status,
            error.code,
            error.message
        );
        Ok(classify_batch_failure(status, error))
    }

    async fn create_contact(&self, contact: &Contact) -> Result<()> {
        let response = self.post(CONTACTS_PATH, contact).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let error = Self::read_error(response).await;
        Err(DispatchError::ProviderContactError {
            message: error
                .message
                .or(error.code)
                .unwrap_or_else(|| format!("HTTP {}", status)),
        })
    }

    async fn send_email(&self, email: &TransactionalEmail) -> Result<SendReceipt> {
        let response = self.post(SEND_PATH, email).await?;

        if response.status().is_success() {
            let text = response.text().await?;
            return Ok(serde_json::from_str(&text).unwrap_or_default());
        }

        let error = Self::read_error(response).await;
        Err(DispatchError::ProviderSendError {
            message: error
                .message
                .unwrap_or_else(|| DEFAULT_SEND_ERROR.to_string()),
        })
    }
}
