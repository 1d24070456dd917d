use crate::domain::model::{Contact, ContactBatch, SendReceipt, TransactionalEmail};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// How the provider answered a batch contact upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactBatchOutcome {
    Created,
    /// The batch endpoint cannot serve this account or list; contacts must be
    /// created one at a time.
    Unsupported,
    Failed {
        message: String,
        code: Option<String>,
    },
}

/// Contact and transactional-send operations of an email provider.
///
/// Transport failures surface as `Err`. Provider-side rejections of a batch
/// upsert are reported through [`ContactBatchOutcome`]; rejections of an
/// individual create or send are reported as `Err`.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn upsert_contacts(&self, batch: &ContactBatch) -> Result<ContactBatchOutcome>;
    async fn create_contact(&self, contact: &Contact) -> Result<()>;
    async fn send_email(&self, email: &TransactionalEmail) -> Result<SendReceipt>;
}
