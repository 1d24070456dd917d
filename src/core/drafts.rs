use crate::domain::model::{Recipient, Slot, SLOT_COUNT};
use crate::domain::ports::Storage;
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::validate_range;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generated recipients and their (possibly edited) sequences, kept between
/// generation and dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CampaignDraft {
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self {
            recipients,
            updated_at: None,
        }
    }

    pub fn recipient(&self, email: &str) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.email == email)
    }

    /// Adds recipients, replacing any existing entry with the same email.
    pub fn merge(&mut self, recipients: Vec<Recipient>) {
        for recipient in recipients {
            match self.recipients.iter_mut().find(|r| r.email == recipient.email) {
                Some(existing) => *existing = recipient,
                None => self.recipients.push(recipient),
            }
        }
    }

    /// Edits one slot of one recipient. `None` leaves that half unchanged.
    pub fn set_slot(
        &mut self,
        email: &str,
        index: u8,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Result<()> {
        validate_range("slot", index, 1, SLOT_COUNT)?;

        let recipient = self
            .recipients
            .iter_mut()
            .find(|r| r.email == email)
            .ok_or_else(|| DispatchError::validation(format!("No recipient {} in draft", email)))?;

        if let Some(subject) = subject {
            recipient.sequence.set_subject(index, subject);
        }
        if let Some(body) = body {
            recipient.sequence.set_body(index, body);
        }
        Ok(())
    }

    pub fn present_slots(&self, email: &str) -> Result<Vec<Slot<'_>>> {
        let recipient = self
            .recipient(email)
            .ok_or_else(|| DispatchError::validation(format!("No recipient {} in draft", email)))?;
        Ok(recipient.sequence.present().collect())
    }

    pub fn total_present_slots(&self) -> usize {
        self.recipients
            .iter()
            .map(|r| r.sequence.present_count())
            .sum()
    }
}

/// Reads and writes a [`CampaignDraft`] as JSON at a fixed path in storage.
pub struct DraftStore<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> DraftStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn load(&self) -> Result<CampaignDraft> {
        let data = self.storage.read_file(&self.path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Loads the draft, or starts an empty one when none has been saved yet.
    pub async fn load_or_default(&self) -> Result<CampaignDraft> {
        match self.load().await {
            Err(DispatchError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(CampaignDraft::default())
            }
            other => other,
        }
    }

    pub async fn save(&self, draft: &mut CampaignDraft) -> Result<()> {
        draft.updated_at = Some(Utc::now());
        let data = serde_json::to_vec_pretty(draft)?;
        self.storage.write_file(&self.path, &data).await?;
        tracing::debug!(
            "Draft saved to {} ({} recipients)",
            self.path,
            draft.recipients.len()
        );
        Ok(())
    }
}
