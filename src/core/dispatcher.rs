use crate::core::html::wrap_html;
use crate::domain::model::{
    Campaign, Contact, ContactBatch, DispatchReport, EmailAddress, Recipient, SendRecord, Sender,
    Slot, TransactionalEmail, DEFAULT_SEND_ERROR, SLOT_COUNT,
};
use crate::domain::ports::{ContactBatchOutcome, EmailProvider};
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::validate_present;
use futures::future::join_all;

/// Registers recipients as provider contacts and sends every present slot of
/// their sequences, one transactional email per slot.
pub struct CampaignDispatcher<P: EmailProvider> {
    provider: P,
}

impl<P: EmailProvider> CampaignDispatcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Runs one dispatch. Validation and contact-stage failures abort the whole
    /// dispatch; send failures are recorded per slot in the returned report.
    ///
    /// Results are ordered by recipient, then by slot index.
    pub async fn dispatch(
        &self,
        sender: &Sender,
        campaign: &Campaign,
        recipients: &[Recipient],
    ) -> Result<DispatchReport> {
        validate_present("sender.name", &sender.name)?;
        validate_present("sender.email", &sender.email)?;
        validate_present("campaign.name", &campaign.name)?;
        if recipients.is_empty() {
            return Err(DispatchError::validation(
                "Missing required field: at least one recipient",
            ));
        }

        tracing::info!(
            "📧 Dispatching campaign '{}' from {} to {} recipients",
            campaign.name,
            sender.email,
            recipients.len()
        );

        self.register_contacts(recipients).await?;

        let per_recipient = join_all(
            recipients
                .iter()
                .map(|recipient| self.send_sequence(sender, recipient)),
        )
        .await;

        let results: Vec<SendRecord> = per_recipient.into_iter().flatten().collect();
        let report = DispatchReport::from_records(sender, campaign, results);

        tracing::info!(
            "✅ Campaign '{}' finished: {} sent, {} failed, {} total",
            campaign.name,
            report.summary.successful,
            report.summary.failed,
            report.summary.total_emails
        );

        Ok(report)
    }

    async fn register_contacts(&self, recipients: &[Recipient]) -> Result<()> {
        let batch = ContactBatch {
            contacts: recipients.iter().map(Contact::from).collect(),
            update_enabled: false,
        };

        match self.provider.upsert_contacts(&batch).await? {
            ContactBatchOutcome::Created => {
                tracing::info!("✅ {} contacts registered in batch", batch.contacts.len());
            }
            ContactBatchOutcome::Unsupported => {
                tracing::info!("🔄 Batch upsert unsupported, creating contacts individually");

                let outcomes = join_all(
                    batch
                        .contacts
                        .iter()
                        .map(|contact| self.provider.create_contact(contact)),
                )
                .await;

                let mut created = 0;
                for (contact, outcome) in batch.contacts.iter().zip(outcomes) {
                    match outcome {
                        Ok(()) => created += 1,
                        Err(e) => {
                            tracing::warn!("⚠️ Could not create contact {}: {}", contact.email, e)
                        }
                    }
                }

                tracing::info!(
                    "✅ {}/{} contacts created individually",
                    created,
                    batch.contacts.len()
                );
            }
            ContactBatchOutcome::Failed { message, code } => {
                tracing::error!(
                    "❌ Contact batch failed (code: {:?}): {}",
                    code,
                    message
                );
                return Err(DispatchError::ProviderContactError { message });
            }
        }

        Ok(())
    }

    async fn send_sequence(&self, sender: &Sender, recipient: &Recipient) -> Vec<SendRecord> {
        let slots: Vec<Slot<'_>> = recipient.sequence.present().collect();

        if slots.len() < usize::from(SLOT_COUNT) {
            tracing::debug!(
                "⚠️ {} has {} of {} slots populated, skipping the rest",
                recipient.email,
                slots.len(),
                SLOT_COUNT
            );
        }

        join_all(
            slots
                .into_iter()
                .map(|slot| self.send_slot(sender, recipient, slot)),
        )
        .await
    }

    async fn send_slot(&self, sender: &Sender, recipient: &Recipient, slot: Slot<'_>) -> SendRecord {
        let email = TransactionalEmail {
            to: vec![EmailAddress {
                email: recipient.email.clone(),
            }],
            sender: sender.clone(),
            subject: slot.subject.to_string(),
            html_content: wrap_html(slot.subject, slot.body),
        };

        match self.provider.send_email(&email).await {
            Ok(receipt) => {
                tracing::debug!("✅ Email {} sent to {}", slot.index, recipient.email);
                SendRecord::sent(&recipient.email, slot.index, receipt.message_id)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to send email {} to {}: {}",
                    slot.index,
                    recipient.email,
                    e
                );
                // transport failures carry no provider message
                let message = match e {
                    DispatchError::ProviderSendError { message } => message,
                    _ => DEFAULT_SEND_ERROR.to_string(),
                };
                SendRecord::failed(&recipient.email, slot.index, message)
            }
        }
    }
}
