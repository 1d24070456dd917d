use crate::adapters::csv_recipients::parse_recipients;
use crate::adapters::generator::{GeneratedSequence, ProductRef, SequenceGenerator};
use crate::core::dispatcher::CampaignDispatcher;
use crate::core::drafts::{CampaignDraft, DraftStore};
use crate::core::report::write_report;
use crate::domain::model::{Campaign, DispatchReport, Sender};
use crate::domain::ports::{EmailProvider, Storage};
use crate::utils::error::{DispatchError, Result};

/// Where recipients for a generation run come from.
#[derive(Debug, Clone)]
pub enum RecipientSource {
    Single(String),
    Csv { data: Vec<u8>, file_name: String },
}

/// Generates sequences and merges them into the stored draft.
pub async fn generate<S: Storage>(
    generator: &SequenceGenerator,
    drafts: &DraftStore<S>,
    source: RecipientSource,
    product: &ProductRef,
) -> Result<CampaignDraft> {
    let generated: Vec<GeneratedSequence> = match source {
        RecipientSource::Single(email) => {
            if email.trim().is_empty() {
                return Err(DispatchError::validation("An email address is required"));
            }
            vec![generator.generate_single(email.trim(), product).await?]
        }
        RecipientSource::Csv { data, file_name } => {
            // reject malformed files before paying for generation
            let recipients = parse_recipients(&data)?;
            if recipients.is_empty() {
                return Err(DispatchError::validation("CSV contains no recipients"));
            }
            generator.generate_bulk(data, &file_name, product).await?
        }
    };

    let tokens: u64 = generated.iter().map(|g| g.tokens_used).sum();
    let cost: f64 = generated.iter().map(|g| g.cost_incurred).sum();
    tracing::info!(
        "📊 {} sequences, {} tokens, cost {:.4}",
        generated.len(),
        tokens,
        cost
    );

    let mut draft = drafts.load_or_default().await?;
    draft.merge(generated.into_iter().map(|g| g.recipient).collect());
    drafts.save(&mut draft).await?;
    Ok(draft)
}

pub async fn edit<S: Storage>(
    drafts: &DraftStore<S>,
    email: &str,
    index: u8,
    subject: Option<&str>,
    body: Option<&str>,
) -> Result<CampaignDraft> {
    if subject.is_none() && body.is_none() {
        return Err(DispatchError::validation(
            "Nothing to edit: pass a subject, a body, or both",
        ));
    }

    let mut draft = drafts.load().await?;
    draft.set_slot(email, index, subject, body)?;
    drafts.save(&mut draft).await?;
    tracing::info!("✏️ Updated email {} for {}", index, email);
    Ok(draft)
}

/// Sends every recipient in the stored draft and optionally writes a report.
pub async fn dispatch<P: EmailProvider, S: Storage>(
    dispatcher: &CampaignDispatcher<P>,
    drafts: &DraftStore<S>,
    sender: &Sender,
    campaign: &Campaign,
    report_dir: Option<&str>,
) -> Result<DispatchReport> {
    let draft = drafts.load().await?;
    tracing::info!(
        "📋 Draft {} has {} recipients, {} emails ready",
        drafts.path(),
        draft.recipients.len(),
        draft.total_present_slots()
    );

    let report = dispatcher
        .dispatch(sender, campaign, &draft.recipients)
        .await?;

    if let Some(dir) = report_dir {
        write_report(drafts.storage(), dir, &report).await?;
    }

    Ok(report)
}
