use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of ordinal positions in an outreach sequence.
pub const SLOT_COUNT: u8 = 8;

/// Error recorded for a failed send when the provider gave no message.
pub const DEFAULT_SEND_ERROR: &str = "Failed to send email";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Sender {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub name: String,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One target contact plus their full sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sequence: SlotMap,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: SlotMap) -> Self {
        self.sequence = sequence;
        self
    }
}

/// A populated slot: both subject and body are non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub index: u8,
    pub subject: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SlotDraft {
    subject: Option<String>,
    body: Option<String>,
}

enum SlotField {
    Subject,
    Body,
}

/// Slot-indexed sequence. On the wire each slot `n` is carried by the keys
/// `Email_<n>_Subject` and `Email_<n>`.
///
/// Partial slots are kept as-is so an edit can complete them later; they are
/// simply never reported as present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, serde_json::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct SlotMap {
    slots: BTreeMap<u8, SlotDraft>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both halves of a slot. Indexes outside `1..=SLOT_COUNT` are ignored.
    pub fn set(&mut self, index: u8, subject: impl Into<String>, body: impl Into<String>) {
        self.set_subject(index, subject);
        self.set_body(index, body);
    }

    pub fn set_subject(&mut self, index: u8, subject: impl Into<String>) {
        if let Some(draft) = self.draft_mut(index) {
            draft.subject = Some(subject.into());
        }
    }

    pub fn set_body(&mut self, index: u8, body: impl Into<String>) {
        if let Some(draft) = self.draft_mut(index) {
            draft.body = Some(body.into());
        }
    }

    pub fn with_slot(mut self, index: u8, subject: &str, body: &str) -> Self {
        self.set(index, subject, body);
        self
    }

    pub fn get(&self, index: u8) -> Option<Slot<'_>> {
        let draft = self.slots.get(&index)?;
        let subject = draft.subject.as_deref().filter(|s| !s.is_empty())?;
        let body = draft.body.as_deref().filter(|b| !b.is_empty())?;
        Some(Slot {
            index,
            subject,
            body,
        })
    }

    /// Present slots in ascending index order.
    pub fn present(&self) -> impl Iterator<Item = Slot<'_>> + '_ {
        (1..=SLOT_COUNT).filter_map(move |index| self.get(index))
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    fn draft_mut(&mut self, index: u8) -> Option<&mut SlotDraft> {
        if !(1..=SLOT_COUNT).contains(&index) {
            return None;
        }
        Some(self.slots.entry(index).or_default())
    }

    fn parse_key(key: &str) -> Option<(u8, SlotField)> {
        let rest = key.strip_prefix("Email_")?;
        let (number, field) = match rest.strip_suffix("_Subject") {
            Some(number) => (number, SlotField::Subject),
            None => (rest, SlotField::Body),
        };
        // canonical decimal only, so "01" or "+1" cannot alias slot 1
        if number.is_empty()
            || number.starts_with('0')
            || !number.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let index: u8 = number.parse().ok()?;
        (1..=SLOT_COUNT)
            .contains(&index)
            .then_some((index, field))
    }
}

impl From<HashMap<String, serde_json::Value>> for SlotMap {
    fn from(raw: HashMap<String, serde_json::Value>) -> Self {
        let mut map = SlotMap::new();
        for (key, value) in raw {
            let serde_json::Value::String(text) = value else {
                continue;
            };
            match Self::parse_key(&key) {
                Some((index, SlotField::Subject)) => map.set_subject(index, text),
                Some((index, SlotField::Body)) => map.set_body(index, text),
                None => {}
            }
        }
        map
    }
}

impl From<SlotMap> for BTreeMap<String, String> {
    fn from(map: SlotMap) -> Self {
        let mut out = BTreeMap::new();
        for (index, draft) in map.slots {
            if let Some(subject) = draft.subject {
                out.insert(format!("Email_{}_Subject", index), subject);
            }
            if let Some(body) = draft.body {
                out.insert(format!("Email_{}", index), body);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAttributes {
    #[serde(rename = "FIRSTNAME")]
    pub first_name: String,
    #[serde(rename = "LASTNAME")]
    pub last_name: String,
    #[serde(rename = "COMPANY")]
    pub company: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    pub attributes: ContactAttributes,
}

impl From<&Recipient> for Contact {
    fn from(recipient: &Recipient) -> Self {
        Self {
            email: recipient.email.clone(),
            attributes: ContactAttributes {
                first_name: recipient.first_name.clone().unwrap_or_default(),
                last_name: recipient.last_name.clone().unwrap_or_default(),
                company: recipient.company_name.clone().unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactBatch {
    pub contacts: Vec<Contact>,
    pub update_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionalEmail {
    pub to: Vec<EmailAddress>,
    pub sender: Sender,
    pub subject: String,
    pub html_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Outcome of one attempted slot send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRecord {
    pub email: String,
    pub email_number: u8,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendRecord {
    pub fn sent(email: &str, email_number: u8, message_id: Option<String>) -> Self {
        Self {
            email: email.to_string(),
            email_number,
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(email: &str, email_number: u8, error: impl Into<String>) -> Self {
        Self {
            email: email.to_string(),
            email_number,
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub total_emails: usize,
    pub successful: usize,
    pub failed: usize,
    pub campaign_name: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub summary: DispatchSummary,
    pub results: Vec<SendRecord>,
}

impl DispatchReport {
    pub fn from_records(sender: &Sender, campaign: &Campaign, results: Vec<SendRecord>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            summary: DispatchSummary {
                total_emails: results.len(),
                successful,
                failed: results.len() - successful,
                campaign_name: campaign.name.clone(),
                sender: sender.clone(),
            },
            results,
        }
    }
}

/// Body of a dispatch request as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub sender: Option<Sender>,
    #[serde(default)]
    pub campaign: Option<Campaign>,
    #[serde(default)]
    pub emails: Vec<Recipient>,
}
