use crate::config::provider::GeneratorConfig;
use crate::domain::model::{Recipient, SlotMap, SLOT_COUNT};
use crate::utils::error::{DispatchError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// Which product a sequence is written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
    Id(String),
    Description(String),
}

impl ProductRef {
    /// An id wins over a description; blank values count as absent.
    pub fn from_parts(id: Option<String>, description: Option<String>) -> Result<Self> {
        if let Some(id) = id.filter(|v| !v.trim().is_empty()) {
            return Ok(Self::Id(id));
        }
        if let Some(description) = description.filter(|v| !v.trim().is_empty()) {
            return Ok(Self::Description(description));
        }
        Err(DispatchError::validation(
            "Either a product id or a product description is required",
        ))
    }

    fn apply(&self, form: Form) -> Form {
        match self {
            Self::Id(id) => form.text("product_id", id.clone()),
            Self::Description(description) => {
                form.text("product_description", description.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSequence {
    pub recipient: Recipient,
    pub product_id: Option<String>,
    pub tokens_used: u64,
    pub cost_incurred: f64,
}

#[derive(Debug, Deserialize)]
struct SingleItem {
    email: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    product_id: Option<String>,
    #[serde(default)]
    sequence: SlotMap,
}

#[derive(Debug, Deserialize)]
struct SingleResponse {
    data: SingleItem,
    #[serde(default)]
    tokens_used: u64,
    #[serde(default)]
    cost_incurred: f64,
}

fn string_field(item: &Map<String, Value>, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Builds a recipient from a bulk result item, whose slots arrive as flat
/// `email_<n>_subject` / `email_<n>_body` fields. Only complete slots are kept.
fn from_flat_item(item: &Map<String, Value>) -> Result<GeneratedSequence> {
    let email = string_field(item, "email").ok_or_else(|| DispatchError::GeneratorError {
        message: "Bulk result item has no email".to_string(),
    })?;

    let mut sequence = SlotMap::new();
    for index in 1..=SLOT_COUNT {
        let subject = string_field(item, &format!("email_{}_subject", index));
        let body = string_field(item, &format!("email_{}_body", index));
        if let (Some(subject), Some(body)) = (subject, body) {
            sequence.set(index, subject, body);
        }
    }

    Ok(GeneratedSequence {
        recipient: Recipient {
            email,
            first_name: string_field(item, "first_name"),
            last_name: string_field(item, "last_name"),
            company_name: string_field(item, "company_name"),
            sequence,
        },
        product_id: string_field(item, "product_id"),
        tokens_used: item.get("tokens_used").and_then(Value::as_u64).unwrap_or(0),
        cost_incurred: item
            .get("cost_incurred")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    })
}

pub(crate) fn backend_client(config: &GeneratorConfig) -> Result<Client> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?;
    Ok(http)
}

/// Turns a non-2xx response into an error carrying the backend's `detail`,
/// else the raw body, else the status line.
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    let text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<Value>(&text) {
        Ok(json) => match json.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::Null) | None => fallback,
            Some(detail) => detail.to_string(),
        },
        Err(_) if !text.is_empty() => text,
        Err(_) => fallback,
    };

    tracing::error!("❌ Generation backend error: {}", message);
    Err(DispatchError::GeneratorError { message })
}

/// Client for the backend that writes eight-email sequences.
pub struct SequenceGenerator {
    http: Client,
    config: GeneratorConfig,
}

impl SequenceGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            http: backend_client(&config)?,
            config,
        })
    }

    fn base_form(&self) -> Form {
        Form::new()
            .text("llm_provider", self.config.llm_provider.clone())
            .text("llm_model", self.config.llm_model.clone())
    }

    pub async fn generate_single(
        &self,
        email: &str,
        product: &ProductRef,
    ) -> Result<GeneratedSequence> {
        let form = product.apply(self.base_form().text("email", email.to_string()));
        let url = self.config.endpoint("/generate-sequence");
        tracing::info!("🚀 Generating sequence for {} via {}", email, url);

        let response = self.http.post(url).multipart(form).send().await?;
        let response = ensure_success(response).await?;
        let parsed: SingleResponse = serde_json::from_str(&response.text().await?)?;

        tracing::info!(
            "✅ Sequence generated for {} ({} tokens, cost {:.4})",
            email,
            parsed.tokens_used,
            parsed.cost_incurred
        );

        let item = parsed.data;
        Ok(GeneratedSequence {
            recipient: Recipient {
                email: item.email,
                first_name: item.first_name.filter(|v| !v.is_empty()),
                last_name: item.last_name.filter(|v| !v.is_empty()),
                company_name: item.company_name.filter(|v| !v.is_empty()),
                sequence: item.sequence,
            },
            product_id: item.product_id,
            tokens_used: parsed.tokens_used,
            cost_incurred: parsed.cost_incurred,
        })
    }

    pub async fn generate_bulk(
        &self,
        csv: Vec<u8>,
        file_name: &str,
        product: &ProductRef,
    ) -> Result<Vec<GeneratedSequence>> {
        let file = Part::bytes(csv)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = product.apply(self.base_form().part("file", file));
        let url = self.config.endpoint("/bulk-generate-sequence");
        tracing::info!("🚀 Generating sequences for {} via {}", file_name, url);

        let response = self.http.post(url).multipart(form).send().await?;
        let response = ensure_success(response).await?;
        let body: Value = serde_json::from_str(&response.text().await?)?;

        let items = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| DispatchError::GeneratorError {
                message: "Unexpected response format from server".to_string(),
            })?;

        let mut generated = Vec::with_capacity(items.len());
        for item in items {
            let item = item
                .as_object()
                .ok_or_else(|| DispatchError::GeneratorError {
                    message: "Unexpected response format from server".to_string(),
                })?;
            generated.push(from_flat_item(item)?);
        }

        tracing::info!("✅ {} sequences generated", generated.len());
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_ref_prefers_id() {
        assert_eq!(
            ProductRef::from_parts(Some("p-1".into()), Some("desc".into())).unwrap(),
            ProductRef::Id("p-1".into())
        );
        assert_eq!(
            ProductRef::from_parts(Some("  ".into()), Some("desc".into())).unwrap(),
            ProductRef::Description("desc".into())
        );
        assert!(ProductRef::from_parts(None, Some("".into())).is_err());
    }

    #[test]
    fn test_flat_item_keeps_only_complete_slots() {
        let item = json!({
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "",
            "email_1_subject": "Hi",
            "email_1_body": "Hello",
            "email_2_subject": "No body",
            "email_3_body": "No subject",
            "email_8_subject": "Last",
            "email_8_body": "Bye",
            "tokens_used": 900,
            "cost_incurred": 0.012
        });

        let generated = from_flat_item(item.as_object().unwrap()).unwrap();
        let slots: Vec<u8> = generated
            .recipient
            .sequence
            .present()
            .map(|slot| slot.index)
            .collect();

        assert_eq!(slots, vec![1, 8]);
        assert_eq!(generated.recipient.first_name.as_deref(), Some("Jane"));
        assert_eq!(generated.recipient.last_name, None);
        assert_eq!(generated.tokens_used, 900);
        assert!(generated.recipient.sequence.get(2).is_none());
    }

    #[test]
    fn test_flat_item_without_email_is_error() {
        let item = json!({"email_1_subject": "Hi", "email_1_body": "Hello"});
        assert!(from_flat_item(item.as_object().unwrap()).is_err());
    }
}
