use crate::core::dispatcher::CampaignDispatcher;
use crate::domain::model::{DispatchRequest, DispatchSummary, SendRecord};
use crate::domain::ports::EmailProvider;
use crate::utils::error::DispatchError;
use serde::{Deserialize, Serialize};

pub const SUCCESS_MESSAGE: &str = "Campaign activated successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DispatchResponseBody {
    Success {
        success: bool,
        message: String,
        summary: DispatchSummary,
        results: Vec<SendRecord>,
    },
    Failure {
        error: String,
    },
}

/// Status code plus JSON body, ready for whatever transport fronts the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: DispatchResponseBody,
}

impl DispatchResponse {
    pub fn failure(error: &DispatchError) -> Self {
        if error.status_code() >= 500 {
            tracing::error!("Campaign activation error: {}", error);
        } else {
            tracing::warn!("Campaign activation rejected: {}", error);
        }

        Self {
            status: error.status_code(),
            body: DispatchResponseBody::Failure {
                error: error.user_friendly_message(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

pub async fn handle_dispatch<P: EmailProvider>(
    dispatcher: &CampaignDispatcher<P>,
    request: DispatchRequest,
) -> DispatchResponse {
    let sender = request.sender.unwrap_or_default();
    let campaign = request.campaign.unwrap_or_default();

    match dispatcher.dispatch(&sender, &campaign, &request.emails).await {
        Ok(report) => DispatchResponse {
            status: 200,
            body: DispatchResponseBody::Success {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
                summary: report.summary,
                results: report.results,
            },
        },
        Err(e) => DispatchResponse::failure(&e),
    }
}

/// Parses a raw request body and dispatches it. A body that does not match the
/// request shape is rejected as a validation failure.
pub async fn handle_dispatch_json<P: EmailProvider>(
    dispatcher: &CampaignDispatcher<P>,
    body: &str,
) -> DispatchResponse {
    match serde_json::from_str::<DispatchRequest>(body) {
        Ok(request) => handle_dispatch(dispatcher, request).await,
        Err(e) => DispatchResponse::failure(&DispatchError::validation(format!(
            "Invalid request body: {}",
            e
        ))),
    }
}
