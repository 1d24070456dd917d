use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use sequence_dispatch::domain::model::DispatchRequest;
use sequence_dispatch::utils::{logger, validation::Validate};
use sequence_dispatch::{
    handle_dispatch, BrevoClient, CampaignDispatcher, DispatchError, DispatchResponse,
    ProviderConfig,
};

fn build_dispatcher() -> Result<CampaignDispatcher<BrevoClient>, DispatchError> {
    let config = ProviderConfig::from_env()?;
    config.validate()?;
    Ok(CampaignDispatcher::new(BrevoClient::new(config)?))
}

async fn function_handler(event: LambdaEvent<serde_json::Value>) -> Result<DispatchResponse, Error> {
    tracing::info!("Campaign activation request received");

    let dispatcher = match build_dispatcher() {
        Ok(dispatcher) => dispatcher,
        Err(e) => return Ok(DispatchResponse::failure(&e)),
    };

    let response = match serde_json::from_value::<DispatchRequest>(event.payload) {
        Ok(request) => handle_dispatch(&dispatcher, request).await,
        Err(e) => DispatchResponse::failure(&DispatchError::validation(format!(
            "Invalid request body: {}",
            e
        ))),
    };

    tracing::info!("Campaign activation finished with status {}", response.status);
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
