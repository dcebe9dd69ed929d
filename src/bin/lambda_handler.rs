//! AWS Lambda handler for loan calculations
//!
//! Accepts a tagged JSON request (`{"calculation": "refinance", ...}`) and
//! returns the result with timing. Invalid input comes back in `error`
//! instead of failing the invocation.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::Serialize;

use ratesense::{CalculationOutput, CalculationRequest, CalculatorDefaults};

/// Output of one invocation
#[derive(Debug, Serialize)]
pub struct CalculationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationOutput>,
    pub generated_at: String,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn respond(request: &CalculationRequest, defaults: &CalculatorDefaults) -> CalculationResponse {
    let start = std::time::Instant::now();
    let outcome = request.evaluate(defaults);
    let execution_time_ms = start.elapsed().as_millis() as u64;
    let generated_at = chrono::Utc::now().to_rfc3339();

    match outcome {
        Ok(result) => CalculationResponse {
            success: true,
            result: Some(result),
            generated_at,
            execution_time_ms,
            error: None,
        },
        Err(e) => {
            log::warn!("rejected request: {}", e);
            CalculationResponse {
                success: false,
                result: None,
                generated_at,
                execution_time_ms,
                error: Some(e.to_string()),
            }
        }
    }
}

async fn handler(event: LambdaEvent<CalculationRequest>) -> Result<CalculationResponse, Error> {
    let defaults = CalculatorDefaults::from_env();
    log::info!("request {}", event.context.request_id);
    Ok(respond(&event.payload, &defaults))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
