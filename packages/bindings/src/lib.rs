use napi::Result as NapiResult;
use napi_derive::napi;

use amort_core::savings;
use amort_core::schedule::{self, ScheduleInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct SummaryBindingInput {
    loan: amort_core::types::LoanInput,
    entries: Vec<amort_core::types::PaymentEntry>,
}

#[napi]
pub fn payment_summary(input_json: String) -> NapiResult<String> {
    let binding_input: SummaryBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = savings::payment_summary(&binding_input.loan, &binding_input.entries)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Builds both the baseline schedule (no extras, no override) and the
/// accelerated one from the same loan, then reports the savings.
#[napi]
pub fn extra_payment_savings(input_json: String) -> NapiResult<String> {
    let accelerated_input: ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;

    let baseline_input = ScheduleInput {
        loan: accelerated_input.loan.clone(),
        extra_payments: vec![],
        payment_override: None,
    };

    let baseline = schedule::build_schedule(&baseline_input).map_err(to_napi_error)?;
    let accelerated = schedule::build_schedule(&accelerated_input).map_err(to_napi_error)?;

    let output = savings::extra_payment_savings(
        &baseline.result.entries,
        &accelerated.result.entries,
        accelerated_input.loan.payment_freq,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
