use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use amort_core::savings;
use amort_core::schedule::{self, PaymentOverride, ScheduleInput};
use amort_core::types::{ExtraPayment, LoanInput, PaymentEntry};

use crate::input;

#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON file with the schedule input
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Path to a JSON file with the summary input
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct SavingsArgs {
    /// Path to a JSON file with the accelerated-schedule input
    #[arg(long)]
    pub input: Option<String>,
}

/// Summary input: a loan plus either a precomputed schedule or the inputs
/// needed to compute one.
#[derive(Deserialize)]
struct SummaryRequest {
    loan: LoanInput,
    #[serde(default)]
    entries: Option<Vec<PaymentEntry>>,
    #[serde(default)]
    extra_payments: Vec<ExtraPayment>,
    #[serde(default)]
    payment_override: Option<PaymentOverride>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sched_input: ScheduleInput = input::read_typed(args.input.as_deref(), "schedule")?;
    let result = schedule::build_schedule(&sched_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SummaryRequest = input::read_typed(args.input.as_deref(), "summary")?;

    let entries = match request.entries {
        Some(entries) => entries,
        None => {
            let sched_input = ScheduleInput {
                loan: request.loan.clone(),
                extra_payments: request.extra_payments,
                payment_override: request.payment_override,
            };
            schedule::build_schedule(&sched_input)?.result.entries
        }
    };

    let result = savings::payment_summary(&request.loan, &entries)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_savings(args: SavingsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let accelerated_input: ScheduleInput = input::read_typed(args.input.as_deref(), "savings")?;

    if accelerated_input.extra_payments.is_empty() && accelerated_input.payment_override.is_none() {
        return Err("savings needs extra_payments or a payment_override to compare against the baseline".into());
    }

    let baseline_input = ScheduleInput {
        loan: accelerated_input.loan.clone(),
        extra_payments: vec![],
        payment_override: None,
    };

    let baseline = schedule::build_schedule(&baseline_input)?;
    let accelerated = schedule::build_schedule(&accelerated_input)?;

    let result = savings::extra_payment_savings(
        &baseline.result.entries,
        &accelerated.result.entries,
        accelerated_input.loan.payment_freq,
    )?;
    Ok(serde_json::to_value(result)?)
}
