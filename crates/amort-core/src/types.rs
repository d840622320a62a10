use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%) unless a field says otherwise.
pub type Rate = Decimal;

/// Billing cadence of the loan. Determines periods per year and the
/// date-increment rule between consecutive payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentFrequency {
    Monthly,
    BiWeekly,
    Weekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::BiWeekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::BiWeekly => "bi-weekly",
            PaymentFrequency::Weekly => "weekly",
        };
        f.write_str(s)
    }
}

/// Unit of the `loan_term` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermUnit {
    Years,
    Months,
}

/// Interest compounding cadence. Carried through for callers and future
/// extension; the period rate is derived from `PaymentFrequency` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundingFrequency {
    Monthly,
    SemiAnnually,
    Annually,
}

/// Immutable loan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// Principal borrowed. Must be positive.
    pub loan_amount: Money,
    /// Annual nominal rate in percent (5 = 5%), 0..=100.
    pub interest_rate: Rate,
    /// Term length in `term_unit` units. Must be at least 1.
    pub loan_term: u32,
    pub term_unit: TermUnit,
    /// Date of first accrual; period 1 falls on this date.
    pub start_date: NaiveDate,
    pub payment_freq: PaymentFrequency,
    pub compounding_freq: CompoundingFrequency,
}

/// An unscheduled principal-targeted payment applied at a specific period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPayment {
    /// Additional amount paid on top of the period's base payment.
    pub amount: Money,
    pub payment_date: NaiveDate,
    /// Target period. When absent, resolved as the first scheduled period
    /// whose date is on or after `payment_date`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_number: Option<u32>,
}

/// One period of a computed schedule. Monetary fields are rounded to cents
/// at emission; the engine's running balance is never the rounded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// 1-based, contiguous for the life of the schedule.
    pub payment_number: u32,
    pub date: NaiveDate,
    pub payment_amount: Money,
    pub principal_amount: Money,
    pub interest_amount: Money,
    pub remaining_balance: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
