//! Period-by-period loan amortization.
//!
//! Builds a full level-payment schedule from a loan configuration, an
//! optional set of unscheduled extra payments, and an optional base-payment
//! override. All math in `rust_decimal::Decimal`; monetary fields are
//! rounded to cents only when an entry is emitted, never on the running
//! balance.

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::AmortError;
use crate::time_value::level_payment;
use crate::types::{
    with_metadata, ComputationOutput, ExtraPayment, LoanInput, Money, PaymentEntry,
    PaymentFrequency, Rate, TermUnit,
};
use crate::AmortResult;

/// Balances at or below one cent are treated as paid off.
const BALANCE_EPSILON: Decimal = dec!(0.01);

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Base-payment override: the period whose index equals
/// `start_from_payment` uses `amount` as its recurring payment instead of
/// the standard level payment, before extra payments are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOverride {
    pub start_from_payment: u32,
    pub amount: Money,
}

/// Schedule computation input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub loan: LoanInput,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPayment>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payment_override: Option<PaymentOverride>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// A computed schedule plus the parameters it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub entries: Vec<PaymentEntry>,
    /// Level payment before overrides and extras, rounded to cents.
    pub standard_payment: Money,
    /// Interest rate applicable to a single period, as a decimal.
    pub period_rate: Rate,
    /// Nominal period count; `entries.len()` is at most this.
    pub total_periods: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the full amortization schedule for a loan.
pub fn build_schedule(input: &ScheduleInput) -> AmortResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_schedule(input)?;

    let loan = &input.loan;
    let periods_per_year = loan.payment_freq.periods_per_year();
    let period_rate = loan.interest_rate / HUNDRED / Decimal::from(periods_per_year);
    let total_periods = derive_period_count(loan.loan_term, loan.term_unit, loan.payment_freq)?;
    let standard_payment = level_payment(period_rate, total_periods, loan.loan_amount)?;

    let extras_by_period = resolve_extra_payments(
        &input.extra_payments,
        loan.start_date,
        loan.payment_freq,
        total_periods,
        &mut warnings,
    )?;

    let mut entries = Vec::with_capacity(total_periods as usize);
    let mut balance = loan.loan_amount;

    for period in 1..=total_periods {
        let date = period_date(loan.start_date, loan.payment_freq, period)?;
        let interest = balance * period_rate;

        let mut payment = match &input.payment_override {
            Some(o) if o.start_from_payment == period => o.amount,
            _ => standard_payment,
        };
        if let Some(extra) = extras_by_period.get(&period) {
            payment += *extra;
        }

        let mut principal = payment - interest;
        if principal < Decimal::ZERO {
            return Err(AmortError::FinancialImpossibility(format!(
                "Period {} payment {} does not cover interest {}; the balance would grow",
                period,
                payment.round_dp(2),
                interest.round_dp(2)
            )));
        }
        if principal > balance {
            // Final-period true-up: never overdraw the balance.
            principal = balance;
            payment = principal + interest;
        }

        balance -= principal;
        if balance <= BALANCE_EPSILON {
            balance = Decimal::ZERO;
        }

        entries.push(PaymentEntry {
            payment_number: period,
            date,
            payment_amount: payment.round_dp(2),
            principal_amount: principal.round_dp(2),
            interest_amount: interest.round_dp(2),
            remaining_balance: balance.round_dp(2),
        });

        if balance.is_zero() {
            break;
        }
    }

    let output = ScheduleOutput {
        entries,
        standard_payment: standard_payment.round_dp(2),
        period_rate,
        total_periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-Payment Amortization Schedule",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Number of payment periods implied by the term and cadence.
///
/// A term in months maps 1:1 to periods only under a monthly cadence; a
/// month-denominated term has no defined period count for bi-weekly or
/// weekly cadences and is rejected.
pub fn derive_period_count(
    loan_term: u32,
    term_unit: TermUnit,
    payment_freq: PaymentFrequency,
) -> AmortResult<u32> {
    match (term_unit, payment_freq) {
        (TermUnit::Years, freq) => Ok(loan_term * freq.periods_per_year()),
        (TermUnit::Months, PaymentFrequency::Monthly) => Ok(loan_term),
        (TermUnit::Months, freq) => Err(AmortError::InvalidInput {
            field: "term_unit".into(),
            reason: format!("A term in months is not defined for {freq} payments; use years"),
        }),
    }
}

/// Calendar date of the given 1-based period.
///
/// Monthly cadences advance by calendar months (chrono clamps the
/// day-of-month at short month ends); bi-weekly and weekly advance by
/// exact 14- and 7-day steps.
pub fn period_date(
    start_date: NaiveDate,
    payment_freq: PaymentFrequency,
    period: u32,
) -> AmortResult<NaiveDate> {
    let steps = period.saturating_sub(1);
    let date = match payment_freq {
        PaymentFrequency::Monthly => start_date.checked_add_months(Months::new(steps)),
        PaymentFrequency::BiWeekly => {
            start_date.checked_add_signed(Duration::days(14 * i64::from(steps)))
        }
        PaymentFrequency::Weekly => {
            start_date.checked_add_signed(Duration::days(7 * i64::from(steps)))
        }
    };
    date.ok_or_else(|| {
        AmortError::DateError(format!(
            "Cannot advance {start_date} by {steps} {payment_freq} periods"
        ))
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn validate_schedule(input: &ScheduleInput) -> AmortResult<()> {
    let loan = &input.loan;

    if loan.loan_amount <= Decimal::ZERO {
        return Err(AmortError::InvalidInput {
            field: "loan_amount".into(),
            reason: "Loan amount must be positive".into(),
        });
    }
    if loan.interest_rate < Decimal::ZERO || loan.interest_rate > HUNDRED {
        return Err(AmortError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Annual rate must be between 0 and 100 percent".into(),
        });
    }
    if loan.loan_term == 0 {
        return Err(AmortError::InvalidInput {
            field: "loan_term".into(),
            reason: "Loan term must be at least 1".into(),
        });
    }

    for extra in &input.extra_payments {
        if extra.amount <= Decimal::ZERO {
            return Err(AmortError::InvalidInput {
                field: "extra_payments".into(),
                reason: format!(
                    "Extra payment dated {} must have a positive amount",
                    extra.payment_date
                ),
            });
        }
    }

    if let Some(o) = &input.payment_override {
        if o.amount <= Decimal::ZERO {
            return Err(AmortError::InvalidInput {
                field: "payment_override".into(),
                reason: "Override payment amount must be positive".into(),
            });
        }
        if o.start_from_payment == 0 {
            return Err(AmortError::InvalidInput {
                field: "payment_override".into(),
                reason: "start_from_payment is 1-based".into(),
            });
        }
    }

    Ok(())
}

/// Sum extra payments per target period. Entries without an explicit
/// `payment_number` resolve to the first scheduled period on or after
/// their date; entries outside the schedule are dropped with a warning.
fn resolve_extra_payments(
    extras: &[ExtraPayment],
    start_date: NaiveDate,
    payment_freq: PaymentFrequency,
    total_periods: u32,
    warnings: &mut Vec<String>,
) -> AmortResult<BTreeMap<u32, Money>> {
    let mut by_period: BTreeMap<u32, Money> = BTreeMap::new();

    for extra in extras {
        let period = match extra.payment_number {
            Some(n) => n,
            None => {
                match first_period_on_or_after(
                    extra.payment_date,
                    start_date,
                    payment_freq,
                    total_periods,
                )? {
                    Some(p) => p,
                    None => {
                        warnings.push(format!(
                            "Extra payment of {} dated {} falls after the final scheduled period; ignored",
                            extra.amount, extra.payment_date
                        ));
                        continue;
                    }
                }
            }
        };

        if period == 0 || period > total_periods {
            warnings.push(format!(
                "Extra payment of {} targets period {} outside the schedule; ignored",
                extra.amount, period
            ));
            continue;
        }

        *by_period.entry(period).or_insert(Decimal::ZERO) += extra.amount;
    }

    Ok(by_period)
}

fn first_period_on_or_after(
    date: NaiveDate,
    start_date: NaiveDate,
    payment_freq: PaymentFrequency,
    total_periods: u32,
) -> AmortResult<Option<u32>> {
    if date <= start_date {
        return Ok(Some(1));
    }
    for period in 1..=total_periods {
        if period_date(start_date, payment_freq, period)? >= date {
            return Ok(Some(period));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompoundingFrequency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_loan() -> LoanInput {
        LoanInput {
            loan_amount: dec!(100_000),
            interest_rate: dec!(5),
            loan_term: 30,
            term_unit: TermUnit::Years,
            start_date: date(2024, 1, 1),
            payment_freq: PaymentFrequency::Monthly,
            compounding_freq: CompoundingFrequency::Monthly,
        }
    }

    fn schedule_only(loan: LoanInput) -> ScheduleInput {
        ScheduleInput {
            loan,
            extra_payments: vec![],
            payment_override: None,
        }
    }

    #[test]
    fn test_derive_period_count_years() {
        assert_eq!(
            derive_period_count(30, TermUnit::Years, PaymentFrequency::Monthly).unwrap(),
            360
        );
        assert_eq!(
            derive_period_count(2, TermUnit::Years, PaymentFrequency::BiWeekly).unwrap(),
            52
        );
        assert_eq!(
            derive_period_count(1, TermUnit::Years, PaymentFrequency::Weekly).unwrap(),
            52
        );
    }

    #[test]
    fn test_derive_period_count_months_monthly() {
        assert_eq!(
            derive_period_count(360, TermUnit::Months, PaymentFrequency::Monthly).unwrap(),
            360
        );
    }

    #[test]
    fn test_derive_period_count_months_weekly_rejected() {
        assert!(derive_period_count(12, TermUnit::Months, PaymentFrequency::Weekly).is_err());
        assert!(derive_period_count(12, TermUnit::Months, PaymentFrequency::BiWeekly).is_err());
    }

    #[test]
    fn test_period_date_monthly_advances_calendar_months() {
        let start = date(2024, 1, 1);
        assert_eq!(
            period_date(start, PaymentFrequency::Monthly, 1).unwrap(),
            start
        );
        assert_eq!(
            period_date(start, PaymentFrequency::Monthly, 13).unwrap(),
            date(2025, 1, 1)
        );
    }

    #[test]
    fn test_period_date_monthly_clamps_short_months() {
        // Jan 31 + 1 month lands on the end of February.
        let start = date(2024, 1, 31);
        assert_eq!(
            period_date(start, PaymentFrequency::Monthly, 2).unwrap(),
            date(2024, 2, 29)
        );
    }

    #[test]
    fn test_period_date_weekly_steps() {
        let start = date(2024, 1, 1);
        assert_eq!(
            period_date(start, PaymentFrequency::Weekly, 2).unwrap(),
            date(2024, 1, 8)
        );
        assert_eq!(
            period_date(start, PaymentFrequency::BiWeekly, 2).unwrap(),
            date(2024, 1, 15)
        );
    }

    #[test]
    fn test_schedule_standard_30y() {
        let result = build_schedule(&schedule_only(standard_loan())).unwrap();
        let out = &result.result;

        assert_eq!(out.total_periods, 360);
        assert_eq!(out.entries.len(), 360);
        assert_eq!(out.standard_payment, dec!(536.82));
        assert_eq!(out.entries[0].payment_amount, dec!(536.82));
        // First period interest: 100000 * 0.05 / 12 = 416.67
        assert_eq!(out.entries[0].interest_amount, dec!(416.67));
        assert_eq!(out.entries.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_zero_rate() {
        let mut loan = standard_loan();
        loan.interest_rate = Decimal::ZERO;
        let result = build_schedule(&schedule_only(loan)).unwrap();
        let out = &result.result;

        assert_eq!(out.entries.len(), 360);
        for entry in &out.entries {
            assert_eq!(entry.interest_amount, Decimal::ZERO);
            assert_eq!(entry.payment_amount, dec!(277.78));
        }
        assert_eq!(out.entries.last().unwrap().remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_months_term_equivalent_to_years() {
        let by_years = build_schedule(&schedule_only(standard_loan())).unwrap();

        let mut loan = standard_loan();
        loan.loan_term = 360;
        loan.term_unit = TermUnit::Months;
        let by_months = build_schedule(&schedule_only(loan)).unwrap();

        assert_eq!(by_years.result.entries, by_months.result.entries);
    }

    #[test]
    fn test_schedule_extra_payment_shortens_schedule() {
        let baseline = build_schedule(&schedule_only(standard_loan())).unwrap();

        let accelerated = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![ExtraPayment {
                amount: dec!(10_000),
                payment_date: date(2024, 12, 1),
                payment_number: Some(12),
            }],
            payment_override: None,
        };
        let accelerated = build_schedule(&accelerated).unwrap();

        assert!(accelerated.result.entries.len() < baseline.result.entries.len());
        assert_eq!(
            accelerated.result.entries.last().unwrap().remaining_balance,
            Decimal::ZERO
        );

        // Period 12 carries the extra on top of the level payment.
        let p12 = &accelerated.result.entries[11];
        assert_eq!(p12.payment_amount, dec!(536.82) + dec!(10_000));
    }

    #[test]
    fn test_extra_payment_resolved_by_date() {
        // No explicit payment_number: 2024-11-15 falls between periods 11
        // (Nov 1) and 12 (Dec 1), so it resolves to period 12.
        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![ExtraPayment {
                amount: dec!(5_000),
                payment_date: date(2024, 11, 15),
                payment_number: None,
            }],
            payment_override: None,
        };
        let result = build_schedule(&input).unwrap();
        let p12 = &result.result.entries[11];
        assert_eq!(p12.payment_amount, dec!(536.82) + dec!(5_000));
    }

    #[test]
    fn test_extra_payment_after_final_period_warns_and_is_ignored() {
        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![ExtraPayment {
                amount: dec!(5_000),
                payment_date: date(2090, 1, 1),
                payment_number: None,
            }],
            payment_override: None,
        };
        let result = build_schedule(&input).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.result.entries.len(), 360);
    }

    #[test]
    fn test_extra_payments_same_period_accumulate() {
        let extra = |amount| ExtraPayment {
            amount,
            payment_date: date(2024, 6, 1),
            payment_number: Some(6),
        };
        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![extra(dec!(1_000)), extra(dec!(500))],
            payment_override: None,
        };
        let result = build_schedule(&input).unwrap();
        let p6 = &result.result.entries[5];
        assert_eq!(p6.payment_amount, dec!(536.82) + dec!(1_500));
    }

    #[test]
    fn test_payment_override_applies_to_named_period_only() {
        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![],
            payment_override: Some(PaymentOverride {
                start_from_payment: 3,
                amount: dec!(1_000),
            }),
        };
        let result = build_schedule(&input).unwrap();
        let entries = &result.result.entries;

        assert_eq!(entries[1].payment_amount, dec!(536.82));
        assert_eq!(entries[2].payment_amount, dec!(1_000));
        assert_eq!(entries[3].payment_amount, dec!(536.82));
    }

    #[test]
    fn test_payment_below_interest_is_rejected() {
        // 416.67 of interest accrues in period 1; a 100 payment cannot
        // amortize anything.
        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![],
            payment_override: Some(PaymentOverride {
                start_from_payment: 1,
                amount: dec!(100),
            }),
        };
        let err = build_schedule(&input).unwrap_err();
        assert!(matches!(err, AmortError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_conservation_and_monotonic_payoff() {
        let result = build_schedule(&schedule_only(standard_loan())).unwrap();
        let entries = &result.result.entries;

        let tol = dec!(0.01);
        let mut prev_balance = dec!(100_000);
        let mut prev_number = 0;
        for entry in entries {
            assert_eq!(entry.payment_number, prev_number + 1);
            prev_number = entry.payment_number;

            let diff =
                (entry.principal_amount + entry.interest_amount - entry.payment_amount).abs();
            assert!(
                diff <= tol,
                "Period {}: principal + interest != payment (diff {})",
                entry.payment_number,
                diff
            );

            assert!(
                entry.remaining_balance <= prev_balance,
                "Period {}: balance {} exceeds prior {}",
                entry.payment_number,
                entry.remaining_balance,
                prev_balance
            );
            prev_balance = entry.remaining_balance;
        }
    }

    #[test]
    fn test_validation_rejections() {
        let mut loan = standard_loan();
        loan.loan_amount = Decimal::ZERO;
        assert!(build_schedule(&schedule_only(loan)).is_err());

        let mut loan = standard_loan();
        loan.interest_rate = dec!(101);
        assert!(build_schedule(&schedule_only(loan)).is_err());

        let mut loan = standard_loan();
        loan.loan_term = 0;
        assert!(build_schedule(&schedule_only(loan)).is_err());

        let input = ScheduleInput {
            loan: standard_loan(),
            extra_payments: vec![ExtraPayment {
                amount: Decimal::ZERO,
                payment_date: date(2024, 6, 1),
                payment_number: Some(6),
            }],
            payment_override: None,
        };
        assert!(build_schedule(&input).is_err());
    }
}
