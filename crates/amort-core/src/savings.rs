//! Reductions over computed schedules: headline payment summaries and
//! original-vs-accelerated savings comparisons.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{
    with_metadata, ComputationOutput, LoanInput, Money, PaymentEntry, PaymentFrequency,
};
use crate::AmortResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Headline figures reduced from a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// First entry's payment amount; zero for an empty schedule.
    pub periodic_payment: Money,
    pub total_interest: Money,
    pub total_payments: Money,
    /// Human-readable payoff date; empty for an empty schedule.
    pub payoff_date: String,
}

/// Interest and time saved by an accelerated schedule relative to the
/// original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsOutput {
    /// May be negative when the accelerated schedule is worse; not clamped.
    pub interest_saved: Money,
    /// Signed period-count difference (original minus accelerated).
    pub time_saved_periods: i64,
    pub time_saved_display: String,
    pub original_total_interest: Money,
    pub accelerated_total_interest: Money,
    pub original_periods: u32,
    pub accelerated_periods: u32,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reduce a schedule to its headline figures. An empty schedule is legal
/// and yields an all-zero summary.
pub fn payment_summary(
    loan: &LoanInput,
    entries: &[PaymentEntry],
) -> AmortResult<ComputationOutput<PaymentSummary>> {
    let start = Instant::now();

    let periodic_payment = entries
        .first()
        .map(|e| e.payment_amount)
        .unwrap_or(Decimal::ZERO);
    // Sum first, round once: rounding each addend would compound drift.
    let total_interest: Decimal = entries.iter().map(|e| e.interest_amount).sum();
    let total_payments: Decimal = entries.iter().map(|e| e.payment_amount).sum();
    let payoff_date = entries
        .last()
        .map(|e| format_payoff_date(e.date))
        .unwrap_or_default();

    let summary = PaymentSummary {
        periodic_payment,
        total_interest: total_interest.round_dp(2),
        total_payments: total_payments.round_dp(2),
        payoff_date,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Schedule Payment Summary",
        loan,
        Vec::new(),
        elapsed,
        summary,
    ))
}

/// Compare an original schedule against an accelerated one.
pub fn extra_payment_savings(
    original: &[PaymentEntry],
    accelerated: &[PaymentEntry],
    payment_freq: PaymentFrequency,
) -> AmortResult<ComputationOutput<SavingsOutput>> {
    let start = Instant::now();

    let original_total_interest: Decimal = original.iter().map(|e| e.interest_amount).sum();
    let accelerated_total_interest: Decimal = accelerated.iter().map(|e| e.interest_amount).sum();
    let interest_saved = (original_total_interest - accelerated_total_interest).round_dp(2);

    let time_saved_periods = original.len() as i64 - accelerated.len() as i64;
    let time_saved_display = format_time_saved(time_saved_periods, payment_freq);

    let output = SavingsOutput {
        interest_saved,
        time_saved_periods,
        time_saved_display,
        original_total_interest: original_total_interest.round_dp(2),
        accelerated_total_interest: accelerated_total_interest.round_dp(2),
        original_periods: original.len() as u32,
        accelerated_periods: accelerated.len() as u32,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra Payment Savings Comparison",
        &serde_json::json!({
            "original_periods": original.len(),
            "accelerated_periods": accelerated.len(),
            "payment_freq": payment_freq.to_string(),
        }),
        Vec::new(),
        elapsed,
        output,
    ))
}

/// Render a saved-period count in the cadence's own units.
///
/// Monthly schedules read naturally in years and months; bi-weekly and
/// weekly cadences are reported as payment counts so the units are never
/// mislabeled as months.
pub fn format_time_saved(periods: i64, payment_freq: PaymentFrequency) -> String {
    let n = periods.max(0);
    match payment_freq {
        PaymentFrequency::Monthly => {
            let years = n / 12;
            let months = n % 12;
            if years > 0 {
                format!(
                    "{} year{}, {} month{}",
                    years,
                    plural(years),
                    months,
                    plural(months)
                )
            } else {
                format!("{} month{}", months, plural(months))
            }
        }
        PaymentFrequency::BiWeekly => format!("{} bi-weekly payment{}", n, plural(n)),
        PaymentFrequency::Weekly => format!("{} weekly payment{}", n, plural(n)),
    }
}

fn format_payoff_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompoundingFrequency, TermUnit};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_loan() -> LoanInput {
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

    fn entry(number: u32, date_: NaiveDate, interest: Money, payment: Money) -> PaymentEntry {
        PaymentEntry {
            payment_number: number,
            date: date_,
            payment_amount: payment,
            principal_amount: payment - interest,
            interest_amount: interest,
            remaining_balance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_summary_empty_schedule() {
        let result = payment_summary(&sample_loan(), &[]).unwrap();
        let s = &result.result;
        assert_eq!(s.periodic_payment, Decimal::ZERO);
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert_eq!(s.total_payments, Decimal::ZERO);
        assert_eq!(s.payoff_date, "");
    }

    #[test]
    fn test_summary_sums_and_payoff_date() {
        let entries = vec![
            entry(1, date(2024, 1, 1), dec!(416.67), dec!(536.82)),
            entry(2, date(2024, 2, 1), dec!(416.17), dec!(536.82)),
        ];
        let result = payment_summary(&sample_loan(), &entries).unwrap();
        let s = &result.result;

        assert_eq!(s.periodic_payment, dec!(536.82));
        assert_eq!(s.total_interest, dec!(832.84));
        assert_eq!(s.total_payments, dec!(1073.64));
        assert_eq!(s.payoff_date, "February 1, 2024");
    }

    #[test]
    fn test_savings_positive() {
        let original = vec![
            entry(1, date(2024, 1, 1), dec!(100), dec!(600)),
            entry(2, date(2024, 2, 1), dec!(90), dec!(600)),
            entry(3, date(2024, 3, 1), dec!(80), dec!(600)),
        ];
        let accelerated = vec![
            entry(1, date(2024, 1, 1), dec!(100), dec!(1100)),
            entry(2, date(2024, 2, 1), dec!(50), dec!(600)),
        ];

        let result =
            extra_payment_savings(&original, &accelerated, PaymentFrequency::Monthly).unwrap();
        let s = &result.result;

        assert_eq!(s.interest_saved, dec!(120));
        assert_eq!(s.time_saved_periods, 1);
        assert_eq!(s.original_periods, 3);
        assert_eq!(s.accelerated_periods, 2);
        assert_eq!(s.time_saved_display, "1 month");
    }

    #[test]
    fn test_savings_negative_not_clamped() {
        let original = vec![entry(1, date(2024, 1, 1), dec!(50), dec!(600))];
        let accelerated = vec![
            entry(1, date(2024, 1, 1), dec!(50), dec!(600)),
            entry(2, date(2024, 2, 1), dec!(40), dec!(600)),
        ];

        let result =
            extra_payment_savings(&original, &accelerated, PaymentFrequency::Monthly).unwrap();
        assert_eq!(result.result.interest_saved, dec!(-40));
        assert_eq!(result.result.time_saved_periods, -1);
    }

    #[test]
    fn test_format_time_saved_monthly() {
        assert_eq!(
            format_time_saved(30, PaymentFrequency::Monthly),
            "2 years, 6 months"
        );
        assert_eq!(
            format_time_saved(13, PaymentFrequency::Monthly),
            "1 year, 1 month"
        );
        assert_eq!(format_time_saved(5, PaymentFrequency::Monthly), "5 months");
        assert_eq!(format_time_saved(0, PaymentFrequency::Monthly), "0 months");
    }

    #[test]
    fn test_format_time_saved_non_monthly_uses_payment_counts() {
        assert_eq!(
            format_time_saved(26, PaymentFrequency::BiWeekly),
            "26 bi-weekly payments"
        );
        assert_eq!(
            format_time_saved(1, PaymentFrequency::Weekly),
            "1 weekly payment"
        );
    }
}
