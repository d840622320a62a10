use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::AmortError;
use crate::types::{Money, Rate};
use crate::AmortResult;

/// Level annuity payment that fully amortizes `principal` over `nper`
/// periods at `rate` per period: P * r * (1+r)^n / ((1+r)^n - 1).
///
/// A zero rate is the simple-division limit P / n and is special-cased
/// rather than evaluated through the annuity formula (0/0 otherwise).
pub fn level_payment(rate: Rate, nper: u32, principal: Money) -> AmortResult<Money> {
    if nper == 0 {
        return Err(AmortError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(AmortError::InvalidInput {
            field: "rate".into(),
            reason: "Period rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let one_plus_r = Decimal::ONE + rate;
    let factor = one_plus_r.powi(nper as i64);
    let annuity_factor = factor - Decimal::ONE;

    if annuity_factor.is_zero() {
        return Err(AmortError::DivisionByZero {
            context: "annuity factor".into(),
        });
    }

    Ok(principal * rate * factor / annuity_factor)
}
