//! Turns raw form text into a validated [`CalculationRequest`].
//!
//! Rates are entered as percentages and leave here as fractions. Nothing
//! reaches the engine until every field has parsed and passed its checks.

use crate::calculation::{CalculationRequest, MonthlyCosts, RefinanceRequest};
use crate::error::{MortgageError, Result};
use crate::loan::LoanTerms;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoanForm {
    pub principal: String,
    /// Annual rate in percent.
    pub interest_rate: String,
    pub num_years: String,
    /// Annual amount.
    pub property_tax: String,
    /// Annual amount.
    pub home_insurance: String,
    pub interest_only: bool,
    /// Present only while the refinance toggle is on.
    pub refinance: Option<RefinanceForm>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefinanceForm {
    pub balance: String,
    pub interest_rate: String,
    pub num_years: String,
    /// Years left on the original loan, blank to compare over its full term.
    pub remaining_years: Option<String>,
}

impl LoanForm {
    pub fn validate(&self) -> Result<CalculationRequest> {
        let terms = LoanTerms::new(
            parse_amount("principal", &self.principal)?,
            parse_percent("interest rate", &self.interest_rate)?,
            parse_years("number of years", &self.num_years)?,
            self.interest_only,
        )?;
        let costs = MonthlyCosts::from_annual(
            parse_non_negative("property tax", &self.property_tax)?,
            parse_non_negative("home insurance", &self.home_insurance)?,
        );
        let refinance = match &self.refinance {
            Some(form) => Some(form.validate(&terms)?),
            None => None,
        };

        Ok(CalculationRequest {
            terms,
            costs,
            refinance,
        })
    }
}

impl RefinanceForm {
    fn validate(&self, original: &LoanTerms) -> Result<RefinanceRequest> {
        let terms = LoanTerms::new(
            parse_amount("refinance balance", &self.balance)?,
            parse_percent("refinance interest rate", &self.interest_rate)?,
            parse_years("refinance number of years", &self.num_years)?,
            false,
        )?;
        let remaining_months = match self.remaining_years.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => {
                let years = parse_years("remaining years", text)?;
                if years > original.term_years() {
                    return Err(MortgageError::invalid(
                        "remaining years",
                        format!(
                            "cannot exceed the original term of {} years",
                            original.term_years()
                        ),
                    ));
                }
                Some(years * 12)
            }
        };

        Ok(RefinanceRequest {
            terms,
            remaining_months,
        })
    }
}

fn parse_number(field: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MortgageError::invalid(field, "is required"));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| MortgageError::invalid(field, format!("'{}' is not a number", text)))?;
    if !value.is_finite() {
        return Err(MortgageError::invalid(field, format!("'{}' is not a number", text)));
    }
    Ok(value)
}

/// A strictly positive amount.
pub fn parse_amount(field: &str, text: &str) -> Result<f64> {
    let value = parse_number(field, text)?;
    if value <= 0. {
        return Err(MortgageError::invalid(field, "must be greater than zero"));
    }
    Ok(value)
}

pub fn parse_non_negative(field: &str, text: &str) -> Result<f64> {
    let value = parse_number(field, text)?;
    if value < 0. {
        return Err(MortgageError::invalid(field, "cannot be negative"));
    }
    Ok(value)
}

/// A percentage, returned as a fraction (`6` -> `0.06`).
pub fn parse_percent(field: &str, text: &str) -> Result<f64> {
    let value = parse_number(field, text)?;
    if !(0. ..100.).contains(&value) {
        return Err(MortgageError::invalid(field, "must be at least 0% and below 100%"));
    }
    Ok(value / 100.)
}

pub fn parse_years(field: &str, text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MortgageError::invalid(field, "is required"));
    }
    let years: u32 = text.parse().map_err(|_| {
        MortgageError::invalid(field, format!("'{}' is not a whole number of years", text))
    })?;
    if years == 0 {
        return Err(MortgageError::invalid(field, "must be at least one year"));
    }
    Ok(years)
}
