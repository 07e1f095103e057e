//! One calculation request in, one result out. Nothing is kept between calls.

use log::info;
use std::fmt;

use crate::loan::{compute_monthly_payment, AmortizationSchedule, LoanTerms};
use crate::refinance::RefinanceComparison;

/// Escrow-style costs that ride on top of the loan payment.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonthlyCosts {
    pub property_tax: f64,
    pub home_insurance: f64,
}

impl MonthlyCosts {
    pub fn from_annual(annual_property_tax: f64, annual_home_insurance: f64) -> Self {
        Self {
            property_tax: annual_property_tax / 12.,
            home_insurance: annual_home_insurance / 12.,
        }
    }

    pub fn total(&self) -> f64 {
        self.property_tax + self.home_insurance
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RefinanceRequest {
    pub terms: LoanTerms,
    /// Payments left on the original loan. `None` compares over its full term.
    pub remaining_months: Option<u32>,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CalculationRequest {
    pub terms: LoanTerms,
    pub costs: MonthlyCosts,
    pub refinance: Option<RefinanceRequest>,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CalculationResult {
    pub terms: LoanTerms,
    pub monthly_payment: f64,
    pub schedule: AmortizationSchedule,
    pub costs: MonthlyCosts,
    pub refinance: Option<RefinanceComparison>,
}

impl CalculationResult {
    pub fn total_interest(&self) -> f64 {
        self.schedule.total_interest()
    }

    pub fn total_paid(&self) -> f64 {
        self.terms.principal() + self.total_interest()
    }

    pub fn total_monthly_payment(&self) -> f64 {
        self.monthly_payment + self.costs.total()
    }
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Monthly Payment (Principal and Interest): ${:.2}",
            self.monthly_payment
        )?;
        writeln!(f, "Monthly Property Tax: ${:.2}", self.costs.property_tax)?;
        writeln!(f, "Monthly Home Insurance: ${:.2}", self.costs.home_insurance)?;
        writeln!(f, "Total Monthly Payment: ${:.2}", self.total_monthly_payment())?;
        writeln!(f, "Total Interest Paid: ${:.2}", self.total_interest())?;
        write!(f, "Total Paid: ${:.2}", self.total_paid())?;
        if let Some(refinance) = &self.refinance {
            write!(f, "\n{}", refinance)?;
        }
        Ok(())
    }
}

pub fn calculate(request: &CalculationRequest) -> CalculationResult {
    let (monthly_payment, schedule) = compute_monthly_payment(&request.terms);

    let refinance = request.refinance.map(|r| match r.remaining_months {
        Some(months) => RefinanceComparison::over_remaining_term(monthly_payment, &r.terms, months),
        None => RefinanceComparison::new(&request.terms, monthly_payment, &r.terms),
    });

    info!(
        "calculated {} payments of {:.2} for {}",
        schedule.len(),
        monthly_payment,
        request.terms
    );

    CalculationResult {
        terms: request.terms,
        monthly_payment,
        schedule,
        costs: request.costs,
        refinance,
    }
}
