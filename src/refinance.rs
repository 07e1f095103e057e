use log::debug;
use std::fmt;

use crate::loan::{compute_monthly_payment, LoanTerms};

/// Monthly payment of an existing loan set against a refinance offer.
///
/// Savings are counted over `months_compared` payments and go negative when
/// the offer costs more per month.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefinanceComparison {
    pub original_payment: f64,
    pub refinance_payment: f64,
    pub months_compared: u32,
    pub interest_savings: f64,
}

impl RefinanceComparison {
    /// Compares over the original loan's full term, as if refinancing at origination.
    pub fn new(original: &LoanTerms, original_payment: f64, refinance: &LoanTerms) -> Self {
        Self::over_remaining_term(original_payment, refinance, original.num_payments())
    }

    /// Compares over an explicit number of payments left on the original loan.
    /// Use this for seasoned loans, where the full term overstates the savings.
    pub fn over_remaining_term(
        original_payment: f64,
        refinance: &LoanTerms,
        remaining_months: u32,
    ) -> Self {
        // refinance offers always amortize
        let (refinance_payment, _) = compute_monthly_payment(&refinance.amortizing());
        let interest_savings = (original_payment - refinance_payment) * remaining_months as f64;
        debug!(
            "refinance {}: payment {:.4} vs {:.4} over {} months, savings {:.2}",
            refinance, refinance_payment, original_payment, remaining_months, interest_savings
        );

        Self {
            original_payment,
            refinance_payment,
            months_compared: remaining_months,
            interest_savings,
        }
    }

    pub fn monthly_savings(&self) -> f64 {
        self.original_payment - self.refinance_payment
    }
}

impl fmt::Display for RefinanceComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Interest Savings: ${:.2} (if refinanced)", self.interest_savings)
    }
}

/// Total savings from refinancing, counted over the original loan's full term.
pub fn compute_refinance_savings(
    original: &LoanTerms,
    original_monthly_payment: f64,
    refinance: &LoanTerms,
) -> f64 {
    RefinanceComparison::new(original, original_monthly_payment, refinance).interest_savings
}
