//! Fixed-rate mortgage calculations: monthly payment, amortization schedule,
//! and a simple refinance comparison.
//!
//! The engine in [`loan`] and [`refinance`] is pure and assumes validated
//! inputs; validation happens in [`input`] before anything reaches it.

pub mod calculation;
pub mod chart;
pub mod error;
pub mod export;
pub mod input;
pub mod loan;
pub mod refinance;

pub use calculation::{calculate, CalculationRequest, CalculationResult, MonthlyCosts};
pub use error::{MortgageError, Result};
pub use loan::{compute_monthly_payment, AmortizationEntry, AmortizationSchedule, LoanTerms};
pub use refinance::{compute_refinance_savings, RefinanceComparison};
