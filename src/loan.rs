use chrono::{Months, NaiveDate};
use log::{debug, trace};
use std::fmt;

use crate::error::{MortgageError, Result};

/// Longest term accepted by [`LoanTerms::new`], in years.
pub const MAX_TERM_YEARS: u32 = 100;

/// The parameters of a fixed-rate loan, compounded monthly.
///
/// Built through [`LoanTerms::new`], which enforces `principal > 0`,
/// `0 <= annual_rate < 1` and `1 <= term_years <= MAX_TERM_YEARS`.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LoanTerms {
    principal: f64,
    annual_rate: f64,
    term_years: u32,
    interest_only: bool,
}

impl LoanTerms {
    pub fn new(
        principal: f64,
        annual_rate: f64,
        term_years: u32,
        interest_only: bool,
    ) -> Result<Self> {
        if !principal.is_finite() || principal <= 0. {
            return Err(MortgageError::invalid(
                "principal",
                format!("must be a positive amount, got {}", principal),
            ));
        }
        // annual_rate is a fraction here, the caller has already divided percentages by 100
        if !annual_rate.is_finite() || !(0. ..1.).contains(&annual_rate) {
            return Err(MortgageError::invalid(
                "annual rate",
                format!("must be at least 0% and below 100%, got {}", annual_rate),
            ));
        }
        if term_years == 0 || term_years > MAX_TERM_YEARS {
            return Err(MortgageError::invalid(
                "term",
                format!("must be between 1 and {} years, got {}", MAX_TERM_YEARS, term_years),
            ));
        }
        Ok(Self {
            principal,
            annual_rate,
            term_years,
            interest_only,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn interest_only(&self) -> bool {
        self.interest_only
    }

    /// The same loan, amortizing.
    pub fn amortizing(self) -> Self {
        Self {
            interest_only: false,
            ..self
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / 12.
    }

    pub fn num_payments(&self) -> u32 {
        self.term_years * 12
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "principal ${:.2}, rate {:.4}%, term {} years{}",
            self.principal,
            self.annual_rate * 100.,
            self.term_years,
            if self.interest_only { ", interest only" } else { "" }
        )
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmortizationEntry {
    pub month_index: u32,
    pub remaining_balance: f64,
    pub interest_portion: f64,
    pub principal_portion: f64,
}

impl AmortizationEntry {
    pub fn new(
        month_index: u32,
        remaining_balance: f64,
        interest_portion: f64,
        principal_portion: f64,
    ) -> Self {
        Self {
            month_index,
            remaining_balance,
            interest_portion,
            principal_portion,
        }
    }

    pub fn payment(&self) -> f64 {
        self.interest_portion + self.principal_portion
    }
}

impl fmt::Display for AmortizationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "month {}, interest ${:.2}, principal ${:.2}, remaining balance ${:.2}",
            self.month_index, self.interest_portion, self.principal_portion, self.remaining_balance
        )
    }
}

/// Month-by-month breakdown of a loan, ordered by `month_index` starting at 1.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AmortizationSchedule {
    entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AmortizationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AmortizationEntry> {
        self.entries.iter()
    }

    /// Looks up an entry by its 1-based month index.
    pub fn get(&self, month_index: u32) -> Option<&AmortizationEntry> {
        let idx = usize::try_from(month_index).ok()?.checked_sub(1)?;
        self.entries.get(idx)
    }

    pub fn last(&self) -> Option<&AmortizationEntry> {
        self.entries.last()
    }

    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest_portion).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.entries.iter().map(|e| e.principal_portion).sum()
    }

    /// Calendar date of a payment, counting whole months from `first_payment`.
    /// Days past the end of a shorter month are clamped, so a loan paid on the
    /// 31st falls due on the 28th/29th in February and returns to the 31st in March.
    pub fn payment_date(&self, first_payment: NaiveDate, month_index: u32) -> Option<NaiveDate> {
        self.get(month_index)?;
        first_payment.checked_add_months(Months::new(month_index - 1))
    }

    /// Every entry paired with its due date.
    pub fn payment_dates(
        &self,
        first_payment: NaiveDate,
    ) -> impl Iterator<Item = (&AmortizationEntry, NaiveDate)> + '_ {
        self.entries.iter().map_while(move |entry| {
            first_payment
                .checked_add_months(Months::new(entry.month_index - 1))
                .map(|date| (entry, date))
        })
    }

    pub fn payoff_date(&self, first_payment: NaiveDate) -> Option<NaiveDate> {
        let last = self.last()?;
        self.payment_date(first_payment, last.month_index)
    }
}

impl<'a> IntoIterator for &'a AmortizationSchedule {
    type Item = &'a AmortizationEntry;
    type IntoIter = std::slice::Iter<'a, AmortizationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Computes the fixed monthly payment for `terms` and its full schedule.
///
/// Interest-only loans pay `principal * monthly_rate` forever and the balance
/// never moves. A zero rate amortizes linearly at `principal / num_payments`.
/// Everything else uses the annuity formula `P * r / (1 - (1 + r)^-n)`,
/// evaluated through `ln_1p`/`exp_m1` so that rates too small to change
/// `1 + r` still land on the linear payment.
pub fn compute_monthly_payment(terms: &LoanTerms) -> (f64, AmortizationSchedule) {
    let monthly_rate = terms.monthly_rate();
    let num_payments = terms.num_payments();

    let monthly_payment = if terms.interest_only {
        terms.principal * monthly_rate
    } else if monthly_rate == 0. {
        terms.principal / num_payments as f64
    } else {
        terms.principal * monthly_rate / discount_complement(monthly_rate, num_payments)
    };
    debug!("{} -> monthly payment {:.4}", terms, monthly_payment);

    let schedule = build_schedule(terms, monthly_payment);
    (monthly_payment, schedule)
}

/// `1 - (1 + r)^-n` without cancellation.
fn discount_complement(monthly_rate: f64, payments: u32) -> f64 {
    -(-(payments as f64) * monthly_rate.ln_1p()).exp_m1()
}

// Each month's balance is the present value of the payments still due rather
// than a running subtraction, so rounding in the payment cannot compound
// across the term and the final balance is exactly zero.
fn build_schedule(terms: &LoanTerms, monthly_payment: f64) -> AmortizationSchedule {
    let monthly_rate = terms.monthly_rate();
    let num_payments = terms.num_payments();
    let balance_after = |month_index: u32| {
        let remaining = num_payments - month_index;
        if terms.interest_only {
            terms.principal
        } else if monthly_rate == 0. {
            monthly_payment * remaining as f64
        } else {
            monthly_payment * (discount_complement(monthly_rate, remaining) / monthly_rate)
        }
    };

    let mut entries = Vec::with_capacity(num_payments as usize);
    let mut previous_balance = terms.principal;

    for month_index in 1..=num_payments {
        let interest_portion = previous_balance * monthly_rate;
        let principal_portion = monthly_payment - interest_portion;
        // the present value can sit an ulp above the principal when the
        // payment is dominated by interest
        let remaining_balance = balance_after(month_index).min(previous_balance);
        trace!(
            "month {}, interest {}, principal {}, balance {}",
            month_index,
            interest_portion,
            principal_portion,
            remaining_balance
        );

        entries.push(AmortizationEntry::new(
            month_index,
            remaining_balance,
            interest_portion,
            principal_portion,
        ));
        previous_balance = remaining_balance;
    }
    AmortizationSchedule { entries }
}



#[cfg(all(test, feature = "serde"))]
mod serde_derives {
    use super::{AmortizationEntry, AmortizationSchedule, LoanTerms};
    use std::marker::PhantomData;

    struct Check<T>(PhantomData<T>);

    trait Deserializable {
        fn deserializable(&self) -> bool {
            true
        }
    }
    impl<T: serde::de::DeserializeOwned> Deserializable for Check<T> {}

    trait NotDeserializable {
        fn deserializable(&self) -> bool {
            false
        }
    }
    impl<T> NotDeserializable for &Check<T> {}

    // validated types must only come out of the engine, never in from a document
    #[test]
    fn validated_types_are_serialize_only() {
        assert!(!(&Check::<AmortizationSchedule>(PhantomData)).deserializable());
        assert!(!(&Check::<LoanTerms>(PhantomData)).deserializable());
        assert!((&Check::<AmortizationEntry>(PhantomData)).deserializable());
    }
}
