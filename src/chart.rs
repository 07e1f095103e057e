//! Dual-axis amortization chart: remaining balance on the left axis, the
//! interest and principal split of each payment on the right.

use log::info;
use plotters::prelude::*;
use std::error::Error as StdError;
use std::path::Path;

use crate::error::{MortgageError, Result};
use crate::loan::AmortizationSchedule;

pub const CHART_SIZE: (u32, u32) = (1000, 600);

const BALANCE_COLOR: RGBColor = RGBColor(31, 119, 180);
const INTEREST_COLOR: RGBColor = RGBColor(214, 39, 40);
const PRINCIPAL_COLOR: RGBColor = RGBColor(44, 160, 44);

/// Renders the schedule to an image at `path`. The format follows the file
/// extension (`.png`, `.jpg`, `.bmp`).
pub fn render_chart(path: impl AsRef<Path>, schedule: &AmortizationSchedule) -> Result<()> {
    let path = path.as_ref();
    if schedule.is_empty() {
        return Err(MortgageError::invalid("schedule", "has no payments to plot"));
    }

    draw_chart(path, schedule).map_err(|e| MortgageError::export(path, e))?;
    info!("saved amortization chart to {}", path.display());
    Ok(())
}

fn payment_range(schedule: &AmortizationSchedule) -> (f64, f64) {
    let (low, high) = schedule
        .iter()
        .flat_map(|e| [e.interest_portion, e.principal_portion])
        .fold((0f64, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    // flat series, e.g. a zero-rate interest-only loan
    if high - low < 1. {
        (low, low + 1.)
    } else {
        (low, high * 1.05)
    }
}

fn draw_chart(
    path: &Path,
    schedule: &AmortizationSchedule,
) -> std::result::Result<(), Box<dyn StdError + Send + Sync>> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let last_month = (schedule.len() as u32).max(2);
    let balance_top = schedule
        .iter()
        .map(|e| e.remaining_balance)
        .fold(1., f64::max)
        * 1.05;
    let (payment_low, payment_high) = payment_range(schedule);

    let mut chart = ChartBuilder::on(&root)
        .caption("Amortization Schedule", ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .right_y_label_area_size(80)
        .build_cartesian_2d(1u32..last_month, 0f64..balance_top)?
        .set_secondary_coord(1u32..last_month, payment_low..payment_high);

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Remaining Balance")
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Payment Amount")
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            schedule.iter().map(|e| (e.month_index, e.remaining_balance)),
            &BALANCE_COLOR,
        ))?
        .label("Remaining Balance")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BALANCE_COLOR));
    chart
        .draw_secondary_series(LineSeries::new(
            schedule.iter().map(|e| (e.month_index, e.interest_portion)),
            &INTEREST_COLOR,
        ))?
        .label("Interest Payment")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], INTEREST_COLOR));
    chart
        .draw_secondary_series(LineSeries::new(
            schedule.iter().map(|e| (e.month_index, e.principal_portion)),
            &PRINCIPAL_COLOR,
        ))?
        .label("Principal Payment")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRINCIPAL_COLOR));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{payment_range, render_chart};
    use crate::error::MortgageError;
    use crate::loan::{compute_monthly_payment, AmortizationSchedule, LoanTerms};
    use test_log::test;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn schedule(rate: f64, interest_only: bool) -> AmortizationSchedule {
        let terms = LoanTerms::new(200000., rate, 30, interest_only).unwrap();
        compute_monthly_payment(&terms).1
    }

    #[test]
    fn test_render_chart_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        render_chart(&path, &schedule(0.06, false)).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_render_flat_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        let flat = schedule(0., true);

        assert_eq!(payment_range(&flat), (0., 1.));
        render_chart(&path, &flat).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_payment_range_covers_both_series() {
        let s = schedule(0.06, false);
        let (low, high) = payment_range(&s);

        assert_eq!(low, 0.);
        assert!(s
            .iter()
            .all(|e| e.interest_portion <= high && e.principal_portion <= high));
    }

    #[test]
    fn test_render_chart_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chart.png");

        let err = render_chart(&path, &schedule(0.06, false)).unwrap_err();
        match err {
            MortgageError::Export { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error {}", other),
        }
    }

    #[test]
    fn test_empty_schedule_is_rejected() {
        let err = render_chart("unused.png", &AmortizationSchedule::default()).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { .. }));
    }
}
