use log::info;
use std::io;
use std::path::Path;

use crate::error::{MortgageError, Result};
use crate::loan::AmortizationSchedule;

pub const SCHEDULE_HEADER: [&str; 4] = [
    "Month",
    "Remaining Balance",
    "Interest Payment",
    "Principal Payment",
];

/// Writes the schedule as CSV: a header row, then one row per month.
pub fn write_schedule<W: io::Write>(
    writer: W,
    schedule: &AmortizationSchedule,
) -> std::result::Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SCHEDULE_HEADER)?;
    for entry in schedule {
        wtr.write_record(&[
            entry.month_index.to_string(),
            entry.remaining_balance.to_string(),
            entry.interest_portion.to_string(),
            entry.principal_portion.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Saves the schedule to `path`, replacing any existing file.
///
/// A failure leaves the schedule itself untouched; only the file may be
/// missing or partially written.
pub fn export_schedule(path: impl AsRef<Path>, schedule: &AmortizationSchedule) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| MortgageError::export(path, e))?;
    write_schedule(file, schedule).map_err(|e| MortgageError::export(path, e))?;
    info!("saved {} months of schedule to {}", schedule.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{export_schedule, write_schedule, SCHEDULE_HEADER};
    use crate::error::MortgageError;
    use crate::loan::{compute_monthly_payment, LoanTerms};
    use test_log::test;

    fn schedule() -> crate::loan::AmortizationSchedule {
        let terms = LoanTerms::new(120000., 0., 1, false).unwrap();
        compute_monthly_payment(&terms).1
    }

    #[test]
    fn test_write_schedule() {
        let mut buf = Vec::new();
        write_schedule(&mut buf, &schedule()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Month,Remaining Balance,Interest Payment,Principal Payment");
        assert_eq!(lines[1], "1,110000,0,10000");
        assert_eq!(lines[12], "12,0,0,10000");
    }

    #[test]
    fn test_export_schedule_round_trips_through_csv_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.csv");
        let schedule = schedule();

        export_schedule(&path, &schedule).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, SCHEDULE_HEADER);
        let months: Vec<u32> = rdr
            .records()
            .map(|r| r.unwrap()[0].parse().unwrap())
            .collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());
    }

    #[test]
    fn test_export_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("schedule.csv");
        let schedule = schedule();

        let err = export_schedule(&path, &schedule).unwrap_err();
        match err {
            MortgageError::Export { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error {}", other),
        }
        assert_eq!(schedule.len(), 12);
        assert!(!path.exists());
    }
}
