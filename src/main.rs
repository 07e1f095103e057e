use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use log::{warn, LevelFilter};
use mortgage::chart::render_chart;
use mortgage::export::export_schedule;
use mortgage::input::{LoanForm, RefinanceForm};
use mortgage::{calculate, CalculationResult};
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use std::process::ExitCode;

/// Fixed-rate mortgage payment, amortization schedule and refinance comparison.
#[derive(Parser, Debug)]
#[command(name = "mortgage", version, about)]
struct Cli {
    /// Loan principal
    #[arg(long)]
    principal: String,

    /// Annual interest rate in percent
    #[arg(long, value_name = "PERCENT")]
    rate: String,

    /// Loan term in whole years
    #[arg(long)]
    years: String,

    /// Annual property tax
    #[arg(long, value_name = "ANNUAL")]
    property_tax: String,

    /// Annual home insurance
    #[arg(long, value_name = "ANNUAL")]
    insurance: String,

    /// Pay interest only; the balance never amortizes
    #[arg(long)]
    interest_only: bool,

    /// Compare against a refinance offer
    #[arg(long)]
    refinance: bool,

    /// Balance of the refinance offer
    #[arg(long, requires = "refinance", required_if_eq("refinance", "true"))]
    refinance_balance: Option<String>,

    /// Annual rate of the refinance offer in percent
    #[arg(
        long,
        value_name = "PERCENT",
        requires = "refinance",
        required_if_eq("refinance", "true")
    )]
    refinance_rate: Option<String>,

    /// Term of the refinance offer in whole years
    #[arg(long, requires = "refinance", required_if_eq("refinance", "true"))]
    refinance_years: Option<String>,

    /// Years left on the current loan; defaults to its full term
    #[arg(long, requires = "refinance")]
    remaining_years: Option<String>,

    /// Print the full amortization schedule
    #[arg(long)]
    schedule: bool,

    /// Save the amortization schedule as CSV
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Save the balance and payment chart as an image (.png, .jpg, .bmp)
    #[arg(long, value_name = "PATH")]
    chart: Option<PathBuf>,

    /// Date of the first payment, used to date the schedule
    #[arg(long, value_name = "YYYY-MM-DD")]
    first_payment: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn form(&self) -> LoanForm {
        let refinance = self.refinance.then(|| RefinanceForm {
            balance: self.refinance_balance.clone().unwrap_or_default(),
            interest_rate: self.refinance_rate.clone().unwrap_or_default(),
            num_years: self.refinance_years.clone().unwrap_or_default(),
            remaining_years: self.remaining_years.clone(),
        });

        LoanForm {
            principal: self.principal.clone(),
            interest_rate: self.rate.clone(),
            num_years: self.years.clone(),
            property_tax: self.property_tax.clone(),
            home_insurance: self.insurance.clone(),
            interest_only: self.interest_only,
            refinance,
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = try_run(&cli) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn try_run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(cli.log_level()).init()?;

    let request = cli.form().validate()?;
    let result = calculate(&request);

    println!("{}", result);
    if let Some(first) = cli.first_payment {
        match result.schedule.payoff_date(first) {
            Some(payoff) => println!("Payoff Date: {}", payoff),
            None => warn!("no payoff date for a first payment on {}", first),
        }
    }

    if cli.schedule {
        show_amortization(&result, cli.first_payment);
    }

    if let Some(path) = &cli.csv {
        export_schedule(path, &result.schedule)?;
        println!("Amortization schedule saved to {}", path.display());
    }

    if let Some(path) = &cli.chart {
        render_chart(path, &result.schedule)?;
        println!("Chart saved to {}", path.display());
    }
    Ok(())
}

fn show_amortization(result: &CalculationResult, first_payment: Option<NaiveDate>) {
    println!();
    match first_payment {
        Some(first) => {
            for (entry, date) in result.schedule.payment_dates(first) {
                println!("{}: {}", date, entry);
            }
        }
        None => {
            for entry in &result.schedule {
                println!("{}", entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use log::LevelFilter;
    use mortgage::{AmortizationSchedule, CalculationResult, LoanTerms};

    const BASE: [&str; 11] = [
        "mortgage",
        "--principal",
        "200000",
        "--rate",
        "6",
        "--years",
        "30",
        "--property-tax",
        "3600",
        "--insurance",
        "1200",
    ];

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(BASE.iter().chain(extra))
    }

    // verifies that results can move across threads
    fn is_normal<T: Sized + Send + Sync + Unpin>() {}

    #[test]
    fn normal_types() {
        is_normal::<LoanTerms>();
        is_normal::<AmortizationSchedule>();
        is_normal::<CalculationResult>();
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn refinance_fields_require_toggle() {
        assert!(parse(&["--refinance-rate", "4"]).is_err());
        assert!(parse(&["--remaining-years", "20"]).is_err());
        assert!(parse(&["--refinance"]).is_err());
    }

    #[test]
    fn refinance_form_follows_toggle() {
        let cli = parse(&[]).unwrap();
        assert!(cli.form().refinance.is_none());

        let cli = parse(&[
            "--refinance",
            "--refinance-balance",
            "200000",
            "--refinance-rate",
            "4",
            "--refinance-years",
            "30",
        ])
        .unwrap();
        let request = cli.form().validate().unwrap();
        assert!(request.refinance.is_some());
    }

    #[test]
    fn verbosity() {
        assert_eq!(parse(&[]).unwrap().log_level(), LevelFilter::Warn);
        assert_eq!(parse(&["-vv"]).unwrap().log_level(), LevelFilter::Debug);
        assert_eq!(parse(&["-vvvv"]).unwrap().log_level(), LevelFilter::Trace);
    }

    #[test]
    fn output_paths() {
        let cli = parse(&["--csv", "schedule.csv", "--chart", "chart.png"]).unwrap();
        assert_eq!(cli.csv.unwrap().to_str(), Some("schedule.csv"));
        assert_eq!(cli.chart.unwrap().to_str(), Some("chart.png"));
        assert!(parse(&["--chart"]).is_err());
    }

    #[test]
    fn first_payment_is_a_date() {
        assert!(parse(&["--first-payment", "2024-02-01"]).is_ok());
        assert!(parse(&["--first-payment", "next month"]).is_err());
    }
}
