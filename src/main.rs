//! RateSense CLI
//!
//! Command-line interface for amortization, card payoff, refinance and rate
//! stress calculations

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use ratesense::config::{parse_deltas, CalculatorDefaults};
use ratesense::export::export_schedule;
use ratesense::inputs::{
    ArmRequest, CardPaymentMode, CompareRequest, CreditCardRequest, LoanRequest, RefinanceRequest,
    ScenarioRequest, StepShockRequest,
};
use ratesense::loan::load_loans;
use ratesense::rates::IndexSource;
use ratesense::{CalculationOutput, CalculationRequest, LoanKind, Schedule, ScenarioRunner};

#[derive(Parser)]
#[command(
    name = "ratesense",
    version,
    about = "Loan simulation: amortization, card payoff, refinance break-even and rate stress"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Write the month-by-month schedule to this CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Schedule rows printed to the console
    #[arg(long, global = true, default_value_t = 24)]
    rows: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Amortize a loan at a flat rate
    Amortize(LoanArgs),
    /// Pay off a credit card balance
    CreditCard(CardArgs),
    /// Refinance break-even and net savings
    Refinance(RefinanceArgs),
    /// Stress a loan with periodic rate bumps
    StepShock(StepShockArgs),
    /// Stress a loan with adjustable-rate resets
    Arm(ArmArgs),
    /// Payment and interest at several rate deltas
    Scenarios(ScenarioArgs),
    /// Compare two loans
    Compare(CompareArgs),
    /// Amortize every loan in a CSV file
    Batch(BatchArgs),
}

#[derive(Args)]
struct LoanArgs {
    #[arg(long)]
    principal: f64,
    /// Annual rate in percent
    #[arg(long)]
    apr: f64,
    #[arg(long)]
    term_months: Option<u32>,
    #[arg(long)]
    term_years: Option<u32>,
    /// Extra principal paid every month
    #[arg(long, default_value_t = 0.0)]
    extra: f64,
    /// mortgage, auto, student or personal (sets the default term)
    #[arg(long, value_parser = parse_kind)]
    kind: Option<LoanKind>,
}

impl LoanArgs {
    fn request(&self) -> LoanRequest {
        LoanRequest {
            principal: self.principal,
            apr_percent: self.apr,
            term_months: self.term_months,
            term_years: self.term_years,
            extra_monthly: self.extra,
            kind: self.kind,
        }
    }
}

#[derive(Args)]
struct CardArgs {
    #[arg(long)]
    balance: f64,
    #[arg(long)]
    apr: f64,
    /// Fixed monthly payment; minimum payments are used when omitted
    #[arg(long)]
    payment: Option<f64>,
}

#[derive(Args)]
struct RefinanceArgs {
    #[arg(long)]
    principal: f64,
    /// Current annual rate in percent
    #[arg(long)]
    current_apr: f64,
    /// Refinanced annual rate in percent
    #[arg(long)]
    new_apr: f64,
    #[arg(long)]
    term_years: Option<u32>,
    #[arg(long)]
    closing_costs: Option<f64>,
    /// Years the loan is kept after refinancing
    #[arg(long)]
    keep_years: Option<u32>,
}

#[derive(Args)]
struct StepShockArgs {
    #[command(flatten)]
    loan: LoanArgs,
    /// Percentage points added at each bump
    #[arg(long)]
    step: f64,
    #[arg(long, default_value_t = 12)]
    every_months: u32,
    #[arg(long, default_value_t = 60)]
    duration_months: u32,
    #[arg(long)]
    cap_apr: Option<f64>,
    /// Stop the simulation after this many months
    #[arg(long)]
    months: Option<u32>,
}

#[derive(Args)]
struct ArmArgs {
    #[command(flatten)]
    loan: LoanArgs,
    #[arg(long, default_value_t = 5)]
    fixed_years: u32,
    #[arg(long, default_value_t = 12)]
    adjust_every_months: u32,
    /// Constant index value used at every reset
    #[arg(long)]
    index: Option<f64>,
    /// Comma-separated index values, one per reset
    #[arg(long)]
    index_values: Option<String>,
    /// Latest observed index value from a feed
    #[arg(long)]
    index_observed: Option<f64>,
    /// Index value used when no other source applies
    #[arg(long, default_value_t = 4.0)]
    index_fallback: f64,
    #[arg(long, default_value_t = 2.75)]
    margin: f64,
    #[arg(long)]
    periodic_cap: Option<f64>,
    #[arg(long)]
    lifetime_cap: Option<f64>,
    #[arg(long)]
    floor: Option<f64>,
    /// Stop the simulation after this many months
    #[arg(long)]
    months: Option<u32>,
}

impl ArmArgs {
    fn index_source(&self) -> Result<IndexSource> {
        if let Some(raw) = &self.index_values {
            let values = parse_deltas(raw).context("index values must be comma-separated numbers")?;
            return Ok(IndexSource::Manual {
                values,
                fallback: self.index_fallback,
            });
        }
        Ok(match self.index {
            Some(value) => IndexSource::Constant { value },
            None => IndexSource::Feed {
                observed: self.index_observed,
                fallback: self.index_fallback,
            },
        })
    }
}

#[derive(Args)]
struct ScenarioArgs {
    #[command(flatten)]
    loan: LoanArgs,
    /// Comma-separated rate deltas in percentage points
    #[arg(long)]
    deltas: Option<String>,
}

#[derive(Args)]
struct CompareArgs {
    #[arg(long)]
    a_principal: f64,
    #[arg(long)]
    a_apr: f64,
    #[arg(long)]
    a_term_years: Option<u32>,
    #[arg(long)]
    b_principal: f64,
    #[arg(long)]
    b_apr: f64,
    #[arg(long)]
    b_term_years: Option<u32>,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV with LoanId,Principal,AprPercent,TermMonths[,ExtraMonthly]
    path: PathBuf,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    execution_time_ms: u64,
    #[serde(flatten)]
    output: &'a CalculationOutput,
}

fn parse_kind(raw: &str) -> std::result::Result<LoanKind, String> {
    LoanKind::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = LoanKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown loan kind '{}' (expected one of {})", raw, known.join(", "))
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let defaults = CalculatorDefaults::from_env();
    let start = Instant::now();

    let output = match &cli.command {
        Commands::Batch(args) => {
            let loans = load_loans(&args.path)
                .with_context(|| format!("failed to load loans from {}", args.path.display()))?;
            log::info!("loaded {} loans from {}", loans.len(), args.path.display());
            CalculationOutput::Batch {
                loans: ScenarioRunner::new().run_batch(&loans),
            }
        }
        command => build_request(command)?
            .evaluate(&defaults)
            .context("invalid input")?,
    };

    let elapsed = start.elapsed();

    if let Some(path) = &cli.csv {
        let schedule = output
            .schedule()
            .context("this calculation has no schedule to export")?;
        export_schedule(schedule, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if cli.json {
        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: elapsed.as_millis() as u64,
            output: &output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_output(&output, cli.rows);
        println!("\nCompleted in {:.2?}", elapsed);
    }

    Ok(())
}

fn build_request(command: &Commands) -> Result<CalculationRequest> {
    let request = match command {
        Commands::Amortize(args) => CalculationRequest::Amortization(args.request()),
        Commands::CreditCard(args) => CalculationRequest::CreditCard(CreditCardRequest {
            balance: args.balance,
            apr_percent: args.apr,
            mode: if args.payment.is_some() {
                CardPaymentMode::Fixed
            } else {
                CardPaymentMode::Minimum
            },
            fixed_payment: args.payment,
        }),
        Commands::Refinance(args) => CalculationRequest::Refinance(RefinanceRequest {
            principal: args.principal,
            base_apr: args.current_apr,
            new_apr: args.new_apr,
            term_months: None,
            term_years: args.term_years,
            extra_monthly: 0.0,
            closing_costs: args.closing_costs,
            keep_months: None,
            keep_years: args.keep_years,
        }),
        Commands::StepShock(args) => CalculationRequest::StepShock(StepShockRequest {
            loan: args.loan.request(),
            step_size: args.step,
            every_months: args.every_months,
            duration_months: args.duration_months,
            cap_apr: args.cap_apr,
            simulation_cap_months: args.months,
        }),
        Commands::Arm(args) => CalculationRequest::Arm(ArmRequest {
            loan: args.loan.request(),
            fixed_years: args.fixed_years,
            adjust_every_months: args.adjust_every_months,
            index: args.index_source()?,
            margin: args.margin,
            periodic_cap: args.periodic_cap,
            lifetime_cap_above_start: args.lifetime_cap,
            floor_apr: args.floor,
            simulation_cap_months: args.months,
        }),
        Commands::Scenarios(args) => {
            let deltas = match &args.deltas {
                Some(raw) => Some(parse_deltas(raw).context("deltas must be comma-separated numbers")?),
                None => None,
            };
            CalculationRequest::Scenarios(ScenarioRequest {
                loan: args.loan.request(),
                deltas,
            })
        }
        Commands::Compare(args) => CalculationRequest::Compare(CompareRequest {
            loan_a: simple_loan(args.a_principal, args.a_apr, args.a_term_years),
            loan_b: simple_loan(args.b_principal, args.b_apr, args.b_term_years),
        }),
        Commands::Batch(_) => anyhow::bail!("batch runs are loaded from a file"),
    };
    Ok(request)
}

fn simple_loan(principal: f64, apr_percent: f64, term_years: Option<u32>) -> LoanRequest {
    LoanRequest {
        principal,
        apr_percent,
        term_months: None,
        term_years,
        extra_monthly: 0.0,
        kind: None,
    }
}

fn print_output(output: &CalculationOutput, rows: usize) {
    match output {
        CalculationOutput::Amortization(schedule) => {
            print_schedule(schedule, rows);
            print_totals(schedule);
        }
        CalculationOutput::CreditCard(outcome) => {
            print_schedule(&outcome.schedule, rows);
            println!("\nCredit Card Payoff:");
            println!("  Months: {}", outcome.months_to_payoff);
            println!("  Total Interest: ${:.2}", outcome.total_interest);
            println!("  Total Paid: ${:.2}", outcome.total_paid);
            println!("  Stop Reason: {:?}", outcome.stop_reason);
            if !outcome.paid_off {
                println!("  Remaining Balance: ${:.2}", outcome.ending_balance);
            }
        }
        CalculationOutput::Refinance(result) => {
            println!("Refinance Analysis ({} month horizon):", result.horizon_months);
            println!("  Current Payment: ${:.2}", result.baseline.base_payment);
            println!("  New Payment: ${:.2}", result.refinanced.base_payment);
            println!("  Monthly Savings: ${:.2}", result.monthly_savings);
            match result.breakeven_month {
                Some(month) => println!("  Break-even Month: {}", month),
                None => println!("  Break-even Month: never"),
            }
            println!("  Interest Saved: ${:.2}", result.interest_saved);
            println!("  Net Savings: ${:.2}", result.net_savings);
        }
        CalculationOutput::StepShock(outcome) | CalculationOutput::Arm(outcome) => {
            print_schedule(&outcome.schedule, rows);
            println!("\nStress Result:");
            println!("  Starting Payment: ${:.2}", outcome.schedule.base_payment());
            println!(
                "  Worst Payment: ${:.2} (month {})",
                outcome.worst_payment, outcome.worst_month
            );
            println!("  Peak Rate: {:.3}% (month {})", outcome.peak_rate, outcome.peak_month);
            println!("  Payment Increase: {:.1}%", outcome.payment_increase * 100.0);
            println!("  Risk: {}", outcome.risk_label.as_str());
        }
        CalculationOutput::Scenarios { rows } => {
            println!(
                "{:>8} {:>8} {:>12} {:>14} {:>10} {:>14}",
                "Delta", "APR", "Payment", "Interest", "PmtChg", "IntChg"
            );
            println!("{}", "-".repeat(72));
            for row in rows {
                println!(
                    "{:>+8.2} {:>8.3} {:>12.2} {:>14.2} {:>+10.2} {:>+14.2}",
                    row.delta,
                    row.apr_percent,
                    row.monthly_payment,
                    row.total_interest,
                    row.payment_change,
                    row.interest_change
                );
            }
        }
        CalculationOutput::Compare(comparison) => {
            println!("{:>10} {:>12} {:>14} {:>14} {:>8}", "Loan", "Payment", "Interest", "Total", "Months");
            println!("{}", "-".repeat(62));
            for (name, summary) in [("A", &comparison.loan_a), ("B", &comparison.loan_b)] {
                println!(
                    "{:>10} {:>12.2} {:>14.2} {:>14.2} {:>8}",
                    name, summary.base_payment, summary.total_interest, summary.total_paid, summary.month_count
                );
            }
            println!("\nCheaper overall: {:?}", comparison.cheaper);
        }
        CalculationOutput::Batch { loans } => {
            println!(
                "{:>12} {:>14} {:>8} {:>12} {:>14} {:>8}",
                "LoanId", "Principal", "APR", "Payment", "Interest", "Months"
            );
            println!("{}", "-".repeat(74));
            for loan in loans {
                println!(
                    "{:>12} {:>14.2} {:>8.3} {:>12.2} {:>14.2} {:>8}",
                    loan.loan_id,
                    loan.summary.principal,
                    loan.apr_percent,
                    loan.summary.base_payment,
                    loan.summary.total_interest,
                    loan.summary.month_count
                );
            }
            let total_interest: f64 = loans.iter().map(|l| l.summary.total_interest).sum();
            println!("\n{} loans, total interest ${:.2}", loans.len(), total_interest);
        }
    }
}

fn print_schedule(schedule: &Schedule, rows: usize) {
    println!(
        "{:>5} {:>8} {:>14} {:>12} {:>12} {:>12} {:>14}",
        "Month", "APR", "Start Bal", "Payment", "Interest", "Principal", "End Bal"
    );
    println!("{}", "-".repeat(93));

    for row in schedule.rows().iter().take(rows) {
        println!(
            "{:>5} {:>8.3} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.month,
            row.apr_percent,
            row.starting_balance,
            row.payment,
            row.interest,
            row.principal,
            row.ending_balance,
        );
    }

    if schedule.rows().len() > rows {
        println!("... ({} more months)", schedule.rows().len() - rows);
    }
}

fn print_totals(schedule: &Schedule) {
    let summary = schedule.summary();
    println!("\nSummary:");
    println!("  Principal: ${:.2}", summary.principal);
    println!("  Monthly Payment: ${:.2}", summary.base_payment);
    println!("  Months: {}", summary.month_count);
    println!("  Total Interest: ${:.2}", summary.total_interest);
    println!("  Total Paid: ${:.2}", summary.total_paid);
    if !summary.paid_off {
        println!("  Remaining Balance: ${:.2}", summary.ending_balance);
    }
}
