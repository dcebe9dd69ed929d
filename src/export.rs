//! CSV export of schedules
//!
//! Layout: `Month,Payment,Interest,Principal,Balance`, one row per month,
//! amounts to the cent, then a `Total` row.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::amortization::Schedule;
use crate::error::ExportError;

const HEADER: [&str; 5] = ["Month", "Payment", "Interest", "Principal", "Balance"];

/// Write `schedule` as CSV to any writer
pub fn write_schedule_csv<W: Write>(schedule: &Schedule, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for row in schedule.rows() {
        csv_writer.write_record([
            row.month.to_string(),
            cents(row.payment),
            cents(row.interest),
            cents(row.principal),
            cents(row.ending_balance),
        ])?;
    }

    let principal_paid: f64 = schedule.rows().iter().map(|r| r.principal).sum();
    csv_writer.write_record([
        "Total".to_string(),
        cents(schedule.total_paid()),
        cents(schedule.total_interest()),
        cents(principal_paid),
        cents(schedule.ending_balance()),
    ])?;

    csv_writer.flush()?;
    Ok(())
}

/// Write `schedule` as CSV to `path`
pub fn export_schedule<P: AsRef<Path>>(schedule: &Schedule, path: P) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;
    write_schedule_csv(schedule, file)?;
    log::info!(
        "wrote {} schedule rows to {}",
        schedule.month_count(),
        path.as_ref().display()
    );
    Ok(())
}

/// Schedule as a CSV string
pub fn schedule_to_csv_string(schedule: &Schedule) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_schedule_csv(schedule, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn cents(amount: f64) -> String {
    format!("{:.2}", amount)
}
