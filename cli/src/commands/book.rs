use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use structopt::StructOpt;
use tablebook_client::{Client, DisplayRange, Session, TableId};

use crate::printer::Printer;

#[derive(Debug, StructOpt)]
pub struct BookArgs {
    #[structopt(name = "table-id")]
    /// The table to book
    table_id: TableId,

    #[structopt(long = "from-date")]
    /// First day of the booking as YYYY-MM-DD. Defaults to today (UTC).
    from_date: Option<String>,

    #[structopt(long = "from-time", default_value = "10:00")]
    /// Start of the booking as HH:MM (UTC)
    from_time: String,

    #[structopt(long = "to-date")]
    /// Last day of the booking as YYYY-MM-DD. Defaults to the first day.
    to_date: Option<String>,

    #[structopt(long = "to-time", default_value = "11:00")]
    /// End of the booking as HH:MM (UTC)
    to_time: String,

    #[structopt(long = "open-ended")]
    /// Book without an end time. Overrides `--to-date` and `--to-time`.
    open_ended: bool,
}

pub fn run(args: &BookArgs, client: &Client, session: &mut Session, printer: &Printer) -> Result<()> {
    let requested = requested_range(args)?;
    let reservation = client
        .book_table(session, args.table_id, &requested)
        .with_context(|| format!("Operation to book table {} has failed.", args.table_id))?;
    info!("Booked table {} for {}.", args.table_id, requested);
    printer.print_resources(&[reservation])
}

fn requested_range(args: &BookArgs) -> Result<DisplayRange> {
    let BookArgs {
        from_date,
        from_time,
        to_date,
        to_time,
        open_ended,
        ..
    } = args;
    let from_date = from_date
        .clone()
        .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string());
    let (to_date, to_time) = if *open_ended {
        (None, None)
    } else {
        (
            Some(to_date.clone().unwrap_or_else(|| from_date.clone())),
            Some(to_time.as_str()),
        )
    };

    DisplayRange::parse(
        "requested",
        Some(from_date.as_str()),
        Some(from_time.as_str()),
        to_date.as_deref(),
        to_time,
    )
    .context("Invalid booking time.")
}
