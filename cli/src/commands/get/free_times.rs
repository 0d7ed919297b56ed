use anyhow::{Context, Result};
use log::info;
use structopt::StructOpt;
use tablebook_client::{Client, TableId};

use crate::printer::Printer;

#[derive(Debug, StructOpt)]
pub struct GetFreeTimesArgs {
    #[structopt(name = "table-id")]
    /// The table whose free times to list
    table_id: TableId,
}

pub fn get(client: &Client, args: &GetFreeTimesArgs, printer: &Printer) -> Result<()> {
    let GetFreeTimesArgs { table_id } = args;
    let ranges = client
        .get_free_ranges(*table_id)
        .with_context(|| format!("Operation to list free times of table {table_id} has failed."))?;
    if ranges.is_empty() {
        info!("Table {} is entirely free.", table_id);
        return Ok(());
    }
    printer.print_resources(&ranges)
}
