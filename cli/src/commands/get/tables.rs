use anyhow::{Context, Result};
use structopt::StructOpt;
use tablebook_client::{Client, RestaurantId};

use crate::printer::Printer;

#[derive(Debug, StructOpt)]
pub struct GetTablesArgs {
    #[structopt(short = "r", long = "restaurant", default_value = "1")]
    /// The restaurant whose tables to list
    restaurant: RestaurantId,

    #[structopt(long = "available")]
    /// Only list tables that are currently available
    available: bool,
}

pub fn get(client: &Client, args: &GetTablesArgs, printer: &Printer) -> Result<()> {
    let GetTablesArgs {
        restaurant,
        available,
    } = args;
    let mut tables = client
        .get_tables(*restaurant)
        .context("Operation to list tables has failed.")?;
    if *available {
        tables.retain(|table| table.is_available());
    }
    tables.sort_unstable_by_key(|table| table.table_id);
    printer.print_resources(&tables)
}
