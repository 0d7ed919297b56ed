mod free_times;
mod tables;

use anyhow::Result;
use structopt::StructOpt;
use tablebook_client::Client;

use self::{free_times::GetFreeTimesArgs, tables::GetTablesArgs};
use crate::printer::Printer;

#[derive(Debug, StructOpt)]
pub enum GetArgs {
    #[structopt(name = "tables")]
    /// List the tables of a restaurant
    Tables(GetTablesArgs),

    #[structopt(name = "free-times")]
    /// List the free times of a table
    FreeTimes(GetFreeTimesArgs),
}

pub fn run(args: &GetArgs, client: &Client, printer: &Printer) -> Result<()> {
    match args {
        GetArgs::Tables(args) => tables::get(client, args, printer),
        GetArgs::FreeTimes(args) => free_times::get(client, args, printer),
    }
}
