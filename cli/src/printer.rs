use colored::Colorize;
use prettytable::{cell, format, row, Row, Table as PrettyTable};
use serde::Serialize;
use tablebook_client::{interval, DisplayRange, Reservation, Table};

use anyhow::{anyhow, Context, Error, Result};
use std::{
    io::{self, Write},
    str::FromStr,
};

pub fn print_resources_as_json<Resource>(
    resources: impl IntoIterator<Item = Resource>,
    mut writer: impl Write,
) -> Result<()>
where
    Resource: Serialize,
{
    for resource in resources {
        serde_json::to_writer(&mut writer, &resource)
            .context("Could not serialise resource.")
            .and_then(|_| writeln!(writer).context("Failed to write JSON resource to writer."))?;
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self> {
        if string == "table" {
            Ok(OutputFormat::Table)
        } else if string == "json" {
            Ok(OutputFormat::Json)
        } else {
            Err(anyhow!("unknown output format: '{}'", string))
        }
    }
}

/// Represents a resource that is able to be displayed as a table.
///
/// The implementation must implement `to_table_headers` to return headers for the resource type,
/// and `to_table_row`, which should return a data row for the given resource instance.
pub trait DisplayTable {
    fn to_table_headers() -> Row;

    fn to_table_row(&self) -> Row;
}

impl DisplayTable for Table {
    fn to_table_headers() -> Row {
        row![bFg => "ID", "Seats", "Shape", "Position", "Status"]
    }

    fn to_table_row(&self) -> Row {
        row![
            self.table_id,
            self.seats_number,
            self.shape,
            format!("({}, {})", self.x, self.y),
            match &self.status {
                Some(status) if self.is_available() => status.green(),
                Some(status) => status.red(),
                None => "unknown".dimmed(),
            }
        ]
    }
}

impl DisplayTable for DisplayRange {
    fn to_table_headers() -> Row {
        row![bFg => "#", "From", "Until"]
    }

    fn to_table_row(&self) -> Row {
        let bound = |label: Option<String>| match label {
            Some(label) => label.normal(),
            None => interval::OPEN_LABEL.dimmed(),
        };
        row![self.id, bound(self.start_label()), bound(self.end_label())]
    }
}

impl DisplayTable for Reservation {
    fn to_table_headers() -> Row {
        row![bFg => "Table", "From (UTC)", "Until (UTC)"]
    }

    fn to_table_row(&self) -> Row {
        row![
            match &self.table_id {
                Some(table_id) => table_id.to_string().normal(),
                None => "unknown".dimmed(),
            },
            match &self.reservation_time_from {
                Some(time) => time.normal(),
                None => "unknown".dimmed(),
            },
            match &self.reservation_time_to {
                Some(time) => time.normal(),
                None => "open".dimmed(),
            }
        ]
    }
}

/// Helper trait to allow collection of resources to be converted into a table.
pub trait IntoTable {
    fn into_table(self) -> PrettyTable;
}

/// All iterators of resources can be converted into a table.
impl<'a, Iterable, Item: 'a> IntoTable for Iterable
where
    Iterable: IntoIterator<Item = &'a Item>,
    Item: DisplayTable,
{
    fn into_table(self) -> PrettyTable {
        let mut table = new_table();
        table.set_titles(Item::to_table_headers());
        for resource in self.into_iter() {
            table.add_row(resource.to_table_row());
        }
        table
    }
}

pub fn new_table() -> PrettyTable {
    let mut table = PrettyTable::new();
    let format = format::FormatBuilder::new()
        .column_separator(' ')
        .borders(' ')
        .separators(&[], format::LineSeparator::new('-', '+', '+', '+'))
        .padding(0, 1)
        .build();
    table.set_format(format);
    table
}

fn print_table<T: IntoTable>(resources: T) {
    let table = resources.into_table();
    table.printstd();
}

/// Print resources using the selected output format.
///
/// Resources passed to the printer must be able to be formatted using all supported
/// `OutputFormat`s.
#[derive(Default, Debug)]
pub struct Printer {
    output: OutputFormat,
}

impl Printer {
    pub fn new(output: OutputFormat) -> Self {
        Self { output }
    }

    pub fn print_resources<T, Resource>(&self, resources: T) -> Result<()>
    where
        T: IntoIterator<Item = Resource> + IntoTable,
        Resource: Serialize,
    {
        match self.output {
            OutputFormat::Table => print_table(resources),
            OutputFormat::Json => print_resources_as_json(resources, io::stdout().lock())?,
        };
        Ok(())
    }
}
