use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub u64);

impl FromStr for Id {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self> {
        string
            .trim()
            .parse()
            .map(Id)
            .map_err(|_| Error::BadTableIdentifier {
                identifier: string.into(),
            })
    }
}

impl Display for Id {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct RestaurantId(pub u64);

impl FromStr for RestaurantId {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self> {
        string
            .trim()
            .parse()
            .map(RestaurantId)
            .map_err(|_| Error::BadRestaurantIdentifier {
                identifier: string.into(),
            })
    }
}

impl Default for RestaurantId {
    fn default() -> Self {
        RestaurantId(1)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
}

impl Display for Shape {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
        })
    }
}

/// A table on the venue's floor plan, positioned in plan units.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Table {
    pub table_id: Id,
    pub x: f64,
    pub y: f64,
    pub shape: Shape,
    pub seats_number: u32,

    // Older gateway deployments do not report a status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Table {
    pub fn is_available(&self) -> bool {
        self.status
            .as_deref()
            .map_or(true, |status| status == "available")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GetTablesResponse {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GetTablesQuery {
    pub restaurant_id: RestaurantId,
}
