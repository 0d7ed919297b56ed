use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resources::table::Id as TableId;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewReservation {
    pub reservation_time_from: DateTime<Utc>,
    pub reservation_time_to: Option<DateTime<Utc>>,
    pub table_id: TableId,
}

/// A reservation as echoed back by the gateway. Only the fields the client
/// sent are known; anything else the gateway adds is kept in `extra`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Reservation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<TableId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_time_from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation_time_to: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
