use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    interval::{wire_to_display, DisplayRange},
};

/// A free segment of a table as reported by the gateway. Either side may be
/// null, meaning the table is free from the beginning of time or forever.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FreeTime {
    pub free_from: Option<String>,
    pub free_until: Option<String>,
}

impl FreeTime {
    pub fn to_display(&self, id: impl Into<String>) -> Result<DisplayRange> {
        wire_to_display(id, self.free_from.as_deref(), self.free_until.as_deref())
    }
}

/// Convert a gateway listing into display ranges, numbering them in order.
pub fn to_display_ranges(free_times: &[FreeTime]) -> Result<Vec<DisplayRange>> {
    free_times
        .iter()
        .enumerate()
        .map(|(index, free_time)| free_time.to_display(index.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_to_display_ranges() {
        let free_times: Vec<FreeTime> = serde_json::from_str(
            r#"[
                {"free_from": null, "free_until": "2024-06-01T12:00:00Z"},
                {"free_from": "2024-06-01T14:00:00Z", "free_until": null}
            ]"#,
        )
        .unwrap();

        let ranges = to_display_ranges(&free_times).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].id, "0");
        assert_eq!(ranges[0].start_date, None);
        assert_eq!(ranges[0].to_string(), "open - 2024-06-01 12:00");
        assert_eq!(ranges[1].id, "1");
        assert_eq!(ranges[1].to_string(), "2024-06-01 14:00 - open");
    }

    #[test]
    fn test_invalid_free_time() {
        let free_times = vec![FreeTime {
            free_from: Some("yesterday".to_owned()),
            free_until: None,
        }];
        assert!(matches!(
            to_display_ranges(&free_times),
            Err(Error::InvalidTimestamp { .. })
        ));
    }
}
