use chrono::{DateTime, Utc};
use time::OffsetDateTime;

pub fn offset_to_chrono(at: OffsetDateTime) -> Option<DateTime<Utc>> {
    let ms = at.unix_timestamp_nanos() / 1_000_000;
    DateTime::from_timestamp_millis(i64::try_from(ms).ok()?)
}

/// ClickHouse `DateTime64(3)` literal for query bounds.
pub fn clickhouse_millis_literal(at: DateTime<Utc>) -> String {
    format!(
        "fromUnixTimestamp64Milli(toInt64({}), 'UTC')",
        at.timestamp_millis()
    )
}
