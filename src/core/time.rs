use chrono::{DateTime, Utc};

pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("SL_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}

/// Unix seconds for persisted records (scan timestamps, completion marks).
pub fn unix_now() -> i64 {
    now_utc().timestamp()
}
