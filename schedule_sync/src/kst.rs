//! Seoul-local time helpers.
//!
//! The portal, its consumers, and the archive layout all live in Korean
//! local time. Korea observes no DST, so converting through the IANA zone
//! and pinning the fixed offset is unambiguous year-round.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Asia::Seoul;

/// Current time in Seoul as a fixed-offset datetime.
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&Seoul).fixed_offset()
}

/// Archive directory stamp for a cycle started at `t`.
///
/// Second granularity, so back-to-back cycles land in distinct immutable
/// archive directories.
pub fn cycle_stamp(t: DateTime<FixedOffset>) -> String {
    t.format("%Y%m%d_%H%M%S").to_string()
}
