//! Panel identifier and timestamp allocation.

use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 9;

/// Source of panel identities.
///
/// Implementations must return ids that are unique for the lifetime of a
/// session. Timestamps are metadata only.
pub trait IdAllocator: Send + Sync {
    fn new_id(&self) -> String;
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock + random allocator producing `panel-<unix millis>-<9 base36 chars>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockIdAllocator;

impl IdAllocator for ClockIdAllocator {
    fn new_id(&self) -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("panel-{}-{}", Utc::now().timestamp_millis(), suffix)
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
