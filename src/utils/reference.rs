use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates `pay-{millis}-{sequence}-{random}`.
///
/// `millis` never goes backwards within the process even if the wall clock
/// does, and the sequence is unique per call, so two references issued in
/// the same millisecond still differ.
pub fn generate_external_reference() -> String {
    let now = Utc::now().timestamp_millis();
    let millis = LAST_MILLIS.fetch_max(now, Ordering::Relaxed).max(now);
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let random: u16 = rand::thread_rng().gen_range(0x1000..=0xffff);

    format!("pay-{}-{}-{:04x}", millis, sequence, random)
}
