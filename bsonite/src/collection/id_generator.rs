use chrono::Utc;
use log::debug;
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};

const COUNTER_MASK: u32 = 0x00FF_FFFF;

/// Generates the 12 bytes of an [ObjectId](crate::collection::ObjectId).
///
/// Layout: 4-byte big-endian seconds since the epoch, 5 bytes chosen once per
/// process, 3-byte big-endian counter that starts at a random value and wraps.
pub struct ObjectIdGenerator {
    process_unique: [u8; 5],
    counter: AtomicU32,
}

impl ObjectIdGenerator {
    pub fn new() -> Self {
        let process_unique: [u8; 5] = OsRng.gen();
        let seed = OsRng.gen::<u32>() & COUNTER_MASK;
        debug!("Initialized object id generator with counter seed {}", seed);

        ObjectIdGenerator {
            process_unique,
            counter: AtomicU32::new(seed),
        }
    }

    pub fn next_bytes(&self) -> [u8; 12] {
        let timestamp = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        self.bytes_at(timestamp)
    }

    fn bytes_at(&self, timestamp: u32) -> [u8; 12] {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process_unique);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        bytes
    }
}

impl Default for ObjectIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
