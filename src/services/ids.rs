//! Listing identifier generation.

use uuid::Uuid;

/// Source of fresh listing identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs from the OS CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::IdGenerator;

    /// Deterministic ids: `listing-1`, `listing-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.0.fetch_add(1, Ordering::Relaxed) + 1;
            format!("listing-{n}")
        }
    }
}
