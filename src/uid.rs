//! Fresh DICOM Unique Identifier generation.
//!
//! UIDs are minted under a configurable OID root, with a device-specific
//! salt and a monotonic counter guaranteeing each call produces a distinct
//! value even when called repeatedly within the same microsecond, or from
//! more than one process on the same host.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_UID_LEN: usize = 64;

/// The widely used example-OID prefix, free for anyone to mint UIDs under
/// per the DICOM standard and ITU-T X.667.
pub const DEFAULT_ROOT: &str = "2.25";

/// Generates fresh, process-unique DICOM UIDs rooted at a fixed OID prefix.
///
/// Each generated UID has the form
/// `{root}.{device_salt}.{epoch_micros}.{counter}`. If this would exceed the
/// 64-character UID length limit, the counter segment (the only segment
/// with no fixed width) is shortened to fit; the root/salt/timestamp prefix
/// is never truncated into.
#[derive(Debug)]
pub struct UidGenerator {
    root: String,
    device_salt: u32,
    counter: AtomicU64,
}

impl UidGenerator {
    /// Build a generator rooted at `root` (e.g. an organization's assigned
    /// OID prefix).
    pub fn new(root: impl Into<String>) -> Self {
        UidGenerator {
            root: root.into(),
            device_salt: device_salt(),
            counter: AtomicU64::new(0),
        }
    }

    /// The process-wide shared generator, rooted at [`DEFAULT_ROOT`].
    pub fn shared() -> &'static UidGenerator {
        static SHARED: Lazy<UidGenerator> = Lazy::new(|| UidGenerator::new(DEFAULT_ROOT));
        &SHARED
    }

    /// Mint a fresh UID.
    pub fn generate(&self) -> String {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or(0);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);

        let prefix = format!("{}.{}.{}.", self.root, self.device_salt, micros);
        let mut counter = n.to_string();

        if prefix.len() + counter.len() > MAX_UID_LEN {
            let budget = MAX_UID_LEN.saturating_sub(prefix.len());
            if budget == 0 {
                // The root/salt/timestamp prefix alone already reaches the
                // limit (reachable with a long custom root); there is no
                // room left for even a single counter digit.
                let mut uid = prefix;
                uid.truncate(MAX_UID_LEN);
                return uid;
            }
            counter.truncate(budget);
        }

        format!("{prefix}{counter}")
    }

    /// Mint a fresh Study Instance UID.
    pub fn generate_study_instance_uid(&self) -> String {
        self.generate()
    }

    /// Mint a fresh Series Instance UID.
    pub fn generate_series_instance_uid(&self) -> String {
        self.generate()
    }

    /// Mint a fresh SOP Instance UID.
    pub fn generate_sop_instance_uid(&self) -> String {
        self.generate()
    }
}

/// A per-process stand-in for a device identifier: distinct across
/// processes and hosts in practice, with no external I/O required.
fn device_salt() -> u32 {
    std::process::id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uids_are_unique() {
        let gen = UidGenerator::new("1.2.3");
        let a = gen.generate_study_instance_uid();
        let b = gen.generate_study_instance_uid();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_uids_have_four_dot_separated_segments_after_the_root() {
        let gen = UidGenerator::new("1.2.3");
        let uid = gen.generate();
        let rest = uid.strip_prefix("1.2.3.").unwrap();
        let segments: Vec<_> = rest.split('.').collect();
        assert_eq!(segments.len(), 3, "expected device_salt.epoch_micros.counter, got {rest}");
    }

    #[test]
    fn generated_uids_respect_the_length_limit() {
        let gen = UidGenerator::new("1".repeat(40));
        assert!(gen.generate().len() <= MAX_UID_LEN);
    }

    #[test]
    fn length_limit_trims_the_counter_not_the_prefix() {
        let gen = UidGenerator::new("1".repeat(40));
        let uid = gen.generate();
        assert!(uid.starts_with(&"1".repeat(40)), "root prefix must survive truncation");
    }

    #[test]
    fn shared_generator_is_rooted_at_default() {
        assert!(UidGenerator::shared().generate().starts_with(DEFAULT_ROOT));
    }
}
