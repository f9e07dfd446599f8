pub mod fingerprint;

pub use fingerprint::{OutputFingerprint, content_hash, json_hash};
