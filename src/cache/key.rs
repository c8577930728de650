//! Cache key fingerprints.
//!
//! Callers key entries by a namespace plus a fingerprint of the request
//! parameters, e.g. `analysis:startup:42:9f2c4e01a7b3d5c8`. Keeping the
//! namespace readable lets [`TtlCache::invalidate`](super::TtlCache::invalidate)
//! drop a whole family of entries by substring.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Build `"{namespace}:{fingerprint}"` from serializable parameters.
///
/// Parameters are rendered to canonical JSON first (object keys sorted), so
/// two values that serialize to the same JSON share a key regardless of field
/// or map insertion order. Fingerprints are stable for the life of the
/// process only, which is all an in-memory cache needs.
pub fn cache_key<P: Serialize + ?Sized>(namespace: &str, params: &P) -> serde_json::Result<String> {
    let canonical = serde_json::to_value(params)?.to_string();
    Ok(format!("{}:{}", namespace, fingerprint(&canonical)))
}

/// 16 hex digit fingerprint of a string.
pub fn fingerprint(input: &str) -> String {
    let mut hasher = DefaultHasher::new();
    input.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
