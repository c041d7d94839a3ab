use aare_types::Snapshot;
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - ontology name
/// - constraint id
/// - each snapshot entry as `name=value` in name order (`name=null` when absent)
pub fn fingerprint_for_violation(
    ontology_name: &str,
    constraint_id: &str,
    snapshot: &Snapshot,
) -> String {
    let mut parts = vec![ontology_name.to_string(), constraint_id.to_string()];
    for (name, value) in snapshot {
        match value {
            Some(v) => parts.push(format!("{name}={v}")),
            None => parts.push(format!("{name}=null")),
        }
    }
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
