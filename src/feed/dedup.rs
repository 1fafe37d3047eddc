//! Duplicate detection for fetched artifacts
//!
//! Artifacts are identified by a server-assigned string. Identifiers carry no
//! ordering, so the only question asked is whether the candidate equals the
//! most recently accepted identifier.

/// Decides whether a freshly fetched artifact is new
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupGate;

impl DedupGate {
    /// Returns `false` when `candidate_id` equals `last_accepted_id`
    pub fn is_new(candidate_id: &str, last_accepted_id: &str) -> bool {
        candidate_id != last_accepted_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_id_is_duplicate() {
        assert!(!DedupGate::is_new("seg-1", "seg-1"));
    }

    #[test]
    fn test_changed_id_is_new() {
        assert!(DedupGate::is_new("seg-2", "seg-1"));
        assert!(DedupGate::is_new("seg-1", ""));
    }

    #[test]
    fn test_empty_candidate_distinct_from_last_is_new() {
        assert!(DedupGate::is_new("", "seg-1"));
        assert!(!DedupGate::is_new("", ""));
    }

    #[test]
    fn test_sequence_accepts_only_changes() {
        let ids = ["a", "a", "b", "b", "b", "a", "c", "c"];
        let mut last = String::new();
        let mut accepted = Vec::new();
        for id in ids {
            if DedupGate::is_new(id, &last) {
                last = id.to_string();
                accepted.push(id);
            }
        }
        assert_eq!(accepted, vec!["a", "b", "a", "c"]);
    }
}
