//! Range-header negotiation.
//!
//! Turns a raw `Range` header plus the object's total size into a concrete
//! inclusive byte interval, or a definitive rejection. Pure and synchronous;
//! all I/O lives in the orchestrating handler.

/// Outcome of negotiating a `Range` header against a known object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDecision {
    /// No `Range` header was sent; serve the full object.
    NoRange,
    /// A concrete inclusive interval within bounds.
    Satisfiable { start: u64, end: u64 },
    /// The request cannot be honored given the object's size.
    Unsatisfiable,
}

/// Validate an optional raw `Range` header value against `total_size`.
///
/// Accepts only the single-range `bytes=start-end` and suffix-open
/// `bytes=start-` forms. Multi-range requests (`bytes=0-1,5-9`) are not
/// supported and fall out as `Unsatisfiable` via the numeric parse.
///
/// A requested `end` past the last byte is rejected outright rather than
/// clamped to `total_size - 1`. RFC 9110 recommends clamping; rejection is
/// kept deliberately and the deviation is pinned down in the tests below.
pub fn decide(raw: Option<&str>, total_size: u64) -> RangeDecision {
    let Some(raw) = raw else {
        return RangeDecision::NoRange;
    };

    let Some(spec) = raw.strip_prefix("bytes=") else {
        return RangeDecision::Unsatisfiable;
    };

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeDecision::Unsatisfiable;
    };

    let Ok(start) = start_str.parse::<u64>() else {
        return RangeDecision::Unsatisfiable;
    };

    // Empty end means "until the last byte of the object".
    let end = if end_str.is_empty() {
        let Some(end) = total_size.checked_sub(1) else {
            // Zero-sized object: no byte exists to serve.
            return RangeDecision::Unsatisfiable;
        };
        end
    } else {
        match end_str.parse::<u64>() {
            Ok(end) => end,
            Err(_) => return RangeDecision::Unsatisfiable,
        }
    };

    if start > end || start >= total_size || end >= total_size {
        return RangeDecision::Unsatisfiable;
    }

    RangeDecision::Satisfiable { start, end }
}

#[cfg(test)]
mod tests {
    use super::{RangeDecision, decide};

    #[test]
    fn absent_header_means_full_object() {
        assert_eq!(decide(None, 500), RangeDecision::NoRange);
        assert_eq!(decide(None, 0), RangeDecision::NoRange);
    }

    #[test]
    fn bounded_range_within_object() {
        assert_eq!(
            decide(Some("bytes=0-499"), 500),
            RangeDecision::Satisfiable { start: 0, end: 499 }
        );
        assert_eq!(
            decide(Some("bytes=100-200"), 500),
            RangeDecision::Satisfiable {
                start: 100,
                end: 200
            }
        );
        assert_eq!(
            decide(Some("bytes=499-499"), 500),
            RangeDecision::Satisfiable {
                start: 499,
                end: 499
            }
        );
    }

    #[test]
    fn open_ended_range_runs_to_last_byte() {
        assert_eq!(
            decide(Some("bytes=100-"), 500),
            RangeDecision::Satisfiable {
                start: 100,
                end: 499
            }
        );
        assert_eq!(
            decide(Some("bytes=0-"), 1),
            RangeDecision::Satisfiable { start: 0, end: 0 }
        );
    }

    #[test]
    fn start_past_object_is_unsatisfiable() {
        assert_eq!(decide(Some("bytes=500-600"), 500), RangeDecision::Unsatisfiable);
        assert_eq!(decide(Some("bytes=500-"), 500), RangeDecision::Unsatisfiable);
    }

    // RFC 9110 would clamp end to total_size - 1 here; this gateway rejects
    // instead. If clamping semantics are ever adopted, this test pins the
    // behavior change.
    #[test]
    fn end_past_object_is_rejected_not_clamped() {
        assert_eq!(decide(Some("bytes=0-500"), 500), RangeDecision::Unsatisfiable);
        assert_eq!(decide(Some("bytes=100-9999"), 500), RangeDecision::Unsatisfiable);
    }

    #[test]
    fn inverted_range_is_unsatisfiable() {
        assert_eq!(decide(Some("bytes=200-100"), 500), RangeDecision::Unsatisfiable);
    }

    #[test]
    fn zero_sized_object_rejects_every_range() {
        assert_eq!(decide(Some("bytes=0-"), 0), RangeDecision::Unsatisfiable);
        assert_eq!(decide(Some("bytes=0-0"), 0), RangeDecision::Unsatisfiable);
        assert_eq!(decide(Some("bytes=100-200"), 0), RangeDecision::Unsatisfiable);
    }

    #[test]
    fn malformed_headers_never_panic() {
        for raw in [
            "bytes=abc-def",
            "bytes=-",
            "bytes=--",
            "bytes=10",
            "bytes=",
            "items=0-10",
            "bytes=0-10,20-30",
            "bytes= 0-10",
            "bytes=-50",
        ] {
            assert_eq!(decide(Some(raw), 500), RangeDecision::Unsatisfiable, "{raw}");
        }
    }
}
