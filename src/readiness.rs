//! Fixed-delay gate standing in for server-side indexing completion.

use serde::Serialize;
use time::{Duration, OffsetDateTime};

/// Outcome of a readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// Whether questions may be sent.
    pub ready: bool,
    /// Human-readable explanation shown above the question box.
    pub message: String,
}

/// Decide whether enough time has passed since the last upload.
///
/// Without a recorded upload the gate never opens. Otherwise it opens once `now - upload_time`
/// reaches `delay`; before that the message reports the whole seconds left.
pub fn check_readiness(
    upload_time: Option<OffsetDateTime>,
    now: OffsetDateTime,
    delay: Duration,
) -> Readiness {
    let Some(uploaded_at) = upload_time else {
        return Readiness {
            ready: false,
            message: "No files have been uploaded yet.".to_string(),
        };
    };

    let elapsed = now - uploaded_at;
    if elapsed < delay {
        // A clock that moved backwards counts as no time elapsed.
        let elapsed_secs = elapsed.whole_seconds().max(0);
        let remaining = delay.whole_seconds() - elapsed_secs;
        return Readiness {
            ready: false,
            message: format!(
                "Files still processing. Please wait about {remaining} seconds before querying."
            ),
        };
    }

    Readiness {
        ready: true,
        message: "Files should be ready for querying.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::seconds(30);

    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp")
    }

    #[test]
    fn never_ready_without_upload() {
        for offset in [0, 29, 30, 10_000] {
            let readiness = check_readiness(None, t0() + Duration::seconds(offset), DELAY);
            assert!(!readiness.ready);
            assert_eq!(readiness.message, "No files have been uploaded yet.");
        }
    }

    #[test]
    fn closed_before_delay_open_at_and_after() {
        let uploaded = Some(t0());
        for offset_ms in [0, 1, 15_000, 29_999] {
            let now = t0() + Duration::milliseconds(offset_ms);
            assert!(!check_readiness(uploaded, now, DELAY).ready, "{offset_ms}ms");
        }
        for offset_ms in [30_000, 30_001, 600_000] {
            let now = t0() + Duration::milliseconds(offset_ms);
            assert!(check_readiness(uploaded, now, DELAY).ready, "{offset_ms}ms");
        }
    }

    #[test]
    fn remaining_seconds_use_whole_elapsed_seconds() {
        let uploaded = Some(t0());
        let readiness = check_readiness(uploaded, t0() + Duration::milliseconds(12_700), DELAY);
        assert_eq!(
            readiness.message,
            "Files still processing. Please wait about 18 seconds before querying."
        );

        let readiness = check_readiness(uploaded, t0(), DELAY);
        assert!(readiness.message.contains("about 30 seconds"));
    }

    #[test]
    fn clock_skew_keeps_gate_closed() {
        let readiness = check_readiness(Some(t0()), t0() - Duration::seconds(5), DELAY);
        assert!(!readiness.ready);
        assert!(readiness.message.contains("about 30 seconds"));
    }
}
