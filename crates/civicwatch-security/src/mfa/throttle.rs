//! Per-account cooldown between verification code sends.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::types::Clock;

/// Serializes code sends per account so rapid repeat requests cannot
/// trigger a flood of messages.
///
/// The check and the write happen under one map-entry lock, so two
/// concurrent requests for the same account can never both pass. Distinct
/// accounts live in different shard slots and do not contend. Entries are
/// overwritten on reissue and never reaped; the map lives for the process
/// lifetime.
#[derive(Debug)]
pub struct ResendThrottle {
    /// Account ID to the send timestamp in unix milliseconds.
    last_sent: DashMap<i64, i64>,
    /// Minimum interval between sends in milliseconds.
    cooldown_ms: i64,
    /// Clock used for elapsed-time checks.
    clock: Arc<dyn Clock>,
}

/// Proof that a send slot was claimed for one account.
///
/// Dropping the permit keeps the claim (the cooldown stands). Passing it
/// to [`ResendThrottle::rollback`] releases the claim, restoring whatever
/// state the account had before, so a failed send does not consume the
/// account's next attempt.
#[derive(Debug)]
#[must_use = "dropping the permit commits the cooldown; roll it back if the send failed"]
pub struct ThrottlePermit {
    subject_id: i64,
    previous: Option<i64>,
}

impl ResendThrottle {
    /// Create a throttle with the given cooldown.
    pub fn new(cooldown_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            last_sent: DashMap::new(),
            cooldown_ms: (cooldown_seconds as i64) * 1000,
            clock,
        }
    }

    /// Claim the send slot for an account, or fail with `ThrottledRequest`
    /// if its cooldown has not elapsed.
    pub fn try_acquire(&self, subject_id: i64) -> AppResult<ThrottlePermit> {
        let now_ms = self.clock.now().timestamp_millis();

        match self.last_sent.entry(subject_id) {
            Entry::Occupied(mut entry) => {
                let previous = *entry.get();
                let elapsed_ms = now_ms - previous;
                if elapsed_ms < self.cooldown_ms {
                    let retry_in_secs = (self.cooldown_ms - elapsed_ms + 999) / 1000;
                    return Err(AppError::throttled(format!(
                        "A verification code was sent recently. Try again in {retry_in_secs}s"
                    )));
                }
                entry.insert(now_ms);
                Ok(ThrottlePermit {
                    subject_id,
                    previous: Some(previous),
                })
            }
            Entry::Vacant(entry) => {
                entry.insert(now_ms);
                Ok(ThrottlePermit {
                    subject_id,
                    previous: None,
                })
            }
        }
    }

    /// Release a claimed slot, restoring the account's prior state.
    pub fn rollback(&self, permit: ThrottlePermit) {
        match permit.previous {
            Some(previous) => {
                self.last_sent.insert(permit.subject_id, previous);
            }
            None => {
                self.last_sent.remove(&permit.subject_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicwatch_core::error::ErrorKind;
    use civicwatch_core::types::ManualClock;

    fn throttle() -> (ResendThrottle, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        (ResendThrottle::new(60, clock.clone() as _), clock)
    }

    #[test]
    fn test_second_request_within_cooldown_is_throttled() {
        let (throttle, _clock) = throttle();
        let _permit = throttle.try_acquire(1).unwrap();
        let err = throttle.try_acquire(1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ThrottledRequest);
    }

    #[test]
    fn test_request_after_cooldown_passes() {
        let (throttle, clock) = throttle();
        let _permit = throttle.try_acquire(1).unwrap();
        clock.advance_secs(59);
        assert!(throttle.try_acquire(1).is_err());
        clock.advance_secs(1);
        assert!(throttle.try_acquire(1).is_ok());
    }

    #[test]
    fn test_accounts_do_not_share_cooldowns() {
        let (throttle, _clock) = throttle();
        let _a = throttle.try_acquire(1).unwrap();
        let _b = throttle.try_acquire(2).unwrap();
        assert!(throttle.try_acquire(1).is_err());
        assert!(throttle.try_acquire(2).is_err());
    }

    #[test]
    fn test_rollback_of_first_request_clears_the_slot() {
        let (throttle, _clock) = throttle();
        let permit = throttle.try_acquire(1).unwrap();
        throttle.rollback(permit);
        assert!(throttle.try_acquire(1).is_ok());
    }

    #[test]
    fn test_rollback_restores_previous_stamp() {
        let (throttle, clock) = throttle();
        let _first = throttle.try_acquire(1).unwrap();
        clock.advance_secs(120);
        let second = throttle.try_acquire(1).unwrap();
        throttle.rollback(second);
        // The first stamp is 120s old, past the 60s cooldown.
        assert!(throttle.try_acquire(1).is_ok());
    }

    #[test]
    fn test_throttled_message_carries_retry_hint() {
        let (throttle, clock) = throttle();
        let _permit = throttle.try_acquire(1).unwrap();
        clock.advance_secs(15);
        let err = throttle.try_acquire(1).unwrap_err();
        assert!(err.message.contains("45s"), "message: {}", err.message);
    }

    #[test]
    fn test_concurrent_requests_admit_exactly_one() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let throttle = Arc::new(ResendThrottle::new(60, clock as _));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let throttle = Arc::clone(&throttle);
            handles.push(std::thread::spawn(move || {
                throttle.try_acquire(7).is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.join().unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
