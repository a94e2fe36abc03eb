use super::endpoints::PreparedRequest;
use crate::error::IsRetryable;
use backon::BackoffBuilder;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt ceiling and backoff schedule for a single model.
///
/// Delays grow as `initial_delay * factor^n` with no jitter and no cap; the
/// schedule yields `max_attempts - 1` delays, one between each pair of attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    initial_delay: Duration,
    factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(7, Duration::from_millis(600), 1.8)
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one attempt.
    pub fn new(max_attempts: usize, initial_delay: Duration, factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            factor,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl BackoffBuilder for RetryPolicy {
    type Backoff = GrowthBackoff;

    fn build(self) -> Self::Backoff {
        GrowthBackoff {
            next_delay_ms: self.initial_delay.as_secs_f64() * 1000.0,
            factor: self.factor,
            remaining: self.max_attempts - 1,
        }
    }
}

/// Multiplicative backoff iterator.
///
/// The running delay is kept unrounded so growth never drifts; each yielded
/// value is rounded to whole milliseconds.
#[derive(Debug, Clone)]
pub struct GrowthBackoff {
    next_delay_ms: f64,
    factor: f64,
    remaining: usize,
}

impl Iterator for GrowthBackoff {
    type Item = Duration;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let delay = Duration::from_millis(self.next_delay_ms.round() as u64);
        self.next_delay_ms *= self.factor;
        Some(delay)
    }
}

impl IsRetryable for StatusCode {
    fn is_retryable(&self) -> bool {
        matches!(
            *self,
            StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        )
    }
}

/// Fully-read upstream response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl IsRetryable for RawResponse {
    fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }
}

#[derive(Debug)]
enum RetryState {
    Attempting { attempt: usize },
    Backoff { attempt: usize, delay: Duration },
    Exhausted(RawResponse),
    Success(RawResponse),
}

/// Send `request` until a non-retryable status arrives or attempts run out.
///
/// Status outcomes never fail: an exhausted retryable status is returned as-is.
/// Transport errors are swallowed while a further attempt remains and
/// propagated on the final attempt.
pub async fn send_with_retry(
    client: &reqwest::Client,
    request: &PreparedRequest,
    policy: RetryPolicy,
) -> Result<RawResponse, reqwest::Error> {
    let max_attempts = policy.max_attempts();
    let mut backoff = policy.build();
    let mut state = RetryState::Attempting { attempt: 1 };

    loop {
        state = match state {
            RetryState::Attempting { attempt } => match request.send_once(client).await {
                Ok(resp) if !resp.is_retryable() => RetryState::Success(resp),
                Ok(resp) => match backoff.next() {
                    Some(delay) => {
                        warn!(
                            model = %request.model,
                            attempt,
                            max_attempts,
                            status = %resp.status,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "[Upstream] Retryable status, backing off"
                        );
                        RetryState::Backoff { attempt, delay }
                    }
                    None => RetryState::Exhausted(resp),
                },
                Err(err) => match backoff.next() {
                    Some(delay) => {
                        warn!(
                            model = %request.model,
                            attempt,
                            max_attempts,
                            error = %err,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            "[Upstream] Transport error, backing off"
                        );
                        RetryState::Backoff { attempt, delay }
                    }
                    None => {
                        warn!(
                            model = %request.model,
                            attempt,
                            error = %err,
                            "[Upstream] Transport error on final attempt"
                        );
                        return Err(err);
                    }
                },
            },
            RetryState::Backoff { attempt, delay } => {
                tokio::time::sleep(delay).await;
                RetryState::Attempting {
                    attempt: attempt + 1,
                }
            }
            RetryState::Exhausted(resp) => {
                warn!(
                    model = %request.model,
                    attempts = max_attempts,
                    status = %resp.status,
                    "[Upstream] Retries exhausted"
                );
                return Ok(resp);
            }
            RetryState::Success(resp) => {
                debug!(
                    model = %request.model,
                    status = %resp.status,
                    "[Upstream] Attempt completed"
                );
                return Ok(resp);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_grows_by_factor_from_600ms() {
        let delays: Vec<u64> = RetryPolicy::default()
            .build()
            .map(|d| u64::try_from(d.as_millis()).expect("delay fits in u64"))
            .collect();

        assert_eq!(delays.len(), 6);
        assert_eq!(delays[..3], [600_u64, 1080, 1944]);
        for (i, delay) in delays.iter().enumerate() {
            let expected = 600.0 * 1.8_f64.powi(i as i32);
            assert!(
                (*delay as f64 - expected).abs() <= 0.5,
                "delay #{i} = {delay}ms, expected ~{expected}ms"
            );
        }
    }

    #[test]
    fn single_attempt_policy_has_no_delays() {
        let policy = RetryPolicy::new(1, Duration::from_millis(600), 1.8);
        assert_eq!(policy.build().count(), 0);
    }

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 7);
        assert_eq!(policy.initial_delay(), Duration::from_millis(600));
        assert!((policy.factor() - 1.8).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10), 2.0);
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn growth_is_unbounded() {
        let last = RetryPolicy::new(20, Duration::from_millis(600), 1.8)
            .build()
            .last()
            .expect("non-empty schedule");
        assert!(last > Duration::from_secs(3600));
    }

    #[test]
    fn retryable_status_set() {
        for code in [429, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(status.is_retryable(), "{code} should be retryable");
        }
        for code in [200, 400, 401, 403, 404, 501] {
            let status = StatusCode::from_u16(code).expect("valid status");
            assert!(!status.is_retryable(), "{code} should not be retryable");
        }
    }
}
