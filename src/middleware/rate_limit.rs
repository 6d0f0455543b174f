//! Rate limiting middleware
//!
//! Public write endpoints (guest registration, share previews) are limited
//! per client IP with a keyed GCRA limiter.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};
use crate::config::settings::RateLimitConfig;
use crate::utils::errors::ConcertError;

pub type IpRateLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// Build the per-IP limiter from settings
pub fn build_limiter(config: &RateLimitConfig) -> Arc<IpRateLimiter> {
    let per_minute = NonZeroU32::new(config.per_minute).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.burst).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute).allow_burst(burst)))
}

/// Forget clients whose quota has fully replenished
pub fn prune(limiter: &IpRateLimiter) {
    limiter.retain_recent();
    limiter.shrink_to_fit();
    debug!(tracked_clients = limiter.len(), "Pruned rate limiter state");
}

/// Prune the limiter on a fixed interval for the life of the process
pub fn spawn_pruning(limiter: Arc<IpRateLimiter>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            prune(&limiter);
        }
    })
}

/// Client address from the connection, unspecified when not served over a socket
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn limit_by_ip(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ConcertError> {
    let ip = client_ip(&request);
    if limiter.check_key(&ip).is_err() {
        warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        return Err(ConcertError::RateLimitExceeded);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_reject_per_ip() {
        let limiter = build_limiter(&RateLimitConfig { per_minute: 1, burst: 2 });
        let a = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok());
    }

    #[test]
    fn test_prune_forgets_replenished_clients_only() {
        let fast: IpRateLimiter = RateLimiter::keyed(Quota::with_period(Duration::from_millis(5)).unwrap());
        for last in 1..=20u8 {
            assert!(fast.check_key(&IpAddr::V4(Ipv4Addr::new(10, 0, 1, last))).is_ok());
        }
        assert_eq!(fast.len(), 20);
        std::thread::sleep(Duration::from_millis(50));
        prune(&fast);
        assert!(fast.is_empty());

        let slow = build_limiter(&RateLimitConfig { per_minute: 1, burst: 1 });
        assert!(slow.check_key(&IpAddr::V4(Ipv4Addr::new(10, 0, 2, 1))).is_ok());
        prune(&slow);
        assert_eq!(slow.len(), 1);
    }
}
