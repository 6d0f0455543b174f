//! Contact share token model

use std::fmt;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareToken {
    pub id: i64,
    pub organisateur_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// `None` means unlimited uses
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

/// Why a share token can no longer be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareTokenRefusal {
    Revoked,
    Expired,
    Exhausted,
}

impl fmt::Display for ShareTokenRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShareTokenRefusal::Revoked => "token revoked",
            ShareTokenRefusal::Expired => "token expired",
            ShareTokenRefusal::Exhausted => "token has no uses left",
        };
        f.write_str(s)
    }
}

impl ShareToken {
    /// Usable while not revoked, `now < expires_at` and uses remain
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), ShareTokenRefusal> {
        if self.revoked {
            return Err(ShareTokenRefusal::Revoked);
        }
        if now >= self.expires_at {
            return Err(ShareTokenRefusal::Expired);
        }
        if let Some(max) = self.max_uses {
            if self.used_count >= max {
                return Err(ShareTokenRefusal::Exhausted);
            }
        }
        Ok(())
    }

    pub fn remaining_uses(&self) -> Option<i32> {
        self.max_uses.map(|max| (max - self.used_count).max(0))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateShareTokenRequest {
    pub expires_in_hours: Option<i64>,
    pub max_uses: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTokenView {
    #[serde(flatten)]
    pub token: ShareToken,
    pub share_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePreview {
    pub owner_name: String,
    pub contact_count: i64,
    pub masked_emails: Vec<String>,
    pub expires_at: DateTime<Utc>,
    pub remaining_uses: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(max_uses: Option<i32>, used_count: i32, expires_in: Duration, revoked: bool) -> ShareToken {
        let now = Utc::now();
        ShareToken {
            id: 1,
            organisateur_id: 1,
            token: "abc".to_string(),
            expires_at: now + expires_in,
            max_uses,
            used_count,
            revoked,
            created_at: now,
        }
    }

    #[test]
    fn test_usable_token() {
        let t = token(Some(3), 2, Duration::hours(1), false);
        assert_eq!(t.check_usable(Utc::now()), Ok(()));
        assert_eq!(t.remaining_uses(), Some(1));
    }

    #[test]
    fn test_exhausted_token_rejected() {
        let t = token(Some(3), 3, Duration::hours(1), false);
        assert_eq!(t.check_usable(Utc::now()), Err(ShareTokenRefusal::Exhausted));
    }

    #[test]
    fn test_expired_token_rejected_even_with_uses_left() {
        let t = token(Some(10), 0, Duration::hours(-1), false);
        assert_eq!(t.check_usable(Utc::now()), Err(ShareTokenRefusal::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let t = token(None, 0, Duration::hours(1), false);
        assert_eq!(t.check_usable(t.expires_at), Err(ShareTokenRefusal::Expired));
    }

    #[test]
    fn test_revoked_token_rejected() {
        let t = token(None, 0, Duration::hours(1), true);
        assert_eq!(t.check_usable(Utc::now()), Err(ShareTokenRefusal::Revoked));
        assert_eq!(t.remaining_uses(), None);
    }
}
