//! Contact share token service
//!
//! An organizer hands out an expiring, use-limited token; other organizers
//! preview it for free and spend one use to copy the owner's contact book.

use chrono::{DateTime, Duration, Utc};
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::contact::{ContactSource, ImportReport, NewContact};
use crate::models::share_token::{CreateShareTokenRequest, SharePreview, ShareToken, ShareTokenView};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::{generate_random_string, mask_email, public_link};
use crate::utils::logging::{log_contact_import, log_share_token_use};

/// Share token service
#[derive(Clone)]
pub struct SharingService {
    db: DatabaseService,
    settings: Settings,
}

/// Expiry instant for a requested window, bounded by configuration
pub fn expiry_for(request: &CreateShareTokenRequest, default_hours: i64, max_hours: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let hours = request.expires_in_hours.unwrap_or(default_hours);
    if !(1..=max_hours).contains(&hours) {
        return Err(ConcertError::InvalidInput(format!("Expiry must be between 1 and {} hours", max_hours)));
    }
    if let Some(max_uses) = request.max_uses {
        if max_uses < 1 {
            return Err(ConcertError::InvalidInput("max_uses must be at least 1".to_string()));
        }
    }
    Ok(now + Duration::hours(hours))
}

impl SharingService {
    pub fn new(db: DatabaseService, settings: Settings) -> Self {
        Self { db, settings }
    }

    fn view(&self, token: ShareToken) -> Result<ShareTokenView> {
        let share_url = public_link(&self.settings.server.public_base_url, &format!("share/{}", token.token))?.to_string();
        Ok(ShareTokenView { token, share_url })
    }

    pub async fn create(&self, organisateur_id: i64, request: CreateShareTokenRequest) -> Result<ShareTokenView> {
        let sharing = &self.settings.sharing;
        let expires_at = expiry_for(&request, sharing.default_expiry_hours, sharing.max_expiry_hours, Utc::now())?;
        let token = generate_random_string(sharing.token_length);

        let share_token = self
            .db
            .share_tokens
            .create(organisateur_id, &token, expires_at, request.max_uses)
            .await?;
        log_share_token_use(share_token.id, organisateur_id, "created", true, None);

        self.view(share_token)
    }

    pub async fn list(&self, organisateur_id: i64) -> Result<Vec<ShareTokenView>> {
        self.db
            .share_tokens
            .list_by_organisateur(organisateur_id)
            .await?
            .into_iter()
            .map(|t| self.view(t))
            .collect()
    }

    pub async fn revoke(&self, organisateur_id: i64, token_id: i64) -> Result<ShareTokenView> {
        let share_token = self
            .db
            .share_tokens
            .revoke(organisateur_id, token_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Share token", token_id))?;
        log_share_token_use(share_token.id, organisateur_id, "revoked", true, None);

        self.view(share_token)
    }

    /// Unknown tokens are 404; known but unusable ones are 410 with the reason
    async fn find_usable(&self, token: &str, action: &str) -> Result<ShareToken> {
        let share_token = self
            .db
            .share_tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| ConcertError::not_found("Share token", "<redacted>"))?;

        if let Err(refusal) = share_token.check_usable(Utc::now()) {
            log_share_token_use(share_token.id, share_token.organisateur_id, action, false, Some(&refusal.to_string()));
            return Err(ConcertError::Gone(refusal.to_string()));
        }
        Ok(share_token)
    }

    /// Masked view of the owner's contacts; does not spend a use
    pub async fn preview(&self, token: &str) -> Result<SharePreview> {
        let share_token = self.find_usable(token, "preview").await?;

        let owner = self
            .db
            .organisateurs
            .find_by_id(share_token.organisateur_id)
            .await?
            .ok_or_else(|| ConcertError::not_found("Organisateur", share_token.organisateur_id))?;
        let emails = self.db.share_tokens.owner_emails(owner.id).await?;

        Ok(SharePreview {
            owner_name: owner.name,
            contact_count: emails.len() as i64,
            masked_emails: emails.iter().map(|e| mask_email(e)).collect(),
            expires_at: share_token.expires_at,
            remaining_uses: share_token.remaining_uses(),
        })
    }

    /// Spend one use and copy the owner's contacts into the caller's book
    pub async fn import(&self, token: &str, organisateur_id: i64) -> Result<ImportReport> {
        let share_token = self.find_usable(token, "import").await?;
        if share_token.organisateur_id == organisateur_id {
            return Err(ConcertError::InvalidInput("Cannot import your own share token".to_string()));
        }

        let contacts: Vec<NewContact> = self
            .db
            .contacts
            .list_by_organisateur(share_token.organisateur_id)
            .await?
            .into_iter()
            .map(|c| NewContact { name: c.name, email: c.email, phone: c.phone })
            .collect();

        let mut tx = self.db.share_tokens.begin().await?;
        if self.db.share_tokens.consume(&mut tx, share_token.id, Utc::now()).await?.is_none() {
            // Lost a race for the last use, or expired in between.
            log_share_token_use(share_token.id, share_token.organisateur_id, "import", false, Some("consumed concurrently"));
            return Err(ConcertError::Gone("token no longer usable".to_string()));
        }
        let imported = self
            .db
            .contacts
            .insert_many(&mut tx, organisateur_id, &contacts, ContactSource::Share)
            .await?;
        tx.commit().await?;

        let report = ImportReport {
            total: contacts.len(),
            imported,
            skipped_invalid: 0,
            skipped_duplicate: contacts.len() - imported,
        };
        log_share_token_use(share_token.id, share_token.organisateur_id, "import", true, None);
        log_contact_import(organisateur_id, ContactSource::Share.as_str(), report.imported, report.skipped_duplicate);

        Ok(report)
    }
}
