//! Contact book service

use crate::database::DatabaseService;
use crate::import::{self, ParsedContacts};
use crate::models::contact::{Contact, ContactSource, ImportReport, NewContact};
use crate::utils::errors::{ConcertError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_phone, non_empty};
use crate::utils::logging::log_contact_import;

/// Contact service for organizers
#[derive(Clone)]
pub struct ContactService {
    db: DatabaseService,
}

impl ContactService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn list(&self, organisateur_id: i64) -> Result<Vec<Contact>> {
        self.db.contacts.list_by_organisateur(organisateur_id).await
    }

    /// Add one contact by hand; an email already in the book is a conflict
    pub async fn create(&self, organisateur_id: i64, contact: NewContact) -> Result<Contact> {
        let email = contact.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ConcertError::InvalidInput(format!("Invalid email address: {}", contact.email)));
        }
        let phone = non_empty(contact.phone);
        if let Some(phone) = &phone {
            if !is_valid_phone(phone) {
                return Err(ConcertError::InvalidInput(format!("Invalid phone number: {}", phone)));
            }
        }

        let new_contact = NewContact { name: non_empty(contact.name), email, phone };
        self.db
            .contacts
            .create(organisateur_id, new_contact, ContactSource::Manual)
            .await?
            .ok_or_else(|| ConcertError::Conflict("This email is already in your contacts".to_string()))
    }

    pub async fn delete(&self, organisateur_id: i64, contact_id: i64) -> Result<()> {
        if !self.db.contacts.delete(organisateur_id, contact_id).await? {
            return Err(ConcertError::not_found("Contact", contact_id));
        }
        Ok(())
    }

    pub async fn import_csv(&self, organisateur_id: i64, text: &str) -> Result<ImportReport> {
        self.store(organisateur_id, import::parse_csv(text), ContactSource::Csv).await
    }

    pub async fn import_vcf(&self, organisateur_id: i64, text: &str) -> Result<ImportReport> {
        self.store(organisateur_id, import::parse_vcf(text), ContactSource::Vcf).await
    }

    async fn store(&self, organisateur_id: i64, parsed: ParsedContacts, source: ContactSource) -> Result<ImportReport> {
        let imported = if parsed.contacts.is_empty() {
            0
        } else {
            let mut tx = self.db.pool().begin().await?;
            let imported = self
                .db
                .contacts
                .insert_many(&mut tx, organisateur_id, &parsed.contacts, source)
                .await?;
            tx.commit().await?;
            imported
        };

        let report = ImportReport {
            total: parsed.total,
            imported,
            skipped_invalid: parsed.invalid,
            skipped_duplicate: parsed.contacts.len() - imported,
        };
        log_contact_import(
            organisateur_id,
            source.as_str(),
            report.imported,
            report.skipped_invalid + report.skipped_duplicate,
        );

        Ok(report)
    }

    pub async fn export_csv(&self, organisateur_id: i64) -> Result<String> {
        let contacts = self.list(organisateur_id).await?;
        Ok(import::contacts_to_csv(&contacts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> ContactService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .expect("lazy pool");
        ContactService::new(DatabaseService::new(pool))
    }

    #[tokio::test]
    async fn test_csv_without_email_column_touches_nothing() {
        // No valid rows means no transaction, so the unreachable pool is never used.
        let report = service().import_csv(1, "nom;ville\nJean;Lyon\n").await.unwrap();
        assert_eq!(report, ImportReport { total: 1, imported: 0, skipped_invalid: 1, skipped_duplicate: 0 });
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_email() {
        let result = service()
            .create(1, NewContact { name: None, email: "nope".to_string(), phone: None })
            .await;
        assert!(matches!(result, Err(ConcertError::InvalidInput(_))));
    }
}
