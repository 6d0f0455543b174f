//! Contact repository implementation

use sqlx::{PgConnection, PgPool};
use crate::models::contact::{Contact, ContactSource, NewContact};
use crate::utils::errors::ConcertError;

const CONTACT_COLUMNS: &str = "id, organisateur_id, name, email, phone, source, created_at";

#[derive(Debug, Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Contact book of an organizer, alphabetical by email
    pub async fn list_by_organisateur(&self, organisateur_id: i64) -> Result<Vec<Contact>, ConcertError> {
        let contacts = sqlx::query_as::<_, Contact>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE organisateur_id = $1 ORDER BY LOWER(email) ASC"
        ))
        .bind(organisateur_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(contacts)
    }

    /// Insert one contact; `None` when the email is already in the book
    pub async fn create(&self, organisateur_id: i64, contact: NewContact, source: ContactSource) -> Result<Option<Contact>, ConcertError> {
        let contact = sqlx::query_as::<_, Contact>(&format!(
            r#"
            INSERT INTO contacts (organisateur_id, name, email, phone, source)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (organisateur_id, LOWER(email)) DO NOTHING
            RETURNING {CONTACT_COLUMNS}
            "#
        ))
        .bind(organisateur_id)
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.phone)
        .bind(source)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    /// Insert many contacts, skipping emails already present.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn insert_many(
        &self,
        conn: &mut PgConnection,
        organisateur_id: i64,
        contacts: &[NewContact],
        source: ContactSource,
    ) -> Result<usize, ConcertError> {
        let mut inserted = 0;
        for contact in contacts {
            let result = sqlx::query(
                r#"
                INSERT INTO contacts (organisateur_id, name, email, phone, source)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (organisateur_id, LOWER(email)) DO NOTHING
                "#
            )
            .bind(organisateur_id)
            .bind(&contact.name)
            .bind(&contact.email)
            .bind(&contact.phone)
            .bind(source)
            .execute(&mut *conn)
            .await?;

            inserted += result.rows_affected() as usize;
        }

        Ok(inserted)
    }

    /// Delete a contact owned by the organizer; false when nothing matched
    pub async fn delete(&self, organisateur_id: i64, id: i64) -> Result<bool, ConcertError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND organisateur_id = $2")
            .bind(id)
            .bind(organisateur_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
