//! Contact file import and export
//!
//! Parsers turn uploaded CSV / vCard text into [`NewContact`] rows; the
//! exporter writes contacts and guest lists back as CSV.

pub mod csv;
pub mod vcf;
pub mod export;

use crate::models::contact::NewContact;

pub use self::csv::parse_csv;
pub use self::vcf::parse_vcf;
pub use export::{contacts_to_csv, inscriptions_to_csv};

/// Outcome of parsing an uploaded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedContacts {
    /// Records seen, valid or not
    pub total: usize,
    pub contacts: Vec<NewContact>,
    pub invalid: usize,
}

impl ParsedContacts {
    fn push(&mut self, name: Option<String>, email: Option<String>, phone: Option<String>) {
        self.total += 1;
        let email = email.map(|e| e.trim().to_lowercase()).unwrap_or_default();
        if crate::utils::helpers::is_valid_email(&email) {
            self.contacts.push(NewContact {
                name: crate::utils::helpers::non_empty(name),
                email,
                phone: crate::utils::helpers::non_empty(phone),
            });
        } else {
            self.invalid += 1;
        }
    }
}
