//! CSV export of contacts and guest lists

use crate::models::contact::Contact;
use crate::models::inscription::Inscription;
use crate::utils::helpers::format_timestamp;

/// Quote a field when it holds a separator, a quote or a line break
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// `name,email,phone`
pub fn contacts_to_csv(contacts: &[Contact]) -> String {
    let mut out = String::new();
    write_row(&mut out, &["name", "email", "phone"]);
    for contact in contacts {
        write_row(&mut out, &[
            contact.name.as_deref().unwrap_or_default(),
            &contact.email,
            contact.phone.as_deref().unwrap_or_default(),
        ]);
    }
    out
}

/// Guest list in registration order
pub fn inscriptions_to_csv(inscriptions: &[Inscription]) -> String {
    let mut out = String::new();
    write_row(&mut out, &["name", "email", "phone", "party_size", "status", "visible", "message", "registered_at"]);
    for inscription in inscriptions {
        write_row(&mut out, &[
            &inscription.name,
            &inscription.email,
            inscription.phone.as_deref().unwrap_or_default(),
            &inscription.party_size.to_string(),
            &inscription.status.to_string(),
            if inscription.is_visible { "yes" } else { "no" },
            inscription.message.as_deref().unwrap_or_default(),
            &format_timestamp(inscription.created_at),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::contact::ContactSource;

    fn contact(name: Option<&str>, email: &str) -> Contact {
        Contact {
            id: 1,
            organisateur_id: 1,
            name: name.map(str::to_string),
            email: email.to_string(),
            phone: None,
            source: ContactSource::Manual,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_contacts_export_quotes_fields() {
        let csv = contacts_to_csv(&[
            contact(Some("Dupont, Jean"), "jean@example.com"),
            contact(Some("Le \"Chef\""), "chef@example.com"),
            contact(None, "anon@example.com"),
        ]);

        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "name,email,phone");
        assert_eq!(lines[1], "\"Dupont, Jean\",jean@example.com,");
        assert_eq!(lines[2], "\"Le \"\"Chef\"\"\",chef@example.com,");
        assert_eq!(lines[3], ",anon@example.com,");
    }

    #[test]
    fn test_export_reads_back_through_import() {
        let csv = contacts_to_csv(&[contact(Some("Dupont, Jean"), "jean@example.com")]);
        let parsed = crate::import::parse_csv(&csv);

        assert_eq!(parsed.contacts.len(), 1);
        assert_eq!(parsed.contacts[0].name.as_deref(), Some("Dupont, Jean"));
    }
}
