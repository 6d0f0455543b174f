//! CSV contact import
//!
//! Accepts exports from common address books and spreadsheets: comma,
//! semicolon or tab separated, RFC 4180 quoting, French or English headers.

use crate::utils::helpers::fold_label;
use super::ParsedContacts;

const EMAIL_HEADERS: &[&str] = &["email", "e-mail", "mail", "courriel", "adresse email", "adresse e-mail", "e-mail 1 - value", "email address"];
const NAME_HEADERS: &[&str] = &["name", "nom", "full name", "display name", "nom complet"];
const FIRST_NAME_HEADERS: &[&str] = &["prenom", "first name", "given name"];
const LAST_NAME_HEADERS: &[&str] = &["last name", "family name", "nom de famille"];
const PHONE_HEADERS: &[&str] = &["phone", "telephone", "tel", "mobile", "portable", "phone 1 - value", "phone number"];

#[derive(Debug, Default)]
struct Columns {
    email: Option<usize>,
    name: Option<usize>,
    first_name: Option<usize>,
    last_name: Option<usize>,
    phone: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Self {
        let folded: Vec<String> = header.iter().map(|h| fold_label(h)).collect();
        let find = |candidates: &[&str]| folded.iter().position(|h| candidates.contains(&h.as_str()));

        Self {
            email: find(EMAIL_HEADERS),
            name: find(NAME_HEADERS),
            first_name: find(FIRST_NAME_HEADERS),
            last_name: find(LAST_NAME_HEADERS),
            phone: find(PHONE_HEADERS),
        }
    }

    fn name(&self, record: &[String]) -> Option<String> {
        if let Some(full) = cell(record, self.name).filter(|v| !v.is_empty()) {
            return Some(full);
        }
        let parts: Vec<String> = [cell(record, self.first_name), cell(record, self.last_name)]
            .into_iter()
            .flatten()
            .filter(|v| !v.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn cell(record: &[String], index: Option<usize>) -> Option<String> {
    index.and_then(|i| record.get(i)).map(|v| v.trim().to_string())
}

/// Pick the separator that occurs most often on the first line, outside quotes
pub fn detect_delimiter(text: &str) -> char {
    let first_line = text.lines().next().unwrap_or_default();
    let mut in_quotes = false;
    let mut counts = [(',', 0usize), (';', 0), ('\t', 0)];

    for c in first_line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(entry) = counts.iter_mut().find(|(d, _)| *d == c) {
                entry.1 += 1;
            }
        }
    }

    counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(d, _)| *d)
        .unwrap_or(',')
}

/// Split CSV text into records, honouring quoted fields with embedded
/// separators, doubled quotes and line breaks
pub fn read_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            other => field.push(other),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records.retain(|r| r.iter().any(|f| !f.trim().is_empty()));
    records
}

/// Parse a CSV contact export.
///
/// The first non-blank record is the header. Without a recognised email
/// column every data row counts as invalid.
pub fn parse_csv(text: &str) -> ParsedContacts {
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(text);
    let mut records = read_records(text, delimiter).into_iter();
    let mut parsed = ParsedContacts::default();

    let Some(header) = records.next() else {
        return parsed;
    };
    let columns = Columns::from_header(&header);

    for record in records {
        let email = columns.email.and(cell(&record, columns.email));
        parsed.push(columns.name(&record), email, cell(&record, columns.phone));
    }

    parsed
}
