//! vCard contact import (2.1, 3.0 and 4.0)

use super::ParsedContacts;

/// Join folded lines: a line starting with a space or tab continues the previous one
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let continuation = line.strip_prefix(' ').or_else(|| line.strip_prefix('\t'));
        if let (Some(continuation), false) = (continuation, lines.is_empty()) {
            if let Some(previous) = lines.last_mut() {
                previous.push_str(continuation);
            }
        } else {
            lines.push(line.to_string());
        }
    }
    lines
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push(' '),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

/// Property name without parameters or group prefix (`item1.EMAIL;TYPE=home` → `EMAIL`)
fn property_name(key: &str) -> String {
    let name = key.split(';').next().unwrap_or_default();
    let name = name.rsplit('.').next().unwrap_or(name);
    name.trim().to_uppercase()
}

/// `N:Family;Given;Additional;Prefix;Suffix` → `Given Family`
fn structured_name(value: &str) -> Option<String> {
    let mut parts = value.split(';').map(unescape);
    let family = parts.next().unwrap_or_default();
    let given = parts.next().unwrap_or_default();
    let joined = [given, family]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

#[derive(Default)]
struct Card {
    formatted_name: Option<String>,
    structured_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

/// Parse one or more vCards; each card is one record
pub fn parse_vcf(text: &str) -> ParsedContacts {
    let mut parsed = ParsedContacts::default();
    let mut current: Option<Card> = None;

    for line in unfold(text.trim_start_matches('\u{feff}')) {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let name = property_name(key);

        match name.as_str() {
            "BEGIN" if value.trim().eq_ignore_ascii_case("VCARD") => current = Some(Card::default()),
            "END" if value.trim().eq_ignore_ascii_case("VCARD") => {
                if let Some(card) = current.take() {
                    parsed.push(card.formatted_name.or(card.structured_name), card.email, card.phone);
                }
            }
            _ => {
                let Some(card) = current.as_mut() else {
                    continue;
                };
                match name.as_str() {
                    "FN" if card.formatted_name.is_none() => {
                        card.formatted_name = Some(unescape(value)).filter(|v| !v.is_empty());
                    }
                    "N" if card.structured_name.is_none() => card.structured_name = structured_name(value),
                    "EMAIL" if card.email.is_none() => card.email = Some(unescape(value)),
                    "TEL" if card.phone.is_none() => {
                        let phone = unescape(value);
                        card.phone = Some(phone.strip_prefix("tel:").map(str::to_string).unwrap_or(phone));
                    }
                    _ => {}
                }
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vcard_3() {
        let text = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jean Dupont\r\nN:Dupont;Jean;;;\r\nEMAIL;TYPE=INTERNET:jean@example.com\r\nEMAIL:autre@example.com\r\nTEL;TYPE=CELL:+33 6 12 34 56 78\r\nEND:VCARD\r\n";
        let parsed = parse_vcf(text);

        assert_eq!(parsed.total, 1);
        assert_eq!(parsed.contacts.len(), 1);
        let contact = &parsed.contacts[0];
        assert_eq!(contact.name.as_deref(), Some("Jean Dupont"));
        assert_eq!(contact.email, "jean@example.com");
        assert_eq!(contact.phone.as_deref(), Some("+33 6 12 34 56 78"));
    }

    #[test]
    fn test_structured_name_fallback_and_grouped_properties() {
        let text = "BEGIN:VCARD\nVERSION:4.0\nN:Martin;Alice;;;\nitem1.EMAIL;type=pref:alice@example.org\nTEL;VALUE=uri:tel:+33-1-23-45-67-89\nEND:VCARD\n";
        let parsed = parse_vcf(text);

        assert_eq!(parsed.contacts[0].name.as_deref(), Some("Alice Martin"));
        assert_eq!(parsed.contacts[0].email, "alice@example.org");
        assert_eq!(parsed.contacts[0].phone.as_deref(), Some("+33-1-23-45-67-89"));
    }

    #[test]
    fn test_folded_lines_are_joined() {
        let text = "BEGIN:VCARD\nVERSION:2.1\nFN:Jean-Baptiste de la\n  Fontaine\nEMAIL:jb@exam\n ple.com\nEND:VCARD\n";
        let parsed = parse_vcf(text);

        assert_eq!(parsed.contacts[0].name.as_deref(), Some("Jean-Baptiste de la Fontaine"));
        assert_eq!(parsed.contacts[0].email, "jb@example.com");
    }

    #[test]
    fn test_card_without_email_is_invalid() {
        let text = "BEGIN:VCARD\nFN:Sans Mail\nTEL:0612345678\nEND:VCARD\nBEGIN:VCARD\nFN:Avec Mail\nEMAIL:ok@example.com\nEND:VCARD\n";
        let parsed = parse_vcf(text);

        assert_eq!(parsed.total, 2);
        assert_eq!(parsed.invalid, 1);
        assert_eq!(parsed.contacts.len(), 1);
    }
}
