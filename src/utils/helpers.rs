//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{DateTime, Utc};
use regex::Regex;
use url::Url;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
            .expect("email regex is valid")
    })
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

/// Validate phone number format (basic validation)
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    phone.chars().all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '.' | '(' | ')'))
        && (8..=15).contains(&digits)
}

/// Keep only the digits of a phone number, turning a French national number
/// (`06 12 34 56 78`) into its international form (`33612345678`)
pub fn phone_to_international_digits(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if phone.trim_start().starts_with('+') {
        digits
    } else if let Some(rest) = digits.strip_prefix("00") {
        rest.to_string()
    } else if digits.len() == 10 && digits.starts_with('0') {
        format!("33{}", &digits[1..])
    } else {
        digits
    }
}

/// Mask the local part of an email address for previews.
///
/// `jean.dupont@example.com` becomes `j***t@example.com`; local parts of one
/// or two characters are fully masked.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let chars: Vec<char> = local.chars().collect();
            let masked = if chars.len() <= 2 {
                "*".repeat(chars.len().max(1))
            } else {
                format!("{}***{}", chars[0], chars[chars.len() - 1])
            };
            format!("{}@{}", masked, domain)
        }
        None => "***".to_string(),
    }
}

/// Compare two secrets without short-circuiting on the first differing byte
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Generate a random alphanumeric string
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                            abcdefghijklmnopqrstuvwxyz\
                            0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercase and strip French accents, for matching loosely written labels
pub fn fold_label(text: &str) -> String {
    normalize_whitespace(text)
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ç' => 'c',
            '_' => ' ',
            other => other,
        })
        .collect()
}

/// Absolute link on the public web front, `path` relative to its base URL
pub fn public_link(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
    base.join(path.trim_start_matches('/'))
}

/// Trim a string and turn blanks into `None`
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_link() {
        let link = public_link("https://concerts.example.fr/app/", "/inscriptions/12").unwrap();
        assert_eq!(link.as_str(), "https://concerts.example.fr/app/inscriptions/12");

        let mut link = public_link("http://localhost:3000", "share/abc").unwrap();
        link.query_pairs_mut().append_pair("token", "a b");
        assert_eq!(link.as_str(), "http://localhost:3000/share/abc?token=a+b");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("jean.dupont@example.com"));
        assert!(is_valid_email("a+b@sub.example.fr"));
        assert!(!is_valid_email("jean.dupont"));
        assert!(!is_valid_email("jean@localhost"));
        assert!(!is_valid_email("jean @example.com"));
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("06 12 34 56 78"));
        assert!(is_valid_phone("+33 6 12 34 56 78"));
        assert!(!is_valid_phone("12"));
        assert!(!is_valid_phone("06-CALL-ME"));
    }

    #[test]
    fn test_phone_to_international_digits() {
        assert_eq!(phone_to_international_digits("06 12 34 56 78"), "33612345678");
        assert_eq!(phone_to_international_digits("+33 6 12 34 56 78"), "33612345678");
        assert_eq!(phone_to_international_digits("0032 470 12 34 56"), "32470123456");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("jean.dupont@example.com"), "j***t@example.com");
        assert_eq!(mask_email("jo@example.com"), "**@example.com");
        assert_eq!(mask_email("x@example.com"), "*@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc123", "abc123"));
        assert!(!constant_time_eq("abc123", "abc124"));
        assert!(!constant_time_eq("abc", "abc123"));
    }

    #[test]
    fn test_generate_random_string() {
        let token = generate_random_string(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_random_string(32));
    }

    #[test]
    fn test_fold_label() {
        assert_eq!(fold_label("  Téléphone  Portable "), "telephone portable");
        assert_eq!(fold_label("Prénom"), "prenom");
        assert_eq!(fold_label("E_mail"), "e mail");
    }
}
