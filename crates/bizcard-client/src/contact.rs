//! Contact actions on a card: `tel:` and `mailto:` links and vCard text.
//! Hidden fields count as missing.

use thiserror::Error;

use bizcard_types::BusinessCard;
use bizcard_types::url::external_href;

use crate::notice::Notice;

pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("this card has no phone number")]
    MissingPhone,
    #[error("'{0}' is not a valid phone number")]
    InvalidPhone(String),
    #[error("this card has no email address")]
    MissingEmail,
}

impl ContactError {
    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

pub fn call_link(card: &BusinessCard) -> Result<String, ContactError> {
    let card = card.public_view();
    let phone = card.fields.phone.as_deref().ok_or(ContactError::MissingPhone)?;

    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')'));
    if !allowed || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(ContactError::InvalidPhone(phone.to_string()));
    }

    let plus = if phone.trim_start().starts_with('+') { "+" } else { "" };
    Ok(format!("tel:{plus}{digits}"))
}

pub fn mail_link(card: &BusinessCard) -> Result<String, ContactError> {
    let card = card.public_view();
    let email = card.fields.email.as_deref().ok_or(ContactError::MissingEmail)?;
    Ok(format!("mailto:{email}"))
}

/// vCard 3.0 of the card's visible fields.
pub fn to_vcard(card: &BusinessCard) -> String {
    let card = card.public_view();
    let f = &card.fields;

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape(&f.name)),
        format!("N:{};;;;", escape(&f.name)),
    ];
    if let Some(title) = &f.job_title {
        lines.push(format!("TITLE:{}", escape(title)));
    }
    if let Some(company) = &f.company {
        lines.push(format!("ORG:{}", escape(company)));
    }
    if let Some(phone) = &f.phone {
        lines.push(format!("TEL;TYPE=WORK,VOICE:{}", escape(phone)));
    }
    if let Some(email) = &f.email {
        lines.push(format!("EMAIL;TYPE=INTERNET:{}", escape(email)));
    }
    if let Some(website) = &f.website {
        lines.push(format!("URL:{}", escape(&external_href(website))));
    }
    if let Some(address) = &f.address {
        lines.push(format!("ADR;TYPE=WORK:;;{};;;;", escape(address)));
    }
    for link in &f.links {
        lines.push(format!("URL;TYPE={}:{}", escape(&link.label), escape(&external_href(&link.url))));
    }
    if let Some(description) = &f.description {
        lines.push(format!("NOTE:{}", escape(description)));
    }
    lines.push("END:VCARD".to_string());

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizcard_types::{CardField, CardFields};
    use uuid::Uuid;

    fn card(phone: Option<&str>, email: Option<&str>) -> BusinessCard {
        BusinessCard::new(
            Uuid::new_v4(),
            CardFields {
                name: "Ada Lovelace".into(),
                company: Some("Analytical Engines, Ltd.".into()),
                phone: phone.map(Into::into),
                email: email.map(Into::into),
                ..Default::default()
            },
        )
    }

    #[test]
    fn call_link_strips_formatting() {
        let c = card(Some("+1 (555) 123-4567"), None);
        assert_eq!(call_link(&c).unwrap(), "tel:+15551234567");
    }

    #[test]
    fn call_link_rejects_bad_numbers() {
        assert_eq!(call_link(&card(None, None)), Err(ContactError::MissingPhone));
        assert!(matches!(call_link(&card(Some("12345"), None)), Err(ContactError::InvalidPhone(_))));
        assert!(matches!(
            call_link(&card(Some("1234567890123456"), None)),
            Err(ContactError::InvalidPhone(_))
        ));
        assert!(matches!(call_link(&card(Some("555-CALL-NOW"), None)), Err(ContactError::InvalidPhone(_))));
    }

    #[test]
    fn hidden_phone_counts_as_missing() {
        let mut c = card(Some("555 123 4567"), None);
        c.fields.visible_fields.set(CardField::Phone, false);
        assert_eq!(call_link(&c), Err(ContactError::MissingPhone));
    }

    #[test]
    fn mail_link_needs_email() {
        assert_eq!(mail_link(&card(None, Some("ada@example.com"))).unwrap(), "mailto:ada@example.com");
        assert_eq!(mail_link(&card(None, None)), Err(ContactError::MissingEmail));
    }

    #[test]
    fn vcard_escapes_and_skips_hidden() {
        let mut c = card(Some("555 123 4567"), Some("ada@example.com"));
        c.fields.visible_fields.set(CardField::Email, false);

        let vcard = to_vcard(&c);
        assert!(vcard.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"));
        assert!(vcard.contains("FN:Ada Lovelace\r\n"));
        assert!(vcard.contains("ORG:Analytical Engines\\, Ltd.\r\n"));
        assert!(vcard.contains("TEL;TYPE=WORK,VOICE:555 123 4567\r\n"));
        assert!(!vcard.contains("EMAIL"));
        assert!(vcard.ends_with("END:VCARD\r\n"));
    }
}
