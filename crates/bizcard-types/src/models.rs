use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

/// Slot defaults for primary, secondary and accent.
pub const DEFAULT_THEME_COLORS: [&str; 3] = ["#000000", "#ffffff", "#dd8d0a"];

// -- Theme colors --

/// Exactly three branding colors. Decodes from a list of any length or
/// `null`: missing or blank slots take the defaults, extra entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "[String; 3]")]
pub struct ThemeColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

impl ThemeColors {
    pub fn as_array(&self) -> [&str; 3] {
        [&self.primary, &self.secondary, &self.accent]
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for color in self.as_array() {
            if !is_hex_color(color) {
                return Err(ValidationError::InvalidColor(color.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl From<Vec<String>> for ThemeColors {
    fn from(colors: Vec<String>) -> Self {
        let mut supplied = colors.into_iter();
        let mut slot = |index: usize| {
            supplied
                .next()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_THEME_COLORS[index].to_string())
        };

        Self {
            primary: slot(0),
            secondary: slot(1),
            accent: slot(2),
        }
    }
}

impl From<Option<Vec<String>>> for ThemeColors {
    fn from(colors: Option<Vec<String>>) -> Self {
        Self::from(colors.unwrap_or_default())
    }
}

impl From<ThemeColors> for [String; 3] {
    fn from(colors: ThemeColors) -> Self {
        [colors.primary, colors.secondary, colors.accent]
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// -- Links --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LinkType {
    Website,
    Linkedin,
    Twitter,
    Instagram,
    Facebook,
    Github,
    Youtube,
    Other,
}

impl From<String> for LinkType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "website" => Self::Website,
            "linkedin" => Self::Linkedin,
            "twitter" | "x" => Self::Twitter,
            "instagram" => Self::Instagram,
            "facebook" => Self::Facebook,
            "github" => Self::Github,
            "youtube" => Self::Youtube,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLink {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: LinkType,
    pub url: String,
}

// -- Visibility --

/// Fields whose public rendering can be switched off. `name` is always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    JobTitle,
    Company,
    Description,
    Email,
    Phone,
    Website,
    Address,
    Links,
}

impl CardField {
    pub const ALL: [CardField; 8] = [
        Self::JobTitle,
        Self::Company,
        Self::Description,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::Address,
        Self::Links,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibleFields {
    pub job_title: bool,
    pub company: bool,
    pub description: bool,
    pub email: bool,
    pub phone: bool,
    pub website: bool,
    pub address: bool,
    pub links: bool,
}

impl Default for VisibleFields {
    fn default() -> Self {
        Self {
            job_title: true,
            company: true,
            description: true,
            email: true,
            phone: true,
            website: true,
            address: true,
            links: true,
        }
    }
}

impl VisibleFields {
    pub fn is_visible(&self, field: CardField) -> bool {
        match field {
            CardField::JobTitle => self.job_title,
            CardField::Company => self.company,
            CardField::Description => self.description,
            CardField::Email => self.email,
            CardField::Phone => self.phone,
            CardField::Website => self.website,
            CardField::Address => self.address,
            CardField::Links => self.links,
        }
    }

    pub fn set(&mut self, field: CardField, visible: bool) {
        let slot = match field {
            CardField::JobTitle => &mut self.job_title,
            CardField::Company => &mut self.company,
            CardField::Description => &mut self.description,
            CardField::Email => &mut self.email,
            CardField::Phone => &mut self.phone,
            CardField::Website => &mut self.website,
            CardField::Address => &mut self.address,
            CardField::Links => &mut self.links,
        };
        *slot = visible;
    }
}

// -- Cards --

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("invalid theme color: {0}")]
    InvalidColor(String),
    #[error("link '{0}' has no url")]
    EmptyLinkUrl(String),
}

/// The editable part of a card. This is also the request body for saves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFields {
    pub name: String,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub links: Vec<CardLink>,
    #[serde(default)]
    pub theme_colors: ThemeColors,
    #[serde(default)]
    pub visible_fields: VisibleFields,
}

impl CardFields {
    /// Trim every text field; blank optional fields become `None`.
    pub fn normalized(mut self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        self.name = self.name.trim().to_string();
        self.job_title = clean(self.job_title);
        self.company = clean(self.company);
        self.description = clean(self.description);
        self.email = clean(self.email);
        self.phone = clean(self.phone);
        self.website = clean(self.website);
        self.address = clean(self.address);
        for link in &mut self.links {
            link.label = link.label.trim().to_string();
            link.url = link.url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
            if !valid {
                return Err(ValidationError::InvalidEmail(email.clone()));
            }
        }

        self.theme_colors.validate()?;

        if let Some(link) = self.links.iter().find(|l| l.url.trim().is_empty()) {
            return Err(ValidationError::EmptyLinkUrl(link.label.clone()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessCard {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub fields: CardFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessCard {
    pub fn new(user_id: Uuid, fields: CardFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of the card with every hidden field cleared.
    pub fn public_view(&self) -> BusinessCard {
        let mut card = self.clone();
        let visible = &self.fields.visible_fields;
        let f = &mut card.fields;

        if !visible.job_title {
            f.job_title = None;
        }
        if !visible.company {
            f.company = None;
        }
        if !visible.description {
            f.description = None;
        }
        if !visible.email {
            f.email = None;
        }
        if !visible.phone {
            f.phone = None;
        }
        if !visible.website {
            f.website = None;
        }
        if !visible.address {
            f.address = None;
        }
        if !visible.links {
            f.links.clear();
        }
        card
    }
}

// -- Accounts --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub id: Uuid,
    pub name: String,
}

/// One row of the admin user table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRole {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub cards: Vec<CardSummary>,
    pub updated_at: DateTime<Utc>,
}

impl UserWithRole {
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }
}
