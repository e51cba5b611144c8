//! Row <-> model conversion. Corrupt optional data degrades to defaults with
//! a warning; corrupt ids fail the request.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use bizcard_db::models::{CardRow, CardSummaryRow, UserRow};
use bizcard_types::{BusinessCard, CardFields, CardSummary, Role, UserWithRole};

use crate::error::ApiError;

pub fn parse_timestamp(value: &str, context: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite's datetime('now') has no timezone: "YYYY-MM-DD HH:MM:SS".
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {}: {}", value, context, e);
            DateTime::default()
        })
}

fn parse_id(value: &str, context: &str) -> Result<Uuid, ApiError> {
    value.parse().map_err(|e| {
        error!("Corrupt id '{}' on {}: {}", value, context, e);
        ApiError::Internal
    })
}

/// Unknown stored roles grant nothing beyond `user`.
pub fn role_from_row(role: &str, user_id: &str) -> Role {
    Role::parse(role).unwrap_or_else(|| {
        warn!("Unknown role '{}' on user '{}', treating as user", role, user_id);
        Role::User
    })
}

fn json_column<T: serde::de::DeserializeOwned + Default>(raw: &str, column: &str, card_id: &str) -> T {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Corrupt {} on card '{}': {}", column, card_id, e);
        T::default()
    })
}

pub fn card_from_row(row: CardRow) -> Result<BusinessCard, ApiError> {
    let context = format!("card '{}'", row.id);
    let fields = CardFields {
        links: json_column(&row.links, "links", &row.id),
        theme_colors: json_column(&row.theme_colors, "theme_colors", &row.id),
        visible_fields: json_column(&row.visible_fields, "visible_fields", &row.id),
        name: row.name,
        job_title: row.job_title,
        company: row.company,
        description: row.description,
        email: row.email,
        phone: row.phone,
        website: row.website,
        address: row.address,
    };

    Ok(BusinessCard {
        id: parse_id(&row.id, &context)?,
        user_id: parse_id(&row.user_id, &context)?,
        fields,
        created_at: parse_timestamp(&row.created_at, &context),
        updated_at: parse_timestamp(&row.updated_at, &context),
    })
}

pub fn card_to_row(card: &BusinessCard) -> Result<CardRow, ApiError> {
    let encode = |value: serde_json::Result<String>| {
        value.map_err(|e| {
            error!("Failed to encode card '{}': {}", card.id, e);
            ApiError::Internal
        })
    };
    let f = &card.fields;

    Ok(CardRow {
        id: card.id.to_string(),
        user_id: card.user_id.to_string(),
        name: f.name.clone(),
        job_title: f.job_title.clone(),
        company: f.company.clone(),
        description: f.description.clone(),
        email: f.email.clone(),
        phone: f.phone.clone(),
        website: f.website.clone(),
        address: f.address.clone(),
        links: encode(serde_json::to_string(&f.links))?,
        theme_colors: encode(serde_json::to_string(&f.theme_colors))?,
        visible_fields: encode(serde_json::to_string(&f.visible_fields))?,
        created_at: card.created_at.to_rfc3339(),
        updated_at: card.updated_at.to_rfc3339(),
    })
}

/// Join users with their card summaries. A user's `updated_at` is the latest
/// of its own record and its cards.
pub fn users_with_cards(users: Vec<UserRow>, cards: Vec<CardSummaryRow>) -> Result<Vec<UserWithRole>, ApiError> {
    let mut by_owner: HashMap<String, Vec<CardSummaryRow>> = HashMap::new();
    for card in cards {
        by_owner.entry(card.user_id.clone()).or_default().push(card);
    }

    users
        .into_iter()
        .map(|user| {
            let context = format!("user '{}'", user.id);
            let mut updated_at = parse_timestamp(&user.updated_at, &context);
            let mut summaries = Vec::new();

            for card in by_owner.remove(&user.id).unwrap_or_default() {
                let card_context = format!("card '{}'", card.id);
                updated_at = updated_at.max(parse_timestamp(&card.updated_at, &card_context));
                summaries.push(CardSummary {
                    id: parse_id(&card.id, &card_context)?,
                    name: card.name,
                });
            }

            Ok(UserWithRole {
                id: parse_id(&user.id, &context)?,
                role: role_from_row(&user.role, &user.id),
                username: user.username,
                cards: summaries,
                updated_at,
            })
        })
        .collect()
}
