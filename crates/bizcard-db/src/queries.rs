use crate::models::{CardRow, CardSummaryRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row};

/// Outcome of a card insert that is subject to a per-user limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The owner already holds `limit` cards; `existing_id` is the oldest one.
    LimitReached { existing_id: String },
}

const USER_COLUMNS: &str = "id, username, password, role, created_at, updated_at";

const CARD_COLUMNS: &str = "id, user_id, name, job_title, company, description, email, phone, \
     website, address, links, theme_colors, visible_fields, created_at, updated_at";

impl Database {
    // -- Health --

    pub fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    // -- Users --

    /// Returns false when the username is already taken.
    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)
                 ON CONFLICT(username) DO NOTHING",
                (id, username, password_hash),
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, username"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no such user exists.
    pub fn set_user_role(&self, id: &str, role: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?1, updated_at = datetime('now') WHERE id = ?2",
                (role, id),
            )?;
            Ok(changed > 0)
        })
    }

    /// Set the role of a user looked up by name. Returns false when absent.
    pub fn set_role_by_username(&self, username: &str, role: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?1, updated_at = datetime('now') WHERE username = ?2 AND role != ?1",
                (role, username),
            )?;
            if changed > 0 {
                return Ok(true);
            }
            let exists: Option<String> = conn
                .query_row("SELECT id FROM users WHERE username = ?1", [username], |row| row.get(0))
                .optional()?;
            Ok(exists.is_some())
        })
    }

    // -- Cards --

    pub fn get_card(&self, id: &str) -> Result<Option<CardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"))?;
            let row = stmt.query_row([id], card_from_row).optional()?;
            Ok(row)
        })
    }

    /// Cards owned by `user_id`, oldest first.
    pub fn get_cards_for_user(&self, user_id: &str) -> Result<Vec<CardRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = ?1 ORDER BY created_at, id"
            ))?;
            let rows = stmt
                .query_map([user_id], card_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_card_summaries(&self) -> Result<Vec<CardSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, user_id, name, updated_at FROM cards ORDER BY created_at, id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(CardSummaryRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert a new card unless the owner already holds `limit` cards.
    /// Count and insert run in one transaction. `None` means no limit.
    pub fn insert_card_checked(&self, card: &CardRow, limit: Option<usize>) -> Result<InsertOutcome> {
        self.with_conn_mut(|conn| {
            if let Some(limit) = limit {
                let mut stmt =
                    conn.prepare("SELECT id FROM cards WHERE user_id = ?1 ORDER BY created_at, id")?;
                let existing = stmt
                    .query_map([&card.user_id], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                if existing.len() >= limit {
                    if let Some(first) = existing.into_iter().next() {
                        return Ok(InsertOutcome::LimitReached { existing_id: first });
                    }
                }
            }

            conn.execute(
                &format!(
                    "INSERT INTO cards ({CARD_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
                ),
                rusqlite::params![
                    card.id,
                    card.user_id,
                    card.name,
                    card.job_title,
                    card.company,
                    card.description,
                    card.email,
                    card.phone,
                    card.website,
                    card.address,
                    card.links,
                    card.theme_colors,
                    card.visible_fields,
                    card.created_at,
                    card.updated_at,
                ],
            )?;
            touch_user(conn, &card.user_id)?;
            Ok(InsertOutcome::Inserted)
        })
    }

    /// Overwrite the editable columns of an existing card. Owner and
    /// `created_at` never change. Returns false when the card is absent.
    pub fn update_card(&self, card: &CardRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE cards SET name = ?2, job_title = ?3, company = ?4, description = ?5,
                     email = ?6, phone = ?7, website = ?8, address = ?9, links = ?10,
                     theme_colors = ?11, visible_fields = ?12, updated_at = ?13
                 WHERE id = ?1",
                rusqlite::params![
                    card.id,
                    card.name,
                    card.job_title,
                    card.company,
                    card.description,
                    card.email,
                    card.phone,
                    card.website,
                    card.address,
                    card.links,
                    card.theme_colors,
                    card.visible_fields,
                    card.updated_at,
                ],
            )?;
            if changed > 0 {
                let owner: String =
                    conn.query_row("SELECT user_id FROM cards WHERE id = ?1", [&card.id], |row| row.get(0))?;
                touch_user(conn, &owner)?;
            }
            Ok(changed > 0)
        })
    }
}

fn touch_user(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute("UPDATE users SET updated_at = datetime('now') WHERE id = ?1", [user_id])?;
    Ok(())
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<CardRow> {
    Ok(CardRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        job_title: row.get(3)?,
        company: row.get(4)?,
        description: row.get(5)?,
        email: row.get(6)?,
        phone: row.get(7)?,
        website: row.get(8)?,
        address: row.get(9)?,
        links: row.get(10)?,
        theme_colors: row.get(11)?,
        visible_fields: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
