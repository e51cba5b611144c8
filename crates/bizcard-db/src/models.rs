//! Rows as stored. Ids and timestamps stay strings and JSON columns stay
//! encoded; bizcard-api converts them to the shared model types.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CardRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    /// JSON array of links
    pub links: String,
    /// JSON array of exactly three colors
    pub theme_colors: String,
    /// JSON object of field -> bool
    pub visible_fields: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct CardSummaryRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub updated_at: String,
}
