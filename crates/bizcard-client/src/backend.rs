use std::future::Future;

use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use bizcard_types::api::{ErrorBody, LoginRequest, LoginResponse, UpdateRoleRequest};
use bizcard_types::{BusinessCard, Role, Session, UserWithRole};

use crate::error::ClientError;

/// The remote half of the card store. [`HttpBackend`] talks to bizcard-api;
/// tests substitute an in-memory fake.
pub trait CardBackend: Send + Sync {
    fn health(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Public view of any card.
    fn fetch_card(&self, card_id: Uuid) -> impl Future<Output = Result<Option<BusinessCard>, ClientError>> + Send;

    /// The signed-in user's own card, complete.
    fn fetch_my_card(&self) -> impl Future<Output = Result<Option<BusinessCard>, ClientError>> + Send;

    /// Create or update `card` under its id. Returns the stored record.
    fn upsert_card(&self, card: &BusinessCard) -> impl Future<Output = Result<BusinessCard, ClientError>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<Vec<UserWithRole>, ClientError>> + Send;

    fn update_role(&self, user_id: Uuid, role: Role) -> impl Future<Output = Result<(), ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Log in and keep the token for subsequent calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Session, ClientError> {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let login: LoginResponse = check(res).await?.json().await?;

        self.token = Some(login.token);
        Ok(Session {
            user_id: login.user_id,
            username: login.username,
            role: login.role,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::Unauthorized)?;
        Ok(builder.bearer_auth(token))
    }
}

/// Map non-2xx responses to typed errors using the API's error body.
async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body: Option<ErrorBody> = res.json().await.ok();
    debug!("API error {}: {:?}", status, body);

    match (status, body) {
        (StatusCode::CONFLICT, Some(ErrorBody { existing_card_id: Some(existing), .. })) => {
            Err(ClientError::CardLimitReached { existing })
        }
        (StatusCode::UNAUTHORIZED, _) => Err(ClientError::Unauthorized),
        (StatusCode::FORBIDDEN, _) => Err(ClientError::Forbidden),
        (StatusCode::NOT_FOUND, _) => Err(ClientError::NotFound),
        (status, body) => Err(ClientError::Status {
            status: status.as_u16(),
            message: body.map(|b| b.error).unwrap_or_else(|| status.to_string()),
        }),
    }
}

impl CardBackend for HttpBackend {
    async fn health(&self) -> Result<(), ClientError> {
        let res = self.client.get(self.url("/health")).send().await?;
        check(res).await?;
        Ok(())
    }

    async fn fetch_card(&self, card_id: Uuid) -> Result<Option<BusinessCard>, ClientError> {
        let res = self.client.get(self.url(&format!("/card/{card_id}"))).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(res).await?.json().await?))
    }

    async fn fetch_my_card(&self) -> Result<Option<BusinessCard>, ClientError> {
        let res = self.authed(self.client.get(self.url("/me/card")))?.send().await?;
        Ok(check(res).await?.json().await?)
    }

    async fn upsert_card(&self, card: &BusinessCard) -> Result<BusinessCard, ClientError> {
        let res = self
            .authed(self.client.put(self.url(&format!("/cards/{}", card.id))))?
            .json(&card.fields)
            .send()
            .await?;
        Ok(check(res).await?.json().await?)
    }

    async fn list_users(&self) -> Result<Vec<UserWithRole>, ClientError> {
        let res = self.authed(self.client.get(self.url("/admin/users")))?.send().await?;
        Ok(check(res).await?.json().await?)
    }

    async fn update_role(&self, user_id: Uuid, role: Role) -> Result<(), ClientError> {
        let res = self
            .authed(self.client.put(self.url(&format!("/admin/users/{user_id}/role"))))?
            .json(&UpdateRoleRequest { role })
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }
}
