use std::path::PathBuf;

use uuid::Uuid;

use bizcard_types::url::card_share_url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the bizcard API.
    pub api_url: String,
    /// Origin that share URLs point at; usually the web front end.
    pub public_origin: String,
    pub cache_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl ClientConfig {
    /// Read `BIZCARD_*` variables. Callers load `.env` first if they use one.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = var("BIZCARD_API_URL")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        let public_origin = var("BIZCARD_PUBLIC_ORIGIN")
            .map(|o| o.trim_end_matches('/').to_string())
            .unwrap_or_else(|| api_url.clone());

        Self {
            api_url,
            public_origin,
            cache_dir: var("BIZCARD_CACHE_DIR").unwrap_or_else(|| "./bizcard-cache".into()).into(),
            download_dir: var("BIZCARD_DOWNLOAD_DIR").unwrap_or_else(|| "./downloads".into()).into(),
        }
    }

    pub fn share_url(&self, card_id: Uuid) -> String {
        card_share_url(&self.public_origin, card_id)
    }
}
