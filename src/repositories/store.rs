use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("store error: {0}")]
    Store(String),
}

/// Authenticated identity as returned by the store's auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// One filter/query pair, e.g. `("user_id", "eq.<uuid>")` or `("limit", "20")`.
pub type Filter = (&'static str, String);

pub fn eq<T: std::fmt::Display>(value: T) -> String {
    format!("eq.{}", value)
}

pub fn gte<T: std::fmt::Display>(value: T) -> String {
    format!("gte.{}", value)
}

pub fn in_list<T: std::fmt::Display>(values: &[T]) -> String {
    let joined = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", joined)
}

pub fn is_null() -> String {
    "is.null".to_string()
}

/// Client for the remote managed store: password auth, filtered row CRUD
/// and blob upload. Everything else in the service goes through this type;
/// business rules live in the callers.
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Extract the human-readable message Supabase puts in error bodies.
    fn error_message(text: &str) -> Option<String> {
        let json: Value = serde_json::from_str(text).ok()?;
        json.get("msg")
            .or_else(|| json.get("message"))
            .or_else(|| json.get("error_description"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    // ---- auth ----

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<AuthUser, StoreError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
            data: Value,
        }

        let resp = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&Body {
                email: email.trim(),
                password,
                data: metadata,
            })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let msg = Self::error_message(&text).unwrap_or_else(|| format!("signup failed: {}", status));
            return Err(StoreError::Auth(msg));
        }

        let json: Value = serde_json::from_str(&text)?;
        // Some deployments nest the user object, others return it flat.
        let user = json.get("user").cloned().unwrap_or(json);
        Ok(serde_json::from_value(user)?)
    }

    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(StoreSession, AuthUser), StoreError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResp {
            access_token: String,
            refresh_token: Option<String>,
            expires_in: Option<i64>,
            token_type: Option<String>,
            user: AuthUser,
        }

        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&Body {
                email: email.trim(),
                password,
            })
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if status != StatusCode::OK {
            let msg = Self::error_message(&text).unwrap_or_else(|| format!("login failed: {}", status));
            return Err(StoreError::Auth(msg));
        }

        let tr: TokenResp = serde_json::from_str(&text)?;
        let session = StoreSession {
            access_token: tr.access_token,
            refresh_token: tr.refresh_token,
            expires_in: tr.expires_in,
            token_type: tr.token_type,
        };
        Ok((session, tr.user))
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        let resp = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        // 401 on an already-dead session is as signed-out as it gets.
        if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(StoreError::Store(format!("logout failed: {}", resp.status())))
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, StoreError> {
        let resp = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Auth(
                Self::error_message(&text).unwrap_or_else(|| "invalid session".to_string()),
            ));
        }
        Ok(serde_json::from_str(&text)?)
    }

    // ---- rows ----

    fn rest_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
            .header("Content-Type", "application/json")
    }

    async fn expect_rows(resp: reqwest::Response) -> Result<Vec<Value>, StoreError> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            return Err(StoreError::Conflict);
        }
        if !status.is_success() {
            return Err(StoreError::Store(format!("{} -> {}", status.as_u16(), text)));
        }
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, StoreError> {
        let resp = self
            .rest_headers(self.client.get(self.rest_url(table)))
            .query(filters)
            .send()
            .await?;
        let rows = Self::expect_rows(resp).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<T, StoreError> {
        self.maybe_one(table, filters).await?.ok_or(StoreError::NotFound)
    }

    pub async fn maybe_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Option<T>, StoreError> {
        let mut rows: Vec<T> = self.select(table, filters).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.swap_remove(0)))
    }

    /// Insert one row and return the stored representation (defaults filled).
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        payload: &impl Serialize,
    ) -> Result<T, StoreError> {
        let resp = self
            .rest_headers(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;
        let rows = Self::expect_rows(resp).await?;
        let first = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Store("empty response from insert".to_string()))?;
        Ok(serde_json::from_value(first)?)
    }

    pub async fn insert_only(&self, table: &str, payload: &impl Serialize) -> Result<(), StoreError> {
        let resp = self
            .rest_headers(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=minimal")
            .json(payload)
            .send()
            .await?;
        Self::expect_rows(resp).await?;
        Ok(())
    }

    /// Filtered update returning the updated rows. An empty result means no
    /// row matched the filters, which callers use as a compare-and-swap miss.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &impl Serialize,
    ) -> Result<Vec<T>, StoreError> {
        let resp = self
            .rest_headers(self.client.patch(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .query(filters)
            .json(patch)
            .send()
            .await?;
        let rows = Self::expect_rows(resp).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }

    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        let resp = self
            .rest_headers(self.client.delete(self.rest_url(table)))
            .query(filters)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::Store(format!("{} -> {}", status.as_u16(), text)));
        }
        Ok(())
    }

    pub async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        let mut query: Vec<Filter> = vec![("select", "id".to_string()), ("limit", "1".to_string())];
        query.extend_from_slice(filters);
        let resp = self
            .rest_headers(self.client.get(self.rest_url(table)))
            .header("Prefer", "count=exact")
            .query(&query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StoreError::Store(format!("{} -> {}", status.as_u16(), text)));
        }
        // Content-Range: 0-0/42
        let total = resp
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| StoreError::Store("missing count in content-range".to_string()))?;
        Ok(total)
    }

    // ---- blobs ----

    /// Upload a blob and return its path within the bucket.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        let encoded: String = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, encoded);
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", &self.service_role_key))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Store(format!("upload failed: {} -> {}", status, text)));
        }
        Ok(path.to_string())
    }
}
