use std::env;

use anyhow::{Context, Result};

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    /// Seed credentials for the one-time admin bootstrap. Optional: when
    /// either var is missing the bootstrap is skipped entirely.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub allowed_origins: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let supabase_url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let supabase_anon_key = env::var("SUPABASE_ANON_KEY")
            .unwrap_or_default()
            .trim()
            .to_string();
        let supabase_service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY not set")?
            .trim()
            .to_string();
        let supabase_jwt_secret = env::var("SUPABASE_JWT_SECRET")
            .context("SUPABASE_JWT_SECRET not set")?
            .trim()
            .to_string();

        let admin_email = env::var("ADMIN_EMAIL").ok().filter(|v| !v.trim().is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.trim().is_empty());

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT is not a valid port number")?;

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key,
            supabase_jwt_secret,
            admin_email,
            admin_password,
            allowed_origins,
            port,
        })
    }
}
