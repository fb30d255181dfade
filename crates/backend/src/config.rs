//! Startup configuration, read once from the environment (and `.env`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend")]
#[command(about = "Ping API protected by bearer authentication and a domain allow-list")]
pub struct AppConfig {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Domain marker identifiers must contain, e.g. `@domain.com`.
    ///
    /// Left empty, every protected request is rejected and `/health` reports
    /// the service as unavailable.
    #[arg(long, env = "ALLOWED_DOMAIN", default_value = "")]
    pub allowed_domain: String,

    /// Extra claim names probed after the built-in ones, comma separated.
    #[arg(long, env = "IDENTITY_CLAIM_PROBES", value_delimiter = ',')]
    pub identity_claim_probes: Vec<String>,

    #[arg(
        long,
        env = "AZURE_AD_INSTANCE",
        default_value = "https://login.microsoftonline.com/"
    )]
    pub azure_ad_instance: String,

    #[arg(long, env = "AZURE_AD_TENANT_ID")]
    pub azure_ad_tenant_id: Option<String>,

    /// Accepted `aud` values, comma separated.
    #[arg(long, env = "AZURE_AD_AUDIENCE", value_delimiter = ',')]
    pub azure_ad_audience: Vec<String>,

    /// Development only: accept HS256 tokens signed with this secret instead
    /// of the identity provider's published keys.
    #[arg(long, env = "AUTH_DEV_HS256_SECRET", hide_env_values = true)]
    pub auth_dev_hs256_secret: Option<String>,

    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173"
    )]
    pub cors_allowed_origins: Vec<String>,

    /// Built frontend bundle, served for non-API paths when present.
    #[arg(long, env = "FRONTEND_DIR", default_value = "crates/frontend/dist")]
    pub frontend_dir: PathBuf,
}

/// Where token signing keys come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySettings {
    Jwks {
        jwks_uri: Url,
        issuers: Vec<String>,
        audience: Vec<String>,
    },
    DevSecret {
        secret: String,
        audience: Vec<String>,
    },
}

impl AppConfig {
    fn instance(&self) -> String {
        let instance = self.azure_ad_instance.trim();
        if instance.ends_with('/') {
            instance.to_string()
        } else {
            format!("{}/", instance)
        }
    }

    fn tenant_id(&self) -> Result<&str> {
        self.azure_ad_tenant_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .context("AZURE_AD_TENANT_ID must be set")
    }

    fn audience(&self) -> Vec<String> {
        self.azure_ad_audience
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// `{instance}{tenant}/v2.0`
    pub fn authority(&self) -> Result<String> {
        Ok(format!("{}{}/v2.0", self.instance(), self.tenant_id()?))
    }

    /// Issuers of v1 and v2 access tokens for the tenant.
    pub fn valid_issuers(&self) -> Result<Vec<String>> {
        let tenant = self.tenant_id()?;
        Ok(vec![
            format!("https://sts.windows.net/{}/", tenant),
            self.authority()?,
        ])
    }

    pub fn jwks_uri(&self) -> Result<Url> {
        let raw = format!(
            "{}{}/discovery/v2.0/keys",
            self.instance(),
            self.tenant_id()?
        );
        Url::parse(&raw).with_context(|| format!("invalid JWKS URI: {}", raw))
    }

    pub fn key_settings(&self) -> Result<KeySettings> {
        if let Some(secret) = self
            .auth_dev_hs256_secret
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            return Ok(KeySettings::DevSecret {
                secret: secret.to_string(),
                audience: self.audience(),
            });
        }

        let audience = self.audience();
        if audience.is_empty() {
            bail!("AZURE_AD_AUDIENCE must be set");
        }

        Ok(KeySettings::Jwks {
            jwks_uri: self.jwks_uri()?,
            issuers: self.valid_issuers()?,
            audience,
        })
    }

    pub fn claim_probes(&self) -> impl Iterator<Item = &str> {
        self.identity_claim_probes
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }

    /// Parse command-line arguments only, ignoring the process environment.
    #[cfg(test)]
    pub(crate) fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        use clap::{CommandFactory, FromArgMatches};

        let matches = Self::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }
}
