//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Identity providers a user can log in with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Github,
    Facebook,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 3] = [
        OAuthProvider::Google,
        OAuthProvider::Github,
        OAuthProvider::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Github => "github",
            OAuthProvider::Facebook => "facebook",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "github" => Ok(OAuthProvider::Github),
            "facebook" => Ok(OAuthProvider::Facebook),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub provider: String,
    pub provider_user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Identity vouched for by a provider after a completed login
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub provider: OAuthProvider,
    pub provider_user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Query parameters on `/auth/{provider}/callback`
#[derive(Deserialize, Debug)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}
