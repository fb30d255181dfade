//! Build-time configuration, baked in from `APP_*` environment variables.

/// Origin of the backend; empty means same origin.
pub const BASE_API_URL: &str = match option_env!("APP_BASE_API_URL") {
    Some(url) => url,
    None => "",
};

pub const CLIENT_ID: &str = match option_env!("APP_CLIENT_ID") {
    Some(id) => id,
    None => "1",
};

/// e.g. `https://login.microsoftonline.com/<tenant-id>`
pub const AUTHORITY: &str = match option_env!("APP_AUTHORITY") {
    Some(authority) => authority,
    None => "",
};

/// Domain the signed-in username must end with.
pub const ALLOWED_DOMAIN: &str = match option_env!("APP_ALLOWED_DOMAIN") {
    Some(domain) => domain,
    None => "@domain.com",
};

const REDIRECT_URI: Option<&str> = option_env!("APP_REDIRECT_URI");

/// Where the identity provider sends the browser back to.
pub fn redirect_uri() -> String {
    match REDIRECT_URI {
        Some(uri) if !uri.is_empty() => uri.to_string(),
        _ => gloo::utils::window()
            .location()
            .origin()
            .unwrap_or_default(),
    }
}

/// Scope of the backend API's access tokens.
pub fn api_scope() -> String {
    format!("api://{}/access_as_user", CLIENT_ID)
}

pub fn endpoint(path: &str) -> String {
    format!("{}/oauth2/v2.0/{}", AUTHORITY.trim_end_matches('/'), path)
}

pub fn api_url(path: &str) -> String {
    format!("{}{}", BASE_API_URL.trim_end_matches('/'), path)
}
