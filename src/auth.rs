use reqwest::Method;

use crate::client::{Body, Client};
use crate::error::{Error, Result};
use crate::models::{Credentials, TokenResponse};

/// Signs in and stores the returned token in the client session.
pub async fn login(client: &Client, email: &str, password: &str) -> Result<()> {
    let body = serde_json::to_value(Credentials { email, password })
        .map_err(|e| Error::Validation(e.to_string()))?;

    let response: TokenResponse = client
        .request(Method::POST, &["login"], &[], Body::Json(body))
        .await?;

    match response.token {
        Some(token) if !token.is_empty() => {
            client.session().login(token);
            info!("logged in as {}", email);
            Ok(())
        }
        _ => Err(Error::Auth("no token received from server".into())),
    }
}

/// Creates an account. The user still has to [`login`] afterwards.
pub async fn register(client: &Client, email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::Validation("email and password are required".into()));
    }

    let body = serde_json::to_value(Credentials { email, password })
        .map_err(|e| Error::Validation(e.to_string()))?;
    client
        .execute(Method::POST, &["register"], Body::Json(body))
        .await?;
    info!("registered {}", email);

    Ok(())
}

pub fn logout(client: &Client) {
    client.session().logout();
    debug!("session cleared");
}
