//! Authentication for the Firestore REST backend.
//!
//! Reads a Google service account key file and exchanges it for an OAuth2
//! access token scoped for Firestore. Tokens are requested per call; the
//! underlying authenticator caches until expiry.

use odmark_config::FirestoreConfig;
use std::{error::Error, path::Path};
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

/// Obtains an OAuth2 access token for the Firestore API.
///
/// # Errors
///
/// This function will return an error if:
/// * The key_path is missing from the FirestoreConfig
/// * The service account key file cannot be read
/// * Authentication with Google's OAuth2 service fails
/// * No token is returned from the authentication service
pub async fn get_firestore_auth_token(
    config: &FirestoreConfig,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in FirestoreConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    // Firestore accepts the generic datastore scope
    let auth_token = auth
        .token(&["https://www.googleapis.com/auth/datastore"])
        .await?;
    let token = match auth_token.token() {
        Some(token) => token,
        None => {
            return Err("No token available".into());
        }
    };

    Ok(token.to_string())
}
