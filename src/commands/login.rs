use dialoguer::{theme::ColorfulTheme, Password};
use tracing::info;

use crate::core::CredentialStore;
use crate::error::{CredentialError, FixplsError};

/// Prompt for an API key and store it
pub fn login(store: &dyn CredentialStore) -> Result<(), FixplsError> {
    let input = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("OpenAI API key")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| FixplsError::Prompt(format!("Failed to read API key: {}", e)))?;

    save_api_key(store, &input)?;
    println!("API key saved");
    Ok(())
}

/// Validate and persist a key typed by the user
pub fn save_api_key(store: &dyn CredentialStore, raw: &str) -> Result<(), FixplsError> {
    match store.store(raw) {
        Ok(()) => {
            info!("Stored API key");
            Ok(())
        }
        Err(CredentialError::Empty) => Err(FixplsError::Usage("API key must not be empty".into())),
        Err(e) => Err(e.into()),
    }
}

/// Remove the stored API key
pub fn logout(store: &dyn CredentialStore) -> Result<(), FixplsError> {
    if store.clear()? {
        println!("API key removed");
    } else {
        println!("No API key stored");
    }
    Ok(())
}
