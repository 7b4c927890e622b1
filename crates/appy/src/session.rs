// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `appy login` and `appy logout`.

use appy_config::AppyConfig;
use appy_core::model::User;
use appy_core::AppyError;
use tracing::{info, warn};

use crate::Client;
use crate::prompt;

/// Name shown for a signed-in user.
pub(crate) fn display_name(user: &User) -> String {
    match (&user.nickname, &user.first_name) {
        (Some(nickname), _) if !nickname.is_empty() => nickname.clone(),
        (_, Some(first)) if !first.is_empty() => first.clone(),
        _ => format!("user {}", user.id),
    }
}

pub async fn run_login(config: &AppyConfig, email: &str) -> Result<(), AppyError> {
    let password = prompt::get_password(email)?;
    let client = Client::connect(config).await?;

    client.store.begin_session().await;
    let outcome = client.gateway.login(email, password).await?;

    match client.gateway.validate_session().await? {
        Some(user_config) => client.store.set_user_config(user_config),
        None => warn!("session could not be validated right after login"),
    }

    let name = outcome
        .user
        .as_ref()
        .map(display_name)
        .unwrap_or_else(|| email.to_string());
    info!(user = %name, "signed in");
    println!("Signed in as {name}.");
    Ok(())
}

/// The stored session is always cleared; an error means only the local
/// token store could not be emptied.
pub async fn run_logout(config: &AppyConfig) -> Result<(), AppyError> {
    let client = Client::connect(config).await?;
    let result = client.gateway.logout().await;
    client.store.clear_data().await;
    result?;
    println!("Signed out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_nickname() {
        let user = User {
            id: 7,
            nickname: Some("ada".into()),
            first_name: Some("Ada".into()),
            ..User::default()
        };
        assert_eq!(display_name(&user), "ada");
    }

    #[test]
    fn display_name_falls_back_to_first_name_then_id() {
        let mut user = User {
            id: 7,
            nickname: Some(String::new()),
            first_name: Some("Ada".into()),
            ..User::default()
        };
        assert_eq!(display_name(&user), "Ada");
        user.first_name = None;
        assert_eq!(display_name(&user), "user 7");
    }
}
