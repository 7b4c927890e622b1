// SPDX-FileCopyrightText: 2026 Appy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password acquisition via TTY prompt or the `APPY_PASSWORD` environment variable.

use appy_core::AppyError;
use secrecy::SecretString;

/// The environment variable name for providing the login password.
pub const PASSWORD_ENV_VAR: &str = "APPY_PASSWORD";

/// Get the login password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `APPY_PASSWORD` (scripts and CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_password(email: &str) -> Result<SecretString, AppyError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Password for {email}: ");
        let password = rpassword::read_password().map_err(|e| AppyError::Login {
            message: format!("failed to read password: {e}"),
            status: None,
        })?;
        if password.is_empty() {
            return Err(AppyError::Login {
                message: "empty password not allowed".to_string(),
                status: None,
            });
        }
        return Ok(SecretString::from(password));
    }

    Err(AppyError::Login {
        message: format!(
            "No password provided. Set {PASSWORD_ENV_VAR} or run interactively."
        ),
        status: None,
    })
}
