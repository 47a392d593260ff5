//! Allowlist management commands.
//!
//! Self-registration never grants admin rights, so promoting a user here is
//! the only way to create an admin.

use aula_core::Email;
use aula_web::data::DataManager;
use aula_web::models::Registration;

use super::CliError;

/// Arguments of `users add`.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub company: &'a str,
    pub role: &'a str,
    pub admin: bool,
}

/// Log every allowlisted user.
pub async fn list(data: &DataManager) {
    let users = data.authorized_users().await;
    if users.is_empty() {
        tracing::info!("No users on the allowlist");
        return;
    }

    for user in &users {
        tracing::info!(
            "{} <{}> {} | {}{}",
            user.name,
            user.email,
            user.company,
            user.role,
            if user.is_admin { " [admin]" } else { "" }
        );
    }
    tracing::info!("{} user(s)", users.len());
}

/// Add a user to the allowlist.
///
/// # Errors
///
/// Returns an error if the email is invalid or already allowlisted, or if
/// the store write fails.
pub async fn add(data: &DataManager, new_user: &NewUser<'_>) -> Result<(), CliError> {
    let email = Email::parse(new_user.email)?;
    if data.find_user(&email).await.is_some() {
        return Err(CliError::UserExists(email.into_inner()));
    }

    let registration = Registration {
        email: email.clone(),
        name: new_user.name.trim().to_string(),
        company: new_user.company.trim().to_string(),
        role: new_user.role.trim().to_string(),
    };
    data.register_user(&registration).await?;

    if new_user.admin {
        data.set_admin(&email, true).await?;
    }

    tracing::info!(
        "User added: {} ({})",
        email,
        if new_user.admin { "admin" } else { "user" }
    );
    Ok(())
}

/// Grant or revoke admin rights.
///
/// # Errors
///
/// Returns an error if the user is not allowlisted or the update fails.
pub async fn set_admin(data: &DataManager, email: &str, is_admin: bool) -> Result<(), CliError> {
    let email = existing(data, email).await?;
    data.set_admin(&email, is_admin).await?;

    if is_admin {
        tracing::info!("{} is now an admin", email);
    } else {
        tracing::info!("{} is no longer an admin", email);
    }
    Ok(())
}

/// Remove a user from the allowlist.
///
/// # Errors
///
/// Returns an error if the user is not allowlisted.
pub async fn remove(data: &DataManager, email: &str) -> Result<(), CliError> {
    let email = existing(data, email).await?;
    data.delete_authorized_user(&email).await;
    tracing::info!("User removed: {}", email);
    Ok(())
}

async fn existing(data: &DataManager, email: &str) -> Result<Email, CliError> {
    let email = Email::parse(email)?;
    if data.find_user(&email).await.is_none() {
        return Err(CliError::UserNotFound(email.into_inner()));
    }
    Ok(email)
}
