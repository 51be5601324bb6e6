//! Session commands: login, logout, whoami, status

use colored::Colorize;

use crate::auth::api::AuthApi;
use crate::auth::types::User;
use crate::error::Result;

/// Sign in and store the session
///
/// # Arguments
///
/// * `api` - Session API
/// * `email` - Account email
/// * `password` - Account password
pub async fn login(api: &AuthApi, email: &str, password: &str) -> Result<()> {
    tracing::info!("Signing in as {}", email);
    let session = api.login(email, password).await?;

    match &session.user {
        Some(user) => println!("{} Signed in as {}", "✓".green().bold(), describe_user(user)),
        None => println!("{} Signed in as {}", "✓".green().bold(), email),
    }
    Ok(())
}

/// Sign out and clear stored credentials
pub async fn logout(api: &AuthApi) -> Result<()> {
    if api.logout().await {
        println!("{} Signed out", "✓".green().bold());
    } else {
        println!("Not signed in; nothing to do");
    }
    Ok(())
}

/// Show the signed-in user
///
/// With `cached`, prints the stored profile without contacting the server.
pub async fn whoami(api: &AuthApi, cached: bool) -> Result<()> {
    let user = if cached {
        api.cached_user()?
    } else {
        Some(api.me().await?)
    };

    match user {
        Some(user) => print!("{}", format_profile(&user)),
        None => println!("Not signed in"),
    }
    Ok(())
}

/// Show whether credentials are stored
pub fn status(api: &AuthApi) -> Result<()> {
    let store = api.client().store();
    if !store.has_credentials()? {
        println!("{}", "Not signed in".yellow());
        return Ok(());
    }

    println!("{}", "Signed in".green().bold());
    println!(
        "  access token:  {}",
        presence(store.access_token()?.is_some())
    );
    println!(
        "  refresh token: {}",
        presence(store.refresh_token()?.is_some())
    );
    if let Some(user) = store.user()? {
        println!("  user:          {}", describe_user(&user));
    }
    Ok(())
}

fn presence(present: bool) -> &'static str {
    if present {
        "stored"
    } else {
        "missing"
    }
}

/// One-line description: `Name <email>`, or just the email
pub fn describe_user(user: &User) -> String {
    if user.name.is_empty() {
        user.email.clone()
    } else {
        format!("{} <{}>", user.name, user.email)
    }
}

/// Multi-line profile listing
pub fn format_profile(user: &User) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", "User:".bold(), describe_user(user)));
    out.push_str(&format!("  id:      {}\n", user.id));
    if let Some(role) = &user.role {
        out.push_str(&format!("  role:    {}\n", role));
    }
    if let Some(created_at) = &user.created_at {
        out.push_str(&format!("  joined:  {}\n", created_at.format("%Y-%m-%d")));
    }
    out
}
