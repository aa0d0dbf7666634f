//! Account command handlers.

use anyhow::Result;
use megablog_core::auth;
use megablog_core::backend::Backend;
use megablog_core::config::Config;
use megablog_core::forms::{self, CHECKED, FormValues, field};
use megablog_core::models::{Credentials, NewAccount};

use super::{connect, ensure_valid};

pub struct SignupArgs {
    pub name: String,
    pub email: String,
    pub password: String,
    pub accept_terms: bool,
}

pub async fn signup(config: &Config, args: SignupArgs) -> Result<()> {
    let values = FormValues::new()
        .with(field::NAME, args.name)
        .with(field::EMAIL, args.email)
        .with(field::PASSWORD, args.password.clone())
        .with(field::CONFIRM_PASSWORD, args.password)
        .with(
            field::ACCEPT_TERMS,
            if args.accept_terms { CHECKED } else { "" },
        );
    ensure_valid(&forms::validate(&forms::signup_rules(), &values))?;

    let backend = connect(config)?;
    let user = auth::sign_up(&backend, &NewAccount::from_form(&values)).await?;
    println!("Welcome, {}! You are signed in as {}.", user.name, user.email);
    Ok(())
}

pub async fn login(config: &Config, email: &str, password: &str) -> Result<()> {
    let values = FormValues::new()
        .with(field::EMAIL, email)
        .with(field::PASSWORD, password);
    ensure_valid(&forms::validate(&forms::login_rules(), &values))?;

    let backend = connect(config)?;
    let user = auth::sign_in(&backend, &Credentials::from_form(&values)).await?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn logout(config: &Config) -> Result<()> {
    let backend = connect(config)?;
    if !backend.has_session() {
        println!("Not signed in.");
        return Ok(());
    }
    if let Err(e) = auth::sign_out(&backend).await {
        // The saved session is dropped either way.
        eprintln!("Warning: the server did not confirm the logout: {e}");
    }
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let backend = connect(config)?;
    match backend.current_user().await {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
        None => println!("Not signed in."),
    }
    Ok(())
}
