use aisadsa_application::AssessmentApp;
use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;

/// Uses the given password or prompts for one.
pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut editor = DefaultEditor::new()?;
    Ok(editor.readline("Password: ")?)
}

pub async fn login(app: &AssessmentApp, username: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = app.login(username, &password).await?;
    println!("{}", format!("Signed in as {}", user.username).bright_green());
    Ok(())
}

pub async fn register(
    app: &AssessmentApp,
    name: &str,
    email: &str,
    username: &str,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = app.register(name, email, username, &password).await?;
    println!(
        "{}",
        format!("Account created; signed in as {}", user.username).bright_green()
    );
    Ok(())
}

pub async fn logout(app: &AssessmentApp) -> Result<()> {
    app.logout().await?;
    println!("{}", "Signed out.".bright_green());
    Ok(())
}

pub fn whoami(app: &AssessmentApp) {
    match app.current_user() {
        Some(user) if !user.name.is_empty() => println!("{} ({})", user.name, user.username),
        Some(user) => println!("{}", user.username),
        None => println!("{}", "Not signed in.".bright_black()),
    }
}
