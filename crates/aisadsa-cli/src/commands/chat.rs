use aisadsa_application::AssessmentApp;
use aisadsa_core::chat::SendOutcome;
use aisadsa_core::layout::INITIAL_PANE_WIDTH;
use anyhow::Result;

use crate::render;

pub async fn send(app: &AssessmentApp, message: &str) -> Result<()> {
    app.enter().await?;
    if let SendOutcome::Replied(reply) = app.chat().send_message(message).await? {
        render::chat_message(&reply, INITIAL_PANE_WIDTH);
    }
    Ok(())
}

pub async fn transcript(app: &AssessmentApp) -> Result<()> {
    app.enter().await?;
    render::transcript(&app.chat().messages().await, INITIAL_PANE_WIDTH);
    Ok(())
}
