use aisadsa_application::AssessmentApp;
use aisadsa_core::flow::{AdvanceOutcome, FlowPhase};
use anyhow::{Result, bail};
use colored::Colorize;

use crate::render;

pub async fn start(app: &AssessmentApp) -> Result<()> {
    app.enter().await?;
    let snapshot = app.flow().start_session().await?;
    render::snapshot(&snapshot);
    Ok(())
}

pub async fn show(app: &AssessmentApp) -> Result<()> {
    app.enter().await?;
    render::snapshot(&app.flow().snapshot().await);
    Ok(())
}

/// Selects option `option` (1-based) and advances.
pub async fn answer(app: &AssessmentApp, option: usize) -> Result<()> {
    app.enter().await?;
    if option == 0 {
        bail!("Options are numbered from 1");
    }
    app.flow().select_option(option - 1).await?;
    print_advance(app.flow().advance().await?);
    render::snapshot(&app.flow().snapshot().await);
    Ok(())
}

pub fn print_advance(outcome: AdvanceOutcome) {
    match outcome {
        AdvanceOutcome::NextQuestion { remaining } => {
            println!("{}", format!("Answer saved. {} to go.", remaining).bright_green())
        }
        AdvanceOutcome::ReadyForFinalSubmission => {
            println!("{}", "Answer saved. That was the last question.".bright_green())
        }
    }
}

pub async fn submit(app: &AssessmentApp) -> Result<()> {
    app.enter().await?;
    if app.flow().snapshot().await.phase != FlowPhase::ReadyForFinalSubmission {
        bail!("Answer every question before submitting");
    }
    let artifacts = app.finish().await?;
    render::results(&artifacts);
    Ok(())
}

pub async fn reset(app: &AssessmentApp) -> Result<()> {
    app.flow().reset().await?;
    println!("{}", "Assessment progress cleared.".bright_green());
    Ok(())
}
