use aisadsa_infrastructure::AisadsaPaths;
use aisadsa_infrastructure::file_session_store::{list_tabs, new_tab_id, remove_tab};
use anyhow::Result;
use colored::Colorize;

pub fn new() -> Result<()> {
    println!("{}", new_tab_id());
    Ok(())
}

pub fn list(paths: &AisadsaPaths) -> Result<()> {
    let tabs = list_tabs(&paths.tabs_dir())?;
    if tabs.is_empty() {
        println!("{}", "No tab sessions.".bright_black());
    }
    for tab in tabs {
        println!("{}", tab);
    }
    Ok(())
}

pub fn remove(paths: &AisadsaPaths, tab: &str) -> Result<()> {
    remove_tab(&paths.tabs_dir(), tab)?;
    println!("{}", format!("Removed tab '{}'", tab).bright_green());
    Ok(())
}
