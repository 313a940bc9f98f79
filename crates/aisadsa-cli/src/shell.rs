//! Interactive shell: one tab session kept in memory between commands.

use std::borrow::Cow::{self, Borrowed, Owned};

use aisadsa_application::AssessmentApp;
use aisadsa_core::chat::SendOutcome;
use aisadsa_core::error::AssessmentError;
use aisadsa_core::flow::{FlowPhase, ResumeOutcome};
use aisadsa_core::layout::PaneResizer;
use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::commands::auth::password_or_prompt;
use crate::commands::flow::print_advance;
use crate::render;

const COMMANDS: &[&str] = &[
    "start", "show", "select", "next", "retry", "submit", "reset", "chat", "transcript",
    "resize", "login", "logout", "whoami", "help", "quit",
];

/// rustyline helper providing command completion, hints and highlighting.
#[derive(Clone)]
struct ShellHelper {
    commands: Vec<String>,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = self
            .commands
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.clone(),
                replacement: cmd.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let command = line.split_whitespace().next().unwrap_or_default();
        if self.commands.iter().any(|c| c == command) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        self.commands
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for ShellHelper {}

/// What the shell should do after a command.
enum Flow {
    Continue,
    Quit,
}

struct Shell<'a> {
    app: &'a AssessmentApp,
    pane: PaneResizer,
}

impl Shell<'_> {
    async fn enter(&self) {
        if !self.app.is_authenticated() {
            println!("{}", "Not signed in. Use 'login <username>'.".bright_black());
            return;
        }
        match self.app.enter().await {
            Ok(entry) => {
                if let ResumeOutcome::Resumed(snapshot) = entry.flow {
                    render::snapshot(&snapshot);
                } else {
                    println!("{}", "Type 'start' to begin the assessment.".bright_black());
                }
                if entry.transcript_len > 0 {
                    println!(
                        "{}",
                        format!("{} chat messages restored.", entry.transcript_len).bright_black()
                    );
                }
            }
            Err(e) => render::error(&e),
        }
    }

    async fn dispatch(&mut self, line: &str) -> Flow {
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        let outcome = match command {
            "quit" | "exit" => return Flow::Quit,
            "help" => {
                print_help();
                Ok(())
            }
            "start" => self.start().await,
            "show" => {
                render::snapshot(&self.app.flow().snapshot().await);
                Ok(())
            }
            "select" => self.select(rest).await,
            "next" => self.next().await,
            "retry" => self.retry().await,
            "submit" => self.submit().await,
            "reset" => self.app.flow().reset().await,
            "chat" => self.chat(rest).await,
            "transcript" => {
                render::transcript(&self.app.chat().messages().await, self.pane.width());
                Ok(())
            }
            "resize" => {
                self.resize(rest);
                Ok(())
            }
            "login" => self.login(rest).await,
            "logout" => self.app.logout().await.map(|()| {
                println!("{}", "Signed out.".bright_green());
            }),
            "whoami" => {
                crate::commands::auth::whoami(self.app);
                Ok(())
            }
            other => {
                println!("{}", format!("Unknown command '{}'", other).bright_black());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            render::error(&e);
        }
        Flow::Continue
    }

    async fn start(&self) -> Result<(), AssessmentError> {
        let snapshot = self.app.flow().start_session().await?;
        render::snapshot(&snapshot);
        Ok(())
    }

    async fn select(&self, arg: &str) -> Result<(), AssessmentError> {
        let Some(index) = parse_option(arg) else {
            println!("{}", "Usage: select <option number>".yellow());
            return Ok(());
        };
        self.app.flow().select_option(index).await?;
        render::snapshot(&self.app.flow().snapshot().await);
        Ok(())
    }

    /// The primary action: Next, Submit or Retry depending on the phase.
    async fn next(&self) -> Result<(), AssessmentError> {
        match self.app.flow().snapshot().await.phase {
            FlowPhase::ReadyForFinalSubmission => self.submit().await,
            FlowPhase::Errored => self.retry().await,
            _ => {
                print_advance(self.app.flow().advance().await?);
                render::snapshot(&self.app.flow().snapshot().await);
                Ok(())
            }
        }
    }

    async fn retry(&self) -> Result<(), AssessmentError> {
        print_advance(self.app.flow().retry_fetch().await?);
        render::snapshot(&self.app.flow().snapshot().await);
        Ok(())
    }

    async fn submit(&self) -> Result<(), AssessmentError> {
        let artifacts = self.app.finish().await?;
        render::results(&artifacts);
        Ok(())
    }

    async fn chat(&self, message: &str) -> Result<(), AssessmentError> {
        println!("{}", "...".bright_black());
        if let SendOutcome::Replied(reply) = self.app.chat().send_message(message).await? {
            render::chat_message(&reply, self.pane.width());
        }
        Ok(())
    }

    /// Simulates dragging the divider to `pointer_x` in a container of the
    /// given width; the chat pane wraps to the result.
    fn resize(&mut self, args: &str) {
        let numbers: Vec<i64> = args
            .split_whitespace()
            .filter_map(|n| n.parse().ok())
            .collect();
        let &[container_width, pointer_x] = numbers.as_slice() else {
            println!("{}", "Usage: resize <container width> <pointer x>".yellow());
            return;
        };
        self.pane.pointer_down();
        let width = self.pane.pointer_move(container_width, pointer_x);
        self.pane.pointer_up();
        println!("{}", format!("Chat pane width: {}px", width).bright_black());
    }

    async fn login(&self, username: &str) -> Result<(), AssessmentError> {
        if username.is_empty() {
            println!("{}", "Usage: login <username>".yellow());
            return Ok(());
        }
        let password = match password_or_prompt(None) {
            Ok(password) => password,
            Err(e) => return Err(AssessmentError::internal(e.to_string())),
        };
        let user = self.app.login(username, &password).await?;
        println!("{}", format!("Signed in as {}", user.username).bright_green());
        self.enter().await;
        Ok(())
    }
}

/// Parses a 1-based option number into an index.
fn parse_option(arg: &str) -> Option<usize> {
    arg.parse::<usize>().ok()?.checked_sub(1)
}

fn print_help() {
    let lines = [
        ("start", "begin a new assessment"),
        ("show", "show the current question"),
        ("select <n>", "choose option n"),
        ("next", "save the answer and continue (submits after the last question)"),
        ("retry", "load the next question again after a failure"),
        ("submit", "submit the assessment and show the results"),
        ("reset", "discard assessment progress"),
        ("chat <text>", "ask the assistant"),
        ("transcript", "show the chat transcript"),
        ("resize <w> <x>", "drag the chat divider"),
        ("login <user>", "sign in"),
        ("logout", "sign out and clear this tab"),
        ("whoami", "show the signed-in user"),
        ("quit", "leave the shell"),
    ];
    for (command, description) in lines {
        println!("  {:<16} {}", command.bright_cyan(), description);
    }
}

/// Runs the shell until `quit` or EOF.
pub async fn run(app: &AssessmentApp, tab: &str) -> Result<()> {
    let mut editor = Editor::new()?;
    editor.set_helper(Some(ShellHelper::new()));

    println!("{}", "=== AISADSA ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Tab '{}'. Type 'help' for commands, 'quit' to exit.", tab).bright_black()
    );
    println!();

    let mut shell = Shell {
        app,
        pane: PaneResizer::new(),
    };
    shell.enter().await;

    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                if let Flow::Quit = shell.dispatch(trimmed).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    app.leave().await;
    Ok(())
}
