// UI layer: the top-level action menu plus the small terminal helpers the
// workflows share (alerts, spinners). Everything is synchronous: each step
// blocks on the operator or on the shipping service.

use crate::error::ApiError;
use crate::listing::list_outgoing;
use crate::models::Message;
use crate::session::Session;
use crate::ship::{return_label, ship};
use anyhow::Result;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::time::Duration;

/// Where control goes once an action finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Menu,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Ship,
    Return,
    ListOutgoing,
    Exit,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Ship, Action::Return, Action::ListOutgoing, Action::Exit];

    pub fn label(self) -> &'static str {
        match self {
            Action::Ship => "Ship a package",
            Action::Return => "Create a return label",
            Action::ListOutgoing => "List sent packages",
            Action::Exit => "Exit",
        }
    }
}

/// Main interactive menu. Runs actions until the operator picks "Exit" or
/// an action asks to stop.
///
/// A failed call to the shipping service ends the current action only; the
/// menu is shown again.
pub fn main_menu(session: &Session<'_>) -> Result<()> {
    let items: Vec<String> = Action::ALL.iter().map(|a| a.label().to_string()).collect();
    loop {
        let action = Action::ALL[session.prompter.select("What do you want to do?", &items, 0)?];
        info!("action: {:?}", action);
        let outcome = match action {
            Action::Ship => ship(session),
            Action::Return => return_label(session),
            Action::ListOutgoing => list_outgoing(session),
            Action::Exit => return Ok(()),
        };
        match outcome {
            Ok(Next::Menu) => {}
            Ok(Next::Exit) => return Ok(()),
            Err(err) => match err.downcast_ref::<ApiError>() {
                Some(api) => {
                    warn!("{:?} aborted: {:#}", action, err);
                    println!("{} {}", "Action aborted:".red().bold(), api);
                }
                None => return Err(err),
            },
        }
    }
}

/// Print service messages as alerts.
pub fn show_messages(messages: &[Message]) {
    for m in messages {
        println!("{} {}", "Alert:".yellow().bold(), m);
    }
}

/// Show a spinner while `work` blocks on the shipping service.
pub fn with_spinner<T, E>(message: &str, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = work();
    spinner.finish_and_clear();
    result
}
