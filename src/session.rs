// Session context threaded through every workflow: the prompt surface, the
// remote service, the parcel templates and the validated default sender.

use crate::api::ShippingService;
use crate::config::{Config, TemplateRegistry};
use crate::error::ConfigError;
use crate::models::Address;
use crate::prompt::Prompter;
use crate::ui::{show_messages, with_spinner};
use anyhow::Result;
use log::info;

pub struct Session<'a> {
    pub prompter: &'a dyn Prompter,
    pub service: &'a dyn ShippingService,
    pub templates: &'a TemplateRegistry,
    /// Sender from the config file, as stored by the service.
    pub sender: Address,
}

impl<'a> Session<'a> {
    /// Validate the configured sender and build the session.
    ///
    /// Returns `Ok(None)` when the operator does not accept the validator's
    /// remarks about the sender. A sender the service flags as invalid is a
    /// configuration error.
    pub fn initialize(
        config: &Config,
        prompter: &'a dyn Prompter,
        service: &'a dyn ShippingService,
        templates: &'a TemplateRegistry,
    ) -> Result<Option<Self>> {
        let sender = with_spinner("Validating the sender address...", || {
            service.validate_address(&config.from)
        })?;
        let verdict = sender.verdict();
        if verdict.is_valid == Some(false) {
            let messages = verdict
                .messages
                .iter()
                .map(|m| format!("  {}", m))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(ConfigError::InvalidSender { messages }.into());
        }
        if !verdict.messages.is_empty() {
            show_messages(&verdict.messages);
            if !prompter.confirm("Are these sender address problems OK?", true)? {
                return Ok(None);
            }
        }
        info!("sender address stored as {:?}", sender.object_id);
        Ok(Some(Session {
            prompter,
            service,
            templates,
            sender,
        }))
    }
}
