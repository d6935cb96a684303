// Address acquisition: reuse a stored address or enter a new one, looping
// through remote validation until the operator accepts the result.

use crate::models::Address;
use crate::prompt::{Prompter, TextQuestion};
use crate::session::Session;
use crate::ui::{show_messages, with_spinner};
use crate::validate;
use anyhow::Result;
use log::{debug, info};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Recipient,
}

impl Role {
    fn noun(self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Recipient => "recipient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Sender => f.write_str("Sender"),
            Role::Recipient => f.write_str("Recipient"),
        }
    }
}

/// Resolve an address for `role`.
///
/// `exclude` is never offered for reuse, so the same place cannot end up
/// at both ends of a shipment. `Ok(None)` means the operator gave up after
/// the validator rejected the address.
pub fn acquire_address(
    session: &Session<'_>,
    role: Role,
    exclude: Option<&Address>,
) -> Result<Option<Address>> {
    println!("{} information", role);
    if session
        .prompter
        .confirm(&format!("Reuse a stored {} address?", role.noun()), false)?
    {
        if let Some(address) = pick_stored(session, role, exclude)? {
            confirm_stored(role, &address);
            return Ok(Some(address));
        }
    }

    let mut draft = Address::default();
    loop {
        draft = prompt_fields(session.prompter, &draft)?;
        let checked = with_spinner("Validating address...", || {
            session.service.validate_address(&draft)
        })?;
        let verdict = checked.verdict();
        debug!("{} validation: {:?}", role.noun(), verdict);

        let accepted = match verdict.is_valid {
            None => {
                show_messages(&verdict.messages);
                session.prompter.confirm(
                    "The validator could not decide whether this address is valid. Use it anyway?",
                    false,
                )?
            }
            Some(false) => {
                println!("The validator thinks this {} address is invalid.", role.noun());
                show_messages(&verdict.messages);
                if !session.prompter.confirm("Re-enter the address?", true)? {
                    info!("{} address abandoned after validation failure", role.noun());
                    return Ok(None);
                }
                false
            }
            Some(true) if !verdict.messages.is_empty() => {
                show_messages(&verdict.messages);
                session
                    .prompter
                    .confirm("Are these address problems OK?", false)?
            }
            Some(true) => true,
        };

        if accepted {
            confirm_stored(role, &checked);
            return Ok(Some(checked));
        }
    }
}

/// Stored addresses minus `exclude`, de-duplicated by structural identity.
pub fn reuse_candidates(stored: Vec<Address>, exclude: Option<&Address>) -> Vec<Address> {
    let mut candidates: Vec<Address> = Vec::new();
    for address in stored {
        if exclude.map_or(false, |ex| ex.same_place(&address)) {
            continue;
        }
        if candidates.iter().any(|seen| seen.same_place(&address)) {
            continue;
        }
        candidates.push(address);
    }
    candidates
}

fn pick_stored(
    session: &Session<'_>,
    role: Role,
    exclude: Option<&Address>,
) -> Result<Option<Address>> {
    let stored = with_spinner("Fetching stored addresses...", || {
        session.service.list_addresses()
    })?;
    let candidates = reuse_candidates(stored, exclude);
    if candidates.is_empty() {
        println!("There are no stored addresses to reuse; enter a new one.");
        return Ok(None);
    }
    let labels: Vec<String> = candidates.iter().map(Address::one_line).collect();
    let index = session
        .prompter
        .select(&format!("Which {} address?", role.noun()), &labels, 0)?;
    Ok(candidates.into_iter().nth(index))
}

/// Ask for every field, pre-filling answers from `previous`.
fn prompt_fields(prompter: &dyn Prompter, previous: &Address) -> Result<Address> {
    let ask = |prompt: &str, value: &str| prompter.text(&TextQuestion::new(prompt).default_to(value));
    let ask_optional = |prompt: &str, value: &str| {
        prompter.text(&TextQuestion::new(prompt).default_to(value).optional())
    };

    Ok(Address {
        name: ask("Name", &previous.name)?,
        company: ask_optional("Company", &previous.company)?,
        street1: ask("Street Address", &previous.street1)?,
        street2: ask_optional("Street (line 2)", &previous.street2)?,
        street3: ask_optional("Street (line 3)", &previous.street3)?,
        city: ask("City", &previous.city)?,
        state: ask_optional("State", &previous.state)?,
        zip: ask("ZIP", &previous.zip)?,
        country: prompter.text(
            &TextQuestion::new("Country Code")
                .default_to(&previous.country)
                .validate(validate::country_code),
        )?
        .to_uppercase(),
        phone: ask_optional("Phone", &previous.phone)?,
        email: ask_optional("E-Mail", &previous.email)?,
        ..Address::default()
    })
}

fn confirm_stored(role: Role, address: &Address) {
    println!("{} address: {}", role, address);
}
