// Ship and return-label use cases: resolve both ends, customs and parcel,
// then quote, pick and buy a label. Every confirmation is a branch point;
// answering "no" returns to the action menu.

use crate::address::{acquire_address, Role};
use crate::api::require_id;
use crate::customs::declare_customs;
use crate::error::{ApiError, ShipError};
use crate::models::{Address, CustomsDeclaration, Parcel, ShipmentExtra, ShipmentRequest, Transaction};
use crate::parcel::specify_parcel;
use crate::rates::choose_rate;
use crate::session::Session;
use crate::ui::{show_messages, with_spinner, Next};
use anyhow::Result;
use crossterm::style::Stylize;
use log::{debug, info, warn};

/// Everything resolved for one shipment, kept for the whole action so a
/// return label can reuse it.
#[derive(Debug, Clone)]
pub struct Consignment {
    pub sender: Address,
    pub recipient: Address,
    pub parcel: Parcel,
    pub customs: Option<CustomsDeclaration>,
}

impl Consignment {
    pub fn outbound_request(&self) -> Result<ShipmentRequest, ApiError> {
        self.request(false)
    }

    /// Same parcel travelling back from the recipient to the sender. The
    /// addresses keep their outbound order; the service swaps them for
    /// shipments flagged `is_return`.
    pub fn return_request(&self) -> Result<ShipmentRequest, ApiError> {
        self.request(true)
    }

    fn request(&self, is_return: bool) -> Result<ShipmentRequest, ApiError> {
        let customs_declaration = match &self.customs {
            Some(customs) => {
                let id = require_id(customs.object_id.as_deref(), "customs declaration")?;
                Some(id.to_string())
            }
            None => None,
        };
        Ok(ShipmentRequest {
            address_from: self.sender.reference(),
            address_to: self.recipient.reference(),
            parcels: vec![self.parcel.clone()],
            customs_declaration,
            extra: ShipmentExtra { is_return },
            run_async: false,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Outbound,
    Return,
}

impl Leg {
    fn noun(self) -> &'static str {
        match self {
            Leg::Outbound => "service",
            Leg::Return => "return service",
        }
    }
}

/// How a label purchase attempt ended.
enum Checkout {
    Purchased(Transaction),
    Stopped(Next),
}

/// Ship a package, then optionally buy a return label for it.
pub fn ship(session: &Session<'_>) -> Result<Next> {
    let Some(consignment) = resolve_consignment(session)? else {
        return Ok(Next::Menu);
    };

    match buy_label(session, &consignment, Leg::Outbound)? {
        Checkout::Purchased(label) => info!("outbound label {:?} purchased", label.object_id),
        Checkout::Stopped(next) => return Ok(next),
    }

    if !session.prompter.confirm("Would you like a return label?", false)? {
        return Ok(Next::Menu);
    }
    Ok(match buy_label(session, &consignment, Leg::Return)? {
        Checkout::Purchased(label) => {
            info!("return label {:?} purchased", label.object_id);
            Next::Menu
        }
        Checkout::Stopped(next) => next,
    })
}

/// Buy only a return label for a parcel the recipient sends back.
pub fn return_label(session: &Session<'_>) -> Result<Next> {
    let Some(consignment) = resolve_consignment(session)? else {
        return Ok(Next::Menu);
    };
    Ok(match buy_label(session, &consignment, Leg::Return)? {
        Checkout::Purchased(label) => {
            info!("return label {:?} purchased", label.object_id);
            Next::Menu
        }
        Checkout::Stopped(next) => next,
    })
}

/// Sender, recipient, customs and parcel, confirmed by the operator.
fn resolve_consignment(session: &Session<'_>) -> Result<Option<Consignment>> {
    let Some(sender) = resolve_sender(session)? else {
        return Ok(None);
    };
    let Some(recipient) = acquire_address(session, Role::Recipient, Some(&sender))? else {
        return Ok(None);
    };
    let customs = declare_customs(session, &sender, &recipient)?;
    let parcel = specify_parcel(session.prompter, session.templates)?;

    let consignment = Consignment {
        sender,
        recipient,
        parcel,
        customs,
    };
    print_consignment(&consignment);
    if !session.prompter.confirm("Does this look acceptable?", true)? {
        info!("consignment declined by the operator");
        return Ok(None);
    }
    Ok(Some(consignment))
}

/// The configured sender unless the operator wants another one.
fn resolve_sender(session: &Session<'_>) -> Result<Option<Address>> {
    if session
        .prompter
        .confirm(&format!("Ship from {}?", session.sender), true)?
    {
        return Ok(Some(session.sender.clone()));
    }
    acquire_address(session, Role::Sender, None)
}

fn print_consignment(consignment: &Consignment) {
    println!("Sender: {}", consignment.sender);
    println!("Recipient: {}", consignment.recipient);
    if let Some(customs) = &consignment.customs {
        println!(
            "Customs declaration: {} ({}), if undeliverable {}",
            customs.contents_type.as_str(),
            customs.contents_explanation,
            customs.non_delivery_option.as_str()
        );
        for item in customs.items.iter().filter_map(|item| item.object()) {
            println!("  - {}", item);
        }
    }
    println!("Parcel: {}", consignment.parcel);
}

/// Create the shipment for `leg`, pick a rate and purchase it.
fn buy_label(session: &Session<'_>, consignment: &Consignment, leg: Leg) -> Result<Checkout> {
    let request = match leg {
        Leg::Outbound => consignment.outbound_request()?,
        Leg::Return => consignment.return_request()?,
    };
    let shipment = with_spinner("Fetching rates...", || {
        session.service.create_shipment(&request)
    })?;
    debug!("shipment {:?} with {} rate(s)", shipment.object_id, shipment.rates.len());

    if !shipment.messages.is_empty() {
        show_messages(&shipment.messages);
        if !session
            .prompter
            .confirm("Are these shipment alerts OK?", true)?
        {
            return Ok(Checkout::Stopped(Next::Menu));
        }
    }

    let rate = match choose_rate(session.prompter, &shipment) {
        Ok(rate) => rate,
        Err(err) => match err.downcast_ref::<ShipError>() {
            Some(no_rates @ ShipError::NoRates) => {
                warn!("shipment {:?} returned no rates", shipment.object_id);
                println!("{}", no_rates.to_string().red());
                return Ok(Checkout::Stopped(Next::Menu));
            }
            None => return Err(err),
        },
    };
    println!("Picked {} {}", leg.noun(), rate.describe());

    if !session.prompter.confirm("Ready to purchase this rate?", false)? {
        return Ok(Checkout::Stopped(Next::Menu));
    }

    let rate_id = require_id(Some(rate.object_id.as_str()), "rate")?;
    let transaction = with_spinner("Purchasing label...", || {
        session.service.purchase_label(rate_id)
    })?;
    debug!("transaction {:?}: {:?}", transaction.object_id, transaction.status);

    if transaction.is_success() {
        report_label(&transaction);
        Ok(Checkout::Purchased(transaction))
    } else {
        println!("{}", "Failed purchasing the label due to:".red().bold());
        show_messages(&transaction.messages);
        let keep_going = session
            .prompter
            .confirm("Continue with another action?", true)?;
        Ok(Checkout::Stopped(if keep_going { Next::Menu } else { Next::Exit }))
    }
}

fn report_label(transaction: &Transaction) {
    println!(
        "Purchased label with tracking number {}",
        transaction.tracking().unwrap_or("(none)")
    );
    if let Some(url) = transaction.label() {
        println!("The label can be downloaded at {}", url);
        open_label(url);
    }
}

#[cfg(not(test))]
fn open_label(url: &str) {
    if let Err(err) = open::that(url) {
        warn!("could not open the label at {}: {}", url, err);
    }
}

#[cfg(test)]
fn open_label(url: &str) {
    debug!("not opening {} under test", url);
}
