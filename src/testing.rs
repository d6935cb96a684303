// Test doubles: a prompter that replays scripted answers and records every
// question, and an in-memory shipping service.

use crate::api::ShippingService;
use crate::error::ApiError;
use crate::models::{
    Address, CustomsDeclaration, CustomsDeclarationDraft, CustomsItem, Message, ObjectRef,
    ObjectState, Parcel, Rate, ServiceLevel, Shipment, ShipmentRequest, Transaction,
    TransactionStatus, ValidationResults,
};
use crate::prompt::{Prompter, TextQuestion};
use anyhow::{anyhow, bail, Result};
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum Answer {
    /// Typed text; an empty string accepts the pre-filled default.
    Text(&'static str),
    /// Press Enter on a text question.
    Default,
    Choice(usize),
    /// Select the first item containing this text.
    Pick(&'static str),
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Select,
    Confirm,
}

#[derive(Debug, Clone)]
pub struct Asked {
    pub kind: Kind,
    pub prompt: String,
    pub default: Option<String>,
    pub items: Vec<String>,
}

pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<Asked>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        ScriptedPrompter {
            answers: RefCell::new(answers.into()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<Asked> {
        self.asked.borrow().clone()
    }

    /// Questions whose prompt is exactly `prompt`.
    pub fn asked_for(&self, prompt: &str) -> Vec<Asked> {
        self.asked
            .borrow()
            .iter()
            .filter(|a| a.prompt == prompt)
            .cloned()
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, asked: Asked) -> Result<Answer> {
        let prompt = asked.prompt.clone();
        self.asked.borrow_mut().push(asked);
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("script ran out of answers at '{}'", prompt))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&self, question: &TextQuestion<'_>) -> Result<String> {
        let answer = self.next(Asked {
            kind: Kind::Text,
            prompt: question.prompt.to_string(),
            default: question.default.clone(),
            items: Vec::new(),
        })?;
        let typed = match answer {
            Answer::Text(text) if !text.is_empty() => text.to_string(),
            Answer::Text(_) | Answer::Default => question.default.clone().unwrap_or_default(),
            other => bail!("expected text for '{}', script has {:?}", question.prompt, other),
        };
        question
            .check(&typed)
            .map_err(|reason| anyhow!("'{}' rejected for '{}': {}", typed, question.prompt, reason))?;
        Ok(typed)
    }

    fn select(&self, prompt: &str, items: &[String], _default: usize) -> Result<usize> {
        let answer = self.next(Asked {
            kind: Kind::Select,
            prompt: prompt.to_string(),
            default: None,
            items: items.to_vec(),
        })?;
        match answer {
            Answer::Choice(index) if index < items.len() => Ok(index),
            Answer::Pick(needle) => items
                .iter()
                .position(|item| item.contains(needle))
                .ok_or_else(|| anyhow!("no item containing '{}' in {:?}", needle, items)),
            other => bail!("expected a choice for '{}', script has {:?}", prompt, other),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        let answer = self.next(Asked {
            kind: Kind::Confirm,
            prompt: prompt.to_string(),
            default: None,
            items: Vec::new(),
        })?;
        match answer {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => bail!("expected yes/no for '{}', script has {:?}", prompt, other),
        }
    }
}

pub const TRACKING_NUMBER: &str = "9400111899223197428490";
pub const LABEL_URL: &str = "https://shippo-delivery.example.com/label.pdf";

/// In-memory shipping service. Validation verdicts are consumed in order;
/// once exhausted every address is valid without messages.
pub struct StubService {
    pub stored_addresses: Vec<Address>,
    pub verdicts: RefCell<VecDeque<ValidationResults>>,
    pub validated: RefCell<Vec<Address>>,
    pub rates: Vec<Rate>,
    pub shipment_messages: Vec<Message>,
    pub shipments: RefCell<Vec<ShipmentRequest>>,
    pub declarations: RefCell<Vec<CustomsDeclarationDraft>>,
    pub purchase_status: TransactionStatus,
    pub purchase_messages: Vec<Message>,
    pub purchases: RefCell<Vec<String>>,
    /// Every transaction handed back by `purchase_label`.
    pub bought: RefCell<Vec<Transaction>>,
    pub transactions: Vec<Transaction>,
    pub stored_rates: HashMap<String, Rate>,
    pub stored_parcels: HashMap<String, Parcel>,
    pub stored_shipments: HashMap<String, Shipment>,
    pub stored_declarations: HashMap<String, CustomsDeclaration>,
    pub stored_items: HashMap<String, CustomsItem>,
}

impl Default for StubService {
    fn default() -> Self {
        StubService {
            stored_addresses: Vec::new(),
            verdicts: RefCell::new(VecDeque::new()),
            validated: RefCell::new(Vec::new()),
            rates: Vec::new(),
            shipment_messages: Vec::new(),
            shipments: RefCell::new(Vec::new()),
            declarations: RefCell::new(Vec::new()),
            purchase_status: TransactionStatus::Success,
            purchase_messages: Vec::new(),
            purchases: RefCell::new(Vec::new()),
            bought: RefCell::new(Vec::new()),
            transactions: Vec::new(),
            stored_rates: HashMap::new(),
            stored_parcels: HashMap::new(),
            stored_shipments: HashMap::new(),
            stored_declarations: HashMap::new(),
            stored_items: HashMap::new(),
        }
    }
}

impl StubService {
    pub fn with_verdicts(self, verdicts: Vec<ValidationResults>) -> Self {
        *self.verdicts.borrow_mut() = verdicts.into();
        self
    }
}

fn not_found(what: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{} {} not found", what, id),
    }
}

fn lookup<T: Clone>(map: &HashMap<String, T>, what: &str, id: &str) -> Result<T, ApiError> {
    map.get(id).cloned().ok_or_else(|| not_found(what, id))
}

impl ShippingService for StubService {
    fn validate_address(&self, address: &Address) -> Result<Address, ApiError> {
        let mut validated = self.validated.borrow_mut();
        validated.push(address.clone());
        let results = self
            .verdicts
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| verdict(Some(true), &[]));
        let mut stored = address.clone();
        stored.object_id = Some(format!("addr_{}", validated.len()));
        stored.validation_results = Some(results);
        Ok(stored)
    }

    fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        Ok(self.stored_addresses.clone())
    }

    fn create_customs_declaration(
        &self,
        draft: &CustomsDeclarationDraft,
    ) -> Result<CustomsDeclaration, ApiError> {
        let mut declarations = self.declarations.borrow_mut();
        declarations.push(draft.clone());
        Ok(CustomsDeclaration {
            object_id: Some(format!("cust_{}", declarations.len())),
            contents_type: draft.contents_type,
            contents_explanation: draft.contents_explanation.clone(),
            non_delivery_option: draft.non_delivery_option,
            certify: draft.certify,
            certify_signer: draft.certify_signer.clone(),
            items: draft
                .items
                .iter()
                .map(|item| ObjectRef::Object(Box::new(item.clone())))
                .collect(),
        })
    }

    fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, ApiError> {
        let mut shipments = self.shipments.borrow_mut();
        shipments.push(request.clone());
        let id = format!("shp_{}", shipments.len());
        Ok(Shipment {
            object_id: Some(id.clone()),
            status: Some("SUCCESS".into()),
            rates: self
                .rates
                .iter()
                .cloned()
                .map(|mut rate| {
                    rate.shipment = Some(id.clone());
                    rate
                })
                .collect(),
            messages: self.shipment_messages.clone(),
            extra: request.extra.clone(),
            ..Shipment::default()
        })
    }

    fn purchase_label(&self, rate_id: &str) -> Result<Transaction, ApiError> {
        self.purchases.borrow_mut().push(rate_id.to_string());
        let success = self.purchase_status == TransactionStatus::Success;
        let transaction = Transaction {
            object_id: Some(format!("tx_{}", self.purchases.borrow().len())),
            object_state: ObjectState::Valid,
            status: self.purchase_status,
            tracking_number: success.then(|| TRACKING_NUMBER.to_string()),
            label_url: success.then(|| LABEL_URL.to_string()),
            messages: self.purchase_messages.clone(),
            rate: Some(ObjectRef::Id(rate_id.to_string())),
            parcel: None,
        };
        self.bought.borrow_mut().push(transaction.clone());
        Ok(transaction)
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        Ok(self.transactions.clone())
    }

    fn retrieve_rate(&self, id: &str) -> Result<Rate, ApiError> {
        lookup(&self.stored_rates, "rate", id)
    }

    fn retrieve_parcel(&self, id: &str) -> Result<Parcel, ApiError> {
        lookup(&self.stored_parcels, "parcel", id)
    }

    fn retrieve_shipment(&self, id: &str) -> Result<Shipment, ApiError> {
        lookup(&self.stored_shipments, "shipment", id)
    }

    fn retrieve_customs_declaration(&self, id: &str) -> Result<CustomsDeclaration, ApiError> {
        lookup(&self.stored_declarations, "customs declaration", id)
    }

    fn retrieve_customs_item(&self, id: &str) -> Result<CustomsItem, ApiError> {
        lookup(&self.stored_items, "customs item", id)
    }
}

pub fn verdict(is_valid: Option<bool>, texts: &[&str]) -> ValidationResults {
    ValidationResults {
        is_valid,
        messages: texts
            .iter()
            .map(|text| Message {
                source: Some("USPS".into()),
                text: text.to_string(),
                code: Some("Unknown Street".into()),
            })
            .collect(),
    }
}

pub fn address(name: &str, street1: &str, country: &str) -> Address {
    Address {
        name: name.into(),
        street1: street1.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        zip: "94117".into(),
        country: country.into(),
        ..Address::default()
    }
}

pub fn rate(id: &str, provider: &str, service: &str, amount: &str) -> Rate {
    Rate {
        object_id: id.into(),
        provider: provider.into(),
        servicelevel: ServiceLevel {
            name: service.into(),
            token: String::new(),
        },
        amount: Decimal::from_str(amount).unwrap_or_default(),
        currency: "USD".into(),
        estimated_days: Some(3),
        attributes: Vec::new(),
        shipment: None,
    }
}
