// Data shapes exchanged with the shipping service. Field names mirror the
// service's JSON so the structs can be sent and received as-is; see
// https://goshippo.com/docs/reference for the full objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A field that the service returns either as a bare object id or as the
/// embedded object, depending on the endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ObjectRef<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> ObjectRef<T> {
    /// The embedded object, if the service sent one.
    pub fn object(&self) -> Option<&T> {
        match self {
            ObjectRef::Id(_) => None,
            ObjectRef::Object(obj) => Some(obj.as_ref()),
        }
    }

    /// Return the embedded object or fetch it by id.
    pub fn resolve<E>(&self, fetch: impl FnOnce(&str) -> Result<T, E>) -> Result<T, E>
    where
        T: Clone,
    {
        match self {
            ObjectRef::Id(id) => fetch(id),
            ObjectRef::Object(obj) => Ok((**obj).clone()),
        }
    }
}

/// Structured warning or error attached to an address, shipment or
/// transaction.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Message {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (Code={})",
            self.source.as_deref().unwrap_or("-"),
            self.text,
            self.code.as_deref().unwrap_or("-")
        )
    }
}

/// Outcome of a remote address validation. `is_valid` is absent when the
/// validator could not reach a verdict.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ValidationResults {
    #[serde(default)]
    pub is_valid: Option<bool>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub company: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub street1: String,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub street2: String,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub street3: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub city: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub state: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub zip: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub country: String,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub phone: String,
    #[serde(
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub validation_results: Option<ValidationResults>,
}

impl Address {
    /// Structural identity used when suggesting stored addresses: two
    /// records denote the same place when name, company, street, city,
    /// state, postal code and country all match.
    pub fn same_place(&self, other: &Address) -> bool {
        self.name == other.name
            && self.company == other.company
            && self.street1 == other.street1
            && self.city == other.city
            && self.state == other.state
            && self.zip == other.zip
            && self.country == other.country
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("street1", &self.street1),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Reference used when the address goes into a shipment request.
    pub fn reference(&self) -> ObjectRef<Address> {
        match &self.object_id {
            Some(id) => ObjectRef::Id(id.clone()),
            None => ObjectRef::Object(Box::new(self.clone())),
        }
    }

    pub fn verdict(&self) -> ValidationResults {
        self.validation_results.clone().unwrap_or_default()
    }

    pub fn one_line(&self) -> String {
        let state_zip = [self.state.as_str(), self.zip.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [
            self.name.as_str(),
            self.company.as_str(),
            self.street1.as_str(),
            self.street2.as_str(),
            self.street3.as_str(),
            self.city.as_str(),
            state_zip.as_str(),
            self.country.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.one_line())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Cm,
    In,
    Ft,
    Mm,
    M,
    Yd,
}

impl DistanceUnit {
    /// Units offered when entering a custom parcel.
    pub const CHOICES: [DistanceUnit; 2] = [DistanceUnit::Cm, DistanceUnit::In];

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Cm => "cm",
            DistanceUnit::In => "in",
            DistanceUnit::Ft => "ft",
            DistanceUnit::Mm => "mm",
            DistanceUnit::M => "m",
            DistanceUnit::Yd => "yd",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    Oz,
    Lb,
    Kg,
    G,
}

impl MassUnit {
    pub const CHOICES: [MassUnit; 3] = [MassUnit::Oz, MassUnit::Lb, MassUnit::Kg];

    pub fn as_str(self) -> &'static str {
        match self {
            MassUnit::Oz => "oz",
            MassUnit::Lb => "lb",
            MassUnit::Kg => "kg",
            MassUnit::G => "g",
        }
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts a YAML/JSON number or string and keeps its textual form. An
/// explicit null reads as an empty string.
fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Text(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Helper::deserialize(deserializer)? {
        Helper::Text(s) => s,
        Helper::Int(i) => i.to_string(),
        Helper::Float(f) => f.to_string(),
        Helper::Null(()) => String::new(),
    })
}

/// Entry of the parcel template registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParcelTemplate {
    pub u: DistanceUnit,
    #[serde(deserialize_with = "number_or_string")]
    pub l: String,
    #[serde(deserialize_with = "number_or_string")]
    pub w: String,
    #[serde(deserialize_with = "number_or_string")]
    pub h: String,
    /// Carrier parcel template token forwarded to the service, if any.
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parcel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub length: String,
    #[serde(deserialize_with = "number_or_string")]
    pub width: String,
    #[serde(deserialize_with = "number_or_string")]
    pub height: String,
    pub distance_unit: DistanceUnit,
    #[serde(deserialize_with = "number_or_string")]
    pub weight: String,
    pub mass_unit: MassUnit,
    /// Name of the registry template the dimensions came from.
    #[serde(skip)]
    pub template: Option<String>,
    #[serde(
        default,
        rename = "template",
        skip_serializing_if = "Option::is_none"
    )]
    pub carrier_template: Option<String>,
}

impl Parcel {
    pub fn from_template(
        name: &str,
        template: &ParcelTemplate,
        weight: String,
        mass_unit: MassUnit,
    ) -> Self {
        Parcel {
            object_id: None,
            length: template.l.clone(),
            width: template.w.clone(),
            height: template.h.clone(),
            distance_unit: template.u,
            weight,
            mass_unit,
            template: Some(name.to_string()),
            carrier_template: template.template.clone(),
        }
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} x {} {}, {} {}",
            self.length, self.width, self.height, self.distance_unit, self.weight, self.mass_unit
        )?;
        match (&self.template, &self.carrier_template) {
            (Some(name), _) | (None, Some(name)) => write!(f, " [{}]", name),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentsType {
    Documents,
    Gift,
    Sample,
    Merchandise,
    HumanitarianDonation,
    ReturnMerchandise,
    Other,
}

impl ContentsType {
    pub const ALL: [ContentsType; 7] = [
        ContentsType::Documents,
        ContentsType::Gift,
        ContentsType::Sample,
        ContentsType::Merchandise,
        ContentsType::HumanitarianDonation,
        ContentsType::ReturnMerchandise,
        ContentsType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentsType::Documents => "DOCUMENTS",
            ContentsType::Gift => "GIFT",
            ContentsType::Sample => "SAMPLE",
            ContentsType::Merchandise => "MERCHANDISE",
            ContentsType::HumanitarianDonation => "HUMANITARIAN_DONATION",
            ContentsType::ReturnMerchandise => "RETURN_MERCHANDISE",
            ContentsType::Other => "OTHER",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NonDeliveryOption {
    Abandon,
    Return,
}

impl NonDeliveryOption {
    pub const ALL: [NonDeliveryOption; 2] = [NonDeliveryOption::Abandon, NonDeliveryOption::Return];

    pub fn as_str(self) -> &'static str {
        match self {
            NonDeliveryOption::Abandon => "ABANDON",
            NonDeliveryOption::Return => "RETURN",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub description: String,
    pub quantity: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub net_weight: String,
    pub mass_unit: MassUnit,
    #[serde(deserialize_with = "number_or_string")]
    pub value_amount: String,
    pub value_currency: String,
    pub origin_country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tariff_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_code: Option<String>,
}

impl fmt::Display for CustomsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {}, {} {}, {} {} from {}",
            self.quantity,
            self.description,
            self.net_weight,
            self.mass_unit,
            self.value_currency,
            self.value_amount,
            self.origin_country
        )
    }
}

/// Declaration as submitted. Only one item per shipment is collected.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CustomsDeclarationDraft {
    pub contents_type: ContentsType,
    pub contents_explanation: String,
    pub non_delivery_option: NonDeliveryOption,
    pub certify: bool,
    pub certify_signer: String,
    pub items: Vec<CustomsItem>,
}

/// Declaration as materialized by the service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomsDeclaration {
    #[serde(default)]
    pub object_id: Option<String>,
    pub contents_type: ContentsType,
    #[serde(default)]
    pub contents_explanation: String,
    pub non_delivery_option: NonDeliveryOption,
    #[serde(default)]
    pub certify: bool,
    #[serde(default)]
    pub certify_signer: String,
    #[serde(default)]
    pub items: Vec<ObjectRef<CustomsItem>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ServiceLevel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: String,
}

/// A carrier quote. Immutable once returned by the service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rate {
    #[serde(default)]
    pub object_id: String,
    pub provider: String,
    #[serde(default)]
    pub servicelevel: ServiceLevel,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub estimated_days: Option<u32>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub shipment: Option<String>,
}

impl Rate {
    /// "{provider} {service level} for {currency} {amount} with est. transit
    /// time of {days} days" followed by one bracketed tag per attribute.
    pub fn describe(&self) -> String {
        let days = self
            .estimated_days
            .map(|d| d.to_string())
            .unwrap_or_else(|| "?".into());
        let mut desc = format!(
            "{} {} for {} {} with est. transit time of {} days",
            self.provider, self.servicelevel.name, self.currency, self.amount, days
        );
        for attribute in &self.attributes {
            desc.push_str(&format!(" [{}]", attribute));
        }
        desc
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ShipmentExtra {
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_return: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl ShipmentExtra {
    pub fn is_empty(&self) -> bool {
        !self.is_return
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ShipmentRequest {
    pub address_from: ObjectRef<Address>,
    pub address_to: ObjectRef<Address>,
    pub parcels: Vec<Parcel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customs_declaration: Option<String>,
    #[serde(skip_serializing_if = "ShipmentExtra::is_empty")]
    pub extra: ShipmentExtra,
    /// `false` makes the service block until every rate is ready.
    #[serde(rename = "async")]
    pub run_async: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Shipment {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address_from: Option<ObjectRef<Address>>,
    #[serde(default)]
    pub address_to: Option<ObjectRef<Address>>,
    #[serde(default)]
    pub parcels: Vec<ObjectRef<Parcel>>,
    #[serde(default)]
    pub customs_declaration: Option<ObjectRef<CustomsDeclaration>>,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub extra: ShipmentExtra,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectState {
    Valid,
    Invalid,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Waiting,
    Queued,
    Success,
    Error,
    Refunded,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Purchase request body.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TransactionRequest<'a> {
    pub rate: &'a str,
    #[serde(rename = "async")]
    pub run_async: bool,
}

/// Result of purchasing a rate.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Transaction {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_state: ObjectState,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub label_url: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub rate: Option<ObjectRef<Rate>>,
    #[serde(default)]
    pub parcel: Option<ObjectRef<Parcel>>,
}

impl Transaction {
    pub fn is_success(&self) -> bool {
        self.status == TransactionStatus::Success
    }

    pub fn tracking(&self) -> Option<&str> {
        self.tracking_number.as_deref().filter(|t| !t.is_empty())
    }

    pub fn label(&self) -> Option<&str> {
        self.label_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// One page of a list endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct Page<T> {
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}
