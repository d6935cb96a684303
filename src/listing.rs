// Listing of purchased labels: each valid transaction is joined with its
// rate, parcel, shipment and customs declaration and printed as a summary.

use crate::api::ShippingService;
use crate::error::ApiError;
use crate::models::{
    Address, CustomsDeclaration, CustomsItem, ObjectRef, ObjectState, Parcel, Rate, Shipment,
    Transaction,
};
use crate::session::Session;
use crate::ui::{with_spinner, Next};
use anyhow::Result;
use log::debug;
use std::fmt;

/// A purchased label and the objects it refers to.
#[derive(Debug, Clone)]
pub struct OutgoingShipment {
    pub transaction: Transaction,
    pub rate: Option<Rate>,
    pub parcel: Option<Parcel>,
    pub shipment: Option<Shipment>,
    pub customs: Option<(CustomsDeclaration, Vec<CustomsItem>)>,
}

/// Fetch every transaction in state VALID along with its related objects.
pub fn collect_outgoing(service: &dyn ShippingService) -> Result<Vec<OutgoingShipment>, ApiError> {
    let mut outgoing = Vec::new();
    for transaction in service.list_transactions()? {
        if transaction.object_state != ObjectState::Valid {
            debug!(
                "skipping transaction {:?} in state {:?}",
                transaction.object_id, transaction.object_state
            );
            continue;
        }
        outgoing.push(resolve(service, transaction)?);
    }
    Ok(outgoing)
}

fn resolve(service: &dyn ShippingService, transaction: Transaction) -> Result<OutgoingShipment, ApiError> {
    let rate = transaction
        .rate
        .as_ref()
        .map(|r| r.resolve(|id| service.retrieve_rate(id)))
        .transpose()?;
    let parcel = transaction
        .parcel
        .as_ref()
        .map(|p| p.resolve(|id| service.retrieve_parcel(id)))
        .transpose()?;
    let shipment = rate
        .as_ref()
        .and_then(|r| r.shipment.as_deref())
        .map(|id| service.retrieve_shipment(id))
        .transpose()?;
    let customs = match shipment
        .as_ref()
        .and_then(|s| s.customs_declaration.as_ref())
    {
        Some(reference) => {
            let declaration = reference.resolve(|id| service.retrieve_customs_declaration(id))?;
            let items = declaration
                .items
                .iter()
                .map(|item| item.resolve(|id| service.retrieve_customs_item(id)))
                .collect::<Result<Vec<_>, ApiError>>()?;
            Some((declaration, items))
        }
        None => None,
    };
    Ok(OutgoingShipment {
        transaction,
        rate,
        parcel,
        shipment,
        customs,
    })
}

fn describe_address(address: Option<&ObjectRef<Address>>) -> String {
    match address {
        Some(ObjectRef::Object(address)) => address.one_line(),
        Some(ObjectRef::Id(id)) => id.clone(),
        None => "unknown".into(),
    }
}

impl fmt::Display for OutgoingShipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = &self.transaction;
        writeln!(
            f,
            "Tracking {} ({:?})",
            tx.tracking().unwrap_or("(none)"),
            tx.status
        )?;
        if let Some(url) = tx.label() {
            writeln!(f, "  Label: {}", url)?;
        }
        if let Some(shipment) = &self.shipment {
            writeln!(f, "  From: {}", describe_address(shipment.address_from.as_ref()))?;
            writeln!(f, "  To: {}", describe_address(shipment.address_to.as_ref()))?;
            if shipment.extra.is_return {
                writeln!(f, "  Return label")?;
            }
        }
        if let Some(parcel) = &self.parcel {
            writeln!(f, "  Parcel: {}", parcel)?;
        }
        if let Some(rate) = &self.rate {
            writeln!(f, "  Service: {}", rate.describe())?;
        }
        if let Some((declaration, items)) = &self.customs {
            writeln!(
                f,
                "  Customs: {} ({}), signed by {}",
                declaration.contents_type.as_str(),
                declaration.contents_explanation,
                declaration.certify_signer
            )?;
            for item in items {
                writeln!(f, "    - {}", item)?;
            }
        }
        Ok(())
    }
}

/// Print a summary of every purchased label.
pub fn list_outgoing(session: &Session<'_>) -> Result<Next> {
    let outgoing = with_spinner("Fetching sent packages...", || {
        collect_outgoing(session.service)
    })?;
    if outgoing.is_empty() {
        println!("No purchased labels found.");
    }
    for shipment in &outgoing {
        println!("{}", shipment);
    }
    Ok(Next::Menu)
}
