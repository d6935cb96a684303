// Rate selection: present the quotes of a shipment cheapest first and let
// the operator pick one.

use crate::error::ShipError;
use crate::models::{Rate, Shipment};
use crate::prompt::Prompter;
use anyhow::{Context, Result};

/// Quotes ordered by ascending price. The sort is stable, so equal prices
/// keep the order the service returned them in.
pub fn sort_rates(rates: &[Rate]) -> Vec<&Rate> {
    let mut sorted: Vec<&Rate> = rates.iter().collect();
    sorted.sort_by_key(|rate| rate.amount);
    sorted
}

/// Ask the operator to pick one of the shipment's rates.
///
/// Fails with [`ShipError::NoRates`] when the service returned no quotes.
pub fn choose_rate(prompter: &dyn Prompter, shipment: &Shipment) -> Result<Rate> {
    if shipment.rates.is_empty() {
        return Err(ShipError::NoRates.into());
    }
    let sorted = sort_rates(&shipment.rates);
    let labels: Vec<String> = sorted.iter().map(|rate| rate.describe()).collect();
    let index = prompter.select("What service do you want?", &labels, 0)?;
    sorted
        .get(index)
        .map(|rate| (*rate).clone())
        .context("Selected rate does not exist")
}
