// Library root
// -----------
// The binary (`main.rs`) loads the configuration, builds an `ApiClient` and
// hands a `Session` to the interactive menu in `ui`.
//
// Module responsibilities:
// - `api`: the `ShippingService` seam and its HTTP client.
// - `models`, `error`, `config`: data shapes, error types, YAML settings.
// - `prompt`, `validate`: the terminal question surface and field checks.
// - `address`, `parcel`, `customs`, `rates`: the workflows that collect one
//   piece of a shipment each.
// - `ship`, `listing`, `ui`: the actions offered in the menu.
pub mod address;
pub mod api;
pub mod config;
pub mod customs;
pub mod error;
pub mod listing;
pub mod models;
pub mod parcel;
pub mod prompt;
pub mod rates;
pub mod session;
pub mod ship;
pub mod ui;
pub mod validate;

#[cfg(test)]
mod testing;
