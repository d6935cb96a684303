// API client module: a small blocking HTTP client for the hosted shipping
// service. The workflows depend on the `ShippingService` trait only, so the
// client can be swapped for an in-memory stand-in.

use crate::error::ApiError;
use crate::models::{
    Address, CustomsDeclaration, CustomsDeclarationDraft, CustomsItem, Page, Parcel, Rate,
    Shipment, ShipmentRequest, Transaction, TransactionRequest,
};
use anyhow::{Context, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const DEFAULT_API_URL: &str = "https://api.goshippo.com";

/// Operations the workflows consume from the shipping service.
pub trait ShippingService {
    /// Create the address with validation requested; the returned copy
    /// carries `validation_results`.
    fn validate_address(&self, address: &Address) -> Result<Address, ApiError>;

    /// Addresses previously stored with the service (first page only).
    fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;

    fn create_customs_declaration(
        &self,
        draft: &CustomsDeclarationDraft,
    ) -> Result<CustomsDeclaration, ApiError>;

    /// Create a shipment. Requests are sent synchronously so the response
    /// already holds every rate quote.
    fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, ApiError>;

    /// Buy the label for a rate, blocking until the carrier answers.
    fn purchase_label(&self, rate_id: &str) -> Result<Transaction, ApiError>;

    /// Purchased labels (first page only).
    fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError>;

    fn retrieve_rate(&self, id: &str) -> Result<Rate, ApiError>;
    fn retrieve_parcel(&self, id: &str) -> Result<Parcel, ApiError>;
    fn retrieve_shipment(&self, id: &str) -> Result<Shipment, ApiError>;
    fn retrieve_customs_declaration(&self, id: &str) -> Result<CustomsDeclaration, ApiError>;
    fn retrieve_customs_item(&self, id: &str) -> Result<CustomsItem, ApiError>;
}

/// Client that holds a reqwest blocking client, the base URL of the API
/// and the token used on every call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// Body of the address creation call.
#[derive(Serialize)]
struct ValidateAddressRequest<'a> {
    #[serde(flatten)]
    address: &'a Address,
    validate: bool,
}

impl ApiClient {
    /// Build a client for `base_url`, authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("ShippoToken {}", api_key))
            .context("The API key contains characters that cannot be sent in a header")?;
        headers.insert(AUTHORIZATION, token);
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("shippo-it/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, what: &'static str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        self.send(self.client.get(&url), what)
    }

    fn post<B, T>(&self, path: &str, body: &B, what: &'static str) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);
        self.send(self.client.post(&url).json(body), what)
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let res = request.send()?;
        debug!("{} -> {}", what, res.status());
        Self::read(res, what)
    }

    /// Turn a non-success status into `ApiError::Status` with the body the
    /// server sent, otherwise decode the JSON payload.
    fn read<T: DeserializeOwned>(res: Response, what: &'static str) -> Result<T, ApiError> {
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        res.json()
            .map_err(|source| ApiError::Decode { what, source })
    }
}

/// Objects that later requests refer to by id must come back with one.
pub fn require_id<'a>(id: Option<&'a str>, what: &'static str) -> Result<&'a str, ApiError> {
    id.filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingId(what))
}

impl ShippingService for ApiClient {
    fn validate_address(&self, address: &Address) -> Result<Address, ApiError> {
        let body = ValidateAddressRequest {
            address,
            validate: true,
        };
        self.post("addresses/", &body, "address")
    }

    fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let page: Page<Address> = self.get("addresses/", "address list")?;
        if page.next.is_some() {
            debug!("more stored addresses exist beyond the first page");
        }
        Ok(page.results)
    }

    fn create_customs_declaration(
        &self,
        draft: &CustomsDeclarationDraft,
    ) -> Result<CustomsDeclaration, ApiError> {
        let declaration: CustomsDeclaration =
            self.post("customs/declarations/", draft, "customs declaration")?;
        require_id(declaration.object_id.as_deref(), "customs declaration")?;
        Ok(declaration)
    }

    fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, ApiError> {
        self.post("shipments/", request, "shipment")
    }

    fn purchase_label(&self, rate_id: &str) -> Result<Transaction, ApiError> {
        let body = TransactionRequest {
            rate: rate_id,
            run_async: false,
        };
        self.post("transactions/", &body, "transaction")
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        let page: Page<Transaction> = self.get("transactions/", "transaction list")?;
        if page.next.is_some() {
            debug!("more transactions exist beyond the first page");
        }
        Ok(page.results)
    }

    fn retrieve_rate(&self, id: &str) -> Result<Rate, ApiError> {
        self.get(&format!("rates/{}", id), "rate")
    }

    fn retrieve_parcel(&self, id: &str) -> Result<Parcel, ApiError> {
        self.get(&format!("parcels/{}", id), "parcel")
    }

    fn retrieve_shipment(&self, id: &str) -> Result<Shipment, ApiError> {
        self.get(&format!("shipments/{}", id), "shipment")
    }

    fn retrieve_customs_declaration(&self, id: &str) -> Result<CustomsDeclaration, ApiError> {
        self.get(&format!("customs/declarations/{}", id), "customs declaration")
    }

    fn retrieve_customs_item(&self, id: &str) -> Result<CustomsItem, ApiError> {
        self.get(&format!("customs/items/{}", id), "customs item")
    }
}
