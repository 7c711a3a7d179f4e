//! # API Client
//!
//! Async HTTP access to the console backend.
//!
//! ## Snapshot Fetch
//! ```text
//! fetch_snapshot(Purchases)
//!   │
//!   ├── GET {base}/compras ──────┐
//!   ├── GET {base}/insumos ──────┼── tokio::try_join! (first error wins)
//!   └── GET {base}/proveedores ──┘
//!   │
//!   ▼
//! Snapshot { transactions, items: EntityDirectory, headers: EntityDirectory }
//! ```
//!
//! Either all three requests succeed or the whole fetch fails with a
//! [`ClientError`]. Each request is bounded by the client timeout.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use taller_core::{EntityDirectory, EntityRef, ReportKind, Transaction};

use crate::dto::{decode_records, entities_from_rows, PurchaseDto, SaleDto};
use crate::error::{ClientError, ClientResult};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Endpoints
// =============================================================================

/// Paths and id columns used for one report kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub transactions: &'static str,
    pub items: &'static str,
    pub item_id_key: &'static str,
    pub headers: &'static str,
    pub header_id_key: &'static str,
}

impl Endpoints {
    pub fn for_kind(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Purchases => Endpoints {
                transactions: "compras",
                items: "insumos",
                item_id_key: "id_insumo",
                headers: "proveedores",
                header_id_key: "id_proveedor",
            },
            ReportKind::Sales => Endpoints {
                transactions: "ventas",
                items: "productos",
                item_id_key: "id_producto",
                headers: "clientes",
                header_id_key: "id_cliente",
            },
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything one report needs, fetched together.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    /// Supplies (purchases) or products (sales).
    pub items: EntityDirectory,
    /// Providers (purchases) or clients (sales).
    pub headers: EntityDirectory,
}

// =============================================================================
// Client
// =============================================================================

/// Client for the console REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:3000/api`).
    ///
    /// ## Errors
    /// - [`ClientError::InvalidUrl`] if `base_url` is not an absolute
    ///   http(s) URL
    /// - [`ClientError::RequestFailed`] if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let mut parsed =
            Url::parse(base_url.trim()).map_err(|e| ClientError::invalid_url(base_url, e))?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ClientError::invalid_url(base_url, "expected an http(s) URL"));
        }

        // join() replaces the last segment unless the path ends in '/'
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ClientError::RequestFailed {
                url: parsed.to_string(),
                message: e.to_string(),
            })?;

        debug!(base_url = %parsed, timeout_ms = timeout.as_millis() as u64, "API client created");

        Ok(Self {
            http,
            base_url: parsed,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::invalid_url(path, e))
    }

    /// GETs `path` and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.endpoint(path)?;
        let url_str = url.to_string();

        debug!(url = %url_str, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&url_str, e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                url: url_str,
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(&url_str, e, self.timeout))?;

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            url: url_str,
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// `GET /compras`. Unreadable records are dropped with a warning.
    pub async fn purchases(&self) -> ClientResult<Vec<PurchaseDto>> {
        let rows: Vec<Value> = self
            .get_json(Endpoints::for_kind(ReportKind::Purchases).transactions)
            .await?;
        Ok(decode_records("purchase", rows))
    }

    /// `GET /ventas`. Unreadable records are dropped with a warning.
    pub async fn sales(&self) -> ClientResult<Vec<SaleDto>> {
        let rows: Vec<Value> = self
            .get_json(Endpoints::for_kind(ReportKind::Sales).transactions)
            .await?;
        Ok(decode_records("sale", rows))
    }

    /// GETs an entity list and keeps its `{ id_key, nombre }` pairs.
    pub async fn entities(&self, path: &str, id_key: &str) -> ClientResult<Vec<EntityRef>> {
        let rows: Vec<Value> = self.get_json(path).await?;
        let entities = entities_from_rows(&rows, id_key);
        debug!(path, rows = rows.len(), entities = entities.len(), "Entity list fetched");
        Ok(entities)
    }

    /// Fetches the transactions of `kind`, normalized.
    ///
    /// Also returns the header names embedded in the records (purchases carry
    /// their provider's name).
    pub async fn transactions(&self, kind: ReportKind) -> ClientResult<(Vec<Transaction>, Vec<EntityRef>)> {
        match kind {
            ReportKind::Purchases => {
                let dtos = self.purchases().await?;
                let embedded = dtos.iter().filter_map(PurchaseDto::embedded_provider).collect();
                let transactions = dtos.into_iter().map(PurchaseDto::into_transaction).collect();
                Ok((transactions, embedded))
            }
            ReportKind::Sales => {
                let dtos = self.sales().await?;
                let transactions = dtos.into_iter().map(SaleDto::into_transaction).collect();
                Ok((transactions, Vec::new()))
            }
        }
    }

    /// Fetches transactions and both entity directories concurrently.
    ///
    /// Listed entity names take precedence over names embedded in records.
    pub async fn fetch_snapshot(&self, kind: ReportKind) -> ClientResult<Snapshot> {
        let endpoints = Endpoints::for_kind(kind);

        let ((transactions, embedded), items, headers) = tokio::try_join!(
            self.transactions(kind),
            self.entities(endpoints.items, endpoints.item_id_key),
            self.entities(endpoints.headers, endpoints.header_id_key),
        )?;

        let mut header_directory = EntityDirectory::from_entities(headers);
        for entity in embedded {
            header_directory.insert_if_absent(entity);
        }

        let snapshot = Snapshot {
            transactions,
            items: EntityDirectory::from_entities(items),
            headers: header_directory,
        };

        info!(
            %kind,
            transactions = snapshot.transactions.len(),
            items = snapshot.items.len(),
            headers = snapshot.headers.len(),
            "Snapshot fetched"
        );

        Ok(snapshot)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
