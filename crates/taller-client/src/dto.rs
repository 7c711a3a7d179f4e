//! # Wire DTOs
//!
//! JSON shapes returned by the console API and their mapping into engine
//! types.
//!
//! ## Mapping
//! ```text
//! ┌──────────────────────────────┐          ┌──────────────────────────────┐
//! │ GET /compras                 │          │ Transaction                  │
//! │   id_compra          ────────┼─────────►│   id                         │
//! │   fecha_compra       ────────┼─────────►│   date (RecordDate)          │
//! │   id_proveedor       ────────┼─────────►│   header_entity_id           │
//! │   total ("150.00")   ────────┼─────────►│   total (Money, cents)       │
//! │   detalleComprasCompra[] ────┼─────────►│   line_items[]               │
//! │     id_insumo, cantidad      │          │     item_entity_id, quantity │
//! │   proveedorCompra.nombre ────┼──► provider directory (embedded name)   │
//! └──────────────────────────────┘          └──────────────────────────────┘
//!   GET /ventas: id_venta, fecha_venta, id_cliente, total,
//!                detalles[] { id_producto, cantidad }
//! ```
//!
//! The backend is loose with types: ids arrive as numbers or strings, money
//! as `"150.00"` or `150`. Everything is normalized to strings and integer
//! cents here so the engine never sees the difference.
//!
//! Lists are decoded one record at a time ([`decode_records`]), so a record
//! that cannot be read is dropped with a warning and the rest still report.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use taller_core::{EntityRef, LineItem, Money, RecordDate, Transaction};

// =============================================================================
// Loose Scalars
// =============================================================================

/// A scalar that may arrive as a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Number(serde_json::Number),
    Text(String),
}

impl WireScalar {
    /// Canonical id string: numbers print without quotes, text is trimmed.
    pub fn to_id(&self) -> String {
        match self {
            WireScalar::Number(n) => n.to_string(),
            WireScalar::Text(s) => s.trim().to_string(),
        }
    }

    /// Reads the value as money. `None` when it is not a decimal amount.
    pub fn to_money(&self) -> Option<Money> {
        match self {
            WireScalar::Number(n) => n.to_string().parse().ok(),
            WireScalar::Text(s) => s.parse().ok(),
        }
    }

    /// Reads the value as a whole quantity, rounding fractional input.
    ///
    /// `None` for non-finite values and for values outside the `i64` range.
    pub fn to_quantity(&self) -> Option<i64> {
        match self {
            WireScalar::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(rounded_quantity)),
            WireScalar::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(rounded_quantity))
            }
        }
    }
}

/// Rounds a float quantity, refusing anything an `i64` cannot hold.
fn rounded_quantity(value: f64) -> Option<i64> {
    let rounded = value.round();
    // 2^63 is the first float past i64::MAX
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Reads a record date. Strings pass through; any other non-null value is
/// kept as its JSON text so it surfaces as an unreadable date.
fn loose_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Decodes a JSON list one record at a time.
///
/// A record that does not decode as `T` is logged and dropped; the others
/// are returned in their original order.
pub fn decode_records<T: DeserializeOwned>(kind: &str, rows: Vec<Value>) -> Vec<T> {
    let received = rows.len();
    let records: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(kind, index, error = %e, "Skipping unreadable record");
                None
            }
        })
        .collect();

    debug!(kind, received, decoded = records.len(), "Records decoded");
    records
}

fn id_or_empty(value: &Option<WireScalar>) -> String {
    value.as_ref().map(WireScalar::to_id).unwrap_or_default()
}

/// Reads a transaction total; missing or unreadable totals count as zero.
fn total_or_zero(kind: &str, id: &str, total: &Option<WireScalar>) -> Money {
    match total {
        Some(raw) => raw.to_money().unwrap_or_else(|| {
            warn!(kind, id, raw = ?raw, "Unreadable total, counting as zero");
            Money::zero()
        }),
        None => {
            warn!(kind, id, "Missing total, counting as zero");
            Money::zero()
        }
    }
}

/// Reads a line quantity; a missing quantity counts as zero.
fn quantity_or_zero(kind: &str, id: &str, quantity: &Option<WireScalar>) -> i64 {
    match quantity {
        Some(raw) => raw.to_quantity().unwrap_or_else(|| {
            warn!(kind, id, raw = ?raw, "Unreadable quantity, counting as zero");
            0
        }),
        None => 0,
    }
}

// =============================================================================
// Purchases (GET /compras)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseDto {
    pub id_compra: WireScalar,
    #[serde(default, deserialize_with = "loose_date")]
    pub fecha_compra: Option<String>,
    #[serde(default)]
    pub id_proveedor: Option<WireScalar>,
    #[serde(default)]
    pub total: Option<WireScalar>,
    #[serde(default, rename = "detalleComprasCompra")]
    pub detalle: Option<Vec<PurchaseLineDto>>,
    #[serde(default, rename = "proveedorCompra")]
    pub proveedor: Option<NamedDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseLineDto {
    #[serde(default)]
    pub id_insumo: Option<WireScalar>,
    #[serde(default)]
    pub cantidad: Option<WireScalar>,
    #[serde(default)]
    pub precio_unitario: Option<WireScalar>,
}

/// An embedded `{ nombre }` object.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedDto {
    #[serde(default)]
    pub nombre: Option<String>,
}

impl PurchaseDto {
    /// The provider name embedded in the purchase, if any.
    pub fn embedded_provider(&self) -> Option<EntityRef> {
        let id = self.id_proveedor.as_ref()?.to_id();
        let name = self.proveedor.as_ref()?.nombre.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(EntityRef::new(id, name))
    }

    pub fn into_transaction(self) -> Transaction {
        let id = self.id_compra.to_id();
        let total = total_or_zero("purchase", &id, &self.total);
        let line_items = self
            .detalle
            .unwrap_or_default()
            .iter()
            .map(|line| LineItem {
                item_entity_id: id_or_empty(&line.id_insumo),
                quantity: quantity_or_zero("purchase", &id, &line.cantidad),
                unit_price: line.precio_unitario.as_ref().and_then(WireScalar::to_money),
            })
            .collect();

        Transaction {
            date: RecordDate::parse(self.fecha_compra.as_deref()),
            header_entity_id: id_or_empty(&self.id_proveedor),
            total,
            line_items,
            id,
        }
    }
}

// =============================================================================
// Sales (GET /ventas)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SaleDto {
    pub id_venta: WireScalar,
    #[serde(default, deserialize_with = "loose_date")]
    pub fecha_venta: Option<String>,
    #[serde(default)]
    pub id_cliente: Option<WireScalar>,
    #[serde(default)]
    pub total: Option<WireScalar>,
    #[serde(default)]
    pub detalles: Option<Vec<SaleLineDto>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleLineDto {
    #[serde(default)]
    pub id_producto: Option<WireScalar>,
    #[serde(default)]
    pub cantidad: Option<WireScalar>,
    #[serde(default)]
    pub precio_unitario: Option<WireScalar>,
}

impl SaleDto {
    pub fn into_transaction(self) -> Transaction {
        let id = self.id_venta.to_id();
        let total = total_or_zero("sale", &id, &self.total);
        let line_items = self
            .detalles
            .unwrap_or_default()
            .iter()
            .map(|line| LineItem {
                item_entity_id: id_or_empty(&line.id_producto),
                quantity: quantity_or_zero("sale", &id, &line.cantidad),
                unit_price: line.precio_unitario.as_ref().and_then(WireScalar::to_money),
            })
            .collect();

        Transaction {
            date: RecordDate::parse(self.fecha_venta.as_deref()),
            header_entity_id: id_or_empty(&self.id_cliente),
            total,
            line_items,
            id,
        }
    }
}

// =============================================================================
// Entity Lists (GET /insumos, /productos, /proveedores, /clientes)
// =============================================================================

/// Extracts `{ <id_key>, nombre }` pairs from an entity list.
///
/// Entity rows carry other columns (prices, phone numbers, foreign ids), so
/// rows are read as loose JSON and only the two needed fields are looked at.
/// Rows without an id or a name are skipped.
pub fn entities_from_rows(rows: &[Value], id_key: &str) -> Vec<EntityRef> {
    rows.iter()
        .filter_map(|row| {
            let id = match row.get(id_key)? {
                Value::Number(n) => n.to_string(),
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => return None,
            };
            let name = row.get("nombre")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(EntityRef::new(id, name))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
