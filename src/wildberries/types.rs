use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A shipment batch. Fields the client does not interpret are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Supply {
    /// `done` is read with JSON truthiness: absent, null, `false`, `0`, `""`,
    /// `[]` and `{}` all count as open.
    pub fn is_done(&self) -> bool {
        self.done.as_ref().is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// An assembly task, passed through as the API sent it. `id` is not required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// The numeric order id, when the task carries one.
    pub fn order_id(&self) -> Option<u64> {
        self.id.as_ref().and_then(Value::as_u64)
    }
}

/// The orders attached to one supply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyOrders {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Sticker images for a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stickers {
    #[serde(default)]
    pub stickers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuppliesPage {
    #[serde(default)]
    pub supplies: Vec<Supply>,
    #[serde(default)]
    pub next: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub next: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderStatuses {
    #[serde(default)]
    pub orders: Vec<Value>,
}
