//! Order document model.
//!
//! Orders are stored as schema-less JSONB documents. `Order` is the typed
//! view over one document: the known keys become fields, anything else is
//! carried through untouched in `extra`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

// -- Closed value sets --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Verified,
    Completed,
    Invalid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Verified,
        OrderStatus::Completed,
        OrderStatus::Invalid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Completed => "completed",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("status", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum OperatingSystem {
    #[default]
    #[serde(rename = "CentOS 7")]
    CentOs7,
    #[serde(rename = "Ubuntu 22")]
    Ubuntu22,
}

impl OperatingSystem {
    pub const ALL: [OperatingSystem; 2] = [OperatingSystem::CentOs7, OperatingSystem::Ubuntu22];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CentOs7 => "CentOS 7",
            Self::Ubuntu22 => "Ubuntu 22",
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatingSystem {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|os| os.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("os", s))
    }
}

/// A value outside one of the closed sets above.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {field} \"{value}\"")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

// -- Documents --

/// Raw row from the `orders` table.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Free-form descriptor; older documents store a bare number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub os: Option<OperatingSystem>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Keys the typed view does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Order {
    /// Memory descriptor rendered for display, whatever JSON type it was stored as.
    pub fn memory_label(&self) -> String {
        match &self.memory {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = serde_json::Error;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let mut fields = match row.document {
            Value::Object(map) => map,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "order {} is not a JSON object: {other}",
                    row.id
                )))
            }
        };
        fields.insert("_id".into(), Value::String(row.id.to_string()));
        fields.insert("createdAt".into(), Value::String(row.created_at.to_rfc3339()));
        fields.insert("updatedAt".into(), Value::String(row.updated_at.to_rfc3339()));
        serde_json::from_value(Value::Object(fields))
    }
}

/// Accept any JSON for a typed optional field, keeping only values that parse.
///
/// The store enforces no schema, so a bad value in one document must not
/// make the whole listing fail.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match s.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unparseable order field");
                None
            }
        },
        Some(other) => {
            tracing::warn!(value = %other, "Ignoring non-string order field");
            None
        }
    })
}

/// Like [`lenient`], for free-text fields: scalars are kept as their text.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(value) => {
            let text = scalar_text(&value);
            if text.is_none() {
                tracing::warn!(value = %value, "Ignoring non-scalar order field");
            }
            text
        }
    })
}

/// Text of a string, number or boolean. `None` for anything else.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// -- API bodies --

/// Body of `POST /api/orders/update`.
///
/// Fields stay as raw JSON so that validation can tell an absent key from an
/// explicit `null`, and so that a wrong-typed id or a falsy `os`/`status`
/// reaches the handler instead of failing extraction.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub username: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub password: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub os: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

/// `Some` for any key that is present, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Validated update: the fields written over an existing document.
///
/// Credentials are `None` when the body left them out, and `Some(None)` when
/// it sent an explicit `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPatch {
    pub id: Uuid,
    pub username: Option<Option<String>>,
    pub password: Option<Option<String>>,
    pub ip_address: Option<Option<String>>,
    pub os: OperatingSystem,
    pub status: OrderStatus,
}

impl OrderPatch {
    /// Keys merged into the stored document. Credentials the body left out
    /// are not written, so their stored values survive.
    pub fn document(&self) -> Value {
        let mut fields = Map::new();
        let credentials = [
            ("username", &self.username),
            ("password", &self.password),
            ("ipAddress", &self.ip_address),
        ];
        for (key, value) in credentials {
            if let Some(value) = value {
                fields.insert(key.to_string(), serde_json::json!(value));
            }
        }
        fields.insert("os".into(), Value::String(self.os.as_str().to_string()));
        fields.insert("status".into(), Value::String(self.status.as_str().to_string()));
        Value::Object(fields)
    }
}

/// Body returned by a successful update. `order` is `null` when the id matched nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderResponse {
    pub message: String,
    pub order: Option<Order>,
}
