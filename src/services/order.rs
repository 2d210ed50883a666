//! Order store operations: list-all, update-one and delete-one.
//!
//! Each operation performs a single statement against the `orders` table.
//! There is no locking between them; the last writer wins.

use std::str::FromStr;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{AppError, StoreError};
use crate::models::order::{
    scalar_text, OperatingSystem, Order, OrderPatch, OrderRow, OrderStatus, UnknownVariant,
    UpdateOrder,
};

/// Fetch every order, newest first by creation time.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Order>, StoreError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, document, created_at, updated_at
        FROM orders
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Order::try_from(row).map_err(StoreError::from))
        .collect()
}

/// Check an update body and fill in the `os`/`status` defaults.
///
/// Only the order id is mandatory, and it must be a UUID string. A falsy
/// `os` or `status` (absent, `null`, `false`, `0`, `""`) resets the stored
/// value to its default. Credentials are written only when present.
pub fn validate_update(input: UpdateOrder) -> Result<OrderPatch, AppError> {
    let id = match &input.order_id {
        Some(Value::String(id)) if !id.is_empty() => Uuid::parse_str(id).ok(),
        _ => None,
    }
    .ok_or_else(|| AppError::Validation("Invalid order ID".to_string()))?;

    Ok(OrderPatch {
        id,
        username: credential("username", input.username)?,
        password: credential("password", input.password)?,
        ip_address: credential("ipAddress", input.ip_address)?,
        os: closed_set::<OperatingSystem>(input.os)?,
        status: closed_set::<OrderStatus>(input.status)?,
    })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn closed_set<T>(value: Option<Value>) -> Result<T, AppError>
where
    T: FromStr<Err = UnknownVariant> + Default,
{
    match value {
        Some(value) if !is_falsy(&value) => {
            let text = scalar_text(&value).unwrap_or_else(|| value.to_string());
            text.parse::<T>().map_err(|e| AppError::Validation(e.to_string()))
        }
        _ => Ok(T::default()),
    }
}

/// Absent stays absent and `null` clears. Numbers and booleans are stored as text.
fn credential(field: &str, value: Option<Value>) -> Result<Option<Option<String>>, AppError> {
    match value {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(value) => scalar_text(&value)
            .map(|text| Some(Some(text)))
            .ok_or_else(|| AppError::Validation(format!("Invalid {field}"))),
    }
}

/// Merge the patch into the stored document and return the result.
///
/// Keys outside the patch, including credentials the body left out, are
/// left as they are. Returns `None` when no
/// order has the given id.
pub async fn update(pool: &PgPool, patch: &OrderPatch) -> Result<Option<Order>, StoreError> {
    let row = sqlx::query_as::<_, OrderRow>(
        r#"
        UPDATE orders
        SET document = document || $2, updated_at = now()
        WHERE id = $1
        RETURNING id, document, created_at, updated_at
        "#,
    )
    .bind(patch.id)
    .bind(patch.document())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(Order::try_from(row)?)),
        None => {
            tracing::debug!(order_id = %patch.id, "Update matched no order");
            Ok(None)
        }
    }
}

/// Delete an order by id. Deleting an id that does not exist succeeds.
pub async fn delete(pool: &PgPool, id: &str) -> Result<(), StoreError> {
    let id = Uuid::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))?;

    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(order_id = %id, deleted = result.rows_affected(), "Order delete executed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "0190f2b4-6a1e-7c3d-9f00-123456789abc";

    fn body() -> UpdateOrder {
        UpdateOrder {
            order_id: Some(json!(ID)),
            ..Default::default()
        }
    }

    #[test]
    fn missing_order_id_is_rejected() {
        let err = validate_update(UpdateOrder::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid order ID");
    }

    #[test]
    fn empty_malformed_and_non_string_order_ids_are_rejected() {
        let bad = [
            json!(""),
            json!("abc"),
            json!("507f1f77bcf86cd799439011"),
            json!(42),
            Value::Null,
            json!({ "id": ID }),
        ];
        for order_id in bad {
            let input = UpdateOrder {
                order_id: Some(order_id.clone()),
                ..Default::default()
            };
            let err = validate_update(input).unwrap_err();
            assert_eq!(err.to_string(), "Invalid order ID", "accepted {order_id}");
        }
    }

    #[test]
    fn falsy_os_and_status_fall_back_to_defaults() {
        for falsy in [json!(""), json!(false), json!(0), Value::Null] {
            let patch = validate_update(UpdateOrder {
                os: Some(falsy.clone()),
                status: Some(falsy),
                ..body()
            })
            .unwrap();
            assert_eq!(patch.os, OperatingSystem::CentOs7);
            assert_eq!(patch.status, OrderStatus::Pending);
        }

        let patch = validate_update(body()).unwrap();
        assert_eq!(patch.os, OperatingSystem::CentOs7);
        assert_eq!(patch.status, OrderStatus::Pending);
    }

    #[test]
    fn given_values_are_kept() {
        let patch = validate_update(UpdateOrder {
            username: Some(json!("admin")),
            password: Some(json!("")),
            ip_address: Some(json!("203.0.113.7")),
            os: Some(json!("Ubuntu 22")),
            status: Some(json!("completed")),
            ..body()
        })
        .unwrap();
        assert_eq!(patch.id.to_string(), ID);
        assert_eq!(patch.username, Some(Some("admin".to_string())));
        assert_eq!(patch.password, Some(Some(String::new())));
        assert_eq!(patch.ip_address, Some(Some("203.0.113.7".to_string())));
        assert_eq!(patch.os, OperatingSystem::Ubuntu22);
        assert_eq!(patch.status, OrderStatus::Completed);
    }

    #[test]
    fn credentials_left_out_are_not_written() {
        let patch = validate_update(UpdateOrder {
            username: Some(json!("root")),
            ip_address: Some(Value::Null),
            ..body()
        })
        .unwrap();
        let document = patch.document();
        assert_eq!(document["username"], "root");
        assert!(document.get("password").is_none());
        assert_eq!(document.get("ipAddress"), Some(&Value::Null));
    }

    #[test]
    fn scalar_credentials_are_stored_as_text() {
        let patch = validate_update(UpdateOrder {
            password: Some(json!(1234)),
            ..body()
        })
        .unwrap();
        assert_eq!(patch.password, Some(Some("1234".to_string())));

        let err = validate_update(UpdateOrder {
            username: Some(json!(["root"])),
            ..body()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid username");
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let err = validate_update(UpdateOrder {
            status: Some(json!("shipped")),
            ..body()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Unknown status \"shipped\"");

        let err = validate_update(UpdateOrder {
            os: Some(json!(true)),
            ..body()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Unknown os \"true\"");
    }
}
