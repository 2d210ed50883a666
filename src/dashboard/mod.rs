//! Client-side dashboard state for the orders admin view.
//!
//! The dashboard loads the full order list once, derives per-status
//! metrics and a filtered view locally, and edits one order at a time
//! through a draft copy. Saves and deletes are reconciled optimistically:
//! the local list is updated from the submitted draft, not from the
//! server's reply.

pub mod client;
pub mod filters;
pub mod relative_time;

pub use client::{ClientError, OrdersClient};
pub use filters::{DateRange, OrderFilters};
pub use relative_time::relative_time;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::order::{OperatingSystem, Order, OrderStatus, UpdateOrder};

/// Order counts shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderMetrics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub verified: usize,
    pub invalid: usize,
}

impl OrderMetrics {
    /// Count orders per status in one pass. Orders without a known status
    /// only add to `total`.
    pub fn tally(orders: &[Order]) -> Self {
        orders.iter().fold(
            Self {
                total: orders.len(),
                ..Self::default()
            },
            |mut metrics, order| {
                match order.status {
                    Some(OrderStatus::Completed) => metrics.completed += 1,
                    Some(OrderStatus::Pending) => metrics.pending += 1,
                    Some(OrderStatus::Verified) => metrics.verified += 1,
                    Some(OrderStatus::Invalid) => metrics.invalid += 1,
                    None => {}
                }
                metrics
            },
        )
    }
}

/// A single edit applied to the open draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    IpAddress(String),
    Username(String),
    Password(String),
    Os(OperatingSystem),
    Status(OrderStatus),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    orders: Vec<Order>,
    pub filters: OrderFilters,
    draft: Option<Order>,
    loading: bool,
    metrics: OrderMetrics,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    /// Empty state, waiting for the first load.
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            filters: OrderFilters::default(),
            draft: None,
            loading: true,
            metrics: OrderMetrics::default(),
        }
    }

    /// Replace the list with a fresh fetch, most recently updated first.
    pub fn load(&mut self, mut orders: Vec<Order>) {
        orders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.metrics = OrderMetrics::tally(&orders);
        self.orders = orders;
        self.loading = false;
    }

    /// The fetch failed; stop loading and keep whatever was there.
    pub fn load_failed(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn metrics(&self) -> OrderMetrics {
        self.metrics
    }

    /// Orders passing the current filters, evaluated against `now`.
    pub fn filtered<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<&Order> {
        self.filters.apply(&self.orders, now)
    }

    // -- Edit flow --

    /// Open a draft copy of the order with `id`.
    pub fn select(&mut self, id: Uuid) -> Option<&Order> {
        let order = self.orders.iter().find(|o| o.id == id)?.clone();
        self.draft = Some(order);
        self.draft.as_ref()
    }

    pub fn draft(&self) -> Option<&Order> {
        self.draft.as_ref()
    }

    /// Apply an edit to the draft only. Returns `false` when no draft is open.
    pub fn edit(&mut self, edit: DraftEdit) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        match edit {
            DraftEdit::IpAddress(v) => draft.ip_address = Some(v),
            DraftEdit::Username(v) => draft.username = Some(v),
            DraftEdit::Password(v) => draft.password = Some(v),
            DraftEdit::Os(os) => draft.os = Some(os),
            DraftEdit::Status(status) => draft.status = Some(status),
        }
        true
    }

    /// Update body for the open draft.
    pub fn save_request(&self) -> Option<UpdateOrder> {
        let draft = self.draft.as_ref()?;
        Some(UpdateOrder {
            order_id: Some(draft.id.to_string().into()),
            username: draft.username.clone().map(Value::from),
            password: draft.password.clone().map(Value::from),
            ip_address: draft.ip_address.clone().map(Value::from),
            os: draft.os.map(|os| os.as_str().into()),
            status: draft.status.map(|status| status.as_str().into()),
        })
    }

    /// Record a successful save: the draft replaces its row and is closed.
    pub fn commit_saved(&mut self) -> Option<Uuid> {
        let draft = self.draft.take()?;
        let id = draft.id;
        if let Some(row) = self.orders.iter_mut().find(|o| o.id == id) {
            *row = draft;
        }
        self.metrics = OrderMetrics::tally(&self.orders);
        Some(id)
    }

    /// Close the draft without saving.
    pub fn cancel(&mut self) {
        self.draft = None;
    }

    // -- Delete flow --

    /// Drop a deleted order from the list. Returns `false` if it was not listed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        self.metrics = OrderMetrics::tally(&self.orders);
        self.orders.len() != before
    }
}
