//! Terminal dashboard for the orders API.
//!
//! Usage:
//!   `dashboard list [--status pending] [--os "Ubuntu 22"] [--search vps] [--range week]`
//!   `dashboard update <ID> [--username ..] [--password ..] [--ip-address ..] [--os ..] [--status ..]`
//!   `dashboard delete <ID> [--yes]`
//!
//! The API base URL comes from `--base-url` or `ORDERDESK_URL`.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use orderdesk::dashboard::{relative_time, DashboardState, DateRange, DraftEdit, OrdersClient};
use orderdesk::models::order::{OperatingSystem, Order, OrderStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "dashboard", about = "Orders admin dashboard")]
struct Cli {
    /// Base URL of the orderdesk API.
    #[arg(long, env = "ORDERDESK_URL", default_value = "http://localhost:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show metrics and the filtered order table.
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        os: Option<OperatingSystem>,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        range: DateRange,
    },
    /// Edit credentials, OS or status of one order.
    Update {
        id: Uuid,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        ip_address: Option<String>,
        #[arg(long)]
        os: Option<OperatingSystem>,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Delete one order after confirmation.
    Delete {
        id: Uuid,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "orderdesk=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let client = OrdersClient::new(cli.base_url);
    let mut state = DashboardState::new();

    match client.list_all().await {
        Ok(orders) => state.load(orders),
        Err(e) => {
            state.load_failed();
            tracing::error!(error = %e, "Failed to load orders");
            return Err(e.into());
        }
    }

    match cli.command {
        Command::List {
            status,
            os,
            search,
            range,
        } => {
            state.filters.status = status;
            state.filters.os = os;
            state.filters.search = search;
            state.filters.date_range = range;
            print_dashboard(&state);
        }
        Command::Update {
            id,
            username,
            password,
            ip_address,
            os,
            status,
        } => {
            if state.select(id).is_none() {
                bail!("No order with id {id}");
            }
            let edits = [
                ip_address.map(DraftEdit::IpAddress),
                username.map(DraftEdit::Username),
                password.map(DraftEdit::Password),
                os.map(DraftEdit::Os),
                status.map(DraftEdit::Status),
            ];
            for edit in edits.into_iter().flatten() {
                state.edit(edit);
            }

            let body = state.save_request().context("No order selected")?;
            if let Err(e) = client.update(&body).await {
                tracing::error!(error = %e, order_id = %id, "Error updating order");
                return Err(e.into());
            }
            state.commit_saved();
            println!("Order updated successfully");
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this order?")? {
                return Ok(());
            }
            if let Err(e) = client.delete(id).await {
                tracing::error!(error = %e, order_id = %id, "Error deleting order");
                return Err(e.into());
            }
            state.remove(id);
            println!("Order deleted successfully");
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_dashboard(state: &DashboardState) {
    let metrics = state.metrics();
    println!("Orders Dashboard");
    println!(
        "Total Orders: {}  Completed: {}  Pending: {}  Verified: {}  Invalid: {}",
        metrics.total, metrics.completed, metrics.pending, metrics.verified, metrics.invalid
    );
    println!();

    let rows = state.filtered(&Local::now());
    if rows.is_empty() {
        println!("No orders match your filters.");
        return;
    }

    println!(
        "{:<36}  {:<24}  {:<18}  {:<8}  {:<10}  {:<10}  {}",
        "ID", "Payment ID", "Product Name", "Memory", "Status", "OS", "Last Updated"
    );
    let now = Utc::now();
    for order in rows {
        print_row(order, now);
    }
}

fn print_row(order: &Order, now: chrono::DateTime<Utc>) {
    println!(
        "{:<36}  {:<24}  {:<18}  {:<8}  {:<10}  {:<10}  {}",
        order.id,
        order.transaction_id.as_deref().unwrap_or(""),
        order.product_name.as_deref().unwrap_or(""),
        order.memory_label(),
        order.status.map(|s| s.as_str()).unwrap_or(""),
        order.os.map(|os| os.as_str()).unwrap_or(""),
        relative_time(order.updated_at, now),
    );
}
