//! Seed script for development — populates a fresh database with sample orders.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires the `DATABASE_URL` environment variable (reads .env).

use anyhow::Context;
use serde_json::json;
use sqlx::PgPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = orderdesk::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    orderdesk::db::migrate(&pool).await?;

    println!("=== orderdesk Seed Script ===");

    seed_orders(&pool).await?;

    println!("\n=== Seed complete! ===");

    Ok(())
}

async fn seed_orders(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] {count} orders already present");
        return Ok(());
    }

    // (document, created hours ago, updated hours ago)
    let samples: [(serde_json::Value, i32, i32); 4] = [
        (
            json!({
                "transactionId": "pi_3PmA1bLkdIwHu7ix0",
                "productName": "VPS Starter",
                "memory": "2GB",
                "username": "root",
                "password": "Xk9#pL2m",
                "ipAddress": "203.0.113.14",
                "os": "CentOS 7",
                "status": "completed"
            }),
            720,
            2,
        ),
        (
            json!({
                "transactionId": "pi_3PmB7cLkdIwHu7ix1",
                "productName": "VPS Standard",
                "memory": "4GB",
                "os": "Ubuntu 22",
                "status": "pending"
            }),
            30,
            30,
        ),
        (
            json!({
                "transactionId": "pi_3PmC2dLkdIwHu7ix2",
                "productName": "VPS Performance",
                "memory": "8GB",
                "username": "admin",
                "password": "Qr7!vN4t",
                "ipAddress": "198.51.100.77",
                "os": "Ubuntu 22",
                "status": "verified"
            }),
            200,
            5,
        ),
        (
            json!({
                "transactionId": "pi_3PmD9eLkdIwHu7ix3",
                "productName": "VPS Starter",
                "memory": 2048,
                "status": "invalid"
            }),
            1,
            1,
        ),
    ];

    for (document, created_hours_ago, updated_hours_ago) in &samples {
        sqlx::query(
            "INSERT INTO orders (document, created_at, updated_at)
             VALUES ($1, now() - make_interval(hours => $2), now() - make_interval(hours => $3))",
        )
        .bind(document)
        .bind(created_hours_ago)
        .bind(updated_hours_ago)
        .execute(pool)
        .await?;
    }

    println!("[done] Inserted {} sample orders", samples.len());
    Ok(())
}
