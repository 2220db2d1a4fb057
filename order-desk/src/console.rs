//! Operator console commands
//!
//! Each command runs inside the logged-in session and the session is
//! closed afterwards, whether the command succeeded or not.

use crate::{CatalogSnapshot, OrderListReconciler};
use anyhow::{Context, bail};
use sales_client::{AuthService, HttpClient};
use shared::OrderStatus;

pub const USAGE: &str = "Usage: order-desk <catalog | orders [--name TEXT] [STATUS...] | stats>";

/// Runs one command, then logs out
pub async fn run_command(auth: &AuthService, command: &str, args: &[String]) -> anyhow::Result<()> {
    let result = execute(command, args, auth.http()).await;
    if let Err(e) = &result {
        tracing::error!(command, error = %e, "Command failed");
    }
    auth.logout(None);
    result
}

async fn execute(command: &str, args: &[String], http: &HttpClient) -> anyhow::Result<()> {
    match command {
        "catalog" => {
            let catalog = CatalogSnapshot::load(http).await?;
            for product in catalog.products() {
                tracing::info!(id = product.id, name = %product.name, price = %product.unit_price, "Product");
            }
            tracing::info!(count = catalog.len(), "Catalog loaded");
        }
        "orders" => {
            let (name, statuses) = parse_order_filters(args)?;
            let mut reconciler = OrderListReconciler::new(http.clone());
            reconciler.refresh().await?;
            let orders = reconciler.select(name.as_deref().unwrap_or_default(), &statuses);
            for order in &orders {
                tracing::info!(
                    id = order.id,
                    customer = %order.full_name,
                    city = %order.city,
                    status = %order.order_status,
                    total = %order.total_amount,
                    created_at = %order.created_at,
                    "Order"
                );
            }
            tracing::info!(count = orders.len(), "Orders listed");
        }
        "stats" => {
            let mut reconciler = OrderListReconciler::new(http.clone());
            reconciler.refresh().await?;
            let stats = reconciler.stats();
            for (status, count) in &stats.by_status {
                tracing::info!(status = %status, count, "Orders by status");
            }
            tracing::info!(
                total = stats.total_orders,
                revenue = %stats.revenue,
                average = %stats.average_order_value,
                "Order statistics"
            );
        }
        other => bail!("Unknown command '{other}'. {USAGE}"),
    }
    Ok(())
}

/// `[--name TEXT] [STATUS...]`
fn parse_order_filters(args: &[String]) -> anyhow::Result<(Option<String>, Vec<OrderStatus>)> {
    let mut name = None;
    let mut statuses = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--name" {
            let value = iter.next().context("--name needs a value")?;
            name = Some(value.clone());
        } else {
            statuses.push(parse_status(arg)?);
        }
    }
    Ok((name, statuses))
}

fn parse_status(arg: &str) -> anyhow::Result<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(arg))
        .with_context(|| format!("Unknown order status '{arg}'"))
}
