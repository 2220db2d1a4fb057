//! order-desk — operator console for the sales order API
//!
//! Commands:
//! - `catalog`  list purchasable products
//! - `orders [--name TEXT] [STATUS...]`  list orders, optionally filtered by
//!   customer name and status
//! - `stats`    order counts and revenue

use order_desk::console::{self, USAGE};
use order_desk::logger::init_logger_with_file;
use order_desk::{DeskConfig, Route};
use sales_client::{AuthService, HttpClient, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = DeskConfig::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let session = Session::shared();
    let http = HttpClient::from_config(&config.client, session.clone())?;
    let auth = AuthService::new(http);

    let credentials = config.credentials()?;
    let user = match auth.login(&credentials).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            return Err(e.into());
        }
    };
    tracing::info!(
        user = %user.username,
        landing = %Route::after_login(&user, session.take_destination().as_deref()),
        base_url = %config.client.base_url,
        "Session started"
    );

    console::run_command(&auth, command, &args[1..]).await
}
