/// EdTech identifier resolver service
use anyhow::Context;
use edtechid_resolver::{config::ServerConfig, context::AppContext, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("failed to load configuration")?;

    init_logging(&config);
    print_banner();

    let ctx = AppContext::new(config)
        .await
        .context("failed to initialize application context")?;

    server::serve(ctx).await.context("server terminated")?;

    Ok(())
}

fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn print_banner() {
    println!(
        r#"
    ___  ____    _____ ____ ____  _   _ ___ ____
   / _ \|  _ \  |_   _/ ___|  _ \| | | |_ _|  _ \
  |  __/| |_) |   | || |   | |_) | |_| || || | | |
   \___||____/    |_| \____|____/ \___/|___|_| |_|

        Identifier Resolver v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
