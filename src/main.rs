//! Decanat - Entry Point
//!
//! Modes:
//! - Default: terminal dashboard client
//! - --serve / -s: development stub backend

use decanat::backend::{ServerConfig, StubServer};
use decanat::{App, AppContext, Config};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let serve_mode = args.iter().any(|a| a == "--serve" || a == "-s");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("Decanat v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: decanat [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --serve, -s        Run the development stub backend");
        println!("  --help, -h         Show this help");
        println!();
        println!("Default: Run the terminal dashboard");
        println!();
        println!("Environment variables:");
        println!("  DECANAT_BACKEND            mock | http (default: mock)");
        println!("  DECANAT_API_URL            HTTP backend URL (default: http://127.0.0.1:8080)");
        println!("  DECANAT_STORAGE_PATH       Session storage file");
        println!("  DECANAT_MOCK_DELAY_MS      Mock read delay (default: 300)");
        println!("  DECANAT_UPLOAD_DELAY_MS    Mock upload delay (default: 5000)");
        println!("  DECANAT_NOTIFICATION_MS    Notification auto-hide (default: 6000)");
        println!("  DECANAT_SERVER_BIND_ADDR   Stub server address (default: 127.0.0.1)");
        println!("  DECANAT_SERVER_PORT        Stub server port (default: 8080)");
        println!("  DECANAT_JWT_SECRET         Stub server signing secret");
        return Ok(());
    }

    // Setup logging based on mode
    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        })
        .unwrap_or(if serve_mode { Level::INFO } else { Level::WARN });

    if serve_mode {
        // Server mode - log to stdout with colors
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("Decanat stub backend v{}", env!("CARGO_PKG_VERSION"));
        let server = StubServer::new(ServerConfig::from_env())?;
        server.run().await?;
    } else {
        // Terminal mode - stdout belongs to the rendered view
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("Decanat v{}", env!("CARGO_PKG_VERSION"));
        let config = Config::from_env()?;
        let ctx = AppContext::from_config(&config)?;
        decanat::terminal::run(App::new(ctx)).await?;
    }

    Ok(())
}
