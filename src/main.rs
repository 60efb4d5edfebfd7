use checkers_arena::ServerConfig;
use checkers_arena::web::run_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("checkers_arena=info,tower_http=info")),
        )
        .init();

    // Optional first argument: path to a JSON config file
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    println!("Checkers Arena");
    println!("==============");
    println!();

    run_server(config).await?;

    Ok(())
}
