use dotenvy::dotenv;
use shoemart_pos::{
    config::{catalog::load_default_config, database},
    core::{catalog::seed_catalog, receipt::FileReceiptEmitter, register::Register},
    errors::Result,
    terminal,
};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load store settings and the catalog seed
    let config = load_default_config()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed catalog rows missing from the database
    let seeded = seed_catalog(&db, &config.products)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    info!("Catalog ready ({} products added)", seeded);

    // 6. Run the register on stdin/stdout
    let emitter = FileReceiptEmitter::from_store(&config.store);
    let mut register = Register::new(db, config.store, emitter);
    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    terminal::run(&mut register, input, &mut output).await
}
