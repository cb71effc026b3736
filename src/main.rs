use shade_quote::{
    config::{
        app::load_default_config,
        database::{create_connection, create_tables},
    },
    core::{
        catalog::{get_catalog, seed_catalog},
        family::ProductFamily,
    },
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Load pricing policy and catalog seed
    let app_config = load_default_config()
        .inspect_err(|e| error!("Failed to load application configuration: {}", e))?;
    info!(
        pergola_minimum = %app_config.pricing.pergola_minimum_order,
        "Loaded application configuration"
    );

    // 4. Open the store and make sure the schema exists
    let db = create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|()| info!("Database schema ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog on first run
    let seeded = seed_catalog(&db, &app_config.catalog)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    if seeded > 0 {
        info!("Catalog seeded with {} rows", seeded);
    }

    // 6. Report what each configurator will offer
    for family in ProductFamily::ALL {
        let catalog = get_catalog(&db, family).await;
        info!(
            %family,
            models = catalog.models.len(),
            finishes = catalog.finishes.len(),
            accessories = catalog.accessories.len(),
            sizes = catalog.dimensions.len(),
            "Catalog loaded"
        );
    }

    Ok(())
}
