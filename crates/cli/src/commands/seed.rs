//! Seed the database with demo data for local development.

use tracing::info;

use tee_studio_storefront::db::{PgCatalog, seed};

use super::{CommandError, connect};

/// Insert the demo user, their design and the demo products.
///
/// The user is upserted by username; products and the design are inserted
/// on every run.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn demo() -> Result<(), CommandError> {
    let pool = connect().await?;
    let catalog = PgCatalog::new(pool);

    let summary = seed::seed_postgres(&catalog).await?;

    info!("Seeding complete!");
    info!("  Demo user: {} (id {})", seed::DEMO_USERNAME, summary.user_id);
    info!("  Products inserted: {}", summary.products);
    info!("  Designs inserted: {}", summary.designs);
    info!("Send requests with header x-user-id: {}", summary.user_id);

    Ok(())
}
