use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use crate::{config::config::Config, repos::organizations::OrganizationsRepo};

/// Spawns the two maintenance sweeps as detached background tasks. Both
/// are single bulk statements, so running them alongside live requests
/// is safe.
pub fn spawn_sweeps(db: DatabaseConnection, config: Config) {
    let interval = Duration::from_secs(config.sweep_interval_secs);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;

            if let Err(e) = run_refill_sweep(&db, &config).await {
                error!("Free-credit refill sweep failed: {}", e);
            }
            if let Err(e) = run_purge_sweep(&db, &config).await {
                error!("Hard-purge sweep failed: {}", e);
            }
        }
    });
}

/// Tops organizations without a paid subscription back up to the free
/// floor, at most once per refill window.
pub async fn run_refill_sweep(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<u64, sea_orm::DbErr> {
    let cutoff =
        chrono::Utc::now().naive_utc() - chrono::Duration::days(config.refill_after_days);

    let orgs_repo = OrganizationsRepo::new(db.clone());
    let refilled = orgs_repo
        .refill_free_credits(config.free_credit_floor, cutoff)
        .await?;

    if refilled > 0 {
        info!("Refilled free credits for {} organizations", refilled);
    }

    Ok(refilled)
}

/// Permanently removes organizations whose soft delete has aged past the
/// retention window.
pub async fn run_purge_sweep(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<u64, sea_orm::DbErr> {
    let cutoff =
        chrono::Utc::now().naive_utc() - chrono::Duration::days(config.purge_after_days);

    let orgs_repo = OrganizationsRepo::new(db.clone());
    let purged = orgs_repo.purge_soft_deleted(cutoff).await?;

    if purged > 0 {
        info!("Purged {} soft-deleted organizations", purged);
    }

    Ok(purged)
}
