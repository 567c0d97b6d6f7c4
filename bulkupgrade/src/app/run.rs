//! Main run sequence

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::app::login::{self, CredentialPrompt};
use crate::app::options::RunOptions;
use crate::catalog::Catalog;
use crate::controller::{DeviceControlApi, InventoryApi, SessionApi, TenantInfo};
use crate::errors::UpgradeError;
use crate::manifest::{self, Manifest};
use crate::upgrade::{abort, plan_and_submit, OutcomeKind, OutcomeLog};

/// Everything a controller must provide for a run
pub trait Controller: SessionApi + InventoryApi + DeviceControlApi {}

impl<T: SessionApi + InventoryApi + DeviceControlApi + ?Sized> Controller for T {}

/// Result of a completed run
#[derive(Debug)]
pub struct RunReport {
    pub tenant: TenantInfo,
    pub rows: usize,
    pub log: OutcomeLog,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.log.error_count() > 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Run on tenant {} finished at {}: rows {}, scheduled {}, aborted {}, skipped {}, warnings {}, errors {}",
            self.tenant.name,
            self.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.rows,
            self.log.count(OutcomeKind::Scheduled),
            self.log.count(OutcomeKind::Aborted),
            self.log.count(OutcomeKind::AlreadyCurrent),
            self.log.count(OutcomeKind::Warning),
            self.log.error_count(),
        )
    }
}

/// Run one bulk upgrade (or abort) pass.
///
/// The manifest is loaded and validated before login, and the catalog is
/// built before any row is processed, so fatal errors never leave a
/// partially applied run. Row failures are recorded in `log` and do not
/// stop the run. Logout is attempted whenever login succeeded. Credentials
/// missing from `options` are asked of `prompt`.
pub async fn run<C, P>(
    options: &RunOptions,
    controller: &C,
    prompt: &P,
    mut log: OutcomeLog,
) -> Result<RunReport, UpgradeError>
where
    C: Controller + ?Sized,
    P: CredentialPrompt + ?Sized,
{
    let manifest = manifest::load(&options.manifest_path, options.mode).await?;

    let tenant = login::login(controller, &options.login, prompt).await?;
    info!("Connected to tenant {} ({})", tenant.name, tenant.id);

    let result = process(&manifest, controller, &mut log).await;
    logout(controller).await;
    result?;

    Ok(RunReport {
        tenant,
        rows: manifest.len(),
        log,
        finished_at: Utc::now(),
    })
}

async fn process<C: Controller + ?Sized>(
    manifest: &Manifest,
    controller: &C,
    log: &mut OutcomeLog,
) -> Result<(), UpgradeError> {
    let catalog = Catalog::build(controller).await.map_err(|e| {
        error!("Catalog build failed: {}", e);
        e
    })?;

    match manifest {
        Manifest::Upgrade(rows) => {
            info!("Performing bulk device upgrades for {} rows", rows.len());
            plan_and_submit(rows, &catalog, controller, log).await;
        }
        Manifest::Abort(rows) => {
            info!("Aborting scheduled upgrades for {} rows", rows.len());
            abort(rows, &catalog, controller, log).await;
        }
    }
    Ok(())
}

async fn logout<C: Controller + ?Sized>(controller: &C) {
    info!("Logging out");
    if let Err(e) = controller.logout().await {
        warn!("Logout failed: {}", e);
    }
}
