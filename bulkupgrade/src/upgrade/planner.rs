//! Upgrade planner
//!
//! Turns each upgrade manifest row into a software state update. Rows are
//! handled strictly in manifest order and a failing row never stops the
//! rows after it.

use openapi_client::models::SoftwareState;
use tracing::{debug, warn};

use crate::catalog::{Catalog, ImageLookup, SiteBinding};
use crate::controller::DeviceControlApi;
use crate::errors::RowError;
use crate::manifest::UpgradeRow;
use crate::upgrade::outcome::{Outcome, OutcomeKind, OutcomeLog};
use crate::upgrade::BLANK_CELL;

/// Resolved upgrade request for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradePlan {
    pub row: usize,
    pub serial_number: String,
    pub device_id: String,
    pub version: String,
    pub image_id: String,
    /// `None` applies the upgrade to all interfaces
    pub interface_ids: Option<Vec<String>>,
    pub download_time: Option<String>,
    pub upgrade_time: Option<String>,
    pub download_interval: Option<u64>,
    pub upgrade_interval: Option<u64>,
}

impl UpgradePlan {
    /// Overwrite the scheduling fields of a fetched state, leaving every
    /// other field as the controller returned it
    pub fn apply_to(&self, state: &mut SoftwareState) {
        state.image_id = Some(self.image_id.clone());
        state.scheduled_download = self.download_time.clone();
        state.scheduled_upgrade = self.upgrade_time.clone();
        state.interface_ids = self.interface_ids.clone();
        state.download_interval = self.download_interval;
        state.upgrade_interval = self.upgrade_interval;
    }
}

/// Resolve a row against the catalog.
///
/// Interface problems are reported to `log` and do not fail the row.
pub fn plan(row: &UpgradeRow, catalog: &Catalog, log: &mut OutcomeLog) -> Result<UpgradePlan, RowError> {
    let serial_number = row.serial_number.as_deref().unwrap_or(BLANK_CELL);
    let device_id = row
        .serial_number
        .as_deref()
        .and_then(|serial| catalog.device_id_by_serial(serial))
        .ok_or_else(|| RowError::DeviceNotFound {
            serial_number: serial_number.to_string(),
        })?;

    let version = row.software_version.as_deref().unwrap_or(BLANK_CELL);
    let image_id = match catalog.resolve_image(version) {
        ImageLookup::Released(id) => id,
        ImageLookup::Unsupported(_) => {
            return Err(RowError::ImageUnsupported {
                version: version.to_string(),
            })
        }
        ImageLookup::Unknown => {
            return Err(RowError::ImageInvalid {
                version: version.to_string(),
            })
        }
    };

    let download_interval =
        parse_interval("download_interval", row.download_interval.as_deref(), serial_number)?;
    let upgrade_interval =
        parse_interval("upgrade_interval", row.upgrade_interval.as_deref(), serial_number)?;

    let interface_ids = resolve_interfaces(row, serial_number, device_id, catalog, log);

    Ok(UpgradePlan {
        row: row.row,
        serial_number: serial_number.to_string(),
        device_id: device_id.to_string(),
        version: version.to_string(),
        image_id: image_id.to_string(),
        interface_ids,
        download_time: row.download_time.clone(),
        upgrade_time: row.upgrade_time.clone(),
        download_interval,
        upgrade_interval,
    })
}

/// Interface ids the upgrade is restricted to, or `None` for all interfaces
fn resolve_interfaces(
    row: &UpgradeRow,
    serial_number: &str,
    device_id: &str,
    catalog: &Catalog,
    log: &mut OutcomeLog,
) -> Option<Vec<String>> {
    let names = row.interface_names()?;

    let site_id = match catalog.device_site(device_id) {
        Some(SiteBinding::Bound(site_id)) => site_id,
        Some(SiteBinding::Unassigned) | None => {
            log.push(Outcome::new(
                Some(row.row),
                serial_number,
                OutcomeKind::Warning,
                format!(
                    "Device {} is not assigned to a site. Ignoring Interface settings for upgrade.",
                    serial_number
                ),
            ));
            return None;
        }
    };

    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        match catalog.interface_id(site_id, device_id, name) {
            Some(id) => ids.push(id.to_string()),
            None => {
                let err = RowError::InterfaceNotFound {
                    interface: name.to_string(),
                    serial_number: serial_number.to_string(),
                };
                log.push(Outcome::failed(Some(row.row), serial_number, &err));
            }
        }
    }

    // Nothing resolved means no restriction, not an empty restriction
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Parse a non-negative whole-number interval. Integral floats such as
/// `30.0` are accepted.
fn parse_interval(
    field: &'static str,
    value: Option<&str>,
    serial_number: &str,
) -> Result<Option<u64>, RowError> {
    let Some(value) = value else {
        return Ok(None);
    };
    if let Ok(n) = value.parse::<u64>() {
        return Ok(Some(n));
    }
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(Some(f as u64))
        }
        _ => Err(RowError::InvalidInterval {
            field,
            value: value.to_string(),
            serial_number: serial_number.to_string(),
        }),
    }
}

/// Read the current state of the planned device and submit the updated
/// state unless the device already runs the target image.
pub async fn submit<A: DeviceControlApi + ?Sized>(plan: &UpgradePlan, api: &A, log: &mut OutcomeLog) {
    let row = Some(plan.row);
    let serial_number = plan.serial_number.as_str();

    let mut state = match api.get_software_state(&plan.device_id).await {
        Ok(state) => state,
        Err(e) => {
            warn!("Software state fetch for {} failed: {}", serial_number, e);
            let err = RowError::StateFetch {
                serial_number: serial_number.to_string(),
            };
            log.push(Outcome::failed(row, serial_number, &err));
            return;
        }
    };

    if state.image_id.as_deref() == Some(plan.image_id.as_str()) {
        log.push(Outcome::new(
            row,
            serial_number,
            OutcomeKind::AlreadyCurrent,
            format!("Device {} already at {}. Skipping Upgrade..", serial_number, plan.version),
        ));
        return;
    }

    plan.apply_to(&mut state);
    debug!("Submitting software state for {}: {:?}", serial_number, state);

    match api.put_software_state(&plan.device_id, &state).await {
        Ok(()) => log.push(Outcome::new(
            row,
            serial_number,
            OutcomeKind::Scheduled,
            format!("Device {} upgrade to {} scheduled", serial_number, plan.version),
        )),
        Err(e) => {
            warn!("Software state update for {} failed: {}", serial_number, e);
            let err = RowError::StateUpdate {
                serial_number: serial_number.to_string(),
                version: plan.version.clone(),
            };
            log.push(Outcome::failed(row, serial_number, &err));
        }
    }
}

/// Plan and submit every row in manifest order, continuing past failed rows
pub async fn plan_and_submit<A: DeviceControlApi + ?Sized>(
    rows: &[UpgradeRow],
    catalog: &Catalog,
    api: &A,
    log: &mut OutcomeLog,
) {
    for row in rows {
        match plan(row, catalog, log) {
            Ok(plan) => submit(&plan, api, log).await,
            Err(err) => {
                let serial_number = row.serial_number.as_deref().unwrap_or(BLANK_CELL);
                log.push(Outcome::failed(Some(row.row), serial_number, &err));
            }
        }
    }
}
