//! Abort executor

use tracing::warn;

use crate::catalog::Catalog;
use crate::controller::DeviceControlApi;
use crate::errors::RowError;
use crate::manifest::AbortRow;
use crate::upgrade::outcome::{Outcome, OutcomeKind, OutcomeLog};
use crate::upgrade::BLANK_CELL;

/// Abort the scheduled upgrade of every listed device, continuing past
/// failed rows. Unknown serial numbers never reach the controller.
pub async fn abort<A: DeviceControlApi + ?Sized>(
    rows: &[AbortRow],
    catalog: &Catalog,
    api: &A,
    log: &mut OutcomeLog,
) {
    for row in rows {
        let serial_number = row.serial_number.as_deref().unwrap_or(BLANK_CELL);
        let Some(device_id) = row
            .serial_number
            .as_deref()
            .and_then(|serial| catalog.device_id_by_serial(serial))
        else {
            let err = RowError::DeviceNotFound {
                serial_number: serial_number.to_string(),
            };
            log.push(Outcome::failed(Some(row.row), serial_number, &err));
            continue;
        };

        match api.abort_upgrade(device_id).await {
            Ok(()) => log.push(Outcome::new(
                Some(row.row),
                serial_number,
                OutcomeKind::Aborted,
                format!("Upgrade aborted for {}", serial_number),
            )),
            Err(e) => {
                warn!("Abort for {} failed: {}", serial_number, e);
                let err = RowError::Abort {
                    serial_number: serial_number.to_string(),
                };
                log.push(Outcome::failed(Some(row.row), serial_number, &err));
            }
        }
    }
}
