//! Catalog construction from the controller inventory

use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogBuilder, SiteBinding};
use crate::controller::InventoryApi;
use crate::errors::UpgradeError;

impl Catalog {
    /// Fetch sites, elements (with their interfaces) and element images and
    /// build the catalog.
    ///
    /// Any failed fetch aborts the build with a `FetchError` naming the
    /// resource. Elements in the unassigned site get no interface query.
    pub async fn build<A: InventoryApi + ?Sized>(api: &A) -> Result<Catalog, UpgradeError> {
        let mut builder = CatalogBuilder::new();

        info!("Creating translation tables: sites");
        let sites = api
            .list_sites()
            .await
            .map_err(|e| UpgradeError::fetch("sites", e))?;
        for site in &sites {
            builder.add_site(site);
        }

        info!("Creating translation tables: elements & interfaces");
        let elements = api
            .list_elements()
            .await
            .map_err(|e| UpgradeError::fetch("elements", e))?;
        for element in &elements {
            builder.add_element(element);

            let SiteBinding::Bound(site_id) = &element.site_id else {
                debug!("Element {} is not assigned to a site, skipping interfaces", element.hw_id);
                continue;
            };
            let interfaces = api
                .list_interfaces(site_id, &element.id)
                .await
                .map_err(|e| UpgradeError::fetch(format!("interfaces of element {}", element.hw_id), e))?;
            for interface in &interfaces {
                builder.add_interface(site_id, &element.id, interface);
            }
        }

        info!("Creating translation tables: element images");
        let images = api
            .list_element_images()
            .await
            .map_err(|e| UpgradeError::fetch("element images", e))?;
        for image in &images {
            builder.add_image(image);
        }

        let catalog = builder.finish();
        info!(
            "Catalog ready: {} sites, {} devices, {} interfaces, {} images",
            catalog.site_count(),
            catalog.device_count(),
            catalog.interface_count(),
            catalog.image_count()
        );
        Ok(catalog)
    }
}
