//! Identifier catalog
//!
//! Snapshot of the controller inventory taken once per run. Translates
//! serial numbers, version strings, site and interface names into controller
//! ids. Immutable after construction; every lookup is a pure read.

mod fetch;
mod index;

use std::collections::HashMap;

use openapi_client::models::{Element, ElementImage, Interface, Site};

pub use openapi_client::models::SiteBinding;

pub use index::IdIndex;

/// Result of resolving a version string against the image buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLookup<'a> {
    /// Released image, an eligible upgrade target
    Released(&'a str),
    /// Known image that is no longer supported
    Unsupported(&'a str),
    /// No image with this version string
    Unknown,
}

/// Interface identity, scoped to one element in one site
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct InterfaceKey {
    site_id: String,
    element_id: String,
    value: String,
}

impl InterfaceKey {
    fn new(site_id: &str, element_id: &str, value: &str) -> Self {
        Self {
            site_id: site_id.to_string(),
            element_id: element_id.to_string(),
            value: value.to_string(),
        }
    }
}

/// Immutable inventory snapshot
#[derive(Debug, Clone)]
pub struct Catalog {
    sites: IdIndex,
    device_names: IdIndex,
    device_serials: IdIndex,
    device_sites: HashMap<String, SiteBinding>,
    released_images: IdIndex,
    unsupported_images: IdIndex,
    interface_ids: HashMap<InterfaceKey, String>,
    interface_names: HashMap<InterfaceKey, String>,
}

impl Catalog {
    /// Element id for a serial number
    pub fn device_id_by_serial(&self, serial_number: &str) -> Option<&str> {
        self.device_serials.id(serial_number)
    }

    /// Serial number of an element
    pub fn serial_by_device_id(&self, device_id: &str) -> Option<&str> {
        self.device_serials.key(device_id)
    }

    pub fn device_id_by_name(&self, name: &str) -> Option<&str> {
        self.device_names.id(name)
    }

    pub fn device_name(&self, device_id: &str) -> Option<&str> {
        self.device_names.key(device_id)
    }

    /// Site binding of an element
    pub fn device_site(&self, device_id: &str) -> Option<&SiteBinding> {
        self.device_sites.get(device_id)
    }

    pub fn site_id_by_name(&self, name: &str) -> Option<&str> {
        self.sites.id(name)
    }

    pub fn site_name(&self, site_id: &str) -> Option<&str> {
        self.sites.key(site_id)
    }

    /// Resolve a version string, released images first
    pub fn resolve_image(&self, version: &str) -> ImageLookup<'_> {
        if let Some(id) = self.released_images.id(version) {
            ImageLookup::Released(id)
        } else if let Some(id) = self.unsupported_images.id(version) {
            ImageLookup::Unsupported(id)
        } else {
            ImageLookup::Unknown
        }
    }

    /// Version string of an image in either bucket
    pub fn image_version(&self, image_id: &str) -> Option<&str> {
        self.released_images
            .key(image_id)
            .or_else(|| self.unsupported_images.key(image_id))
    }

    /// Interface id by name within one element's scope
    pub fn interface_id(&self, site_id: &str, device_id: &str, name: &str) -> Option<&str> {
        self.interface_ids
            .get(&InterfaceKey::new(site_id, device_id, name))
            .map(String::as_str)
    }

    /// Interface name by id within one element's scope
    pub fn interface_name(&self, site_id: &str, device_id: &str, interface_id: &str) -> Option<&str> {
        self.interface_names
            .get(&InterfaceKey::new(site_id, device_id, interface_id))
            .map(String::as_str)
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn device_count(&self) -> usize {
        self.device_serials.len()
    }

    pub fn interface_count(&self) -> usize {
        self.interface_ids.len()
    }

    pub fn image_count(&self) -> usize {
        self.released_images.len() + self.unsupported_images.len()
    }
}

/// Incremental catalog construction
#[derive(Debug)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog {
                sites: IdIndex::new("site"),
                device_names: IdIndex::new("device name"),
                device_serials: IdIndex::new("device serial number"),
                device_sites: HashMap::new(),
                released_images: IdIndex::new("released image"),
                unsupported_images: IdIndex::new("unsupported image"),
                interface_ids: HashMap::new(),
                interface_names: HashMap::new(),
            },
        }
    }

    pub fn add_site(&mut self, site: &Site) -> &mut Self {
        self.catalog.sites.insert(&site.id, &site.name);
        self
    }

    pub fn add_element(&mut self, element: &Element) -> &mut Self {
        let catalog = &mut self.catalog;
        if let Some(name) = &element.name {
            catalog.device_names.insert(&element.id, name);
        }
        catalog.device_serials.insert(&element.id, &element.hw_id);
        catalog
            .device_sites
            .insert(element.id.clone(), element.site_id.clone());
        self
    }

    pub fn add_interface(&mut self, site_id: &str, element_id: &str, interface: &Interface) -> &mut Self {
        let catalog = &mut self.catalog;
        catalog.interface_ids.insert(
            InterfaceKey::new(site_id, element_id, &interface.name),
            interface.id.clone(),
        );
        catalog.interface_names.insert(
            InterfaceKey::new(site_id, element_id, &interface.id),
            interface.name.clone(),
        );
        self
    }

    /// Add an image to the released or unsupported bucket by lifecycle state
    pub fn add_image(&mut self, image: &ElementImage) -> &mut Self {
        if image.is_released() {
            self.catalog.released_images.insert(&image.id, &image.version);
        } else {
            self.catalog.unsupported_images.insert(&image.id, &image.version);
        }
        self
    }

    pub fn finish(self) -> Catalog {
        self.catalog
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
