use log::info;

use crate::{
    graphql::model::{property::Property, property_use::PropertyUse},
    store::{Store, StoreError},
};

/// Names of the seeded properties.
pub const PROPERTY_NAMES: [&str; 5] = [
    "Alpha Tower",
    "Beta Complex",
    "Gamma Plaza",
    "Delta Building",
    "Epsilon Center",
];

/// Names of the uses seeded for every property. The use at index `i` gets `(i + 1) * 10` units.
pub const PROPERTY_USE_NAMES: [&str; 5] = [
    "Residential",
    "Commercial",
    "Parking",
    "Storage",
    "Amenities",
];

/// Replaces the content of the store with the fixed demo data set.
///
/// Deletes all property uses, then all properties, then inserts every property followed by its uses.
/// Returns the amount of seeded properties.
pub async fn seed(store: &Store) -> Result<usize, StoreError> {
    store.clear().await?;
    for name in PROPERTY_NAMES {
        let property = Property::new(name);
        let property_uses: Vec<PropertyUse> = PROPERTY_USE_NAMES
            .iter()
            .zip(1..)
            .map(|(use_name, position)| PropertyUse::new(&property, use_name, position * 10))
            .collect();
        store.insert_property(property).await?;
        store.insert_property_uses(property_uses).await?;
    }
    info!(
        "Seeded {} properties with property uses.",
        PROPERTY_NAMES.len()
    );
    Ok(PROPERTY_NAMES.len())
}
