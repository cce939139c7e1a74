// Entity Models
//
// One flat record type covers every granularity (state → district/city/
// region/college). The hierarchy lives in `parent_name`, not in nesting.

pub mod geo_entity;

pub use geo_entity::{Coordinates, EntityType, GeoEntity};
