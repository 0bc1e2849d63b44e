mod geojson_types;

pub use geojson_types::*;
