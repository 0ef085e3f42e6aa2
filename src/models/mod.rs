pub mod coordinates;
pub mod distance;
pub mod refuge;
pub mod route;
pub mod settings;

pub use coordinates::{distance_km, Coordinates, LocationSample};
pub use distance::DistanceUnit;
pub use refuge::{RefugeDistance, RefugeZone};
pub use route::{Route, RouteSource};
pub use settings::{MapSettings, MapType, SettingsUpdate};
