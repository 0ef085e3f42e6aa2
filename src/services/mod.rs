pub mod guidance;
pub mod location;
pub mod navigation;
pub mod osrm;
pub mod registry;
pub mod route_provider;
pub mod speech;
