//! Staff roster, hiring and patrol zoning

pub mod directory;
pub mod hiring;
pub mod zones;

pub use directory::StaffDirectory;
pub use hiring::{DriverMetrics, HireContext, HireTrigger, HiringPolicy, NeedSignals};
pub use zones::{grid_cells, ZoneAssignment, ZoneInputs, ZonePlanner, ZoneReport};
