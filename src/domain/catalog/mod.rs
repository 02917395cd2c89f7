//! Static reference data served to the assistants and the lookup endpoints.

mod appointment;
mod healthcare;
mod lookup;

pub use appointment::{AppointmentContext, SpecialPanels, APPOINTMENT_CONTEXT};
pub use healthcare::{HealthcareContext, LabPackage, Provider, SlotTable, TestInfo, HEALTHCARE_CONTEXT};
pub use lookup::{PackageComparison, PackageQuery, ProviderQuery, ProviderSlots};
