//! The booked appointment the support assistant answers questions about.

use once_cell::sync::Lazy;
use serde::Serialize;

/// Panel counts inside the booked package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPanels {
    pub arthritis_panel: String,
    pub cardiac_risk_markers: String,
}

/// Appointment and package details for the customer in the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentContext {
    pub appointment_type: String,
    pub appointment_status: String,
    pub provider: String,
    pub patient: String,
    pub appointment_date_time: String,
    pub slot: String,
    pub agent_name: String,
    pub agent_number: String,
    pub booking_time: String,
    #[serde(rename = "reportTAT")]
    pub report_tat: String,
    pub payment_method: String,

    pub package_name: String,
    pub package_provider: String,
    pub cost: String,
    pub reports_in: String,
    pub times_booked: String,
    pub sample_collection: String,
    pub lab_visit: bool,
    pub lab_visit_available: String,
    pub earliest_slot: String,
    pub confirmation: String,

    pub total_tests: u32,
    pub special_panels: SpecialPanels,

    pub fasting_required: bool,
    pub fasting_duration: String,
    pub about_package: String,

    pub clinic_contact: String,
    pub clinic_address: String,
    pub maps_link: String,
}

pub static APPOINTMENT_CONTEXT: Lazy<AppointmentContext> = Lazy::new(AppointmentContext::seeded);

impl AppointmentContext {
    /// The single home-collection booking served by this deployment.
    pub fn seeded() -> Self {
        Self {
            appointment_type: "Home Collection".into(),
            appointment_status: "Agent Assigned".into(),
            provider: "Thyrocare Labs".into(),
            patient: "Omkar Patil".into(),
            appointment_date_time: "3 June 2025, 4:00 PM to 5:00 PM".into(),
            slot: "4:00 PM to 5:00 PM".into(),
            agent_name: "Parth Raheja".into(),
            agent_number: "1234567890".into(),
            booking_time: "26 May 2025, 11:00 AM".into(),
            report_tat: "6th June 5pm".into(),
            payment_method: "wallet".into(),

            package_name: "Aarogyam Full Body Platinum Package – Pune".into(),
            package_provider: "Thyrocare".into(),
            cost: "₹8499".into(),
            reports_in: "48 hours".into(),
            times_booked: "5000+ times".into(),
            sample_collection: "Home Collection only".into(),
            lab_visit: false,
            lab_visit_available: "❌ Unavailable".into(),
            earliest_slot: "Tomorrow, 6:00 AM".into(),
            confirmation: "Quick Confirmation".into(),

            total_tests: 136,
            special_panels: SpecialPanels {
                arthritis_panel: "2 tests".into(),
                cardiac_risk_markers: "7 tests".into(),
            },

            fasting_required: true,
            fasting_duration: "8–12 hours mandatory".into(),
            about_package: "The Aarogyam Full Body Platinum Package offers comprehensive health assessment, targeting: Nutritional deficiencies, Hormonal imbalances, Lifestyle-related risks, Growth and metabolism disorders. Ideal for professionals and individuals looking for preventive care and in-depth diagnostics.".into(),

            clinic_contact: "+91-20-2605-5000".into(),
            clinic_address: "Thyrocare Labs, Viman Nagar, Pune, Maharashtra 411014".into(),
            maps_link: "https://maps.google.com/?q=Thyrocare+Labs+Viman+Nagar+Pune".into(),
        }
    }
}

impl Default for AppointmentContext {
    fn default() -> Self {
        Self::seeded()
    }
}
