//! Provider network, lab packages, slots and test explainers for Xplore.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub name: String,
    /// Pincodes served.
    pub locations: Vec<String>,
    pub services: Vec<String>,
    pub specialties: Vec<String>,
    pub rating: String,
    pub reviews: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabPackage {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub price: u32,
    pub tests: Vec<String>,
    pub tat: String,
    pub home_collection: bool,
    pub fasting: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes: Option<String>,
    pub normal_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_indicates: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_indicates: Option<String>,
    pub preparation: String,
}

/// Provider name -> date label -> open times.
pub type SlotTable = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Read-only dataset embedded in the Xplore prompt and served by the lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthcareContext {
    pub providers: Vec<Provider>,
    pub packages: Vec<LabPackage>,
    pub slots: SlotTable,
    pub test_info: BTreeMap<String, TestInfo>,
}

pub static HEALTHCARE_CONTEXT: Lazy<HealthcareContext> = Lazy::new(HealthcareContext::seeded);

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn provider(
    name: &str,
    locations: &[&str],
    services: &[&str],
    specialties: &[&str],
    rating: &str,
    reviews: &str,
    contact: &str,
) -> Provider {
    Provider {
        name: name.into(),
        locations: strings(locations),
        services: strings(services),
        specialties: strings(specialties),
        rating: rating.into(),
        reviews: reviews.into(),
        contact: contact.into(),
    }
}

fn package(
    id: &str,
    name: &str,
    provider: &str,
    price: u32,
    tests: &[&str],
    tat: &str,
    fasting: &str,
) -> LabPackage {
    LabPackage {
        id: id.into(),
        name: name.into(),
        provider: provider.into(),
        price,
        tests: strings(tests),
        tat: tat.into(),
        home_collection: true,
        fasting: fasting.into(),
    }
}

fn day_slots(days: [(&str, &[&str]); 3]) -> BTreeMap<String, Vec<String>> {
    days.into_iter()
        .map(|(day, times)| (day.to_string(), strings(times)))
        .collect()
}

impl HealthcareContext {
    pub fn seeded() -> Self {
        let providers = vec![
            provider(
                "Thyrocare",
                &["400001", "411045", "560001"],
                &["Blood Tests", "Full Body Checkup", "Thyroid Profile"],
                &["Pathology", "Preventive Health"],
                "4.2",
                "1250+",
                "+91-20-2605-7890",
            ),
            provider(
                "Lal Path Labs",
                &["400001", "411045", "110001"],
                &["Blood Tests", "Full Body Checkup", "Cardiac Profile"],
                &["Pathology", "Cardiology"],
                "4.4",
                "2100+",
                "+91-20-2605-3456",
            ),
            provider(
                "Healthians",
                &["400001", "411045", "110001", "560001"],
                &["Home Collection", "Full Body Checkup", "Vitamin Tests"],
                &["Pathology", "Home Healthcare"],
                "4.3",
                "1800+",
                "+91-20-2605-9876",
            ),
            provider(
                "Ruby Hall Labs",
                &["411001", "411045"],
                &["Blood Tests", "Imaging", "Cardiac Tests"],
                &["Pathology", "Cardiology", "Radiology"],
                "4.5",
                "3200+",
                "+91-20-2605-1234",
            ),
            provider(
                "Dr. Omkar Patil's Clinic",
                &["411014", "411045"],
                &["Consultation", "Health Checkup", "Preventive Care"],
                &["General Medicine", "Preventive Health"],
                "4.7",
                "950+",
                "+91-20-2605-5678",
            ),
        ];

        let packages = vec![
            package(
                "thy-fbp-001",
                "Full Body Checkup",
                "Thyrocare",
                799,
                &["CBC", "Lipid Profile", "Liver Function Test", "Kidney Function Test", "Thyroid Profile"],
                "24 hours",
                "8-12 hours",
            ),
            package(
                "lal-fbp-001",
                "Full Body Checkup",
                "Lal Path Labs",
                1199,
                &["CBC", "Lipid Profile", "Liver Function Test", "Kidney Function Test", "Thyroid Profile", "ECG", "ESR"],
                "48 hours",
                "10-12 hours",
            ),
            package(
                "hea-fbp-001",
                "Full Body Checkup",
                "Healthians",
                999,
                &["CBC", "Lipid Profile", "Liver Function Test", "Kidney Function Test", "Thyroid Profile", "Vitamin D"],
                "24 hours",
                "8-10 hours",
            ),
            package(
                "thy-aar-001",
                "Aarogyam Full Body Platinum Package",
                "Thyrocare",
                8499,
                &[
                    "Complete Blood Count (22 parameters)",
                    "Lipid Profile (8 parameters)",
                    "Liver Function (12 parameters)",
                    "Kidney Function (9 parameters)",
                    "Thyroid Profile (3 parameters)",
                    "Diabetes Panel (5 parameters)",
                    "Vitamin Panel (4 parameters)",
                    "Cardiac Risk Markers (7 parameters)",
                    "Arthritis Panel (2 parameters)",
                    "And 64 more tests",
                ],
                "48 hours",
                "8-12 hours mandatory",
            ),
            package(
                "thy-vit-001",
                "Basic Vitamin Panel",
                "Thyrocare",
                899,
                &["Vitamin D", "Vitamin B12", "Calcium"],
                "24 hours",
                "Not required",
            ),
            package(
                "lal-vit-001",
                "Vitamin Essentials",
                "Lal Path Labs",
                1299,
                &["Vitamin D", "Vitamin B12", "Vitamin B9 (Folate)", "Calcium", "Iron"],
                "36 hours",
                "Not required",
            ),
            package(
                "hea-vitd-001",
                "Vitamin D Test",
                "Healthians",
                599,
                &["Vitamin D only"],
                "24 hours",
                "Not required",
            ),
            package(
                "thy-dia-001",
                "Diabetes Control Package",
                "Thyrocare",
                599,
                &["HbA1c", "Fasting Blood Sugar", "Post Prandial Blood Sugar", "Lipid Profile"],
                "24 hours",
                "8-12 hours",
            ),
            package(
                "lal-dia-001",
                "Diabetes Care Package",
                "Lal Path Labs",
                699,
                &["HbA1c", "Fasting Blood Sugar", "Post Prandial Blood Sugar", "Lipid Profile", "Kidney Function Test"],
                "36 hours",
                "8-12 hours",
            ),
        ];

        let mut slots = SlotTable::new();
        slots.insert(
            "Ruby Hall Labs".into(),
            day_slots([
                ("29 May 2025", &["09:00 AM", "10:00 AM", "11:00 AM", "02:00 PM", "03:00 PM"]),
                ("30 May 2025", &["09:00 AM", "10:00 AM", "12:00 PM", "01:00 PM", "04:00 PM"]),
                ("tomorrow", &["08:00 AM", "09:00 AM", "11:00 AM", "02:00 PM", "05:00 PM"]),
            ]),
        );
        slots.insert(
            "Thyrocare".into(),
            day_slots([
                ("29 May 2025", &["06:00 AM", "07:00 AM", "08:00 AM", "05:00 PM", "06:00 PM"]),
                ("30 May 2025", &["06:00 AM", "07:00 AM", "08:00 AM", "09:00 AM", "05:00 PM"]),
                ("tomorrow", &["06:00 AM", "07:00 AM", "08:00 AM", "09:00 AM", "05:00 PM", "06:00 PM"]),
            ]),
        );
        slots.insert(
            "Dr. Omkar P".into(),
            day_slots([
                ("29 May 2025", &["10:00 AM", "11:00 AM", "04:00 PM", "05:00 PM", "06:00 PM"]),
                ("30 May 2025", &["10:00 AM", "11:00 AM", "12:00 PM", "04:00 PM", "05:00 PM"]),
                ("tomorrow", &["10:00 AM", "11:00 AM", "12:00 PM", "04:00 PM", "05:00 PM", "06:00 PM"]),
            ]),
        );

        let mut test_info = BTreeMap::new();
        test_info.insert(
            "Vitamin D".into(),
            TestInfo {
                purpose: "Measures the level of Vitamin D in your blood".into(),
                includes: None,
                normal_range: "30-100 ng/mL".into(),
                low_indicates: Some("Bone weakening, increased risk of fractures".into()),
                high_indicates: Some("Potential toxicity, kidney stones".into()),
                preparation: "No special preparation required".into(),
            },
        );
        test_info.insert(
            "Thyroid Profile".into(),
            TestInfo {
                purpose: "Evaluates thyroid function".into(),
                includes: Some("T3, T4, TSH".into()),
                normal_range: "TSH: 0.4-4.0 mIU/L, T4: 5.0-12.0 μg/dL, T3: 80-200 ng/dL".into(),
                low_indicates: None,
                high_indicates: None,
                preparation: "No special preparation required".into(),
            },
        );
        test_info.insert(
            "Lipid Profile".into(),
            TestInfo {
                purpose: "Assesses cardiovascular risk".into(),
                includes: Some("Total Cholesterol, HDL, LDL, Triglycerides".into()),
                normal_range: "Total Cholesterol: <200 mg/dL, HDL: >40 mg/dL, LDL: <100 mg/dL, Triglycerides: <150 mg/dL".into(),
                low_indicates: None,
                high_indicates: None,
                preparation: "8-12 hours fasting required".into(),
            },
        );
        test_info.insert(
            "Blood Sugar".into(),
            TestInfo {
                purpose: "Screens for diabetes and monitors blood glucose levels".into(),
                includes: Some("Fasting Blood Sugar, Post Prandial Blood Sugar".into()),
                normal_range: "Fasting: 70-100 mg/dL, Post Prandial: <140 mg/dL".into(),
                low_indicates: None,
                high_indicates: None,
                preparation: "8-12 hours fasting required for FBS, 2 hours after meal for PPBS".into(),
            },
        );

        Self {
            providers,
            packages,
            slots,
            test_info,
        }
    }
}

impl Default for HealthcareContext {
    fn default() -> Self {
        Self::seeded()
    }
}
