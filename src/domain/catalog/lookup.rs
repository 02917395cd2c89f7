//! Filters and comparisons over the healthcare dataset.

use serde::{Deserialize, Serialize};

use super::healthcare::{HealthcareContext, LabPackage, Provider};
use crate::domain::foundation::{DomainError, ErrorCode};

/// Provider search. Empty fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderQuery {
    /// Exact pincode.
    pub location: Option<String>,
    /// Case-insensitive substring of a specialty.
    pub specialty: Option<String>,
    /// Case-insensitive substring of a service.
    pub service: Option<String>,
}

/// Package search. Empty fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageQuery {
    /// Keep packages whose provider serves this pincode.
    pub pincode: Option<String>,
    /// Case-insensitive substring of the provider name.
    pub provider: Option<String>,
}

/// Side-by-side view of two packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageComparison {
    pub package_a: LabPackage,
    pub package_b: LabPackage,
    pub differences: Vec<String>,
}

/// Open times for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSlots {
    pub provider: String,
    pub date: String,
    pub times: Vec<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl HealthcareContext {
    pub fn find_providers(&self, query: &ProviderQuery) -> Vec<&Provider> {
        let location = non_blank(&query.location);
        let specialty = non_blank(&query.specialty);
        let service = non_blank(&query.service);

        self.providers
            .iter()
            .filter(|p| location.map_or(true, |loc| p.locations.iter().any(|l| l == loc)))
            .filter(|p| specialty.map_or(true, |s| p.specialties.iter().any(|x| contains_ci(x, s))))
            .filter(|p| service.map_or(true, |s| p.services.iter().any(|x| contains_ci(x, s))))
            .collect()
    }

    pub fn find_packages(&self, query: &PackageQuery) -> Vec<&LabPackage> {
        let provider = non_blank(&query.provider);
        let serving: Option<Vec<&str>> = non_blank(&query.pincode).map(|pin| {
            self.providers
                .iter()
                .filter(|p| p.locations.iter().any(|l| l == pin))
                .map(|p| p.name.as_str())
                .collect()
        });

        self.packages
            .iter()
            .filter(|p| provider.map_or(true, |name| contains_ci(&p.provider, name)))
            .filter(|p| {
                serving
                    .as_ref()
                    .map_or(true, |names| names.contains(&p.provider.as_str()))
            })
            .collect()
    }

    /// Looks a package up by id first, then by exact name.
    pub fn find_package(&self, key: &str) -> Option<&LabPackage> {
        let key = key.trim();
        self.packages
            .iter()
            .find(|p| p.id == key)
            .or_else(|| self.packages.iter().find(|p| p.name == key))
    }

    /// Compares price, turnaround and test lists of two packages.
    ///
    /// # Errors
    ///
    /// - `PackageNotFound` if either key matches nothing
    pub fn compare_packages(&self, a: &str, b: &str) -> Result<PackageComparison, DomainError> {
        let not_found = |key: &str| {
            DomainError::new(ErrorCode::PackageNotFound, "One or both packages not found")
                .with_detail("package", key)
        };
        let pkg_a = self.find_package(a).ok_or_else(|| not_found(a))?;
        let pkg_b = self.find_package(b).ok_or_else(|| not_found(b))?;

        let mut differences = Vec::new();
        if pkg_a.price != pkg_b.price {
            differences.push(format!(
                "Price: {} (₹{}) vs {} (₹{})",
                pkg_a.provider, pkg_a.price, pkg_b.provider, pkg_b.price
            ));
        }
        if pkg_a.tat != pkg_b.tat {
            differences.push(format!(
                "TAT: {} ({}) vs {} ({})",
                pkg_a.provider, pkg_a.tat, pkg_b.provider, pkg_b.tat
            ));
        }

        let only_in = |left: &LabPackage, right: &LabPackage| -> Vec<String> {
            left.tests
                .iter()
                .filter(|t| !right.tests.contains(t))
                .cloned()
                .collect()
        };
        let only_a = only_in(pkg_a, pkg_b);
        if !only_a.is_empty() {
            differences.push(format!("Tests only in {}: {}", pkg_a.provider, only_a.join(", ")));
        }
        let only_b = only_in(pkg_b, pkg_a);
        if !only_b.is_empty() {
            differences.push(format!("Tests only in {}: {}", pkg_b.provider, only_b.join(", ")));
        }

        Ok(PackageComparison {
            package_a: pkg_a.clone(),
            package_b: pkg_b.clone(),
            differences,
        })
    }

    /// Slots per provider whose name contains `provider`, optionally for one
    /// date label.
    pub fn find_slots(&self, provider: Option<&str>, date: Option<&str>) -> Vec<ProviderSlots> {
        let provider = provider.map(str::trim).filter(|p| !p.is_empty());
        let date = date.map(str::trim).filter(|d| !d.is_empty());

        self.slots
            .iter()
            .filter(|(name, _)| provider.map_or(true, |p| contains_ci(name, p)))
            .flat_map(|(name, days)| {
                days.iter()
                    .filter(move |(day, _)| date.map_or(true, |d| day.eq_ignore_ascii_case(d)))
                    .map(move |(day, times)| ProviderSlots {
                        provider: name.clone(),
                        date: day.clone(),
                        times: times.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> HealthcareContext {
        HealthcareContext::seeded()
    }

    fn names<'a>(providers: &[&'a Provider]) -> Vec<&'a str> {
        providers.iter().map(|p| p.name.as_str()).collect()
    }

    mod providers {
        use super::*;

        #[test]
        fn no_filters_returns_everyone() {
            assert_eq!(ctx().find_providers(&ProviderQuery::default()).len(), 5);
        }

        #[test]
        fn location_is_exact() {
            let ctx = ctx();
            let found = ctx.find_providers(&ProviderQuery {
                location: Some("411014".into()),
                ..Default::default()
            });
            assert_eq!(names(&found), vec!["Dr. Omkar Patil's Clinic"]);

            let none = ctx.find_providers(&ProviderQuery {
                location: Some("4110".into()),
                ..Default::default()
            });
            assert!(none.is_empty());
        }

        #[test]
        fn specialty_and_service_are_case_insensitive() {
            let ctx = ctx();
            let found = ctx.find_providers(&ProviderQuery {
                specialty: Some("cardio".into()),
                service: Some("CARDIAC".into()),
                ..Default::default()
            });
            assert_eq!(names(&found), vec!["Lal Path Labs", "Ruby Hall Labs"]);
        }

        #[test]
        fn blank_filter_is_ignored() {
            let ctx = ctx();
            let found = ctx.find_providers(&ProviderQuery {
                location: Some("  ".into()),
                ..Default::default()
            });
            assert_eq!(found.len(), 5);
        }
    }

    mod packages {
        use super::*;

        #[test]
        fn provider_filter_is_substring() {
            let ctx = ctx();
            let found = ctx.find_packages(&PackageQuery {
                provider: Some("lal".into()),
                ..Default::default()
            });
            assert_eq!(found.len(), 3);
            assert!(found.iter().all(|p| p.provider == "Lal Path Labs"));
        }

        #[test]
        fn pincode_keeps_packages_of_serving_providers() {
            let ctx = ctx();
            let found = ctx.find_packages(&PackageQuery {
                pincode: Some("560001".into()),
                ..Default::default()
            });
            assert!(found
                .iter()
                .all(|p| p.provider == "Thyrocare" || p.provider == "Healthians"));
            assert_eq!(found.len(), 6);
        }

        #[test]
        fn unknown_pincode_returns_nothing() {
            let ctx = ctx();
            let found = ctx.find_packages(&PackageQuery {
                pincode: Some("999999".into()),
                ..Default::default()
            });
            assert!(found.is_empty());
        }
    }

    mod compare {
        use super::*;

        #[test]
        fn full_body_checkups_differ_in_price_tat_and_tests() {
            let cmp = ctx().compare_packages("thy-fbp-001", "lal-fbp-001").unwrap();
            assert_eq!(
                cmp.differences,
                vec![
                    "Price: Thyrocare (₹799) vs Lal Path Labs (₹1199)".to_string(),
                    "TAT: Thyrocare (24 hours) vs Lal Path Labs (48 hours)".to_string(),
                    "Tests only in Lal Path Labs: ECG, ESR".to_string(),
                ]
            );
        }

        #[test]
        fn name_lookup_takes_first_match() {
            let cmp = ctx()
                .compare_packages("Full Body Checkup", "Diabetes Care Package")
                .unwrap();
            assert_eq!(cmp.package_a.provider, "Thyrocare");
            assert_eq!(cmp.package_b.id, "lal-dia-001");
        }

        #[test]
        fn identical_packages_have_no_differences() {
            let cmp = ctx().compare_packages("thy-dia-001", "thy-dia-001").unwrap();
            assert!(cmp.differences.is_empty());
        }

        #[test]
        fn unknown_package_is_an_error() {
            let err = ctx().compare_packages("thy-fbp-001", "nope").unwrap_err();
            assert_eq!(err.code(), ErrorCode::PackageNotFound);
            assert_eq!(err.details.get("package"), Some(&"nope".to_string()));
        }
    }

    mod slots {
        use super::*;

        #[test]
        fn filters_by_provider_and_date() {
            let found = ctx().find_slots(Some("ruby"), Some("Tomorrow"));
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].provider, "Ruby Hall Labs");
            assert_eq!(found[0].times[0], "08:00 AM");
        }

        #[test]
        fn no_filters_lists_every_day() {
            assert_eq!(ctx().find_slots(None, None).len(), 9);
        }
    }
}
