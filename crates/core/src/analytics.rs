//! Staff dashboard analytics summary.
//!
//! Pure computation over lightweight snapshots so the API layer can feed it
//! from whatever the store returns.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::project_status::ProjectStatus;
use crate::types::Timestamp;

/// Number of brands listed in [`AnalyticsSummary::top_brands`].
pub const TOP_BRANDS_LIMIT: usize = 5;

/// What the summary needs to know about one brand.
#[derive(Debug, Clone)]
pub struct BrandSnapshot {
    pub name: String,
    pub billable: bool,
    pub project_count: usize,
}

/// What the summary needs to know about one project.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSnapshot {
    pub status: ProjectStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM`.
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub revenue: u64,
    pub revenue_formatted: String,
    pub projects_completed: usize,
    pub active_brands: usize,
    pub inactive_brands: usize,
    pub top_brands: Vec<BrandCount>,
    pub per_month: Vec<MonthCount>,
}

/// Build the summary. `plan_price` is the flat monthly price per billable brand.
pub fn summarize(
    brands: &[BrandSnapshot],
    projects: &[ProjectSnapshot],
    plan_price: u64,
) -> AnalyticsSummary {
    let revenue = brands.iter().filter(|b| b.billable).count() as u64 * plan_price;

    let projects_completed = projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Completed)
        .count();

    let active_brands = brands.iter().filter(|b| b.project_count > 0).count();

    let mut ranked: Vec<&BrandSnapshot> = brands.iter().collect();
    ranked.sort_by(|a, b| b.project_count.cmp(&a.project_count).then(a.name.cmp(&b.name)));
    let top_brands = ranked
        .into_iter()
        .take(TOP_BRANDS_LIMIT)
        .map(|b| BrandCount {
            name: b.name.clone(),
            count: b.project_count,
        })
        .collect();

    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for p in projects {
        *months
            .entry(p.created_at.format("%Y-%m").to_string())
            .or_default() += 1;
    }
    let per_month = months
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect();

    AnalyticsSummary {
        revenue,
        revenue_formatted: format!("${revenue}"),
        projects_completed,
        active_brands,
        inactive_brands: brands.len() - active_brands,
        top_brands,
        per_month,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn brand(name: &str, billable: bool, project_count: usize) -> BrandSnapshot {
        BrandSnapshot {
            name: name.to_string(),
            billable,
            project_count,
        }
    }

    fn project(status: ProjectStatus, year: i32, month: u32) -> ProjectSnapshot {
        ProjectSnapshot {
            status,
            created_at: Utc.with_ymd_and_hms(year, month, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_inputs_produce_zeroes() {
        let summary = summarize(&[], &[], 200);
        assert_eq!(summary.revenue_formatted, "$0");
        assert_eq!(summary.projects_completed, 0);
        assert!(summary.top_brands.is_empty());
        assert!(summary.per_month.is_empty());
    }

    #[test]
    fn revenue_counts_only_billable_brands() {
        let brands = [brand("a", true, 0), brand("b", false, 0), brand("c", true, 1)];
        let summary = summarize(&brands, &[], 200);
        assert_eq!(summary.revenue, 400);
        assert_eq!(summary.revenue_formatted, "$400");
    }

    #[test]
    fn active_and_inactive_brands_split_on_project_count() {
        let brands = [brand("a", false, 2), brand("b", false, 0), brand("c", false, 0)];
        let summary = summarize(&brands, &[], 200);
        assert_eq!(summary.active_brands, 1);
        assert_eq!(summary.inactive_brands, 2);
    }

    #[test]
    fn top_brands_are_ranked_and_capped() {
        let brands: Vec<_> = (0..7).map(|i| brand(&format!("b{i}"), false, i)).collect();
        let summary = summarize(&brands, &[], 200);
        assert_eq!(summary.top_brands.len(), TOP_BRANDS_LIMIT);
        assert_eq!(summary.top_brands[0], BrandCount { name: "b6".into(), count: 6 });
        assert_eq!(summary.top_brands[4].name, "b2");
    }

    #[test]
    fn ties_are_broken_by_name() {
        let brands = [brand("zeta", false, 1), brand("alpha", false, 1)];
        let summary = summarize(&brands, &[], 200);
        assert_eq!(summary.top_brands[0].name, "alpha");
    }

    #[test]
    fn projects_are_grouped_by_month_in_order() {
        let projects = [
            project(ProjectStatus::Completed, 2026, 8),
            project(ProjectStatus::Pending, 2026, 7),
            project(ProjectStatus::Completed, 2026, 8),
        ];
        let summary = summarize(&[], &projects, 200);
        assert_eq!(summary.projects_completed, 2);
        assert_eq!(
            summary.per_month,
            vec![
                MonthCount { month: "2026-07".into(), count: 1 },
                MonthCount { month: "2026-08".into(), count: 2 },
            ]
        );
    }
}
