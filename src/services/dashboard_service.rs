// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, Utc};
use sqlx::{Acquire, Sqlite};

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::{
        crm::{LEAD_STATUS_NEW, LEAD_STATUS_QUALIFIED, Lead, Opportunity},
        dashboard::{DashboardSummary, MonthlyRevenue, StageCount, StatusCount},
    },
};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// How many calendar months the revenue chart trails over, anchored to now.
const REVENUE_WINDOW_MONTHS: i32 = 6;

/// Computes the dashboard from the entity lists on every call; nothing is
/// cached or persisted, so the summary is always as fresh as the store.
#[derive(Clone)]
pub struct DashboardService {
    repo: CrmRepository,
}

impl DashboardService {
    pub fn new(repo: CrmRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary<'e, A>(&self, acquirable: A) -> Result<DashboardSummary, AppError>
    where
        A: Acquire<'e, Database = Sqlite>,
    {
        let mut conn = acquirable.acquire().await?;

        let accounts = self.repo.list_accounts(&mut *conn).await?;
        let leads = self.repo.list_leads(&mut *conn).await?;
        let opps = self.repo.list_opportunities(&mut *conn).await?;

        Ok(DashboardSummary {
            total_accounts: accounts.len() as u32,
            total_leads: leads.len() as u32,
            total_opps: opps.len() as u32,
            total_revenue: total_revenue(&opps),
            conversion_rate: conversion_rate(&leads),
            pipeline_by_stage: pipeline_by_stage(&opps),
            lead_status_distribution: lead_status_distribution(&leads),
            revenue_by_month: revenue_by_month(&opps, Utc::now()),
        })
    }
}

/// Sum of all known amounts; a missing amount contributes 0.
pub fn total_revenue(opps: &[Opportunity]) -> f64 {
    opps.iter().filter_map(|o| o.amount).sum()
}

/// Qualified leads (case-insensitive) over all leads, as a percentage.
/// Defined as 0 when there are no leads.
pub fn conversion_rate(leads: &[Lead]) -> f64 {
    if leads.is_empty() {
        return 0.0;
    }
    let qualified = leads
        .iter()
        .filter(|l| l.status.eq_ignore_ascii_case(LEAD_STATUS_QUALIFIED))
        .count();
    qualified as f64 / leads.len() as f64 * 100.0
}

/// Opportunity counts grouped by stage string, groups in first-seen order
/// over the input. Blank stages land in an "UNKNOWN" bucket rather than
/// being dropped.
pub fn pipeline_by_stage(opps: &[Opportunity]) -> Vec<StageCount> {
    let mut buckets: Vec<StageCount> = Vec::new();
    for opp in opps {
        let stage = match opp.stage.trim() {
            "" => "UNKNOWN",
            stage => stage,
        };
        match buckets.iter_mut().find(|b| b.stage == stage) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(StageCount {
                stage: stage.to_string(),
                count: 1,
            }),
        }
    }
    buckets
}

/// Lead counts grouped by uppercased status; blank statuses count as NEW.
pub fn lead_status_distribution(leads: &[Lead]) -> Vec<StatusCount> {
    let mut buckets: Vec<StatusCount> = Vec::new();
    for lead in leads {
        let status = match lead.status.trim() {
            "" => LEAD_STATUS_NEW.to_string(),
            status => status.to_uppercase(),
        };
        match buckets.iter_mut().find(|b| b.status == status) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(StatusCount { status, count: 1 }),
        }
    }
    buckets
}

/// Revenue bucketed by creation month over the trailing six calendar months
/// anchored to `now`. The window moves with the clock; months without
/// opportunities contribute a zero point so the chart has no gaps.
pub fn revenue_by_month(opps: &[Opportunity], now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    // Months counted from year zero make the year wrap-around arithmetic flat.
    let anchor = now.year() * 12 + now.month0() as i32;

    (0..REVENUE_WINDOW_MONTHS)
        .rev()
        .map(|offset| {
            let months = anchor - offset;
            let year = months.div_euclid(12);
            let month0 = months.rem_euclid(12) as usize;
            let month = format!("{year:04}-{:02}", month0 + 1);

            let total = opps
                .iter()
                .filter(|o| month_key(o.created_at) == month)
                .filter_map(|o| o.amount)
                .sum();

            MonthlyRevenue {
                label: format!("{} {:02}", MONTH_LABELS[month0], year.rem_euclid(100)),
                month,
                total,
            }
        })
        .collect()
}

fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn opp_with(amount: Option<f64>, stage: &str, created_at: DateTime<Utc>) -> Opportunity {
        Opportunity {
            id: Uuid::new_v4(),
            name: "deal".to_string(),
            stage: stage.to_string(),
            amount,
            account_id: Uuid::new_v4(),
            created_at,
        }
    }

    fn lead_with(status: &str) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            company: None,
            email: None,
            status: status.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_amounts_count_as_zero_revenue() {
        let now = Utc::now();
        let opps = vec![
            opp_with(Some(100.0), "PROSPECTING", now),
            opp_with(None, "PROSPECTING", now),
            opp_with(Some(50.0), "WON", now),
        ];
        assert_eq!(total_revenue(&opps), 150.0);
    }

    #[test]
    fn conversion_rate_is_case_insensitive() {
        let leads = vec![
            lead_with("QUALIFIED"),
            lead_with("qualified"),
            lead_with("NEW"),
            lead_with("NEW"),
        ];
        assert_eq!(conversion_rate(&leads), 50.0);
    }

    #[test]
    fn conversion_rate_without_leads_is_zero() {
        assert_eq!(conversion_rate(&[]), 0.0);
    }

    #[test]
    fn pipeline_groups_in_first_seen_order_with_unknown_bucket() {
        let now = Utc::now();
        let opps = vec![
            opp_with(None, "A", now),
            opp_with(None, "A", now),
            opp_with(None, "", now),
        ];
        assert_eq!(
            pipeline_by_stage(&opps),
            vec![
                StageCount { stage: "A".to_string(), count: 2 },
                StageCount { stage: "UNKNOWN".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn lead_statuses_are_uppercased_and_blank_defaults_to_new() {
        let leads = vec![lead_with("new"), lead_with("NEW"), lead_with(""), lead_with("Qualified")];
        assert_eq!(
            lead_status_distribution(&leads),
            vec![
                StatusCount { status: "NEW".to_string(), count: 3 },
                StatusCount { status: "QUALIFIED".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn revenue_window_trails_six_months_with_zero_fill() {
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();
        let opps = vec![
            opp_with(Some(100.0), "WON", Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()),
            opp_with(Some(40.0), "WON", Utc.with_ymd_and_hms(2026, 5, 20, 9, 30, 0).unwrap()),
            // Outside the window, must not appear anywhere.
            opp_with(Some(999.0), "WON", Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap()),
        ];

        let series = revenue_by_month(&opps, now);

        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2026-03", "2026-04", "2026-05", "2026-06", "2026-07", "2026-08"]
        );
        let totals: Vec<f64> = series.iter().map(|m| m.total).collect();
        assert_eq!(totals, vec![0.0, 0.0, 40.0, 0.0, 0.0, 100.0]);
    }

    #[test]
    fn month_boundary_falls_into_exactly_one_bucket() {
        let now = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let boundary = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let series = revenue_by_month(&[opp_with(Some(10.0), "WON", boundary)], now);

        let hits: Vec<&MonthlyRevenue> = series.iter().filter(|m| m.total > 0.0).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].month, "2026-06");
    }

    #[test]
    fn revenue_window_wraps_across_the_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        let series = revenue_by_month(&[], now);

        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(
            months,
            vec!["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]
        );
        assert_eq!(series[0].label, "Sep 25");
        assert_eq!(series[5].label, "Feb 26");
    }
}
