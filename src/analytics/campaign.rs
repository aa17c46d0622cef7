//! Campaign delivery metrics

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{pct, round2};
use crate::models::{Campaign, CampaignAnalytics, CampaignStatus, Channel};

/// Summed delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeliveryTotals {
    pub sent: u64,
    pub opened: u64,
    pub clicked: u64,
    pub conversions: u64,
    pub bounced: u64,
    pub unsubscribed: u64,
    pub revenue: f64,
}

impl DeliveryTotals {
    pub fn add(&mut self, row: &CampaignAnalytics) {
        self.sent += row.sent;
        self.opened += row.opened;
        self.clicked += row.clicked;
        self.conversions += row.conversions;
        self.bounced += row.bounced;
        self.unsubscribed += row.unsubscribed;
        self.revenue += row.revenue;
    }

    pub fn merge(&mut self, other: &DeliveryTotals) {
        self.sent += other.sent;
        self.opened += other.opened;
        self.clicked += other.clicked;
        self.conversions += other.conversions;
        self.bounced += other.bounced;
        self.unsubscribed += other.unsubscribed;
        self.revenue += other.revenue;
    }

    /// All rates are relative to `sent`
    pub fn rates(&self) -> DeliveryRates {
        DeliveryRates {
            open_rate: pct(self.opened, self.sent),
            click_rate: pct(self.clicked, self.sent),
            conversion_rate: pct(self.conversions, self.sent),
            bounce_rate: pct(self.bounced, self.sent),
            unsubscribe_rate: pct(self.unsubscribed, self.sent),
        }
    }
}

/// Percentages, rounded to 2 decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DeliveryRates {
    pub open_rate: f64,
    pub click_rate: f64,
    pub conversion_rate: f64,
    pub bounce_rate: f64,
    pub unsubscribe_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: DeliveryTotals,
    #[serde(flatten)]
    pub rates: DeliveryRates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignMetrics {
    pub campaign_id: Uuid,
    pub name: String,
    pub channel: Channel,
    pub status: CampaignStatus,
    pub budget: f64,
    pub totals: DeliveryTotals,
    pub rates: DeliveryRates,
    /// `(revenue - budget) / budget`, as a percentage; 0 without a budget
    pub roi: f64,
    pub daily: Vec<DailyPoint>,
}

/// Metrics for one campaign; rows for other campaigns are ignored
pub fn campaign_metrics(campaign: &Campaign, rows: &[CampaignAnalytics]) -> CampaignMetrics {
    let mut totals = DeliveryTotals::default();
    let mut by_day: BTreeMap<NaiveDate, DeliveryTotals> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.campaign_id == campaign.id) {
        totals.add(row);
        by_day.entry(row.date).or_default().add(row);
    }

    let daily = by_day
        .into_iter()
        .map(|(date, totals)| DailyPoint {
            date,
            rates: totals.rates(),
            totals,
        })
        .collect();

    CampaignMetrics {
        campaign_id: campaign.id,
        name: campaign.name.clone(),
        channel: campaign.channel,
        status: campaign.status,
        budget: campaign.budget,
        rates: totals.rates(),
        roi: round2(super::rate(totals.revenue - campaign.budget, campaign.budget)),
        totals,
        daily,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignOverview {
    pub totals: DeliveryTotals,
    pub rates: DeliveryRates,
    pub campaigns: Vec<CampaignMetrics>,
}

/// Per-campaign metrics plus totals across every campaign
pub fn campaign_overview(campaigns: &[Campaign], rows: &[CampaignAnalytics]) -> CampaignOverview {
    let metrics: Vec<CampaignMetrics> = campaigns
        .iter()
        .map(|campaign| campaign_metrics(campaign, rows))
        .collect();

    let mut totals = DeliveryTotals::default();
    for m in &metrics {
        totals.merge(&m.totals);
    }

    CampaignOverview {
        rates: totals.rates(),
        totals,
        campaigns: metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn campaign(budget: f64) -> Campaign {
        Campaign {
            id: Uuid::new_v4(),
            name: "Spring launch".to_string(),
            channel: Channel::Email,
            status: CampaignStatus::Active,
            budget,
            start_date: None,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    fn day(campaign_id: Uuid, date: &str, sent: u64, opened: u64, clicked: u64) -> CampaignAnalytics {
        CampaignAnalytics {
            id: Uuid::new_v4(),
            campaign_id,
            date: date.parse().unwrap(),
            sent,
            opened,
            clicked,
            conversions: clicked / 2,
            bounced: 0,
            unsubscribed: 0,
            revenue: 10.0 * (clicked / 2) as f64,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rates_are_zero_when_nothing_sent() {
        let c = campaign(100.0);
        let metrics = campaign_metrics(&c, &[day(c.id, "2024-03-01", 0, 0, 0)]);
        assert_eq!(metrics.rates.open_rate, 0.0);
        assert_eq!(metrics.rates.click_rate, 0.0);
        assert!(metrics.daily[0].rates.open_rate.is_finite());
    }

    #[test]
    fn test_campaign_metrics() {
        let c = campaign(50.0);
        let other = campaign(0.0);
        let rows = vec![
            day(c.id, "2024-03-02", 100, 40, 10),
            day(c.id, "2024-03-01", 100, 20, 10),
            day(other.id, "2024-03-01", 1000, 1000, 1000),
        ];

        let metrics = campaign_metrics(&c, &rows);
        assert_eq!(metrics.totals.sent, 200);
        assert_eq!(metrics.rates.open_rate, 30.0);
        assert_eq!(metrics.rates.click_rate, 10.0);
        assert_eq!(metrics.rates.conversion_rate, 5.0);
        // revenue 100 on a budget of 50
        assert_eq!(metrics.roi, 100.0);

        let dates: Vec<String> = metrics.daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(metrics.daily[1].rates.open_rate, 40.0);
    }

    #[test]
    fn test_overview_totals() {
        let a = campaign(0.0);
        let b = campaign(0.0);
        let rows = vec![day(a.id, "2024-03-01", 100, 50, 0), day(b.id, "2024-03-01", 300, 50, 0)];

        let overview = campaign_overview(&[a, b], &rows);
        assert_eq!(overview.campaigns.len(), 2);
        assert_eq!(overview.totals.sent, 400);
        assert_eq!(overview.rates.open_rate, 25.0);
        assert_eq!(overview.campaigns[0].roi, 0.0);
    }
}
