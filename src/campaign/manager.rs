use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Error;

use super::date::{self, DateFormat, MILLIS_PER_DAY, NULL_DATE_MILLIS};
use super::db::CampaignStore;

pub const EXPECTED_ELIGIBLE: usize = 40;

const START_SPREAD_DAYS: i64 = 30;
const MIN_RUN_DAYS: i64 = 14;
const RUN_SPREAD_DAYS: i64 = 70;

#[derive(Clone, Debug)]
pub struct BackfillOptions {
    pub status: String,
    pub null_date_millis: i64,
    pub expected_count: Option<usize>,
    pub now: DateTime<Utc>,
}

impl BackfillOptions {
    pub fn new(now: DateTime<Utc>) -> BackfillOptions {
        BackfillOptions {
            status: super::UNDER_DEVELOPMENT.to_string(),
            null_date_millis: NULL_DATE_MILLIS,
            expected_count: Some(EXPECTED_ELIGIBLE),
            now,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub eligible: usize,
    pub updated: Vec<String>,
    pub fallback_baselines: Vec<String>,
    pub count_mismatch: bool,
    #[serde(skip)]
    pub updated_indices: Vec<usize>,
}

pub fn is_eligible(campaign: &Value, options: &BackfillOptions) -> bool {
    super::status(campaign) == Some(options.status.as_str())
        && date::is_null_date(super::start_date(campaign), options.null_date_millis)
        && date::is_null_date(super::end_date(campaign), options.null_date_millis)
}

// linear over [0, 30] days; the first eligible record starts on its baseline
pub fn start_offset(index: usize, count: usize) -> Duration {
    Duration::milliseconds(spread(index, count, START_SPREAD_DAYS))
}

// linear over [14, 84] days, measured from the record's own start date
pub fn end_offset(index: usize, count: usize) -> Duration {
    Duration::milliseconds(MIN_RUN_DAYS * MILLIS_PER_DAY + spread(index, count, RUN_SPREAD_DAYS))
}

fn spread(index: usize, count: usize, days: i64) -> i64 {
    if count <= 1 {
        return 0;
    }

    index as i64 * days * MILLIS_PER_DAY / (count as i64 - 1)
}

fn synthetic_dates(
    baseline: date::StoredDate,
    index: usize,
    count: usize,
) -> Option<(date::StoredDate, date::StoredDate)> {
    let start = baseline
        .instant
        .checked_add_signed(start_offset(index, count))?;
    let end = start.checked_add_signed(end_offset(index, count))?;

    Some((
        date::StoredDate {
            instant: start,
            format: baseline.format,
        },
        date::StoredDate {
            instant: end,
            format: baseline.format,
        },
    ))
}

#[tracing::instrument(skip(campaigns))]
pub fn backfill_dates(campaigns: &mut [Value], options: &BackfillOptions) -> BackfillReport {
    let eligible: Vec<usize> = campaigns
        .iter()
        .enumerate()
        .filter(|(_, campaign)| is_eligible(campaign, options))
        .map(|(index, _)| index)
        .collect();

    let mut report = BackfillReport {
        total: campaigns.len(),
        eligible: eligible.len(),
        ..BackfillReport::default()
    };

    if let Some(expected) = options.expected_count {
        if expected != eligible.len() {
            warn!(
                expected,
                found = eligible.len(),
                "eligible campaign count differs from expected, continuing"
            );
            report.count_mismatch = true;
        }
    }

    let count = eligible.len();
    for (i, &index) in eligible.iter().enumerate() {
        let campaign = &mut campaigns[index];
        let label = super::label(campaign, index);

        let created_at = super::created_at(campaign)
            .filter(|value| !date::is_null_date(Some(*value), options.null_date_millis))
            .and_then(date::parse_date);

        let (start, end) = match created_at.and_then(|baseline| synthetic_dates(baseline, i, count)) {
            Some(dates) => dates,
            None => {
                warn!(
                    campaign = %label,
                    index,
                    "campaign has no usable createdat, using current time"
                );
                report.fallback_baselines.push(label.clone());
                let baseline = date::StoredDate {
                    instant: options.now,
                    format: DateFormat::default(),
                };
                match synthetic_dates(baseline, i, count) {
                    Some(dates) => dates,
                    None => {
                        warn!(
                            campaign = %label,
                            index,
                            "current time is out of range, skipping"
                        );
                        continue;
                    }
                }
            }
        };

        super::set_dates(
            campaign,
            date::format_date(start.instant, start.format),
            date::format_date(end.instant, end.format),
        );

        report.updated.push(label);
        report.updated_indices.push(index);
    }

    report
}

#[tracing::instrument(skip(db))]
pub async fn backfill_campaigns(
    db: &dyn CampaignStore,
    options: &BackfillOptions,
) -> Result<BackfillReport, Error> {
    let mut campaigns = db.load_campaigns().await?;

    let report = backfill_dates(&mut campaigns, options);

    db.save_campaigns(&campaigns, &report.updated_indices)
        .await?;

    info!(
        total = report.total,
        eligible = report.eligible,
        updated = report.updated.len(),
        fallback = report.fallback_baselines.len(),
        "backfilled campaign dates"
    );

    Ok(report)
}
