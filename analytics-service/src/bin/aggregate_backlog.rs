//! Re-runs daily aggregation over an inclusive date range, then refreshes
//! every weekly/monthly/annual window the range touches. Safe to repeat:
//! all writes are keyed upserts.

use std::collections::BTreeSet;
use std::{env, sync::Arc};

use analytics_service::{
    config::AppConfig, daily::DailyAggregator, observability, rollup::PeriodAggregator,
};
use anyhow::{bail, Context, Result};
use meter_client::domain::PeriodKind;
use meter_client::PgStore;
use sqlx::postgres::PgPoolOptions;
use time::{Date, Duration};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: aggregate_backlog <start-date> <end-date>");
    }
    let start = parse_date(&args[1])?;
    let end = parse_date(&args[2])?;
    if start > end {
        bail!("start date {start} is after end date {end}");
    }

    let cfg = AppConfig::load()?;
    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;
    let store = Arc::new(PgStore::new(pool));

    let daily = DailyAggregator::new(store.clone(), store.clone(), store.clone());
    let mut date = start;
    while date <= end {
        let summary = daily.aggregate(date).await?;
        if summary.errors > 0 {
            tracing::warn!(
                date = %date,
                errors = summary.errors,
                "backlog day finished with per-meter errors"
            );
        }
        date += Duration::days(1);
    }

    // Refresh every period window the backfilled days fall into.
    let rollup = PeriodAggregator::new(store.clone(), store.clone());
    for kind in [PeriodKind::Weekly, PeriodKind::Monthly, PeriodKind::Annual] {
        let mut windows = BTreeSet::new();
        let mut date = start;
        while date <= end {
            windows.insert(kind.containing(date));
            date += Duration::days(1);
        }
        for (window_start, window_end) in windows {
            rollup.aggregate(kind, window_start, window_end).await?;
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, format).with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}
