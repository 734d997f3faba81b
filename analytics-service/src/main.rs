use std::{env, sync::Arc};

use analytics_service::{
    comparison::ComparisonEngine,
    config::AppConfig,
    daily::DailyAggregator,
    metrics_server, observability,
    rollup::PeriodAggregator,
    switching::SwitchingAnalyzer,
};
use anyhow::{bail, Context, Result};
use meter_client::domain::PeriodKind;
use meter_client::PgStore;
use sqlx::postgres::PgPoolOptions;
use time::Date;

const USAGE: &str = "usage: analytics-service <command> [args]\n\
    \n\
    commands:\n\
    \x20 daily <date>                                    aggregate raw readings for one day\n\
    \x20 period <weekly|monthly|annual> <anchor-date>    roll up the calendar window containing the anchor\n\
    \x20 compare <daily|weekly|monthly|annual> <meter> <date>\n\
    \x20 switching <meter> <tariff> <start> <end> [energy-type]\n\
    \x20 detailed <meter> <date>                         trailing-window analysis with an inferred tariff\n\
    \x20 history <meter> [limit]                         recent switching analyses, newest first\n\
    \n\
    dates are YYYY-MM-DD";

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("{USAGE}");
    }

    let cfg = AppConfig::load()?;
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr);
    }

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.uri)
        .await?;
    let store = Arc::new(PgStore::new(pool));

    match args[1].as_str() {
        "daily" => {
            let date = parse_date(arg(&args, 2, "date")?)?;
            let aggregator = DailyAggregator::new(store.clone(), store.clone(), store.clone());
            let summary = aggregator.aggregate(date).await?;
            print_json(&summary)?;
        }
        "period" => {
            let kind: PeriodKind = arg(&args, 2, "period kind")?.parse()?;
            let anchor = parse_date(arg(&args, 3, "anchor date")?)?;
            let (start, end) = kind.containing(anchor);
            let aggregator = PeriodAggregator::new(store.clone(), store.clone());
            let summary = aggregator.aggregate(kind, start, end).await?;
            print_json(&summary)?;
        }
        "compare" => {
            let scope = arg(&args, 2, "comparison scope")?;
            let meter_id = parse_id(arg(&args, 3, "meter id")?)?;
            let date = parse_date(arg(&args, 4, "date")?)?;
            let engine = ComparisonEngine::new(store.clone());
            match scope {
                "daily" => print_json(&engine.daily_comparison(meter_id, date).await?)?,
                scope => {
                    let kind: PeriodKind = scope.parse()?;
                    print_json(&engine.period_comparison(kind, meter_id, date).await?)?;
                }
            }
        }
        "switching" => {
            let meter_id = parse_id(arg(&args, 2, "meter id")?)?;
            let tariff_id = parse_id(arg(&args, 3, "tariff id")?)?;
            let start = parse_date(arg(&args, 4, "start date")?)?;
            let end = parse_date(arg(&args, 5, "end date")?)?;
            let energy_type = args.get(6).map(String::as_str);
            let analyzer = SwitchingAnalyzer::new(store.clone(), store.clone(), store.clone());
            let outcome = analyzer
                .analyze(meter_id, tariff_id, start, end, energy_type, true)
                .await?;
            print_json(&outcome)?;
        }
        "detailed" => {
            let meter_id = parse_id(arg(&args, 2, "meter id")?)?;
            let date = parse_date(arg(&args, 3, "date")?)?;
            let analyzer = SwitchingAnalyzer::new(store.clone(), store.clone(), store.clone());
            let outcome = analyzer
                .detailed_analysis(meter_id, date, cfg.analysis.detailed_window_days)
                .await?;
            print_json(&outcome)?;
        }
        "history" => {
            let meter_id = parse_id(arg(&args, 2, "meter id")?)?;
            let limit = match args.get(3) {
                Some(raw) => raw.parse::<i64>().with_context(|| format!("invalid limit '{raw}'"))?,
                None => cfg.analysis.history_limit,
            };
            let analyzer = SwitchingAnalyzer::new(store.clone(), store.clone(), store.clone());
            print_json(&analyzer.history(meter_id, limit).await?)?;
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }

    Ok(())
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing {name}\n\n{USAGE}"))
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("invalid id '{raw}', expected an integer"))
}

fn parse_date(raw: &str) -> Result<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, format).with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
