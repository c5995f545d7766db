mod cli;

use chrono::{DateTime, Local, TimeDelta};
use clap::{Parser, crate_version};
use sunledger::{
    balance::EnergyBalance,
    billing::bill::bills_within,
    prelude::*,
    series::{DailyLoadCurve, SeriesWindow, SolarCurve},
    statistics::{RevenueOverview, StatsPeriod},
    tables::{
        build_balance_table,
        build_bills_table,
        build_classification_table,
        build_consumption_points_table,
        build_daily_revenue_table,
        build_electricity_stats_table,
        build_overview_table,
        build_revenue_breakdown_table,
        build_revenue_points_table,
        build_revenue_stats_table,
        build_tariff_table,
    },
    tariff::{ClockTime, Tariff},
};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command, ConsumptionArgs, SelfUseArgs, SeriesArgs, report_bills};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let now = Local::now();

    match args.command {
        Command::Classify(classify_args) => {
            let tariff = args.tariff.load()?;
            let times = if classify_args.times.is_empty() {
                vec![ClockTime::of(&now)]
            } else {
                classify_args.times
            };
            println!("{}", build_classification_table(&tariff, &times));
        }
        Command::Balance(balance_args) => {
            let balance =
                EnergyBalance::new(balance_args.generation, balance_args.consumption, now);
            println!("{}", build_balance_table(&balance));
        }
        Command::Revenue(revenue_args) => {
            let tariff = args.tariff.load()?;
            let self_use_ratio = validate_self_use_ratio(revenue_args.self_use)?;
            let at = revenue_args.at.unwrap_or(now);
            let point = tariff.revenue_point(at, revenue_args.energy, self_use_ratio);
            let breakdown =
                tariff.revenue_breakdown(revenue_args.energy, &at, self_use_ratio).round_to_cents();
            let saving = tariff.self_use_saving(point.self_use_energy, &at);
            info!(revenue = %point.revenue, %saving, "valued");
            println!("{}", build_revenue_points_table(&[point]));
            println!("{}", build_revenue_breakdown_table(&breakdown, saving));
        }
        Command::Series(series_args) => {
            report_revenue(&args.tariff.load()?, &series_args, now)?;
        }
        Command::Consumption(consumption_args) => {
            report_consumption(&args.tariff.load()?, &consumption_args, now)?;
        }
        Command::Bill(bill_args) => {
            let tariff = args.tariff.load()?;
            let bills = report_bills(&tariff, &bill_args, now)?;
            let bills: Vec<_> =
                bills_within(&bills, bill_args.window.months(), now.date_naive()).collect();
            println!("{}", build_bills_table(&bills));
        }
        Command::Tariff => {
            let config = args.tariff.load_config()?;
            let tariff = Tariff::try_from(&config)?;
            println!("{}", config.to_json()?);
            println!("{}", build_tariff_table(&tariff));
        }
    }

    info!("done!");
    Ok(())
}

fn validate_self_use_ratio(args: SelfUseArgs) -> Result<f64> {
    ensure!(
        (0.0..=1.0).contains(&args.self_use_ratio),
        "the self-use ratio must be within 0..=1, got {}",
        args.self_use_ratio,
    );
    Ok(args.self_use_ratio)
}

#[instrument(skip_all, fields(period = %args.window.period))]
fn report_revenue(tariff: &Tariff, args: &SeriesArgs, now: DateTime<Local>) -> Result {
    let solar = SolarCurve {
        peak_hourly_energy: args.generation.peak_hourly_energy,
        self_use_ratio: validate_self_use_ratio(args.self_use)?,
    };
    let window = args.window.current(now)?;
    let points = tariff.revenue_series(&window, &solar)?;
    if args.points {
        println!("{}", build_revenue_points_table(&points));
    }
    let stats = tariff.revenue_stats(&points, args.window.period);
    if args.window.period != StatsPeriod::Day {
        println!("{}", build_daily_revenue_table(&tariff.daily_revenue(&points)));
    }
    println!("{}", build_revenue_stats_table(&stats));

    if args.window.period == StatsPeriod::Day {
        let yesterday = SeriesWindow::builder()
            .start(StatsPeriod::Day.start_of(now - TimeDelta::days(1))?)
            .end(window.start - window.interval)
            .interval(window.interval)
            .build();
        let yesterday_stats =
            tariff.revenue_stats(&tariff.revenue_series(&yesterday, &solar)?, StatsPeriod::Day);
        println!("{}", build_overview_table(&RevenueOverview::new(&stats, &yesterday_stats)));
    }
    Ok(())
}

#[instrument(skip_all, fields(period = %args.window.period))]
fn report_consumption(tariff: &Tariff, args: &ConsumptionArgs, now: DateTime<Local>) -> Result {
    let window = args.window.current(now)?;
    let points = tariff.consumption_series(&window, &DailyLoadCurve::default())?;
    if args.points {
        println!("{}", build_consumption_points_table(&points));
    }
    let stats = tariff.electricity_stats(&points, args.window.period, window.start, window.end);
    println!("{}", build_electricity_stats_table(&stats));
    Ok(())
}
