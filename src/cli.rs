mod bill;
mod tariff;
mod window;

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use sunledger::{
    billing::bill::BillWindow,
    revenue::DEFAULT_SELF_USE_RATIO,
    tariff::ClockTime,
};
use sunledger_quantities::energy::KilowattHours;

pub use self::{bill::report_bills, tariff::TariffArgs, window::WindowArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[clap(flatten)]
    pub tariff: TariffArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the tariff period and price of wall-clock times.
    #[clap(name = "classify")]
    Classify(ClassifyArgs),

    /// Split generation and consumption into self-use and grid exchange.
    #[clap(name = "balance")]
    Balance(BalanceArgs),

    /// Revenue of the energy generated at a moment.
    #[clap(name = "revenue")]
    Revenue(RevenueArgs),

    /// Revenue series and statistics of the clear-sky generation profile.
    #[clap(name = "series")]
    Series(Box<SeriesArgs>),

    /// Consumption series and cost statistics of the daily load profile.
    #[clap(name = "consumption")]
    Consumption(Box<ConsumptionArgs>),

    /// Monthly electricity bills.
    #[clap(name = "bill")]
    Bill(Box<BillArgs>),

    /// Print the effective tariff configuration.
    #[clap(name = "tariff")]
    Tariff,
}

#[derive(Parser)]
pub struct ClassifyArgs {
    /// `HH:MM` times to classify, the current time if none.
    #[clap(value_name = "HH:MM")]
    pub times: Vec<ClockTime>,
}

#[derive(Parser)]
pub struct BalanceArgs {
    /// Generated energy in kilowatt-hours.
    #[clap(long, env = "GENERATION_KWH")]
    pub generation: KilowattHours,

    /// Consumed energy in kilowatt-hours.
    #[clap(long, env = "CONSUMPTION_KWH")]
    pub consumption: KilowattHours,
}

#[derive(Parser)]
pub struct RevenueArgs {
    /// Generated energy in kilowatt-hours.
    #[clap(long)]
    pub energy: KilowattHours,

    /// Generation time, now if omitted.
    #[clap(long)]
    pub at: Option<DateTime<Local>>,

    #[clap(flatten)]
    pub self_use: SelfUseArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct SelfUseArgs {
    /// Share of the generated energy consumed on site, `0..=1`.
    #[clap(long, env = "SELF_USE_RATIO", default_value_t = DEFAULT_SELF_USE_RATIO)]
    pub self_use_ratio: f64,
}

#[derive(Parser)]
pub struct SeriesArgs {
    #[clap(flatten)]
    pub window: WindowArgs,

    #[clap(flatten)]
    pub generation: GenerationArgs,

    #[clap(flatten)]
    pub self_use: SelfUseArgs,

    /// Print every point of the series rather than just the statistics.
    #[clap(long)]
    pub points: bool,
}

#[derive(Copy, Clone, Parser)]
pub struct GenerationArgs {
    /// Energy generated over an hour at solar noon on a clear day.
    #[clap(
        long = "peak-hourly-generation-kwh",
        env = "PEAK_HOURLY_GENERATION_KWH",
        default_value = "100"
    )]
    pub peak_hourly_energy: KilowattHours,
}

#[derive(Parser)]
pub struct ConsumptionArgs {
    #[clap(flatten)]
    pub window: WindowArgs,

    /// Print every point of the series rather than just the statistics.
    #[clap(long)]
    pub points: bool,
}

#[derive(Parser)]
pub struct BillArgs {
    /// How far back to list the bills.
    #[clap(long, env = "BILL_WINDOW", default_value = "half")]
    pub window: BillWindow,

    #[clap(flatten)]
    pub generation: GenerationArgs,
}
