use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;
use sunledger_quantities::{cost::Cost, energy::KilowattHours};

use crate::{
    balance::EnergyBalance,
    billing::{ConsumptionPoint, bill::ElectricityBill},
    revenue::{RevenueBreakdown, RevenuePoint, Trend},
    statistics::{DailyRevenue, ElectricityStats, RevenueOverview, RevenueStats},
    tariff::{ClockTime, Period, Tariff},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn period_cell(period: Period) -> Cell {
    Cell::new(period).fg(period.color())
}

fn right(cell: Cell) -> Cell {
    cell.set_alignment(CellAlignment::Right)
}

fn energy_cell(energy: KilowattHours) -> Cell {
    let cell = right(Cell::new(energy));
    if energy <= KilowattHours::ZERO { cell.add_attribute(Attribute::Dim) } else { cell }
}

fn cost_cell(cost: Cost) -> Cell {
    right(Cell::new(cost)).fg(if cost < Cost::ZERO { Color::Green } else { Color::Reset })
}

pub fn build_tariff_table(tariff: &Tariff) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Price", "Hours", "Minutes per day"]);
    for period in Period::ALL {
        let hours = tariff.hours(period);
        table.add_row(vec![
            period_cell(period),
            right(Cell::new(tariff.price_of(period))),
            Cell::new(hours.iter().join(", ")),
            right(Cell::new(hours.iter().map(|range| range.minutes()).sum::<u16>()))
                .add_attribute(Attribute::Dim),
        ]);
    }
    table.add_row(vec![
        Cell::new("subsidy").add_attribute(Attribute::Dim),
        right(Cell::new(tariff.subsidy_price)),
        Cell::new(""),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("grid").add_attribute(Attribute::Dim),
        right(Cell::new(tariff.grid_price)),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

pub fn build_classification_table(tariff: &Tariff, times: &[ClockTime]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Period", "Price"]);
    for time in times {
        let period = tariff.classify_clock_time(*time);
        table.add_row(vec![
            Cell::new(time),
            period_cell(period),
            right(Cell::new(tariff.price_of(period))).fg(period.color()),
        ]);
    }
    table
}

pub fn build_revenue_points_table(points: &[RevenuePoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Time", "Period", "Energy", "Self-use", "Grid", "Revenue"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(point.timestamp.format("%H:%M")),
            period_cell(point.period),
            energy_cell(point.energy),
            energy_cell(point.self_use_energy),
            energy_cell(point.grid_energy),
            right(Cell::new(point.revenue)).fg(Color::Green),
        ]);
    }
    table
}

pub fn build_revenue_breakdown_table(breakdown: &RevenueBreakdown, saving: Cost) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Self-use", "Grid", "Subsidy", "Total", "Saved purchase"]);
    table.add_row(vec![
        right(Cell::new(breakdown.self_use)),
        right(Cell::new(breakdown.grid)),
        right(Cell::new(breakdown.subsidy)),
        right(Cell::new(breakdown.total())).fg(Color::Green).add_attribute(Attribute::Bold),
        right(Cell::new(saving)).add_attribute(Attribute::Dim),
    ]);
    table
}

pub fn build_daily_revenue_table(days: &[DailyRevenue]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Energy", "Self-use", "Grid", "Revenue"]);
    for day in days {
        table.add_row(vec![
            Cell::new(day.date.format("%a %b %d")),
            energy_cell(day.energy),
            energy_cell(day.self_use_energy),
            energy_cell(day.grid_energy),
            right(Cell::new(day.revenue)).fg(Color::Green),
        ]);
    }
    table
}

pub fn build_consumption_points_table(points: &[ConsumptionPoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Time", "Period", "Consumption", "Cost"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.timestamp.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(point.timestamp.format("%H:%M")),
            period_cell(point.period),
            energy_cell(point.consumption),
            right(Cell::new(point.cost)).fg(point.period.color()),
        ]);
    }
    table
}

pub fn build_revenue_stats_table(stats: &RevenueStats) -> Table {
    let mut table = new_table();
    table.set_header(vec![Cell::new(stats.period), Cell::new("Energy"), Cell::new("Revenue")]);
    table.add_row(vec![
        Cell::new("self-use"),
        energy_cell(stats.self_use_energy),
        right(Cell::new(stats.self_use_revenue)),
    ]);
    table.add_row(vec![
        Cell::new("grid"),
        energy_cell(stats.grid_energy),
        right(Cell::new(stats.grid_revenue)),
    ]);
    table.add_row(vec![
        Cell::new("subsidy"),
        energy_cell(stats.total_energy).add_attribute(Attribute::Dim),
        right(Cell::new(stats.subsidy_revenue)),
    ]);
    table.add_row(vec![
        Cell::new("total").add_attribute(Attribute::Bold),
        energy_cell(stats.total_energy).add_attribute(Attribute::Bold),
        right(Cell::new(stats.total_revenue)).fg(Color::Green).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("self-use rate").add_attribute(Attribute::Dim),
        right(Cell::new(stats.self_use_rate)),
        Cell::new(""),
    ]);
    table
}

pub fn build_overview_table(overview: &RevenueOverview) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Revenue", "Energy", "Self-use rate", "Trend", "Change"]);
    table.add_row(vec![
        right(Cell::new(overview.today_revenue)).fg(Color::Green),
        right(Cell::new(overview.today_energy)),
        right(Cell::new(overview.self_use_rate)),
        Cell::new(overview.trend).fg(match overview.trend {
            Trend::Up => Color::Green,
            Trend::Down => Color::Red,
            Trend::Stable => Color::Reset,
        }),
        right(Cell::new(overview.change_rate)),
    ]);
    table
}

pub fn build_electricity_stats_table(stats: &ElectricityStats) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Period", "Consumption", "Cost"]);
    for (period, cost) in stats.cost.by_period().iter() {
        table.add_row(vec![
            period_cell(period),
            energy_cell(*stats.consumption_by_period.get(period)),
            cost_cell(*cost),
        ]);
    }
    table.add_row(vec![
        Cell::new("total").add_attribute(Attribute::Bold),
        energy_cell(stats.total_consumption).add_attribute(Attribute::Bold),
        cost_cell(stats.cost.total).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("average").add_attribute(Attribute::Dim),
        Cell::new(""),
        right(Cell::new(stats.average_price)),
    ]);
    table
}

pub fn build_balance_table(balance: &EnergyBalance) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Generation",
        "Consumption",
        "Self-use",
        "Grid feed",
        "Grid draw",
        "Self-use rate",
    ]);
    table.add_row(vec![
        energy_cell(balance.generation),
        energy_cell(balance.consumption),
        energy_cell(balance.flow.self_use),
        energy_cell(balance.flow.grid_feed).fg(Color::Green),
        energy_cell(balance.flow.grid_draw).fg(Color::Red),
        right(Cell::new(balance.flow.self_use_rate)),
    ]);
    table
}

pub fn build_bills_table(bills: &[&ElectricityBill]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Month",
        "Consumption",
        "Peak",
        "Valley",
        "Flat",
        "Total cost",
        "Average",
        "Saving",
        "Grid",
        "Actual",
        "Status",
    ]);
    for bill in bills {
        table.add_row(vec![
            Cell::new(&bill.period),
            energy_cell(bill.total_consumption),
            cost_cell(bill.cost_by_period.peak).fg(Period::Peak.color()),
            cost_cell(bill.cost_by_period.valley).fg(Period::Valley.color()),
            cost_cell(bill.cost_by_period.flat).fg(Period::Flat.color()),
            cost_cell(bill.total_cost),
            right(Cell::new(bill.average_price)).add_attribute(Attribute::Dim),
            cost_cell(bill.self_use_saving),
            cost_cell(bill.grid_revenue),
            cost_cell(bill.actual_cost).add_attribute(Attribute::Bold),
            Cell::new(bill.status),
        ]);
    }
    table
}
