//! CLI command implementations for autoserv reports and record keeping.
//!
//! Provides subcommand handlers for:
//! - `autoserv history VEHICLE` — one vehicle's service visits, newest first
//! - `autoserv add VEHICLE ...` — record a new service visit
//! - `autoserv stats` — overall summary and most replaced parts
//! - `autoserv monthly [--year Y]` — revenue by month
//! - `autoserv daily [--date D]` — services performed on one day
//! - `autoserv migrate [--dry-run]` — backfill legacy records
//! - `autoserv health` — config and database reachability
//! - `autoserv config show|init|set|reset` — configuration management

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;

use crate::analytics::formatter::format_currency;
use crate::analytics::{self, DaySummary, MonthlyBucket, PartFrequency, ServiceSummary, Snapshot, YearView};
use crate::config::{self, AutoservConfig, DisplayConfig};
use crate::records::{
    NewServiceEntry, ServiceItem, ServiceRecord, SparePart, generate_record_id,
    normalize_vehicle_number,
};
use crate::store::{self, RecordStore, migrate_legacy};

/// Output format for report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// autoserv history
// ---------------------------------------------------------------------------

/// Show every recorded visit of one vehicle.
pub fn run_history(
    store: &dyn RecordStore,
    display: &DisplayConfig,
    vehicle: &str,
    format: OutputFormat,
) -> Result<()> {
    let records = analytics::vehicle_history(store, vehicle)
        .with_context(|| format!("failed to load history for {vehicle}"))?;

    if records.is_empty() {
        let vehicle = normalize_vehicle_number(vehicle);
        println!(
            "{}",
            format!(
                "No service records for {vehicle}. Add one with `autoserv add {vehicle} --date YYYY-MM-DD ...`."
            )
            .yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let resolved: Vec<ServiceRecord> =
                records.iter().map(ServiceRecord::with_resolved_totals).collect();
            print_json(&resolved)?
        }
        OutputFormat::Csv => print_history_csv(&records),
        OutputFormat::Table => print_history_table(&records, display),
    }

    Ok(())
}

fn print_history_table(records: &[ServiceRecord], display: &DisplayConfig) {
    let vehicle = records
        .first()
        .map(|r| r.vehicle_number.as_str())
        .unwrap_or_default();
    println!(
        "{}",
        format!("Service History — {vehicle}").bold().cyan()
    );
    println!("{}", "=".repeat(60));

    for record in records {
        println!();
        let km = record
            .kilometer_reading
            .map(|km| format!("  {} km", format_number(km.max(0.0).round() as u64)))
            .unwrap_or_default();
        println!(
            "  {}{}",
            display_date(record).bold(),
            km.dimmed()
        );

        for part in &record.spare_parts {
            println!(
                "    {:<36} {:>16}",
                truncate(&part.name, 36),
                format_currency(part.cost, &display.currency_symbol)
            );
        }
        for item in &record.service_items {
            println!(
                "    {:<36} {:>16}",
                truncate(&item.description, 36),
                format_currency(item.cost, &display.currency_symbol)
            );
        }
        println!("    {}", "-".repeat(53).dimmed());
        println!(
            "    {:<36} {:>16}",
            "Total".bold(),
            format_currency(record.total_cost(), &display.currency_symbol).green()
        );
    }

    println!();
    println!(
        "  {} {} visits",
        "Recorded:".dimmed(),
        records.len()
    );
}

fn print_history_csv(records: &[ServiceRecord]) {
    println!("id,date,kilometer_reading,spare_cost,service_cost,total_cost,parts,services");
    for r in records {
        let parts: Vec<&str> = r.spare_parts.iter().map(|p| p.name.as_str()).collect();
        let services: Vec<&str> = r
            .service_items
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        println!(
            "{},{},{},{:.2},{:.2},{:.2},{},{}",
            csv_field(&r.id),
            csv_field(&r.date),
            r.kilometer_reading.map(|km| km.to_string()).unwrap_or_default(),
            r.spare_cost(),
            r.service_cost(),
            r.total_cost(),
            csv_field(&parts.join("; ")),
            csv_field(&services.join("; ")),
        );
    }
}

// ---------------------------------------------------------------------------
// autoserv add
// ---------------------------------------------------------------------------

/// Validate and store a new service visit.
pub fn run_add(
    store: &dyn RecordStore,
    display: &DisplayConfig,
    vehicle: &str,
    entry: NewServiceEntry,
) -> Result<()> {
    let record = match entry.into_record(vehicle, generate_record_id()) {
        Ok(record) => record,
        Err(errors) => {
            eprintln!("{}", "Service entry rejected:".red().bold());
            for error in &errors {
                eprintln!("  {} {}", "✗".red(), error);
            }
            anyhow::bail!("{} invalid field(s)", errors.len());
        }
    };

    let key = store
        .append(&record.vehicle_number, &record)
        .context("failed to save service record")?;

    println!(
        "{} Saved service for {} on {} ({})",
        "✓".green().bold(),
        record.vehicle_number.bold(),
        display_date(&record),
        format_currency(record.total_cost(), &display.currency_symbol)
    );
    println!("  {} {}", "Key:".dimmed(), key.dimmed());
    Ok(())
}

/// Build an entry from command-line pieces.
///
/// `parts` and `services` are `NAME=COST` pairs.
pub fn build_entry(
    date: &str,
    kilometer_reading: Option<f64>,
    parts: &[String],
    services: &[String],
) -> Result<NewServiceEntry> {
    let spare_parts = parts
        .iter()
        .map(|raw| parse_line_item(raw).map(|(name, cost)| SparePart::new(name, cost)))
        .collect::<Result<Vec<_>>>()?;
    let service_items = services
        .iter()
        .map(|raw| parse_line_item(raw).map(|(desc, cost)| ServiceItem::new(desc, cost)))
        .collect::<Result<Vec<_>>>()?;

    Ok(NewServiceEntry {
        date: date.to_string(),
        kilometer_reading,
        spare_parts,
        service_items,
    })
}

/// Split `NAME=COST` at the last `=`, so names may themselves contain `=`.
pub fn parse_line_item(raw: &str) -> Result<(String, f64)> {
    let (name, cost) = raw
        .rsplit_once('=')
        .with_context(|| format!("expected NAME=COST, got '{raw}'"))?;
    let cost: f64 = cost
        .trim()
        .parse()
        .with_context(|| format!("invalid cost in '{raw}'"))?;
    Ok((name.trim().to_string(), cost))
}

// ---------------------------------------------------------------------------
// autoserv stats
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport<'a> {
    summary: &'a ServiceSummary,
    top_parts: &'a [PartFrequency],
}

/// Show the overall summary and the most replaced parts.
pub fn run_stats(store: &dyn RecordStore, display: &DisplayConfig, format: OutputFormat) -> Result<()> {
    let snapshot = Snapshot::load(store).context("failed to load service records")?;

    if snapshot.is_empty() {
        println!(
            "{}",
            "No service records yet. Add one with `autoserv add`.".yellow()
        );
        return Ok(());
    }

    let summary = snapshot.summary();
    let top_parts = snapshot.top_parts(display.top_parts);

    match format {
        OutputFormat::Json => print_json(&StatsReport {
            summary: &summary,
            top_parts: &top_parts,
        })?,
        OutputFormat::Csv => print_stats_csv(&summary, &top_parts),
        OutputFormat::Table => print_stats_table(&summary, &top_parts, display),
    }

    Ok(())
}

fn print_stats_table(summary: &ServiceSummary, top_parts: &[PartFrequency], display: &DisplayConfig) {
    let money = |amount: f64| format_currency(amount, &display.currency_symbol);

    println!("{}", format!("{} — Service Report", display.shop_name).bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Total services: ".bold(), summary.total_services);
    println!("  {} {}", "Total revenue:  ".bold(), money(summary.total_revenue).green());
    println!("  {} {}", "Service charges:".bold(), money(summary.total_service_cost));
    println!("  {} {}", "Spare parts:    ".bold(), money(summary.total_spare_cost));
    println!("  {} {}", "Average bill:   ".bold(), money(summary.average_service_cost));
    println!();

    if !top_parts.is_empty() {
        println!("{}", "Most Replaced Parts".bold().cyan());
        println!("  {:<4} {:<40} {:>8}", "#", "Part", "Count");
        println!("  {}", "-".repeat(54));
        for (i, part) in top_parts.iter().enumerate() {
            let line = format!(
                "  {:<4} {:<40} {:>8}",
                i + 1,
                truncate(&part.name, 40),
                part.count
            );
            if i % 2 == 0 {
                println!("{}", line);
            } else {
                println!("{}", line.dimmed());
            }
        }
    }
}

fn print_stats_csv(summary: &ServiceSummary, top_parts: &[PartFrequency]) {
    println!("metric,value");
    println!("total_services,{}", summary.total_services);
    println!("total_revenue,{:.2}", summary.total_revenue);
    println!("total_service_cost,{:.2}", summary.total_service_cost);
    println!("total_spare_cost,{:.2}", summary.total_spare_cost);
    println!("average_service_cost,{:.2}", summary.average_service_cost);
    println!();
    println!("part,count");
    for part in top_parts {
        println!("{},{}", csv_field(&part.name), part.count);
    }
}

// ---------------------------------------------------------------------------
// autoserv monthly
// ---------------------------------------------------------------------------

/// Show revenue by month: every month on record, or one year's twelve months.
pub fn run_monthly(
    store: &dyn RecordStore,
    display: &DisplayConfig,
    year: Option<i32>,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = Snapshot::load(store).context("failed to load service records")?;

    if let Some(year) = year {
        let view = snapshot.year_view(year);
        match format {
            OutputFormat::Json => print_json(&view)?,
            OutputFormat::Csv => print_year_csv(&view),
            OutputFormat::Table => print_year_table(&view, display),
        }
        return Ok(());
    }

    let buckets = snapshot.monthly_revenue();
    if buckets.is_empty() {
        println!("{}", "No dated service records yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&buckets)?,
        OutputFormat::Csv => print_monthly_csv(&buckets),
        OutputFormat::Table => print_monthly_table(&buckets, display),
    }

    Ok(())
}

fn print_monthly_table(buckets: &[MonthlyBucket], display: &DisplayConfig) {
    let money = |amount: f64| format_currency(amount, &display.currency_symbol);

    println!("{}", "Monthly Revenue".bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<18} {:>16} {:>16} {:>16}",
        "Month", "Service", "Spares", "Total"
    );
    println!("  {}", "-".repeat(70));

    for (i, bucket) in buckets.iter().enumerate() {
        let line = format!(
            "  {:<18} {:>16} {:>16} {:>16}",
            bucket.month_year,
            money(bucket.service_cost),
            money(bucket.spare_cost),
            money(bucket.amount),
        );
        if i % 2 == 0 {
            println!("{}", line);
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_monthly_csv(buckets: &[MonthlyBucket]) {
    println!("month,year,month_year,service_cost,spare_cost,amount");
    for b in buckets {
        println!(
            "{},{},{},{:.2},{:.2},{:.2}",
            b.month, b.year, b.month_year, b.service_cost, b.spare_cost, b.amount,
        );
    }
}

fn print_year_table(view: &YearView, display: &DisplayConfig) {
    let money = |amount: f64| format_currency(amount, &display.currency_symbol);

    println!("{}", format!("Revenue — {}", view.year).bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<18} {:>16} {:>16} {:>16}",
        "Month", "Service", "Spares", "Total"
    );
    println!("  {}", "-".repeat(70));

    for row in &view.months {
        let line = format!(
            "  {:<18} {:>16} {:>16} {:>16}",
            row.name,
            money(row.service_cost),
            money(row.spare_cost),
            money(row.amount),
        );
        if row.amount == 0.0 {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    println!("  {}", "-".repeat(70));
    println!(
        "  {:<18} {:>16} {:>16} {:>16}",
        "Total".bold(),
        money(view.total.service_cost),
        money(view.total.spare_cost),
        money(view.total.amount).green(),
    );
}

fn print_year_csv(view: &YearView) {
    println!("month,name,service_cost,spare_cost,amount");
    for row in &view.months {
        println!(
            "{},{},{:.2},{:.2},{:.2}",
            row.month, row.name, row.service_cost, row.spare_cost, row.amount,
        );
    }
    println!(
        "total,{},{:.2},{:.2},{:.2}",
        view.year, view.total.service_cost, view.total.spare_cost, view.total.amount,
    );
}

// ---------------------------------------------------------------------------
// autoserv daily
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DailyReport<'a> {
    #[serde(flatten)]
    summary: &'a DaySummary,
    services: Vec<ServiceRecord>,
}

/// Show the services performed on one day (today by default).
pub fn run_daily(
    store: &dyn RecordStore,
    display: &DisplayConfig,
    date: Option<NaiveDate>,
    format: OutputFormat,
) -> Result<()> {
    let day = date.unwrap_or_else(analytics::engine::today);
    let snapshot = Snapshot::load(store).context("failed to load service records")?;
    let summary = snapshot.day_summary(day);
    let services = snapshot.records_on(day);

    match format {
        OutputFormat::Json => print_json(&DailyReport {
            summary: &summary,
            services: services
                .iter()
                .map(|r| r.with_resolved_totals())
                .collect(),
        })?,
        OutputFormat::Csv => print_daily_csv(&services),
        OutputFormat::Table => print_daily_table(&summary, &services, display),
    }

    Ok(())
}

fn print_daily_table(summary: &DaySummary, services: &[&ServiceRecord], display: &DisplayConfig) {
    let money = |amount: f64| format_currency(amount, &display.currency_symbol);

    println!(
        "{}",
        format!("Services on {}", summary.date.format("%d %B %Y")).bold().cyan()
    );
    println!("{}", "=".repeat(60));

    if services.is_empty() {
        println!("  {}", "No services recorded on this day.".yellow());
        return;
    }

    println!(
        "  {:<14} {:<24} {:>16}",
        "Vehicle", "Work", "Total"
    );
    println!("  {}", "-".repeat(56));
    for record in services {
        let work: Vec<&str> = record
            .service_items
            .iter()
            .map(|i| i.description.as_str())
            .chain(record.spare_parts.iter().map(|p| p.name.as_str()))
            .collect();
        println!(
            "  {:<14} {:<24} {:>16}",
            truncate(&record.vehicle_number, 14),
            truncate(&work.join(", "), 24),
            money(record.total_cost()),
        );
    }

    println!();
    println!("  {} {}", "Services:     ".bold(), summary.summary.total_services);
    println!(
        "  {} {}",
        "Revenue:      ".bold(),
        money(summary.summary.total_revenue).green()
    );
    println!(
        "  {} {}",
        "Average bill: ".bold(),
        money(summary.summary.average_service_cost)
    );
}

fn print_daily_csv(services: &[&ServiceRecord]) {
    println!("vehicle_number,id,date,spare_cost,service_cost,total_cost");
    for r in services {
        println!(
            "{},{},{},{:.2},{:.2},{:.2}",
            csv_field(&r.vehicle_number),
            csv_field(&r.id),
            csv_field(&r.date),
            r.spare_cost(),
            r.service_cost(),
            r.total_cost(),
        );
    }
}

// ---------------------------------------------------------------------------
// autoserv migrate
// ---------------------------------------------------------------------------

/// Rewrite legacy `serviceCharge` records into the itemized schema.
pub fn run_migrate(store: &dyn RecordStore, dry_run: bool) -> Result<()> {
    let report = migrate_legacy(store, dry_run).context("migration failed")?;

    if report.legacy == 0 {
        println!(
            "{} All {} records already use the itemized schema.",
            "✓".green().bold(),
            report.scanned
        );
        return Ok(());
    }

    if dry_run {
        println!(
            "{}",
            format!(
                "{} of {} records would be migrated:",
                report.legacy, report.scanned
            )
            .yellow()
        );
        for path in &report.paths {
            println!("  {} {}", "·".dimmed(), path);
        }
        println!();
        println!("  {}", "Run without --dry-run to apply.".dimmed());
    } else {
        println!(
            "{} Migrated {} of {} records.",
            "✓".green().bold(),
            report.migrated,
            report.scanned
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// autoserv health
// ---------------------------------------------------------------------------

/// Check config files and database reachability.
pub fn run_health(cfg: &AutoservConfig) -> Result<()> {
    println!("{}", "autoserv Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.autoserv/config.toml found"
        } else {
            "not found (run `autoserv config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".autoserv.toml found"
        } else {
            "none (optional)"
        },
    );

    let store = match store::from_config(&cfg.database) {
        Ok(store) => store,
        Err(e) => {
            print_health_item("Database", false, &e.to_string());
            return Ok(());
        }
    };
    print_health_item("Database", true, &store.describe());

    match Snapshot::load(&store) {
        Ok(snapshot) => {
            print_health_item(
                "Records",
                true,
                &format!("{} service records", snapshot.records().len()),
            );
            let legacy = migrate_legacy(&store, true).map(|r| r.legacy).unwrap_or(0);
            print_health_item(
                "Schema",
                legacy == 0,
                &if legacy == 0 {
                    "all records itemized".to_string()
                } else {
                    format!("{legacy} legacy records (run `autoserv migrate`)")
                },
            );
        }
        Err(e) => print_health_item("Records", false, &e.to_string()),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// autoserv config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective autoserv Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.autoserv/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.autoserv/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".autoserv.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".autoserv.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "AUTOSERV_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.autoserv/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Set database.url before running reports.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    let shown = if key.ends_with("auth_token") { "********" } else { value };
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), shown);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Service date as `05 Mar 2025`, or the raw stored text when unparseable.
fn display_date(record: &ServiceRecord) -> String {
    record
        .service_date()
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| record.date.clone())
}

/// Format a number with comma separators for readability.
fn format_number(n: u64) -> String {
    analytics::formatter::format_number(n)
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
        assert_eq!(truncate("₹₹₹₹", 3), "₹₹…");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_parse_line_item() {
        assert_eq!(
            parse_line_item("Oil filter=250").unwrap(),
            ("Oil filter".to_string(), 250.0)
        );
        assert_eq!(
            parse_line_item(" Brake pad = 1200.50 ").unwrap(),
            ("Brake pad".to_string(), 1200.5)
        );
        assert_eq!(parse_line_item("a=b=3").unwrap(), ("a=b".to_string(), 3.0));
        assert!(parse_line_item("no cost").is_err());
        assert!(parse_line_item("Wash=free").is_err());
    }

    #[test]
    fn test_build_entry() {
        let entry = build_entry(
            "2025-03-05",
            Some(12000.0),
            &["Oil filter=250".to_string()],
            &["General service=500".to_string(), "Wash=100".to_string()],
        )
        .unwrap();

        assert_eq!(entry.date, "2025-03-05");
        assert_eq!(entry.spare_parts, vec![SparePart::new("Oil filter", 250.0)]);
        assert_eq!(entry.service_items.len(), 2);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn add_stores_valid_entry_and_rejects_invalid() {
        let store = MemoryStore::new();
        let display = DisplayConfig::default();

        let entry = build_entry("2025-03-05", None, &["Plug=80".to_string()], &[]).unwrap();
        run_add(&store, &display, "ap09 ab 1234", entry).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch_vehicle("AP09 AB 1234").unwrap().len(), 1);

        let bad = build_entry("", None, &["=10".to_string()], &[]).unwrap();
        assert!(run_add(&store, &display, "AP09", bad).is_err());
        assert_eq!(store.len(), 1);
    }
}
