// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::path::Path;

// Use library instead of local modules
use geo_metrics::{
    get_all_entities, init_tracing, last_import, load_entities, open_database, replace_entities,
    validate, Dashboard, DashboardConfig, ViewMode,
};

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let config = DashboardConfig::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let source = args
                .get(2)
                .context("Usage: geo-metrics import <entities.csv|entities.json> [database]")?;
            let db_path = args
                .get(3)
                .map(Path::new)
                .unwrap_or(config.database_path.as_path());
            run_import(Path::new(source), db_path)?;
        }
        Some("summary") => {
            let db_path = args
                .get(2)
                .map(Path::new)
                .unwrap_or(config.database_path.as_path());
            run_summary(db_path, &config)?;
        }
        _ => run_ui_mode(&config)?,
    }

    Ok(())
}

fn run_import(source: &Path, db_path: &Path) -> Result<()> {
    println!("🗄️  Import: entities → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load entities
    println!("\n📂 Loading {:?}...", source);
    let entities = load_entities(source)?;
    println!("✓ Loaded {} entities", entities.len());

    // 2. Validate (informational; nothing is dropped)
    println!("\n🔍 Validating...");
    let report = validate(&entities);
    println!("✓ {}", report.summary());
    for issue in &report.issues {
        println!(
            "   {:?} #{} {} [{}]: {}",
            issue.severity, issue.index, issue.entity, issue.field, issue.message
        );
    }

    // 3. Store
    println!("\n💾 Writing {:?}...", db_path);
    let mut conn = open_database(db_path)?;
    let inserted = replace_entities(&mut conn, &entities, &source.display().to_string())?;
    println!("✓ Stored {} entities", inserted);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Import complete");

    Ok(())
}

fn run_summary(db_path: &Path, config: &DashboardConfig) -> Result<()> {
    let conn = open_database(db_path)?;
    let entities = get_all_entities(&conn)?;

    if let Some(run) = last_import(&conn)? {
        println!(
            "📦 {} entities from {} (imported {})",
            run.entity_count,
            run.source,
            run.imported_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    let mut dashboard = Dashboard::new(entities, config);

    for mode in ViewMode::ALL {
        dashboard.set_view_mode(mode);
        let summary = dashboard.summary();

        println!("\n📊 {} ({} entities)", mode.title(), dashboard.view().dataset.len());
        println!("   {}", summary.summary());

        for row in dashboard.table() {
            println!(
                "   {:>2}. {:<28} {:<8} {:>12.2} {:>5} {:>7} {:>6.1} {}",
                row.rank,
                row.name,
                row.entity_type.as_str(),
                row.revenue,
                row.colleges,
                row.growth,
                row.intensity,
                row.bucket
            );
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &DashboardConfig) -> Result<()> {
    println!("🖥️  Loading Geo Metrics dashboard...\n");

    let db_path = config.database_path.as_path();

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: geo-metrics import <entities.csv>");
        eprintln!("   to import entities first.");
        std::process::exit(1);
    }

    let conn = open_database(db_path)?;
    let entities = get_all_entities(&conn)?;
    println!("✓ Loaded {} entities\n", entities.len());

    let mut app = ui::App::new(Dashboard::new(entities, config));
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &DashboardConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the API: cargo run --bin geo-metrics-server --features server");
    std::process::exit(1);
}
