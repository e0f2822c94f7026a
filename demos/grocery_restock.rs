//! 雜貨店補貨示例：CSV 匯入、用量預測、補貨計劃、快照存檔

use std::io::Cursor;

use shelf_core::{Clock, FixedClock, Inventory, PlanningConfig, UsageLog};

const STOCK_CSV: &str = "\
Item ID,Name,Unit,Quantity,Expiration,Threshold
BREAD-01,Bread,loaf,12,2025-11-22,10
EGGS-01,Eggs,dozen,8,2025-11-30,6
EGGS-01,Eggs,dozen,4,2025-11-19,6
BEANS-01,Beans,can,40,,15
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== 雜貨店補貨示例 ===\n");

    let mut clock = FixedClock::at_date(chrono::NaiveDate::from_ymd_opt(2025, 11, 13).ok_or("無效日期")?);
    let config = PlanningConfig::default().with_lead_time_days(4);

    let mut inventory = Inventory::new();
    let rows = shelf_io::import_csv_from_reader(Cursor::new(STOCK_CSV), &mut inventory)?;
    println!("匯入 {} 列，共 {} 個品項\n", rows, inventory.len());

    // 一週的銷售紀錄
    let mut usage = UsageLog::new();
    for (bread, eggs, beans) in [(3, 1, 2), (4, 2, 1), (2, 1, 3), (5, 2, 2), (3, 1, 1), (4, 2, 2), (3, 1, 4)] {
        usage.record_usage_now("BREAD-01", bread, &clock);
        usage.record_usage_now("EGGS-01", eggs, &clock);
        usage.record_usage_now("BEANS-01", beans, &clock);
        clock.advance_days(1);
    }

    let today = clock.today();
    for item_id in usage.item_ids() {
        let forecast = usage.forecast_demand(item_id, config.forecast_window)?;
        println!("  {} 預測日需求: {}", item_id, forecast);
    }

    let expired = inventory.mark_expired_items(today);
    println!("\n過期報廢: {:?}", expired);

    let plan = inventory.generate_restock_plan(&usage.recent_usage(config.usage_window), &config, today);
    println!("\n補貨計劃（提前期 {} 天）:", config.lead_time_days);
    for (item_id, quantity) in &plan {
        let item = inventory.get_item(item_id)?;
        println!("  - {}: 訂購 {} {}", item.name(), quantity, item.unit());
    }

    let dir = std::env::temp_dir().join("shelf-demo");
    shelf_io::save_inventory(dir.join("inventory.json"), &inventory)?;
    shelf_io::export_csv(dir.join("inventory.csv"), &inventory, today)?;
    println!("\n快照已存到 {}", dir.display());

    Ok(())
}
