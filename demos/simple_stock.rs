//! 簡單庫存示例：批次、先到期先出、到期提醒

use shelf_core::{Clock, ConsumptionOrder, Inventory, ItemKind, SystemClock};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== 簡單庫存示例 ===\n");

    let today = SystemClock.today();
    let mut inventory = Inventory::new();

    let milk = inventory.add_new_item(ItemKind::Perishable, "MILK-001", "Milk", "L", 5)?;
    milk.add_batch(6, today.checked_add_days(chrono::Days::new(1)))?;
    milk.add_batch(10, today.checked_add_days(chrono::Days::new(9)))?;

    let rice = inventory.add_new_item(ItemKind::NonPerishable, "RICE-001", "Rice", "kg", 10)?;
    rice.add_batch(25, None)?;

    println!("庫存摘要:\n{}\n", inventory.format_snapshot(today));

    inventory.reduce_stock("MILK-001", 8, ConsumptionOrder::Fifo)?;
    println!("銷售 8 L 牛奶後:\n{}\n", inventory.format_snapshot(today));

    for batch in inventory.get_item("MILK-001")?.batches() {
        println!("  - {}", batch);
    }

    let alerts = inventory.expiring_alerts(today, 3);
    println!("\n3 天內到期的批次: {}", alerts.len());
    for alert in &alerts {
        println!(
            "  - {} 批次 {}: {} 件，{} 到期",
            alert.item_id, alert.batch_id, alert.available, alert.expiration
        );
    }

    println!("\n需要補貨: {:?}", inventory.calculate_reorder_list(today));

    Ok(())
}
