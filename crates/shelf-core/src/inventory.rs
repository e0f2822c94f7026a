//! 庫存（品項集合）

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::item::{ConsumptionOrder, InventoryItem, ItemKind};
use crate::snapshot::{InventorySnapshot, ItemRecord};
use crate::{Result, ShelfError};

/// 補貨計劃：品項ID → 建議訂購量
pub type RestockPlan = BTreeMap<String, u32>;

/// 到期提醒
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAlert {
    pub item_id: String,
    pub batch_id: String,
    pub expiration: NaiveDate,
    pub available: u32,
}

/// 庫存
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<String, InventoryItem>,
}

impl Inventory {
    /// 創建空的庫存
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入品項，ID 重複時失敗
    pub fn add_item(&mut self, item: InventoryItem) -> Result<&mut InventoryItem> {
        let item_id = item.item_id().to_string();
        if self.items.contains_key(&item_id) {
            return Err(ShelfError::DuplicateKey(item_id));
        }

        tracing::debug!("新增品項 {} ({:?})", item_id, item.kind());
        Ok(self.items.entry(item_id).or_insert(item))
    }

    /// 建立並加入新品項
    pub fn add_new_item(
        &mut self,
        kind: ItemKind,
        item_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        threshold: u32,
    ) -> Result<&mut InventoryItem> {
        let item = InventoryItem::new(kind, item_id, name, unit, threshold)?;
        self.add_item(item)
    }

    /// 查找品項
    pub fn get_item(&self, item_id: &str) -> Result<&InventoryItem> {
        self.items
            .get(item_id)
            .ok_or_else(|| ShelfError::NotFound(format!("品項 {}", item_id)))
    }

    /// 查找品項（可變）
    pub fn get_item_mut(&mut self, item_id: &str) -> Result<&mut InventoryItem> {
        self.items
            .get_mut(item_id)
            .ok_or_else(|| ShelfError::NotFound(format!("品項 {}", item_id)))
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 依品項ID排序走訪
    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    /// 對指定品項扣減庫存
    pub fn reduce_stock(
        &mut self,
        item_id: &str,
        quantity: u32,
        order: ConsumptionOrder,
    ) -> Result<()> {
        self.get_item_mut(item_id)?.reduce_stock(quantity, order)
    }

    /// 過期報廢
    ///
    /// 每個品項只處理第一個仍有剩餘的過期批次，其餘過期批次保持原狀。
    /// 回傳受影響的品項ID。
    pub fn mark_expired_items(&mut self, today: NaiveDate) -> Vec<String> {
        let mut affected = Vec::new();

        for (item_id, item) in self.items.iter_mut() {
            let spoiled = item
                .batches_mut()
                .iter_mut()
                .find(|b| b.is_expired(today) && b.available_quantity() > 0);

            if let Some(batch) = spoiled {
                let discarded = batch.mark_spoiled();
                tracing::debug!(
                    "品項 {} 批次 {} 過期報廢 {}",
                    item_id,
                    batch.batch_id(),
                    discarded
                );
                affected.push(item_id.clone());
            }
        }

        if !affected.is_empty() {
            tracing::info!("過期報廢品項: {}", affected.len());
        }

        affected
    }

    /// 低於補貨門檻的品項（不計過期批次）
    pub fn calculate_reorder_list(&self, today: NaiveDate) -> Vec<String> {
        self.items
            .values()
            .filter(|item| item.is_below_threshold(today))
            .map(|item| item.item_id().to_string())
            .collect()
    }

    /// 全庫存的即將到期批次
    pub fn expiring_alerts(&self, today: NaiveDate, days_threshold: u32) -> Vec<ExpiryAlert> {
        let mut alerts = Vec::new();

        for item in self.items.values() {
            for batch in item.alert_expiring_items(today, days_threshold) {
                if let Some(expiration) = batch.expiration() {
                    alerts.push(ExpiryAlert {
                        item_id: item.item_id().to_string(),
                        batch_id: batch.batch_id().to_string(),
                        expiration,
                        available: batch.available_quantity(),
                    });
                }
            }
        }

        alerts
    }

    /// 文字摘要，每個品項一行
    pub fn format_snapshot(&self, today: NaiveDate) -> String {
        self.items
            .values()
            .map(|item| {
                format!(
                    "{}: {} - {} {}",
                    item.item_id(),
                    item.name(),
                    item.compute_available_quantity(today, false),
                    item.unit()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 產生補貨計劃
    ///
    /// 對用量資料中的每個品項，取最近 `usage_window` 筆用量的平均值乘以提前期作為目標量；
    /// 可用量低於目標時，建議訂購量為差額（四捨六入五成雙到整數）。
    /// 不在庫存中的品項、沒有用量的品項直接略過。
    pub fn generate_restock_plan<I, K, V>(
        &self,
        usage: I,
        config: &PlanningConfig,
        today: NaiveDate,
    ) -> RestockPlan
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u32]>,
    {
        let mut plan = RestockPlan::new();

        for (item_id, history) in usage {
            let item_id = item_id.as_ref();
            let Some(item) = self.items.get(item_id) else {
                tracing::debug!("用量資料中的品項 {} 不在庫存中，略過", item_id);
                continue;
            };

            let Some(average) = recent_average(history.as_ref(), config.usage_window) else {
                continue;
            };

            let target = average * Decimal::from(config.lead_time_days);
            let available = Decimal::from(item.compute_available_quantity(today, false));

            if available < target {
                let shortfall = (target - available).round();
                plan.insert(
                    item_id.to_string(),
                    shortfall.to_u32().unwrap_or(u32::MAX),
                );
            }
        }

        tracing::info!("補貨計劃完成，建議訂購品項: {}", plan.len());
        plan
    }

    /// 轉成快照
    pub fn to_snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            items: self
                .items
                .iter()
                .map(|(item_id, item)| (item_id.clone(), ItemRecord::from(item)))
                .collect(),
        }
    }

    /// 從快照還原，鍵值必須與紀錄中的品項ID一致
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Result<Self> {
        let mut inventory = Self::new();
        for (key, record) in snapshot.items {
            if key != record.id {
                return Err(ShelfError::InvalidArgument(format!(
                    "快照鍵值 {} 與品項ID {} 不一致",
                    key, record.id
                )));
            }
            inventory.add_item(record.into_item()?)?;
        }
        Ok(inventory)
    }
}

/// 最近 `window` 筆的平均值；沒有資料時回傳 None
fn recent_average(history: &[u32], window: usize) -> Option<Decimal> {
    let start = history.len().saturating_sub(window);
    let recent = &history[start..];
    if recent.is_empty() {
        return None;
    }

    let total: Decimal = recent.iter().map(|&q| Decimal::from(q)).sum();
    Some(total / Decimal::from(recent.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()
    }

    fn days(offset: i64) -> Option<NaiveDate> {
        Some(today() + chrono::Duration::days(offset))
    }

    fn sample_inventory() -> Inventory {
        let mut inventory = Inventory::new();

        let milk = inventory
            .add_new_item(ItemKind::Perishable, "001", "Milk", "L", 5)
            .unwrap();
        milk.add_batch(10, days(2)).unwrap();

        let beans = inventory
            .add_new_item(ItemKind::NonPerishable, "002", "Beans", "can", 10)
            .unwrap();
        beans.add_batch(50, None).unwrap();

        inventory
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let mut inventory = sample_inventory();
        let duplicate = InventoryItem::perishable("001", "Other Milk", "L", 0).unwrap();

        assert!(matches!(
            inventory.add_item(duplicate),
            Err(ShelfError::DuplicateKey(id)) if id == "001"
        ));
        assert_eq!(inventory.get_item("001").unwrap().name(), "Milk");
    }

    #[test]
    fn test_get_missing_item() {
        let inventory = sample_inventory();
        assert!(matches!(
            inventory.get_item("999"),
            Err(ShelfError::NotFound(_))
        ));
    }

    #[test]
    fn test_reduce_stock_by_id() {
        let mut inventory = sample_inventory();
        inventory
            .reduce_stock("002", 20, ConsumptionOrder::Fifo)
            .unwrap();

        assert_eq!(
            inventory
                .get_item("002")
                .unwrap()
                .compute_available_quantity(today(), false),
            30
        );
        assert!(inventory
            .reduce_stock("404", 1, ConsumptionOrder::Fifo)
            .is_err());
    }

    #[test]
    fn test_mark_expired_only_first_batch() {
        let mut inventory = Inventory::new();
        let cheese = inventory
            .add_new_item(ItemKind::Perishable, "c1", "Cheese", "kg", 0)
            .unwrap();
        cheese.add_batch(4, days(-3)).unwrap();
        cheese.add_batch(6, days(-1)).unwrap();
        cheese.add_batch(8, days(5)).unwrap();

        let fresh = inventory
            .add_new_item(ItemKind::Perishable, "c2", "Cream", "L", 0)
            .unwrap();
        fresh.add_batch(2, days(1)).unwrap();

        let affected = inventory.mark_expired_items(today());
        assert_eq!(affected, vec!["c1".to_string()]);

        let cheese = inventory.get_item("c1").unwrap();
        assert_eq!(cheese.batches()[0].available_quantity(), 0);
        assert_eq!(cheese.batches()[1].available_quantity(), 6);
        assert_eq!(cheese.batches()[2].available_quantity(), 8);

        // 第二次執行處理下一個過期批次
        assert_eq!(inventory.mark_expired_items(today()), vec!["c1".to_string()]);
        assert!(inventory.mark_expired_items(today()).is_empty());
    }

    #[test]
    fn test_reorder_list() {
        let mut inventory = Inventory::new();
        inventory
            .add_new_item(ItemKind::Perishable, "a", "Apples", "kg", 10)
            .unwrap()
            .add_batch(9, days(3))
            .unwrap();
        inventory
            .add_new_item(ItemKind::Perishable, "b", "Bananas", "kg", 10)
            .unwrap()
            .add_batch(10, days(3))
            .unwrap();

        // 過期批次不計入
        let cherries = inventory
            .add_new_item(ItemKind::Perishable, "c", "Cherries", "kg", 5)
            .unwrap();
        cherries.add_batch(3, days(2)).unwrap();
        cherries.add_batch(20, days(-1)).unwrap();

        assert_eq!(
            inventory.calculate_reorder_list(today()),
            vec!["a".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_expiring_alerts() {
        let mut inventory = sample_inventory();
        inventory
            .get_item_mut("001")
            .unwrap()
            .add_batch(3, days(9))
            .unwrap();

        let alerts = inventory.expiring_alerts(today(), 3);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].item_id, "001");
        assert_eq!(alerts[0].available, 10);
        assert_eq!(Some(alerts[0].expiration), days(2));
    }

    #[test]
    fn test_format_snapshot() {
        let inventory = sample_inventory();
        let text = inventory.format_snapshot(today());

        assert_eq!(text, "001: Milk - 10 L\n002: Beans - 50 can");
    }

    #[test]
    fn test_restock_plan() {
        let mut inventory = Inventory::new();
        inventory
            .add_new_item(ItemKind::NonPerishable, "x", "Flour", "kg", 0)
            .unwrap();

        let usage: HashMap<&str, Vec<u32>> = HashMap::from([("x", vec![2, 3, 1, 2, 4, 1, 3])]);
        let plan = inventory.generate_restock_plan(&usage, &PlanningConfig::default(), today());

        // 16 / 7 * 3 = 6.857 -> 7
        assert_eq!(plan.get("x"), Some(&7));
    }

    #[test]
    fn test_restock_plan_uses_recent_window() {
        let mut inventory = Inventory::new();
        inventory
            .add_new_item(ItemKind::NonPerishable, "x", "Flour", "kg", 0)
            .unwrap()
            .add_batch(5, None)
            .unwrap();

        // 只取最後 7 筆：平均 4，目標 12，差額 7
        let usage: HashMap<&str, Vec<u32>> =
            HashMap::from([("x", vec![100, 100, 4, 4, 4, 4, 4, 4, 4])]);
        let plan = inventory.generate_restock_plan(&usage, &PlanningConfig::default(), today());
        assert_eq!(plan.get("x"), Some(&7));

        // 少於 7 筆時使用全部
        let usage: HashMap<&str, Vec<u32>> = HashMap::from([("x", vec![1, 2])]);
        let config = PlanningConfig::default().with_lead_time_days(10);
        let plan = inventory.generate_restock_plan(&usage, &config, today());
        assert_eq!(plan.get("x"), Some(&10));
    }

    #[rstest]
    #[case(vec![5, 0], None, 2)] // 2.5 -> 2
    #[case(vec![7, 0], None, 4)] // 3.5 -> 4
    #[case(vec![1, 2], Some(1), 0)] // 0.5 -> 0
    #[case(vec![1, 1, 1, 2], Some(1), 0)] // 0.25 -> 0
    #[case(vec![3, 2], Some(1), 2)] // 1.5 -> 2
    fn test_restock_rounds_half_to_even(
        #[case] history: Vec<u32>,
        #[case] stock: Option<u32>,
        #[case] expected: u32,
    ) {
        let mut inventory = Inventory::new();
        let flour = inventory
            .add_new_item(ItemKind::NonPerishable, "x", "Flour", "kg", 0)
            .unwrap();
        if let Some(quantity) = stock {
            flour.add_batch(quantity, None).unwrap();
        }

        let usage: HashMap<&str, Vec<u32>> = HashMap::from([("x", history)]);
        let config = PlanningConfig::default().with_lead_time_days(1);
        let plan = inventory.generate_restock_plan(&usage, &config, today());

        // 差額低於 0.5 仍記錄為 0
        assert_eq!(plan.get("x"), Some(&expected));
    }

    #[test]
    fn test_from_snapshot_rejects_mismatched_key() {
        let mut snapshot = sample_inventory().to_snapshot();
        let record = snapshot.items.remove("001").unwrap();
        snapshot.items.insert("k1".to_string(), record);

        assert!(matches!(
            Inventory::from_snapshot(snapshot),
            Err(ShelfError::InvalidArgument(msg)) if msg.contains("k1")
        ));
    }

    #[test]
    fn test_restock_plan_skips_unknown_and_sufficient() {
        let inventory = sample_inventory();
        let usage: HashMap<&str, Vec<u32>> = HashMap::from([
            ("001", vec![2, 3, 1, 2]),
            ("002", vec![1, 2, 1]),
            ("ghost", vec![9, 9, 9]),
            ("empty", vec![]),
        ]);

        let plan = inventory.generate_restock_plan(&usage, &PlanningConfig::default(), today());

        // 001: 平均 2 * 3 = 6 < 10；002: 平均 1.33 * 3 = 4 < 50
        assert!(plan.is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut inventory = sample_inventory();
        inventory
            .reduce_stock("001", 4, ConsumptionOrder::Fifo)
            .unwrap();

        let restored = Inventory::from_snapshot(inventory.to_snapshot()).unwrap();
        assert_eq!(restored, inventory);
    }
}
