//! 庫存品項模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::{Result, ShelfError};

/// 品項類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// 易腐品：過期批次不計入可用量，會產生到期提醒
    Perishable,
    /// 非易腐品：所有批次都計入可用量，不產生到期提醒
    NonPerishable,
}

impl ItemKind {
    /// 快照中使用的類型標籤
    pub fn tag(&self) -> &'static str {
        match self {
            ItemKind::Perishable => "PerishableItem",
            ItemKind::NonPerishable => "NonPerishableItem",
        }
    }

    /// 從標籤解析，未知標籤回傳 None
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PerishableItem" => Some(ItemKind::Perishable),
            "NonPerishableItem" => Some(ItemKind::NonPerishable),
            _ => None,
        }
    }
}

/// 扣減庫存時的批次順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsumptionOrder {
    /// 先到期先出；無到期日的批次排在最後
    #[default]
    Fifo,
    /// 依批次加入順序
    Insertion,
}

/// 庫存品項
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    item_id: String,
    name: String,
    unit: String,
    threshold: u32,
    kind: ItemKind,
    batches: Vec<Batch>,
}

impl InventoryItem {
    /// 創建新的品項
    pub fn new(
        kind: ItemKind,
        item_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        threshold: u32,
    ) -> Result<Self> {
        let item_id = item_id.into();
        let name = name.into();
        let unit = unit.into();

        for (field, value) in [("item_id", &item_id), ("name", &name), ("unit", &unit)] {
            if value.trim().is_empty() {
                return Err(ShelfError::InvalidArgument(format!(
                    "{} 不可為空",
                    field
                )));
            }
        }

        Ok(Self {
            item_id,
            name,
            unit,
            threshold,
            kind,
            batches: Vec::new(),
        })
    }

    /// 創建易腐品
    pub fn perishable(
        item_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        threshold: u32,
    ) -> Result<Self> {
        Self::new(ItemKind::Perishable, item_id, name, unit, threshold)
    }

    /// 創建非易腐品
    pub fn non_perishable(
        item_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        threshold: u32,
    ) -> Result<Self> {
        Self::new(ItemKind::NonPerishable, item_id, name, unit, threshold)
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// 設置補貨門檻
    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }

    /// 所有批次（依加入順序）
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// 依 ID 查找批次
    pub fn batch(&self, batch_id: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.batch_id() == batch_id)
    }

    pub(crate) fn batches_mut(&mut self) -> &mut [Batch] {
        &mut self.batches
    }

    /// 新增批次
    pub fn add_batch(&mut self, quantity: u32, expiration: Option<NaiveDate>) -> Result<&Batch> {
        let batch = Batch::new(quantity, expiration)?;
        Ok(self.push_batch(batch))
    }

    /// 加入既有批次（快照還原用）
    pub fn push_batch(&mut self, batch: Batch) -> &Batch {
        self.batches.push(batch);
        &self.batches[self.batches.len() - 1]
    }

    /// 計算可用數量
    ///
    /// 易腐品預設排除過期批次，`include_expired` 為 true 時全部計入；
    /// 非易腐品一律計入所有批次，旗標無作用。
    /// 總和超過 `u32::MAX` 時停在上限。
    pub fn compute_available_quantity(&self, today: NaiveDate, include_expired: bool) -> u32 {
        match self.kind {
            ItemKind::Perishable => saturating_total(
                self.batches
                    .iter()
                    .filter(|b| include_expired || !b.is_expired(today)),
            ),
            ItemKind::NonPerishable => self.total_available(),
        }
    }

    /// 所有批次的剩餘數量總和（不論是否過期）
    fn total_available(&self) -> u32 {
        saturating_total(self.batches.iter())
    }

    /// 是否低於補貨門檻
    pub fn is_below_threshold(&self, today: NaiveDate) -> bool {
        self.compute_available_quantity(today, false) < self.threshold
    }

    /// 扣減庫存（銷售/消耗）
    ///
    /// 先檢查所有批次的剩餘總量，不足時直接回傳 `InsufficientStock`，
    /// 不會留下部分扣減的狀態；足夠時才依順序逐批扣減。
    /// 走訪時不略過過期批次。
    pub fn reduce_stock(&mut self, quantity: u32, order: ConsumptionOrder) -> Result<()> {
        if quantity == 0 {
            return Ok(());
        }

        let available = self.total_available();
        if quantity > available {
            return Err(ShelfError::InsufficientStock {
                requested: quantity,
                available,
            });
        }

        let mut remaining = quantity;
        for index in self.consumption_sequence(order) {
            let batch = &mut self.batches[index];
            let take = remaining.min(batch.available_quantity());
            batch.consume(take)?;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }

        tracing::debug!(
            "品項 {} 扣減 {} {}（{:?}）",
            self.item_id,
            quantity,
            self.unit,
            order
        );

        Ok(())
    }

    /// 批次走訪順序（回傳索引）
    fn consumption_sequence(&self, order: ConsumptionOrder) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.batches.len()).collect();
        if order == ConsumptionOrder::Fifo {
            // 穩定排序：同一天到期的批次保持加入順序
            indices.sort_by_key(|&i| self.batches[i].expiration().unwrap_or(NaiveDate::MAX));
        }
        indices
    }

    /// 即將到期的批次：到期日落在 [today, today + days_threshold]
    pub fn alert_expiring_items(&self, today: NaiveDate, days_threshold: u32) -> Vec<&Batch> {
        match self.kind {
            ItemKind::Perishable => self
                .batches
                .iter()
                .filter(|b| {
                    matches!(
                        b.days_until_expiration(today),
                        Some(days) if (0..=i64::from(days_threshold)).contains(&days)
                    )
                })
                .collect(),
            ItemKind::NonPerishable => Vec::new(),
        }
    }
}

fn saturating_total<'a>(batches: impl Iterator<Item = &'a Batch>) -> u32 {
    batches
        .map(Batch::available_quantity)
        .fold(0, u32::saturating_add)
}

impl std::fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {} units",
            self.name,
            self.unit,
            self.total_available()
        )
    }
}
