//! 庫存快照（持久化格式）
//!
//! 快照是「品項ID → 品項紀錄」的映射，欄位名稱即檔案格式。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::item::{InventoryItem, ItemKind};
use crate::Result;

/// 整個庫存的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    pub items: BTreeMap<String, ItemRecord>,
}

/// 品項紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// 類型標籤（PerishableItem / NonPerishableItem）
    pub variant: String,
    pub id: String,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub threshold: u32,
    #[serde(default)]
    pub batches: Vec<BatchRecord>,
}

/// 批次紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: String,
    pub total_quantity: u32,
    #[serde(default)]
    pub used_quantity: u32,
    pub expiration: Option<NaiveDate>,
}

impl From<&Batch> for BatchRecord {
    fn from(batch: &Batch) -> Self {
        Self {
            id: batch.batch_id().to_string(),
            total_quantity: batch.total_quantity(),
            used_quantity: batch.used_quantity(),
            expiration: batch.expiration(),
        }
    }
}

impl BatchRecord {
    /// 還原成批次
    pub fn into_batch(self) -> Result<Batch> {
        Batch::restore(self.id, self.total_quantity, self.used_quantity, self.expiration)
    }
}

impl From<&InventoryItem> for ItemRecord {
    fn from(item: &InventoryItem) -> Self {
        Self {
            variant: item.kind().tag().to_string(),
            id: item.item_id().to_string(),
            name: item.name().to_string(),
            unit: item.unit().to_string(),
            threshold: item.threshold(),
            batches: item.batches().iter().map(BatchRecord::from).collect(),
        }
    }
}

impl ItemRecord {
    /// 還原成品項
    ///
    /// 未知的類型標籤一律以非易腐品還原。
    pub fn into_item(self) -> Result<InventoryItem> {
        let kind = ItemKind::from_tag(&self.variant).unwrap_or_else(|| {
            tracing::warn!(
                "品項 {} 的類型標籤 {:?} 無法辨識，以非易腐品還原",
                self.id,
                self.variant
            );
            ItemKind::NonPerishable
        });

        let mut item = InventoryItem::new(kind, self.id, self.name, self.unit, self.threshold)?;
        for record in self.batches {
            item.push_batch(record.into_batch()?);
        }
        Ok(item)
    }
}
