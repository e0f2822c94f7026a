//! 批次模型

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Result, ShelfError};

/// 批次：總量固定、已用量只增不減
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    batch_id: String,
    total_quantity: u32,
    used_quantity: u32,
    expiration: Option<NaiveDate>,
}

impl Batch {
    /// 創建新的批次
    pub fn new(quantity: u32, expiration: Option<NaiveDate>) -> Result<Self> {
        if quantity == 0 {
            return Err(ShelfError::InvalidArgument(
                "批次數量必須為正整數".to_string(),
            ));
        }

        Ok(Self {
            batch_id: Self::generate_id(),
            total_quantity: quantity,
            used_quantity: 0,
            expiration,
        })
    }

    /// 從快照還原批次（保留原本的 ID 與已用量）
    pub fn restore(
        batch_id: String,
        total_quantity: u32,
        used_quantity: u32,
        expiration: Option<NaiveDate>,
    ) -> Result<Self> {
        if batch_id.trim().is_empty() {
            return Err(ShelfError::InvalidArgument("批次ID不可為空".to_string()));
        }
        if total_quantity == 0 {
            return Err(ShelfError::InvalidArgument(format!(
                "批次 {} 的數量必須為正整數",
                batch_id
            )));
        }
        if used_quantity > total_quantity {
            return Err(ShelfError::InvalidArgument(format!(
                "批次 {} 的已用量 {} 超過總量 {}",
                batch_id, used_quantity, total_quantity
            )));
        }

        Ok(Self {
            batch_id,
            total_quantity,
            used_quantity,
            expiration,
        })
    }

    /// 解析 ISO 日期字串；空字串表示沒有到期日
    pub fn parse_expiration(raw: &str) -> Result<Option<NaiveDate>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ShelfError::InvalidArgument(format!("無效的到期日: {}", raw)))
    }

    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    pub fn used_quantity(&self) -> u32 {
        self.used_quantity
    }

    pub fn expiration(&self) -> Option<NaiveDate> {
        self.expiration
    }

    /// 可用數量（總量 - 已用量）
    pub fn available_quantity(&self) -> u32 {
        self.total_quantity - self.used_quantity
    }

    /// 到期日早於今天即為過期
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expiration, Some(expiration) if expiration < today)
    }

    /// 距離到期還有幾天（已過期為負數）
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration
            .map(|expiration| (expiration - today).num_days())
    }

    /// 使用數量，超過可用量時整筆失敗
    pub fn consume(&mut self, quantity: u32) -> Result<()> {
        let available = self.available_quantity();
        if quantity > available {
            return Err(ShelfError::InsufficientStock {
                requested: quantity,
                available,
            });
        }
        self.used_quantity += quantity;
        Ok(())
    }

    /// 報廢：剩餘數量全部標記為已用
    pub fn mark_spoiled(&mut self) -> u32 {
        let discarded = self.available_quantity();
        self.used_quantity = self.total_quantity;
        discarded
    }
}

impl std::fmt::Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.expiration {
            Some(expiration) => write!(
                f,
                "Batch {}: {} units (exp {})",
                self.batch_id,
                self.available_quantity(),
                expiration
            ),
            None => write!(
                f,
                "Batch {}: {} units",
                self.batch_id,
                self.available_quantity()
            ),
        }
    }
}
