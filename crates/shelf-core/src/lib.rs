//! # Shelf Core
//!
//! 庫存領域模型：批次、品項、庫存、用量紀錄

pub mod batch;
pub mod calendar;
pub mod config;
pub mod inventory;
pub mod item;
pub mod snapshot;
pub mod usage;

// Re-export 主要類型
pub use batch::Batch;
pub use calendar::{Clock, FixedClock, SystemClock};
pub use config::PlanningConfig;
pub use inventory::{ExpiryAlert, Inventory, RestockPlan};
pub use item::{ConsumptionOrder, InventoryItem, ItemKind};
pub use snapshot::{BatchRecord, InventorySnapshot, ItemRecord};
pub use usage::{UsageEvent, UsageLog, WasteEntry};

/// 庫存錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ShelfError {
    #[error("無效的參數: {0}")]
    InvalidArgument(String),

    #[error("庫存不足：需要 {requested}, 可用 {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("找不到: {0}")]
    NotFound(String),

    #[error("重複的品項ID: {0}")]
    DuplicateKey(String),

    #[error("I/O 失敗: {context}")]
    Io {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ShelfError {
    /// 包裝底層 I/O 或解析錯誤
    pub fn io<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        ShelfError::Io {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;
