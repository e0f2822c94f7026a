//! JSON 持久化

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use shelf_core::{Inventory, InventorySnapshot, PlanningConfig, Result, ShelfError, UsageLog};

/// 儲存庫存快照（必要時建立上層目錄）
pub fn save_inventory(path: impl AsRef<Path>, inventory: &Inventory) -> Result<()> {
    let path = path.as_ref();
    write_json(path, &inventory.to_snapshot())?;
    tracing::info!("已儲存庫存快照 {}（{} 個品項）", path.display(), inventory.len());
    Ok(())
}

/// 載入庫存快照
pub fn load_inventory(path: impl AsRef<Path>) -> Result<Inventory> {
    let path = path.as_ref();
    let snapshot: InventorySnapshot = read_json(path)?;
    let inventory = Inventory::from_snapshot(snapshot)
        .map_err(|e| ShelfError::io(format!("無法解析 {}", path.display()), e))?;
    tracing::info!("已載入庫存快照 {}（{} 個品項）", path.display(), inventory.len());
    Ok(inventory)
}

/// 儲存用量紀錄
pub fn save_usage_log(path: impl AsRef<Path>, log: &UsageLog) -> Result<()> {
    write_json(path.as_ref(), log)
}

/// 載入用量紀錄
pub fn load_usage_log(path: impl AsRef<Path>) -> Result<UsageLog> {
    read_json(path.as_ref())
}

/// 載入規劃參數，缺少的欄位使用預設值
pub fn load_config(path: impl AsRef<Path>) -> Result<PlanningConfig> {
    read_json(path.as_ref())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ShelfError::io(format!("無法建立目錄 {}", parent.display()), e))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ShelfError::io(format!("無法序列化 {}", path.display()), e))?;
    fs::write(path, json)
        .map_err(|e| ShelfError::io(format!("無法寫入 {}", path.display()), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| ShelfError::io(format!("無法讀取 {}", path.display()), e))?;
    serde_json::from_str(&content)
        .map_err(|e| ShelfError::io(format!("無法解析 {}", path.display()), e))
}
