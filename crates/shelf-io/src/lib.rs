//! # Shelf IO
//!
//! 檔案邊界：JSON 快照存取、CSV 匯入/匯出、規劃參數載入。
//! 所有檔案與解析錯誤都包裝成 `ShelfError::Io`。

pub mod csv_io;
pub mod json;

// Re-export 主要函式
pub use csv_io::{export_csv, export_csv_to_writer, import_csv, import_csv_from_reader};
pub use json::{load_config, load_inventory, load_usage_log, save_inventory, save_usage_log};
