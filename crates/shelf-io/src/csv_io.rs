//! CSV 匯入/匯出

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use shelf_core::{Batch, Inventory, ItemKind, Result, ShelfError};

/// 匯出欄位
const EXPORT_HEADER: [&str; 4] = ["Item ID", "Name", "Quantity", "Unit"];

/// 匯入欄位在標頭中的位置
struct Columns {
    item_id: usize,
    name: usize,
    unit: usize,
    quantity: usize,
    expiration: Option<usize>,
    threshold: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        Ok(Self {
            item_id: require_column(headers, &["itemid", "id"], "item_id")?,
            name: require_column(headers, &["name"], "name")?,
            unit: require_column(headers, &["unit"], "unit")?,
            quantity: require_column(headers, &["quantity"], "quantity")?,
            expiration: find_column(headers, &["expiration"]),
            threshold: find_column(headers, &["threshold"]),
        })
    }
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&normalize_header(h).as_str()))
}

fn require_column(headers: &csv::StringRecord, aliases: &[&str], label: &str) -> Result<usize> {
    find_column(headers, aliases)
        .ok_or_else(|| ShelfError::InvalidArgument(format!("CSV 缺少必要欄位: {}", label)))
}

/// 標頭正規化：忽略大小寫、空白與底線
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 從檔案匯入，回傳匯入的列數
pub fn import_csv(path: impl AsRef<Path>, inventory: &mut Inventory) -> Result<usize> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ShelfError::io(format!("無法開啟 {}", path.display()), e))?;
    let count = import_csv_from_reader(file, inventory)?;
    tracing::info!("已從 {} 匯入 {} 列", path.display(), count);
    Ok(count)
}

/// 從任意讀取器匯入
///
/// 品項已存在時，該列成為既有品項的新批次（名稱、單位、門檻忽略）；
/// 新品項依是否有到期日決定為易腐品或非易腐品。
/// 逐列套用，遇到錯誤時先前的列保持已匯入。
pub fn import_csv_from_reader<R: Read>(reader: R, inventory: &mut Inventory) -> Result<usize> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ShelfError::io("無法讀取 CSV 標頭", e))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut count = 0;
    for (index, record) in rdr.records().enumerate() {
        // 標頭為第 1 列
        let line = index + 2;
        let record = record.map_err(|e| ShelfError::io(format!("無法讀取 CSV 第 {} 列", line), e))?;
        import_row(&record, &columns, inventory).map_err(|e| match e {
            ShelfError::InvalidArgument(msg) => {
                ShelfError::InvalidArgument(format!("第 {} 列: {}", line, msg))
            }
            other => other,
        })?;
        count += 1;
    }

    Ok(count)
}

fn import_row(
    record: &csv::StringRecord,
    columns: &Columns,
    inventory: &mut Inventory,
) -> Result<()> {
    let field = |index: usize| record.get(index).unwrap_or("");
    let optional = |index: Option<usize>| index.map(field).unwrap_or("");

    let item_id = field(columns.item_id);
    let raw_quantity = field(columns.quantity);
    let quantity: u32 = raw_quantity
        .parse()
        .map_err(|_| ShelfError::InvalidArgument(format!("無效的數量: {:?}", raw_quantity)))?;
    let expiration = Batch::parse_expiration(optional(columns.expiration))?;

    if inventory.contains(item_id) {
        inventory.get_item_mut(item_id)?.add_batch(quantity, expiration)?;
        return Ok(());
    }

    let raw_threshold = optional(columns.threshold);
    let threshold: u32 = if raw_threshold.is_empty() {
        0
    } else {
        raw_threshold
            .parse()
            .map_err(|_| ShelfError::InvalidArgument(format!("無效的門檻: {:?}", raw_threshold)))?
    };

    let kind = if expiration.is_some() {
        ItemKind::Perishable
    } else {
        ItemKind::NonPerishable
    };

    // 先驗證批次再加入品項，避免留下沒有批次的新品項
    let batch = Batch::new(quantity, expiration)?;
    inventory
        .add_new_item(kind, item_id, field(columns.name), field(columns.unit), threshold)?
        .push_batch(batch);
    Ok(())
}

/// 匯出到檔案
pub fn export_csv(path: impl AsRef<Path>, inventory: &Inventory, today: NaiveDate) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| ShelfError::io(format!("無法建立目錄 {}", parent.display()), e))?;
    }
    let file = File::create(path)
        .map_err(|e| ShelfError::io(format!("無法建立 {}", path.display()), e))?;
    export_csv_to_writer(file, inventory, today)?;
    tracing::info!("已匯出 {} 個品項到 {}", inventory.len(), path.display());
    Ok(())
}

/// 匯出到任意寫入器，數量為未過期的可用量
pub fn export_csv_to_writer<W: Write>(
    writer: W,
    inventory: &Inventory,
    today: NaiveDate,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)
        .map_err(|e| ShelfError::io("無法寫入 CSV 標頭", e))?;

    for item in inventory.items() {
        let quantity = item.compute_available_quantity(today, false).to_string();
        wtr.write_record([item.item_id(), item.name(), quantity.as_str(), item.unit()])
            .map_err(|e| ShelfError::io(format!("無法寫入品項 {}", item.item_id()), e))?;
    }

    wtr.flush().map_err(|e| ShelfError::io("無法寫入 CSV", e))
}
