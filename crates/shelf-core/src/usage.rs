//! 用量紀錄與需求預測

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::Clock;
use crate::{Result, ShelfError};

/// 用量事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub quantity: u32,
    pub timestamp: NaiveDateTime,
}

/// 報廢紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WasteEntry {
    pub item_id: String,
    pub quantity: u32,
    pub date: NaiveDate,
}

impl WasteEntry {
    pub fn new(item_id: impl Into<String>, quantity: u32, date: NaiveDate) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            date,
        }
    }
}

/// 用量紀錄（品項ID → 依記錄順序的事件）
///
/// 與庫存沒有擁有關係，只透過呼叫端提供的品項ID關聯。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLog {
    events: HashMap<String, Vec<UsageEvent>>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄一筆用量
    pub fn record_usage(
        &mut self,
        item_id: impl Into<String>,
        quantity: u32,
        timestamp: NaiveDateTime,
    ) {
        self.events
            .entry(item_id.into())
            .or_default()
            .push(UsageEvent {
                quantity,
                timestamp,
            });
    }

    /// 以時鐘的目前時間記錄一筆用量
    pub fn record_usage_now(&mut self, item_id: impl Into<String>, quantity: u32, clock: &impl Clock) {
        self.record_usage(item_id, quantity, clock.now());
    }

    /// 某品項的所有事件
    pub fn events(&self, item_id: &str) -> &[UsageEvent] {
        self.events.get(item_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 有紀錄的品項ID（排序後）
    pub fn item_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.events.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// 需求預測：日平均用量
    ///
    /// 取最近 `window` 筆事件（依記錄順序，不依時間戳過濾），
    /// 總量除以涵蓋的不同日期數（至少為 1），四捨五入到小數兩位。
    pub fn forecast_demand(&self, item_id: &str, window: usize) -> Result<Decimal> {
        let events = match self.events.get(item_id) {
            Some(events) if !events.is_empty() => events,
            _ => {
                return Err(ShelfError::NotFound(format!(
                    "品項 {} 沒有用量紀錄",
                    item_id
                )))
            }
        };

        let start = events.len().saturating_sub(window);
        let recent = &events[start..];

        let total: Decimal = recent.iter().map(|e| Decimal::from(e.quantity)).sum();
        let distinct_days = recent
            .iter()
            .map(|e| e.timestamp.date())
            .collect::<BTreeSet<_>>()
            .len()
            .max(1);

        let forecast = (total / Decimal::from(distinct_days)).round_dp(2);
        tracing::debug!("品項 {} 需求預測 {}/日（{} 筆事件）", item_id, forecast, recent.len());
        Ok(forecast)
    }

    /// 各品項最近 `limit` 筆用量，供補貨計劃使用
    pub fn recent_usage(&self, limit: usize) -> BTreeMap<String, Vec<u32>> {
        self.events
            .iter()
            .map(|(item_id, events)| {
                let start = events.len().saturating_sub(limit);
                let quantities = events[start..].iter().map(|e| e.quantity).collect();
                (item_id.clone(), quantities)
            })
            .collect()
    }

    /// 報廢報表：[start, end] 期間內各品項的報廢總量（超過 `u32::MAX` 時停在上限）
    pub fn generate_waste_report(
        waste_log: &[WasteEntry],
        start: NaiveDate,
        end: NaiveDate,
    ) -> BTreeMap<String, u32> {
        let mut report = BTreeMap::new();
        for entry in waste_log
            .iter()
            .filter(|e| (start..=end).contains(&e.date))
        {
            let total: &mut u32 = report.entry(entry.item_id.clone()).or_insert(0);
            *total = total.saturating_add(entry.quantity);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use rstest::rstest;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_forecast_without_usage() {
        let log = UsageLog::new();
        assert!(matches!(
            log.forecast_demand("milk", 30),
            Err(ShelfError::NotFound(_))
        ));
    }

    #[test]
    fn test_forecast_divides_by_distinct_days() {
        let mut log = UsageLog::new();
        log.record_usage("milk", 4, at(1, 9));
        log.record_usage("milk", 2, at(1, 17));
        log.record_usage("milk", 3, at(2, 9));
        log.record_usage("milk", 1, at(4, 9));

        // 10 / 3 天 = 3.333 -> 3.33
        assert_eq!(log.forecast_demand("milk", 30).unwrap(), Decimal::new(333, 2));
    }

    #[rstest]
    #[case(1, Decimal::from(1))]
    #[case(2, Decimal::from(2))]
    #[case(3, Decimal::new(267, 2))]
    fn test_forecast_window_counts_events(#[case] window: usize, #[case] expected: Decimal) {
        let mut log = UsageLog::new();
        log.record_usage("milk", 4, at(1, 9));
        log.record_usage("milk", 3, at(2, 9));
        log.record_usage("milk", 1, at(3, 9));

        // 3 筆: 8 / 3 = 2.666 -> 2.67
        assert_eq!(log.forecast_demand("milk", window).unwrap(), expected);
    }

    #[test]
    fn test_record_usage_now() {
        let clock = FixedClock::at(at(5, 12));
        let mut log = UsageLog::new();
        log.record_usage_now("bread", 2, &clock);

        assert_eq!(log.events("bread")[0].timestamp, at(5, 12));
        assert!(log.events("cake").is_empty());
        assert_eq!(log.item_ids(), vec!["bread"]);
    }

    #[test]
    fn test_recent_usage() {
        let mut log = UsageLog::new();
        for (day, quantity) in [(1, 5), (2, 6), (3, 7)] {
            log.record_usage("eggs", quantity, at(day, 8));
        }

        let recent = log.recent_usage(2);
        assert_eq!(recent.get("eggs"), Some(&vec![6, 7]));
    }

    #[test]
    fn test_waste_report() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 10, day).unwrap();
        let waste = vec![
            WasteEntry::new("milk", 2, d(1)),
            WasteEntry::new("milk", 3, d(5)),
            WasteEntry::new("bread", 1, d(5)),
            WasteEntry::new("bread", 4, d(6)),
            WasteEntry::new("eggs", 6, d(9)),
        ];

        let report = UsageLog::generate_waste_report(&waste, d(1), d(5));

        assert_eq!(report.get("milk"), Some(&5));
        assert_eq!(report.get("bread"), Some(&1));
        assert_eq!(report.get("eggs"), None);
    }

    #[test]
    fn test_waste_report_saturates() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        let waste = vec![WasteEntry::new("m", u32::MAX, d), WasteEntry::new("m", 1, d)];

        let report = UsageLog::generate_waste_report(&waste, d, d);
        assert_eq!(report.get("m"), Some(&u32::MAX));
    }

    #[test]
    fn test_usage_log_serde() {
        let mut log = UsageLog::new();
        log.record_usage("milk", 4, at(1, 9));

        let json = serde_json::to_string(&log).unwrap();
        let restored: UsageLog = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, log);
    }
}
