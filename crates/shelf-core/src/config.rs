//! 補貨規劃參數配置

use serde::{Deserialize, Serialize};

/// 規劃參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// 補貨提前期（天）
    pub lead_time_days: u32,

    /// 補貨計劃取最近幾筆用量計算平均
    pub usage_window: usize,

    /// 即將到期的提醒天數
    pub expiry_alert_days: u32,

    /// 需求預測取最近幾筆用量事件
    ///
    /// 注意：這是事件筆數，不是日曆天數範圍。
    pub forecast_window: usize,
}

impl PlanningConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            lead_time_days: 3,
            usage_window: 7,
            expiry_alert_days: 3,
            forecast_window: 30,
        }
    }

    /// 建構器模式：設置提前期
    pub fn with_lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    /// 建構器模式：設置用量平均窗口
    pub fn with_usage_window(mut self, window: usize) -> Self {
        self.usage_window = window;
        self
    }

    /// 建構器模式：設置到期提醒天數
    pub fn with_expiry_alert_days(mut self, days: u32) -> Self {
        self.expiry_alert_days = days;
        self
    }

    /// 建構器模式：設置預測窗口
    pub fn with_forecast_window(mut self, window: usize) -> Self {
        self.forecast_window = window;
        self
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self::new()
    }
}
