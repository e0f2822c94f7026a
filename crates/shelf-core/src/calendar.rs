//! 時鐘來源
//!
//! 所有與到期日相關的運算都接收明確的 `today`，
//! 時鐘只在邊界（記錄用量、匯出、示例程式）取值。

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 日期/時間來源
pub trait Clock {
    /// 今天的日期
    fn today(&self) -> NaiveDate;

    /// 目前時間
    fn now(&self) -> NaiveDateTime;
}

/// 系統時鐘（本地時間）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定時鐘（測試用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedClock {
    pub now: NaiveDateTime,
}

impl FixedClock {
    /// 固定在某日的午夜
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(chrono::NaiveTime::default()),
        }
    }

    /// 固定在某個時間點
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// 往後推移天數
    pub fn advance_days(&mut self, days: i64) {
        self.now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
