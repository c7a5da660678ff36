//! Market session window on the exchange-local clock.

use crate::config::Config;
use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Regular-hours window: weekdays, exchange-local open..close.
#[derive(Debug, Clone)]
pub struct SessionWindow {
    timezone: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl SessionWindow {
    pub fn new(timezone: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            timezone,
            open,
            close,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.exchange_timezone,
            config.session_open,
            config.session_close,
        )
    }

    /// Session test for an arbitrary instant. Close is exclusive so the
    /// 16:00:00 tick already counts as after-hours.
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = local.time();
        time >= self.open && time < self.close
    }

    pub fn is_active_now(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}
