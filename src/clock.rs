use chrono::{DateTime, Local, NaiveDate, Utc};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of the current calendar date.
///
/// Day granularity in the local time zone. Injected into the daybook so tests
/// can drive day boundaries with [`ManualClock`].
pub trait ClockSource {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    today: Cell<NaiveDate>,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            now: Cell::new(Self::midday(today)),
            today: Cell::new(today),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
        self.now.set(Self::midday(today));
    }

    /// Move to the next calendar day
    pub fn advance_day(&self) {
        if let Some(next) = self.today.get().succ_opt() {
            self.set_today(next);
        }
    }

    fn midday(date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc()
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

impl<C: ClockSource + ?Sized> ClockSource for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Periodic tick, polled by the event loop instead of running its own timer
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self { interval, last: start }
    }

    /// True once per elapsed interval
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_one_day() {
        let clock = ManualClock::new(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        clock.advance_day();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        clock.advance_day();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn ticker_fires_once_per_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(60), start);

        assert!(!ticker.poll(start + Duration::from_secs(30)));
        assert!(ticker.poll(start + Duration::from_secs(60)));
        assert!(!ticker.poll(start + Duration::from_secs(90)));
        assert!(ticker.poll(start + Duration::from_secs(121)));
    }
}
