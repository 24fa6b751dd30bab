use chrono::NaiveDate;
use thiserror::Error;

use crate::models::DailyLogEntry;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("Rating must be between 1 and 10, got {0}")]
    OutOfRange(u8),
}

/// History of daily self-ratings, at most one per date.
///
/// Order is insertion order (a re-rated day moves to the end); lookups go by
/// date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingLog {
    entries: Vec<DailyLogEntry>,
}

impl RatingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries, keeping only the last entry per date
    pub fn from_entries(entries: Vec<DailyLogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.upsert(entry);
        }
        log
    }

    /// Save a rating for `date`, replacing any earlier one for the same date
    pub fn record(&mut self, date: NaiveDate, rating: u8) -> Result<(), RatingError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(RatingError::OutOfRange(rating));
        }
        self.upsert(DailyLogEntry::new(date, rating));
        Ok(())
    }

    fn upsert(&mut self, entry: DailyLogEntry) {
        self.entries.retain(|e| e.date != entry.date);
        self.entries.push(entry);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyLogEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    pub fn entries(&self) -> &[DailyLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` most recently saved entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<&DailyLogEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    pub fn average(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u32 = self.entries.iter().map(|e| u32::from(e.rating)).sum();
        Some(f64::from(total) / self.entries.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        crate::time::parse_date(s).unwrap()
    }

    #[test]
    fn same_date_replaces() {
        let mut log = RatingLog::new();
        log.record(date("2024-01-01"), 4).unwrap();
        log.record(date("2024-01-02"), 6).unwrap();
        log.record(date("2024-01-01"), 9).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(date("2024-01-01")).map(|e| e.rating), Some(9));
        // Replaced entry moves to the end
        assert_eq!(log.entries()[1].date, date("2024-01-01"));
    }

    #[test]
    fn rejects_out_of_range() {
        let mut log = RatingLog::new();
        assert_eq!(log.record(date("2024-01-01"), 0), Err(RatingError::OutOfRange(0)));
        assert_eq!(log.record(date("2024-01-01"), 11), Err(RatingError::OutOfRange(11)));
        assert!(log.is_empty());
        assert!(log.record(date("2024-01-01"), 1).is_ok());
        assert!(log.record(date("2024-01-02"), 10).is_ok());
    }

    #[test]
    fn from_entries_dedupes_keeping_last() {
        let log = RatingLog::from_entries(vec![
            DailyLogEntry::new(date("2024-01-01"), 3),
            DailyLogEntry::new(date("2024-01-02"), 5),
            DailyLogEntry::new(date("2024-01-01"), 8),
        ]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(date("2024-01-01")).map(|e| e.rating), Some(8));
    }

    #[test]
    fn recent_is_newest_first() {
        let mut log = RatingLog::new();
        log.record(date("2024-01-01"), 1).unwrap();
        log.record(date("2024-01-02"), 2).unwrap();
        log.record(date("2024-01-03"), 3).unwrap();
        let ratings: Vec<u8> = log.recent(2).iter().map(|e| e.rating).collect();
        assert_eq!(ratings, vec![3, 2]);
    }

    #[test]
    fn average() {
        let mut log = RatingLog::new();
        assert_eq!(log.average(), None);
        log.record(date("2024-01-01"), 4).unwrap();
        log.record(date("2024-01-02"), 7).unwrap();
        assert_eq!(log.average(), Some(5.5));
    }
}
