use async_trait::async_trait;
use tracing::debug;
use wizard_config::BookingEntry;

use super::ConflictChecker;
use crate::errors::CollaboratorError;
use crate::scheduling::{occurrences, Booking, ConflictQuery};

/// In-process conflict checker over a fixed list of device bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingCalendar {
    bookings: Vec<Booking>,
}

impl BookingCalendar {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self { bookings }
    }

    pub fn from_config(entries: &[BookingEntry]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|entry| Booking {
                    title: entry.title.clone(),
                    device: entry.device.clone(),
                    start: entry.start,
                    end: entry.end,
                })
                .collect(),
        )
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Bookings on the query's device overlapping any of its occurrences.
    pub fn conflicts(&self, query: &ConflictQuery) -> Vec<Booking> {
        let slots = occurrences(query);
        self.bookings
            .iter()
            .filter(|booking| booking.device == query.device)
            .filter(|booking| slots.iter().any(|(start, end)| booking.overlaps(*start, *end)))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ConflictChecker for BookingCalendar {
    async fn check(&self, query: &ConflictQuery) -> Result<Vec<Booking>, CollaboratorError> {
        let found = self.conflicts(query);
        debug!(device = %query.device, conflicts = found.len(), "conflict check");
        Ok(found)
    }
}
