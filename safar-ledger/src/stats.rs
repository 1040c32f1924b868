use safar_core::booking::{STATUS_APPROVED, STATUS_PENDING};
use safar_core::{Booking, BookingStats};

/// Folds active bookings into a [`BookingStats`] rollup. Recomputed on every call.
pub struct StatsAggregator {
    stats: BookingStats,
}

impl StatsAggregator {
    pub fn new(total_trips: u64) -> Self {
        Self {
            stats: BookingStats {
                total_trips,
                ..BookingStats::default()
            },
        }
    }

    pub fn record(&mut self, status: &str, branch: &str, package_type: &str) {
        self.stats.total_bookings += 1;
        match status {
            STATUS_PENDING => self.stats.pending_bookings += 1,
            STATUS_APPROVED => self.stats.approved_bookings += 1,
            _ => {}
        }
        *self.stats.state_stats.entry(branch.to_string()).or_insert(0) += 1;
        *self.stats.type_stats.entry(package_type.to_string()).or_insert(0) += 1;
    }

    pub fn record_booking(&mut self, booking: &Booking) {
        self.record(&booking.status, &booking.branch, &booking.umrah_type);
    }

    pub fn finish(self) -> BookingStats {
        self.stats
    }

    pub fn collect<'a>(total_trips: u64, bookings: impl IntoIterator<Item = &'a Booking>) -> BookingStats {
        let mut aggregator = Self::new(total_trips);
        for booking in bookings {
            aggregator.record_booking(booking);
        }
        aggregator.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_groupings() {
        let mut agg = StatsAggregator::new(4);
        agg.record("pending", "Oran", "economy");
        agg.record("approved", "Oran", "vip");
        agg.record("cancelled", "Alger", "economy");
        agg.record("pending", "Alger", "economy");
        let stats = agg.finish();

        assert_eq!(stats.total_trips, 4);
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.pending_bookings, 2);
        assert_eq!(stats.approved_bookings, 1);
        assert_eq!(stats.state_stats["Oran"], 2);
        assert_eq!(stats.state_stats["Alger"], 2);
        assert_eq!(stats.type_stats["economy"], 3);
        assert_eq!(stats.type_stats["vip"], 1);
    }

    #[test]
    fn test_empty_ledger() {
        let stats = StatsAggregator::collect(0, std::iter::empty());
        assert_eq!(stats, safar_core::BookingStats::default());
    }
}
