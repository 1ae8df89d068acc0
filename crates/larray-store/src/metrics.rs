//! Lifecycle counters for a storage backend.
//!
//! [`StoreMetrics`] is updated by the backend and the store as operations
//! complete, and read by callers for telemetry and leak checks.

/// Cumulative operation counts and current memory usage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreMetrics {
    /// Successful allocations, adoptions and duplications.
    pub allocations: u64,
    /// Allocation requests rejected for any reason.
    pub failed_allocations: u64,
    /// Successful deallocations.
    pub deallocations: u64,
    /// Deallocation requests rejected as double free or invalid state.
    pub rejected_deallocations: u64,
    /// Reference views handed out.
    pub reference_views: u64,
    /// Copy views handed out.
    pub copy_views: u64,
    /// Arrays currently holding storage.
    pub live_arrays: usize,
    /// Bytes of storage currently held.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
}

impl StoreMetrics {
    pub(crate) fn record_allocation(&mut self, bytes: usize) {
        self.allocations += 1;
        self.live_arrays += 1;
        self.live_bytes += bytes;
        self.peak_bytes = self.peak_bytes.max(self.live_bytes);
    }

    pub(crate) fn record_deallocation(&mut self, bytes: usize) {
        self.deallocations += 1;
        self.live_arrays -= 1;
        self.live_bytes -= bytes;
    }

    /// Turn a committed allocation back into a failed one.
    pub(crate) fn record_rollback(&mut self, bytes: usize) {
        self.allocations -= 1;
        self.failed_allocations += 1;
        self.live_arrays -= 1;
        self.live_bytes -= bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StoreMetrics::default();
        assert_eq!(m.allocations, 0);
        assert_eq!(m.failed_allocations, 0);
        assert_eq!(m.deallocations, 0);
        assert_eq!(m.rejected_deallocations, 0);
        assert_eq!(m.reference_views, 0);
        assert_eq!(m.copy_views, 0);
        assert_eq!(m.live_arrays, 0);
        assert_eq!(m.live_bytes, 0);
        assert_eq!(m.peak_bytes, 0);
    }

    #[test]
    fn peak_survives_deallocation() {
        let mut m = StoreMetrics::default();
        m.record_allocation(100);
        m.record_allocation(50);
        m.record_deallocation(100);
        assert_eq!(m.live_arrays, 1);
        assert_eq!(m.live_bytes, 50);
        assert_eq!(m.peak_bytes, 150);
    }

    #[test]
    fn rollback_counts_as_failure_not_deallocation() {
        let mut m = StoreMetrics::default();
        m.record_allocation(64);
        m.record_rollback(64);
        assert_eq!(m.allocations, 0);
        assert_eq!(m.failed_allocations, 1);
        assert_eq!(m.deallocations, 0);
        assert_eq!(m.live_arrays, 0);
        assert_eq!(m.live_bytes, 0);
    }
}
