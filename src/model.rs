#[derive(Debug, Clone)]
pub struct PoolMetrics {
    pub threads: usize,
    pub queued_tasks: usize,
    pub in_flight: usize,
    pub completed_tasks: usize,
    pub expired_tasks: usize,
}

impl PoolMetrics {
    pub fn utilization(&self) -> f64 {
        if self.threads == 0 {
            return 0.0;
        }
        self.in_flight as f64 / self.threads as f64
    }

    pub fn queue_pressure(&self) -> f64 {
        self.queued_tasks as f64
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.completed_tasks + self.expired_tasks;
        if total == 0 {
            return 1.0;
        }
        self.completed_tasks as f64 / total as f64
    }

    pub fn is_idle(&self) -> bool {
        self.queued_tasks == 0 && self.in_flight == 0
    }
}
