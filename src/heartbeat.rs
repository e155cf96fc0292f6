//! Auto-heartbeat ("thumper", spec §4.8): a periodic keep-alive
//! transaction for a context's subscribed channels/groups, armed after
//! every completed non-heartbeat transaction and skipped — not queued —
//! if a user transaction preempts it (Open Question #3, `SPEC_FULL.md`
//! §5).

use std::collections::BTreeSet;
use std::time::Duration;

/// Per-context heartbeat registration: the period and the channel/group
/// set to report presence on.
#[derive(Debug, Default)]
pub struct HeartbeatState {
    period: Option<Duration>,
    channels: BTreeSet<String>,
    channel_groups: BTreeSet<String>,
    /// Set while a heartbeat timer is armed; cleared the moment a user
    /// transaction starts, so the heartbeat is silently skipped rather
    /// than queued behind it.
    armed: bool,
}

impl HeartbeatState {
    pub fn enable(&mut self, period: Duration, channels: Vec<String>, channel_groups: Vec<String>) {
        self.period = Some(period);
        self.channels = channels.into_iter().collect();
        self.channel_groups = channel_groups.into_iter().collect();
        self.armed = true;
    }

    pub fn disable(&mut self) {
        self.period = None;
        self.channels.clear();
        self.channel_groups.clear();
        self.armed = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.period.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn channels(&self) -> Vec<String> {
        self.channels.iter().cloned().collect()
    }

    pub fn channel_groups(&self) -> Vec<String> {
        self.channel_groups.iter().cloned().collect()
    }

    /// Called when a user transaction (non-heartbeat) is about to run:
    /// disarms any pending heartbeat so the scheduler's timer tick skips
    /// it instead of queuing it behind the user transaction.
    pub fn disarm_for_user_transaction(&mut self) {
        self.armed = false;
    }

    /// Called when a non-heartbeat transaction completes: re-arms the
    /// heartbeat timer if auto-heartbeat is enabled.
    pub fn rearm_after_transaction(&mut self) {
        if self.period.is_some() {
            self.armed = true;
        }
    }

    /// Whether the scheduler should fire a heartbeat transaction right
    /// now (its timer expired and nothing preempted it).
    pub fn should_fire(&self) -> bool {
        self.armed && self.period.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let hb = HeartbeatState::default();
        assert!(!hb.is_enabled());
        assert!(!hb.should_fire());
    }

    #[test]
    fn enable_arms_and_disable_clears() {
        let mut hb = HeartbeatState::default();
        hb.enable(Duration::from_secs(30), vec!["chan".into()], vec![]);
        assert!(hb.is_enabled());
        assert!(hb.should_fire());
        hb.disable();
        assert!(!hb.is_enabled());
        assert!(!hb.should_fire());
    }

    #[test]
    fn user_transaction_preempts_pending_heartbeat_rather_than_queuing_it() {
        let mut hb = HeartbeatState::default();
        hb.enable(Duration::from_secs(30), vec!["chan".into()], vec![]);
        hb.disarm_for_user_transaction();
        assert!(!hb.should_fire(), "heartbeat must be skipped, not queued");
        hb.rearm_after_transaction();
        assert!(hb.should_fire());
    }
}
