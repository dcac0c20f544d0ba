// sync/subscriptions.rs

// Which trajectories watch which points. A point notification fans out to the
// trajectories listed here; entries are dropped as soon as a trajectory is
// removed or repointed.

use crate::planning::{Trajectory, TrajectoryId};
use crate::scene::NodeId;
use std::collections::{BTreeSet, HashMap};

/// Subscription table keyed by point handle
#[derive(Debug, Default)]
pub struct Subscriptions {
    by_point: HashMap<NodeId, BTreeSet<TrajectoryId>>,
}

impl Subscriptions {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `trajectory` follow `point`
    pub fn subscribe(&mut self, point: NodeId, trajectory: TrajectoryId) {
        self.by_point.entry(point).or_default().insert(trajectory);
    }

    /// Stops `trajectory` following `point`
    pub fn unsubscribe(&mut self, point: NodeId, trajectory: TrajectoryId) {
        if let Some(watchers) = self.by_point.get_mut(&point) {
            watchers.remove(&trajectory);
            if watchers.is_empty() {
                self.by_point.remove(&point);
            }
        }
    }

    /// Subscribes a trajectory to both of its endpoints
    pub fn watch(&mut self, trajectory: &Trajectory) {
        self.subscribe(trajectory.entry, trajectory.id);
        self.subscribe(trajectory.target, trajectory.id);
    }

    /// Removes a trajectory from every point it watched
    pub fn drop_trajectory(&mut self, trajectory: TrajectoryId) {
        self.by_point.retain(|_, watchers| {
            watchers.remove(&trajectory);
            !watchers.is_empty()
        });
    }

    /// Trajectories watching a point, in id order
    pub fn subscribers(&self, point: NodeId) -> Vec<TrajectoryId> {
        self.by_point
            .get(&point)
            .map(|watchers| watchers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether any trajectory follows `point`
    pub fn is_watched(&self, point: NodeId) -> bool {
        self.by_point.contains_key(&point)
    }

    /// Forgets every subscription
    pub fn clear(&mut self) {
        self.by_point.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_trajectory_unsubscribes_every_point() {
        let mut subscriptions = Subscriptions::new();
        let a = TrajectoryId(NodeId(100));
        let b = TrajectoryId(NodeId(101));
        subscriptions.subscribe(NodeId(1), a);
        subscriptions.subscribe(NodeId(2), a);
        subscriptions.subscribe(NodeId(1), b);

        subscriptions.drop_trajectory(a);
        assert_eq!(subscriptions.subscribers(NodeId(1)), vec![b]);
        assert!(!subscriptions.is_watched(NodeId(2)));
    }

    #[test]
    fn unsubscribe_of_unknown_pair_is_harmless() {
        let mut subscriptions = Subscriptions::new();
        subscriptions.unsubscribe(NodeId(9), TrajectoryId(NodeId(1)));
        assert!(subscriptions.subscribers(NodeId(9)).is_empty());
    }
}
