//! Desired subscription topics of a session.

use super::Topic;

/// Insertion-ordered set of topics the session wants to receive.
///
/// This is desired state: it survives reconnects and is replayed against
/// every new connection, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionSet {
    topics: Vec<Topic>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a topic. Returns false if it was already present.
    pub fn insert(&mut self, topic: Topic) -> bool {
        if self.contains(&topic) {
            return false;
        }
        self.topics.push(topic);
        true
    }

    /// Removes a topic. Returns false if it was not present.
    pub fn remove(&mut self, topic: &Topic) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t != topic);
        self.topics.len() != before
    }

    pub fn contains(&self, topic: &Topic) -> bool {
        self.topics.contains(topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(raw: &str) -> Topic {
        raw.parse().unwrap()
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = SubscriptionSet::new();
        assert!(set.insert(topic("conversation:c1")));
        assert!(!set.insert(topic("conversation:c1")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut set = SubscriptionSet::new();
        set.insert(topic("inbox:i1"));
        set.insert(topic("conversation:c1"));
        set.insert(topic("contact:ct1"));

        let order: Vec<String> = set.iter().map(Topic::to_string).collect();
        assert_eq!(order, vec!["inbox:i1", "conversation:c1", "contact:ct1"]);
    }

    #[test]
    fn remove_reports_membership() {
        let mut set = SubscriptionSet::new();
        set.insert(topic("conversation:c1"));
        assert!(set.remove(&topic("conversation:c1")));
        assert!(!set.remove(&topic("conversation:c1")));
        assert!(set.is_empty());
    }
}
