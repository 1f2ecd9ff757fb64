use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::prelude::*;

use super::{Target, TargetError};
use crate::dsl::FilterAst;
use crate::tagging::{AutomaticTagEntry, effective_tags};

/// A change made to a [`TargetStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(usize),
    Removed(usize),
    Replaced(usize),
    Moved { from: usize, to: usize },
    Cleared,
}

/// Ordered, mutable list of targets.
///
/// Each mutation is published to every subscriber in the order it happened.
#[derive(Debug, Default)]
pub struct TargetStore {
    targets: Vec<Target>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_targets(targets: Vec<Target>) -> Self {
        Self {
            targets,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, event: StoreEvent) {
        tracing::debug!("Store: {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn check_index(&self, index: usize) -> Result<(), TargetError> {
        if index < self.targets.len() {
            Ok(())
        } else {
            Err(TargetError::IndexOutOfRange {
                index,
                len: self.targets.len(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> Vec<Target> {
        self.targets.clone()
    }

    pub fn push(&mut self, target: Target) {
        self.targets.push(target);
        let index = self.targets.len() - 1;
        self.publish(StoreEvent::Added(index));
    }

    pub fn insert(&mut self, index: usize, target: Target) -> Result<(), TargetError> {
        if index > self.targets.len() {
            return Err(TargetError::IndexOutOfRange {
                index,
                len: self.targets.len(),
            });
        }
        self.targets.insert(index, target);
        self.publish(StoreEvent::Added(index));
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Target, TargetError> {
        self.check_index(index)?;
        let removed = self.targets.remove(index);
        self.publish(StoreEvent::Removed(index));
        Ok(removed)
    }

    /// Swap in an edited target, returning the old one.
    pub fn replace(&mut self, index: usize, target: Target) -> Result<Target, TargetError> {
        self.check_index(index)?;
        let old = std::mem::replace(&mut self.targets[index], target);
        self.publish(StoreEvent::Replaced(index));
        Ok(old)
    }

    /// Move the target at `from` so that it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), TargetError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let target = self.targets.remove(from);
        self.targets.insert(to, target);
        self.publish(StoreEvent::Moved { from, to });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.targets.clear();
        self.publish(StoreEvent::Cleared);
    }

    /// Indices of the targets whose effective tags match `filter`.
    pub fn filter_indices(&self, filter: &FilterAst, rules: &[AutomaticTagEntry]) -> Vec<usize> {
        self.targets
            .par_iter()
            .enumerate()
            .filter(|(_, target)| filter.is_match(&effective_tags(target, rules)))
            .map(|(i, _)| i)
            .collect()
    }
}
