//! Tick-indexed deferred work.
//!
//! Anything an ability wants to happen later (a companion arriving, an aura
//! pulse, a transformation ending, a trap arming) is queued here and drained
//! by the simulation step. There is no wall-clock scheduling anywhere.

use std::collections::BTreeMap;

use crate::catalogue::AbilityKind;
use crate::state::{AbilitySlot, EntityId, Tick, Vec2};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// An owned object reached its destination.
    Arrival,
    /// One beat of a periodic effect.
    Pulse,
    /// A temporal effect ran its full course.
    Complete,
    /// A placed object becomes active.
    Arm,
    /// An owned object is forced to resolve now.
    Resolve,
}

/// A follow-up callback routed to the handler of `ability`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredTask {
    pub due: Tick,
    /// Insertion order; breaks ties between tasks due on the same tick.
    pub seq: u64,
    pub ability: AbilityKind,
    pub slot: AbilitySlot,
    pub caster: EntityId,
    pub rank: u8,
    pub kind: TaskKind,
    pub anchor: Option<EntityId>,
    pub point: Option<Vec2>,
    /// Further repetitions after this one.
    pub repeats: u32,
    /// Ticks between repetitions.
    pub interval: u64,
    /// Free-form guard value checked by the handler (e.g. an order sequence).
    pub token: u32,
}

impl DeferredTask {
    pub fn new(
        ability: AbilityKind,
        slot: AbilitySlot,
        caster: EntityId,
        rank: u8,
        kind: TaskKind,
    ) -> Self {
        Self {
            due: Tick::ZERO,
            seq: 0,
            ability,
            slot,
            caster,
            rank,
            kind,
            anchor: None,
            point: None,
            repeats: 0,
            interval: 0,
            token: 0,
        }
    }

    pub fn anchor(mut self, entity: EntityId) -> Self {
        self.anchor = Some(entity);
        self
    }

    pub fn at(mut self, point: Vec2) -> Self {
        self.point = Some(point);
        self
    }

    pub fn repeating(mut self, repeats: u32, interval: u64) -> Self {
        self.repeats = repeats;
        self.interval = interval.max(1);
        self
    }

    pub fn token(mut self, token: u32) -> Self {
        self.token = token;
        self
    }

    /// The next repetition, if any remain.
    pub fn next_repeat(&self) -> Option<DeferredTask> {
        if self.repeats == 0 {
            return None;
        }
        Some(DeferredTask {
            due: self.due + self.interval,
            repeats: self.repeats - 1,
            ..self.clone()
        })
    }
}

/// Deferred tasks ordered by `(due, seq)`.
///
/// Serialized as a flat task list so snapshots work with formats that only
/// accept string map keys.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "QueueSnapshot", from = "QueueSnapshot"))]
pub struct DeferredQueue {
    tasks: BTreeMap<(Tick, u64), DeferredTask>,
    next_seq: u64,
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct QueueSnapshot {
    tasks: Vec<DeferredTask>,
    next_seq: u64,
}

#[cfg(feature = "serde")]
impl From<DeferredQueue> for QueueSnapshot {
    fn from(queue: DeferredQueue) -> Self {
        Self {
            tasks: queue.tasks.into_values().collect(),
            next_seq: queue.next_seq,
        }
    }
}

#[cfg(feature = "serde")]
impl From<QueueSnapshot> for DeferredQueue {
    fn from(snapshot: QueueSnapshot) -> Self {
        let next_seq = snapshot
            .tasks
            .iter()
            .map(|task| task.seq + 1)
            .fold(snapshot.next_seq, u64::max);
        Self {
            tasks: snapshot
                .tasks
                .into_iter()
                .map(|task| ((task.due, task.seq), task))
                .collect(),
            next_seq,
        }
    }
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `task` for tick `due`. Returns its sequence number.
    pub fn schedule(&mut self, due: Tick, mut task: DeferredTask) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        task.due = due;
        task.seq = seq;
        self.tasks.insert((due, seq), task);
        seq
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: Tick) -> Option<DeferredTask> {
        let (&key, _) = self.tasks.first_key_value()?;
        if key.0 > now {
            return None;
        }
        self.tasks.remove(&key)
    }

    /// Drops every task matching `predicate`. Returns how many were dropped.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&DeferredTask) -> bool) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|_, task| !predicate(task));
        before - self.tasks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeferredTask> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(kind: TaskKind) -> DeferredTask {
        DeferredTask::new(AbilityKind::Ascension, AbilitySlot::R, EntityId(1), 1, kind)
    }

    #[test]
    fn pops_in_due_then_insertion_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(Tick(5), task(TaskKind::Complete));
        queue.schedule(Tick(3), task(TaskKind::Pulse));
        queue.schedule(Tick(3), task(TaskKind::Resolve));

        assert!(queue.pop_due(Tick(2)).is_none());
        assert_eq!(queue.pop_due(Tick(3)).unwrap().kind, TaskKind::Pulse);
        assert_eq!(queue.pop_due(Tick(3)).unwrap().kind, TaskKind::Resolve);
        assert!(queue.pop_due(Tick(4)).is_none());
        assert_eq!(queue.pop_due(Tick(9)).unwrap().kind, TaskKind::Complete);
        assert!(queue.is_empty());
    }

    #[test]
    fn repeats_count_down() {
        let mut first = task(TaskKind::Pulse).repeating(2, 10);
        first.due = Tick(1);
        let second = first.next_repeat().unwrap();
        let third = second.next_repeat().unwrap();
        assert_eq!(second.due, Tick(11));
        assert_eq!(third.due, Tick(21));
        assert!(third.next_repeat().is_none());
    }
}
