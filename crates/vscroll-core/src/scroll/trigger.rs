//! Threshold triggers
//!
//! A trigger watches the observable position and runs its callback when the
//! position reaches its threshold. The latch keeps it from firing again until
//! the position moves back across the threshold, and `once` triggers never
//! re-arm at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Error};

/// Crossing direction of a trigger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Fires when position >= threshold
    #[default]
    #[serde(rename = ">=", alias = ">y")]
    AtOrAbove,
    /// Fires when position <= threshold
    #[serde(rename = "<=", alias = "<y")]
    AtOrBelow,
}

impl Condition {
    /// Whether `position` satisfies the condition for `threshold`
    #[inline]
    pub fn is_met(self, position: f64, threshold: f64) -> bool {
        match self {
            Condition::AtOrAbove => position >= threshold,
            Condition::AtOrBelow => position <= threshold,
        }
    }

    /// Whether `position` has moved back past `threshold`
    #[inline]
    pub fn is_recrossed(self, position: f64, threshold: f64) -> bool {
        match self {
            Condition::AtOrAbove => position < threshold,
            Condition::AtOrBelow => position > threshold,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AtOrAbove => f.write_str(">="),
            Condition::AtOrBelow => f.write_str("<="),
        }
    }
}

/// Identifier handed out when a trigger is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u64);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Details passed to a trigger callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub id: TriggerId,
    pub threshold: f64,
    pub condition: Condition,
    /// Observable position that caused the crossing
    pub position: f64,
}

type Callback = Box<dyn FnMut(&TriggerEvent) -> Result<(), BoxError>>;

/// Threshold rule with its callback
pub struct Trigger {
    threshold: f64,
    condition: Condition,
    once: bool,
    fired: bool,
    callback: Callback,
}

impl Trigger {
    pub fn new<F>(threshold: f64, condition: Condition, once: bool, callback: F) -> Self
    where
        F: FnMut(&TriggerEvent) -> Result<(), BoxError> + 'static,
    {
        Self {
            threshold,
            condition,
            once,
            fired: false,
            callback: Box::new(callback),
        }
    }

    /// Re-arming trigger that fires when position >= threshold
    pub fn above<F>(threshold: f64, callback: F) -> Self
    where
        F: FnMut(&TriggerEvent) -> Result<(), BoxError> + 'static,
    {
        Self::new(threshold, Condition::AtOrAbove, false, callback)
    }

    /// Re-arming trigger that fires when position <= threshold
    pub fn below<F>(threshold: f64, callback: F) -> Self
    where
        F: FnMut(&TriggerEvent) -> Result<(), BoxError> + 'static,
    {
        Self::new(threshold, Condition::AtOrBelow, false, callback)
    }

    /// Make the trigger fire at most once
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Evaluate against `position`, returning whether the callback ran
    ///
    /// The latch is set before the callback runs, so a failing callback is
    /// not retried on the next evaluation.
    fn evaluate(&mut self, id: TriggerId, position: f64) -> Result<bool, Error> {
        if !self.fired && self.condition.is_met(position, self.threshold) {
            self.fired = true;
            let event = TriggerEvent {
                id,
                threshold: self.threshold,
                condition: self.condition,
                position,
            };
            (self.callback)(&event).map_err(|source| Error::Trigger { id, source })?;
            return Ok(true);
        }

        if self.fired && !self.once && self.condition.is_recrossed(position, self.threshold) {
            self.fired = false;
        }

        Ok(false)
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("threshold", &self.threshold)
            .field("condition", &self.condition)
            .field("once", &self.once)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}

/// Owned, ordered collection of triggers
#[derive(Debug, Default)]
pub struct TriggerSet {
    entries: Vec<(TriggerId, Trigger)>,
    next_id: u64,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger; evaluation follows registration order
    pub fn add(&mut self, trigger: Trigger) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, trigger));
        id
    }

    pub fn remove(&mut self, id: TriggerId) -> Option<Trigger> {
        let index = self.entries.iter().position(|(entry_id, _)| *entry_id == id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, trigger)| trigger)
    }

    /// Clear every latch, including those of `once` triggers
    pub fn rearm(&mut self) {
        for (_, trigger) in &mut self.entries {
            trigger.fired = false;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evaluate every trigger in registration order
    ///
    /// Stops at the first failing callback and returns its error.
    pub fn evaluate(&mut self, position: f64) -> Result<usize, Error> {
        let mut fired = 0;
        for (id, trigger) in &mut self.entries {
            if trigger.evaluate(*id, position)? {
                tracing::debug!(
                    "Trigger {} fired ({} {}) at {}",
                    id,
                    trigger.condition,
                    trigger.threshold,
                    position
                );
                fired += 1;
            }
        }
        Ok(fired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut(&TriggerEvent) -> Result<(), BoxError>) {
        let count = Rc::new(Cell::new(0));
        let handle = count.clone();
        (count, move |_: &TriggerEvent| -> Result<(), BoxError> {
            handle.set(handle.get() + 1);
            Ok(())
        })
    }

    #[test]
    fn test_above_fires_once_per_crossing() {
        let (count, callback) = counter();
        let mut set = TriggerSet::new();
        set.add(Trigger::above(500.0, callback));

        set.evaluate(499.0).unwrap();
        assert_eq!(count.get(), 0);
        set.evaluate(500.0).unwrap();
        set.evaluate(600.0).unwrap();
        set.evaluate(600.0).unwrap();
        assert_eq!(count.get(), 1);

        // Back below re-arms, next crossing fires again
        set.evaluate(400.0).unwrap();
        set.evaluate(510.0).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_once_never_rearms() {
        let (count, callback) = counter();
        let mut set = TriggerSet::new();
        let id = set.add(Trigger::above(10.0, callback).once());

        set.evaluate(20.0).unwrap();
        set.evaluate(0.0).unwrap();
        set.evaluate(20.0).unwrap();
        assert_eq!(count.get(), 1);
        assert!(set.get(id).unwrap().has_fired());
    }

    #[test]
    fn test_below_is_symmetric() {
        let (count, callback) = counter();
        let mut set = TriggerSet::new();
        set.add(Trigger::below(100.0, callback));

        set.evaluate(150.0).unwrap();
        assert_eq!(count.get(), 0);
        set.evaluate(100.0).unwrap();
        assert_eq!(count.get(), 1);
        set.evaluate(50.0).unwrap();
        assert_eq!(count.get(), 1);
        set.evaluate(101.0).unwrap();
        set.evaluate(99.0).unwrap();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_registration_order() {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut set = TriggerSet::new();
        for threshold in [30.0, 10.0, 20.0] {
            let log = log.clone();
            set.add(Trigger::above(threshold, move |event: &TriggerEvent| {
                log.borrow_mut().push(event.threshold);
                Ok(())
            }));
        }
        assert_eq!(set.evaluate(50.0).unwrap(), 3);
        assert_eq!(*log.borrow(), vec![30.0, 10.0, 20.0]);
    }

    #[test]
    fn test_failing_callback_is_not_retried() {
        let attempts = Rc::new(Cell::new(0));
        let handle = attempts.clone();
        let mut set = TriggerSet::new();
        let id = set.add(Trigger::above(1.0, move |_: &TriggerEvent| {
            handle.set(handle.get() + 1);
            Err("boom".into())
        }));

        let err = set.evaluate(5.0).unwrap_err();
        assert!(matches!(err, Error::Trigger { id: failed, .. } if failed == id));
        set.evaluate(5.0).unwrap();
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn test_remove_and_rearm() {
        let (count, callback) = counter();
        let mut set = TriggerSet::new();
        let id = set.add(Trigger::above(0.0, callback).once());
        set.evaluate(1.0).unwrap();
        set.rearm();
        set.evaluate(1.0).unwrap();
        assert_eq!(count.get(), 2);

        assert!(set.remove(id).is_some());
        assert!(set.is_empty());
        assert!(set.remove(id).is_none());
    }

    #[test]
    fn test_condition_serde_accepts_legacy_names() {
        let parsed: Vec<Condition> = serde_json::from_str(r#"[">=", "<=", ">y", "<y"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Condition::AtOrAbove,
                Condition::AtOrBelow,
                Condition::AtOrAbove,
                Condition::AtOrBelow
            ]
        );
    }
}
