//! Time-ordered event scheduler
//!
//! The scheduler owns every pending event and delivers them once they are due.
//! A host drives it once per simulation tick:
//!
//! ```
//! use courier_core::{EventScheduler, PendingEvent, SchedulerConfig};
//!
//! let mut scheduler = EventScheduler::with_config(SchedulerConfig::with_tick_interval(0.1));
//! scheduler.enqueue(PendingEvent::new("door", "Open"), 0.25);
//! assert!(scheduler.has_pending_named("door"));
//! ```
//!
//! Handlers run from inside [`EventScheduler::service_events`] and may queue
//! further events. Each due event is unlinked before its recipients run and
//! the loop re-reads the queue head after every delivery, so events queued
//! with zero delay during a drain are delivered by that same drain.

use crate::event::{CallerInfo, EventTarget, InputData, PendingEvent, PendingSummary};
use crate::persist::{SavedEvent, SchedulerSave};
use crate::resolver::{find_all_by_class, find_all_by_name, EntityResolver};
use crate::signal;
use crate::{Clock, EntityId, SchedulerConfig, Value};
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use std::collections::BTreeMap;

/// The host side of message delivery
///
/// Implemented by whatever owns the entities: it resolves target names and
/// accepts inputs on behalf of each entity.
pub trait World: EntityResolver {
    /// Deliver one input to `target`
    ///
    /// Returns whether the target handled the input. The scheduler is passed
    /// back so the handler can queue follow-up events.
    fn accept_input(
        &mut self,
        target: EntityId,
        input: &InputData,
        scheduler: &mut EventScheduler,
    ) -> bool;
}

/// Queue position: fire time, then enqueue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    time: OrderedFloat<f64>,
    seq: u64,
}

/// Queue of pending events ordered by fire time
///
/// Events with equal fire times are delivered in the order they were queued.
#[derive(Debug, Clone)]
pub struct EventScheduler {
    config: SchedulerConfig,
    clock: Clock,
    events: BTreeMap<EventKey, PendingEvent>,
    next_seq: u64,
    single_step: bool,
    step_requested: bool,
}

impl EventScheduler {
    /// Create a scheduler with the default configuration
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler from a configuration
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            clock: config.clock(),
            single_step: config.single_step,
            config,
            events: BTreeMap::new(),
            next_seq: 0,
            step_requested: false,
        }
    }

    /// Reset to the configured start state: empty queue, fresh clock
    pub fn init(&mut self) {
        self.clear();
        self.clock = self.config.clock();
        self.single_step = self.config.single_step;
        self.step_requested = false;
    }

    /// Drop every pending event (level change)
    pub fn clear(&mut self) {
        if !self.events.is_empty() {
            debug!("clearing {} pending events", self.events.len());
        }
        self.events.clear();
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Advance the clock by one tick
    pub fn advance(&mut self) {
        self.clock.advance();
    }

    /// Move the clock to an absolute time
    pub fn set_time(&mut self, time: f64) {
        self.clock.set_time(time);
    }

    /// Queue `event` to fire `delay` seconds from now
    ///
    /// Negative or NaN delays are treated as zero. Returns the absolute fire
    /// time assigned to the event.
    pub fn enqueue(&mut self, mut event: PendingEvent, delay: f64) -> f64 {
        let delay = delay.max(0.0);
        event.fire_time = self.clock.now() + delay;
        let key = EventKey {
            time: OrderedFloat(event.fire_time),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.events.insert(key, event);
        key.time.0
    }

    /// Queue an input for every entity matching `name`
    pub fn post_named(
        &mut self,
        name: impl Into<String>,
        input: impl Into<String>,
        value: Value,
        delay: f64,
    ) -> f64 {
        let event = PendingEvent::new(EventTarget::Named(name.into()), input).with_value(value);
        self.enqueue(event, delay)
    }

    /// Queue an input for one entity
    pub fn post_direct(&mut self, target: EntityId, input: impl Into<String>, value: Value, delay: f64) -> f64 {
        let event = PendingEvent::new(EventTarget::Direct(target), input).with_value(value);
        self.enqueue(event, delay)
    }

    /// Deliver every event that is due
    ///
    /// Returns the number of events dispatched. In single-step mode at most
    /// one event is dispatched per [`request_step`](Self::request_step).
    pub fn service_events<W: World + ?Sized>(&mut self, world: &mut W) -> usize {
        let mut dispatched = 0;
        loop {
            if self.single_step && !self.step_requested {
                break;
            }
            let Some(event) = self.pop_due() else {
                break;
            };
            self.step_requested = false;
            self.dispatch(world, event);
            dispatched += 1;
        }
        dispatched
    }

    fn pop_due(&mut self) -> Option<PendingEvent> {
        let entry = self.events.first_entry()?;
        if entry.key().time.0 > self.clock.now() {
            return None;
        }
        Some(entry.remove())
    }

    fn dispatch<W: World + ?Sized>(&mut self, world: &mut W, event: PendingEvent) {
        let targets = match &event.target {
            EventTarget::Direct(id) => {
                if world.is_alive(*id) {
                    vec![*id]
                } else {
                    Vec::new()
                }
            }
            EventTarget::Named(name) => {
                let found = find_all_by_name(&*world, name, event.activator, event.caller_id());
                if found.is_empty() {
                    find_all_by_class(&*world, name)
                } else {
                    found
                }
            }
        };

        if targets.is_empty() {
            warn!(
                "unhandled input: (target '{}') -> ({}), from ({}); target entity not found",
                event.target,
                event.input,
                caller_label(event.caller.as_ref()),
            );
            return;
        }

        let data = event.input_data();
        for target in targets {
            if self.config.trace_dispatch {
                debug!(
                    "({:.2}) input {}: {}.{}({})",
                    self.clock.now(),
                    caller_label(event.caller.as_ref()),
                    world.name_of(target).unwrap_or(""),
                    data.input,
                    data.value.describe(&*world),
                );
            }
            world.accept_input(target, &data, self);
        }
    }

    /// Remove every event queued by `caller`
    ///
    /// `caller` carries the caller's current name and class. While `resolver`
    /// still holds an entity under `caller.id`, that entity's live name and
    /// class must match `caller`, and then every event queued under the handle
    /// is removed. A handle `resolver` no longer knows only matches events
    /// whose recorded caller equals `caller`. Returns the number removed.
    pub fn cancel<R: EntityResolver + ?Sized>(&mut self, resolver: &R, caller: &CallerInfo) -> usize {
        match resolver.name_of(caller.id).zip(resolver.class_of(caller.id)) {
            Some((name, class)) => {
                if name != caller.name || class != caller.class.as_str() {
                    return 0;
                }
                self.remove_where(|event| event.caller_id() == Some(caller.id))
            }
            None => self.remove_where(|event| event.caller.as_ref().is_some_and(|c| c.is_same(caller))),
        }
    }

    /// Remove direct events to `target` whose input starts with `input_prefix`
    ///
    /// The prefix compares case-insensitively. Returns the number removed.
    pub fn cancel_on(&mut self, target: EntityId, input_prefix: &str) -> usize {
        self.remove_where(|event| {
            event.target.as_direct() == Some(target) && input_has_prefix(&event.input, input_prefix)
        })
    }

    /// Whether any direct event to `target` is pending, optionally filtered
    /// by input prefix
    pub fn has_pending(&self, target: EntityId, input_prefix: Option<&str>) -> bool {
        self.events.values().any(|event| {
            event.target.as_direct() == Some(target)
                && input_prefix.map_or(true, |prefix| input_has_prefix(&event.input, prefix))
        })
    }

    /// Whether any event addressed by name to exactly `name` is pending
    pub fn has_pending_named(&self, name: &str) -> bool {
        self.events
            .values()
            .any(|event| matches!(&event.target, EventTarget::Named(n) if n.eq_ignore_ascii_case(name)))
    }

    fn remove_where(&mut self, mut matches: impl FnMut(&PendingEvent) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|_, event| !matches(event));
        before - self.events.len()
    }

    /// List every pending event in firing order and log the listing
    pub fn dump(&self) -> Vec<PendingSummary> {
        let lines: Vec<PendingSummary> = self
            .events
            .values()
            .map(|event| PendingSummary {
                time_to_fire: self.clock.until(event.fire_time),
                target: event.target.to_string(),
                input: event.input.clone(),
                parameter: event.value.to_string(),
            })
            .collect();

        info!("event queue ({} pending) at {:.2}:", lines.len(), self.clock.now());
        for line in &lines {
            info!("   {}", line);
        }
        lines
    }

    /// Pending events in firing order
    pub fn iter(&self) -> impl Iterator<Item = &PendingEvent> {
        self.events.values()
    }

    /// Fire time of the next event
    pub fn next_fire_time(&self) -> Option<f64> {
        self.events.keys().next().map(|key| key.time.0)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Enable or disable single-step mode
    pub fn set_single_step(&mut self, enabled: bool) {
        self.single_step = enabled;
        self.step_requested = false;
    }

    pub fn is_single_step(&self) -> bool {
        self.single_step
    }

    /// Allow the next due event through while single-stepping
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    /// Snapshot pending events with delays relative to the current clock
    pub fn save(&self) -> SchedulerSave {
        let now = self.clock.now();
        SchedulerSave {
            events: self
                .events
                .values()
                .map(|event| SavedEvent {
                    delay: (event.fire_time - now).max(0.0),
                    target: event.target.clone(),
                    input: event.input.clone(),
                    value: event.value.clone(),
                    activator: event.activator,
                    caller: event.caller.clone(),
                    stamp: event.stamp,
                })
                .collect(),
        }
    }

    /// Re-queue saved events relative to the current clock
    ///
    /// Existing events are kept; call [`clear`](Self::clear) first to replace
    /// the queue.
    pub fn restore(&mut self, save: SchedulerSave) {
        debug!("restoring {} pending events", save.events.len());
        for saved in save.events {
            signal::observe_stamp(saved.stamp);
            let event = PendingEvent::new(saved.target, saved.input)
                .with_value(saved.value)
                .with_activator(saved.activator)
                .with_caller(saved.caller)
                .with_stamp(saved.stamp);
            self.enqueue(event, saved.delay);
        }
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn caller_label(caller: Option<&CallerInfo>) -> String {
    match caller {
        Some(caller) => format!("{},{}", caller.class, caller.name),
        None => "none".to_string(),
    }
}

fn input_has_prefix(input: &str, prefix: &str) -> bool {
    input.len() >= prefix.len()
        && input.is_char_boundary(prefix.len())
        && input[..prefix.len()].eq_ignore_ascii_case(prefix)
}
