//! Output signals and their bindings
//!
//! A [`Signal`] is one named output of an entity. Each [`Binding`] wires it to
//! an input on some target, optionally after a delay and for a limited number
//! of firings. Bindings are usually written as text:
//!
//! ```text
//! target,input,parameter,delay,count
//! door_a,Open,,2.0,1
//! ```
//!
//! Trailing fields may be omitted. A count of `0` (or any negative count)
//! means the binding never runs out.

use crate::event::{CallerInfo, EventTarget, PendingEvent};
use crate::persist::SignalSave;
use crate::resolver::names_match;
use crate::{EntityId, EventScheduler, Value};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Input used when a binding names none
pub const DEFAULT_INPUT: &str = "Activate";

static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

/// Allocate a fresh binding stamp (never 0)
pub fn next_stamp() -> u64 {
    NEXT_STAMP.fetch_add(1, Ordering::Relaxed)
}

/// Keep future stamps above one seen in restored data
pub(crate) fn observe_stamp(stamp: u64) {
    if stamp != 0 {
        NEXT_STAMP.fetch_max(stamp.saturating_add(1), Ordering::Relaxed);
    }
}

/// How many more times a binding fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireCount {
    Unbounded,
    Remaining(u32),
}

impl FireCount {
    /// `n` firings; zero or negative means unbounded
    pub fn times(n: i64) -> Self {
        if n <= 0 {
            FireCount::Unbounded
        } else {
            FireCount::Remaining(n.min(u32::MAX as i64) as u32)
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, FireCount::Unbounded)
    }

    /// Count as written in binding text (`-1` for unbounded)
    pub fn as_raw(&self) -> i64 {
        match self {
            FireCount::Unbounded => -1,
            FireCount::Remaining(n) => *n as i64,
        }
    }
}

/// One wiring entry of a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Target name; `None` uses the signal's default target
    pub target: Option<String>,
    pub input: String,
    /// Replaces the fired value when present
    pub parameter: Option<String>,
    /// Seconds between firing and delivery
    pub delay: f64,
    pub count: FireCount,
    stamp: u64,
}

impl Binding {
    /// Unbounded, undelayed binding to `target`'s `input`
    pub fn new(target: impl Into<String>, input: impl Into<String>) -> Self {
        let target = target.into();
        let input = input.into();
        Self {
            target: (!target.is_empty()).then_some(target),
            input: if input.is_empty() {
                DEFAULT_INPUT.to_string()
            } else {
                input
            },
            parameter: None,
            delay: 0.0,
            count: FireCount::Unbounded,
            stamp: next_stamp(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        let parameter = parameter.into();
        self.parameter = (!parameter.is_empty()).then_some(parameter);
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = sanitize_delay(delay);
        self
    }

    pub fn with_count(mut self, count: FireCount) -> Self {
        self.count = match count {
            FireCount::Remaining(0) => FireCount::Unbounded,
            other => other,
        };
        self
    }

    /// Parse `target,input,parameter,delay,count`
    ///
    /// Never fails: each missing or malformed field falls back to its
    /// default. The ESC character is accepted as the delimiter when the text
    /// has no commas.
    pub fn parse(text: &str) -> Self {
        let delimiter = if !text.contains(',') && text.contains('\x1b') {
            '\x1b'
        } else {
            ','
        };
        let mut fields = text.split(delimiter).map(str::trim);

        let target = fields.next().unwrap_or("");
        let input = match fields.next().unwrap_or("") {
            name if name.is_empty() || name.contains(char::is_whitespace) => {
                if !name.is_empty() {
                    debug!("binding '{}': bad input name '{}', using {}", text, name, DEFAULT_INPUT);
                }
                DEFAULT_INPUT
            }
            name => name,
        };
        let parameter = fields.next().unwrap_or("");
        let delay = match fields.next().filter(|f| !f.is_empty()) {
            Some(field) => field.parse::<f64>().unwrap_or_else(|_| {
                debug!("binding '{}': bad delay '{}', using 0", text, field);
                0.0
            }),
            None => 0.0,
        };
        let count = match fields.next().filter(|f| !f.is_empty()) {
            Some(field) => field.parse::<i64>().map(FireCount::times).unwrap_or_else(|_| {
                debug!("binding '{}': bad count '{}', firing always", text, field);
                FireCount::Unbounded
            }),
            None => FireCount::Unbounded,
        };

        Binding::new(target, input)
            .with_parameter(parameter)
            .with_delay(delay)
            .with_count(count)
    }

    /// Unique stamp assigned at creation
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn is_unbounded(&self) -> bool {
        self.count.is_unbounded()
    }

    /// Text form accepted by [`Binding::parse`]
    pub fn to_definition(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.target.as_deref().unwrap_or(""),
            self.input,
            self.parameter.as_deref().unwrap_or(""),
            self.delay,
            self.count.as_raw()
        )
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_definition())
    }
}

fn sanitize_delay(delay: f64) -> f64 {
    if delay.is_finite() {
        delay.max(0.0)
    } else {
        0.0
    }
}

/// An output port: the bindings attached to one entity output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    default_target: Option<String>,
    bindings: Vec<Binding>,
    last_value: Value,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal whose unnamed bindings go to `target`
    pub fn with_default_target(target: impl Into<String>) -> Self {
        Self {
            default_target: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_target.as_deref()
    }

    pub fn set_default_target(&mut self, target: Option<String>) {
        self.default_target = target;
    }

    /// Append a binding
    pub fn add_binding(&mut self, binding: Binding) -> &Binding {
        self.bindings.push(binding);
        &self.bindings[self.bindings.len() - 1]
    }

    /// Parse binding text and append the result
    pub fn parse_binding(&mut self, text: &str) -> &Binding {
        self.add_binding(Binding::parse(text))
    }

    /// Queue one event per live binding
    ///
    /// Each binding's parameter, if set, replaces `value` as the payload.
    /// Finite bindings lose one firing and are dropped once exhausted.
    /// Returns the number of events queued.
    pub fn fire(
        &mut self,
        scheduler: &mut EventScheduler,
        value: Value,
        activator: Option<EntityId>,
        caller: Option<&CallerInfo>,
        extra_delay: f64,
    ) -> usize {
        let default_target = self.default_target.as_deref().unwrap_or("");
        let trace = scheduler.config().trace_firings;
        let extra_delay = sanitize_delay(extra_delay);
        let mut queued = 0;

        self.bindings.retain_mut(|binding| {
            let payload = match &binding.parameter {
                Some(parameter) => Value::String(parameter.clone()),
                None => value.clone(),
            };
            let target = binding.target.as_deref().unwrap_or(default_target);
            let event = PendingEvent::new(EventTarget::Named(target.to_string()), binding.input.clone())
                .with_value(payload)
                .with_activator(activator)
                .with_caller(caller.cloned())
                .with_stamp(binding.stamp);
            scheduler.enqueue(event, binding.delay + extra_delay);
            queued += 1;

            if trace {
                debug!(
                    "({:.2}) output: ({}) -> ({},{},{:.1})({})",
                    scheduler.now(),
                    caller.map_or_else(|| "none".to_string(), |c| format!("{},{}", c.class, c.name)),
                    target,
                    binding.input,
                    binding.delay + extra_delay,
                    binding.parameter.as_deref().unwrap_or(""),
                );
            }

            match &mut binding.count {
                FireCount::Unbounded => true,
                FireCount::Remaining(n) => {
                    *n -= 1;
                    *n > 0
                }
            }
        });

        self.last_value = value;
        queued
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Longest delay of any binding
    pub fn max_delay(&self) -> f64 {
        self.bindings.iter().map(|b| b.delay).fold(0.0, f64::max)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Binding created with `stamp`
    pub fn binding(&self, stamp: u64) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.stamp == stamp)
    }

    /// Value passed to the most recent [`fire`](Self::fire)
    pub fn last_value(&self) -> &Value {
        &self.last_value
    }

    /// Drop every binding whose target name is `target`
    pub fn remove_bindings_to(&mut self, target: &str) -> usize {
        let before = self.bindings.len();
        self.bindings
            .retain(|b| !b.target.as_deref().is_some_and(|t| names_match(target, t)));
        before - self.bindings.len()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn save(&self) -> SignalSave {
        SignalSave {
            default_target: self.default_target.clone(),
            bindings: self.bindings.clone(),
            last_value: self.last_value.clone(),
        }
    }

    /// Rebuild a signal from saved state
    pub fn restore(save: SignalSave) -> Self {
        for binding in &save.bindings {
            observe_stamp(binding.stamp);
        }
        Self {
            default_target: save.default_target,
            bindings: save.bindings,
            last_value: save.last_value,
        }
    }
}
