//! Converts raw pin samples into discrete reaction events.

use std::collections::HashMap;

/// How an input pin is wired and which transitions matter for it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Momentary push button: only the press edge (raw low to high) is reported.
    Button,
    /// Pulled-up toggle switch: only the release edge (raw low to high) is
    /// reported. The idle level is high, so no event fires before the switch
    /// has actually been operated.
    Switch,
    /// Momentary push button where both press and release edges are reported,
    /// for rules that act while the button is held down.
    Hold,
    /// Analog sensor: every sample change is forwarded as a normalized level.
    Analog,
}

/// A discrete occurrence on one input pin.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub pin: u8,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    /// A digital transition: `Edge(true)` for press, `Edge(false)` for release.
    Edge(bool),
    /// An analog sample normalized to `0.0..=1.0`.
    Level(f64),
}

/// Stateful filter turning the raw notification stream into [`Event`]s.
///
/// Keeps the last delivered raw level per pin so repeated identical samples and
/// irrelevant transitions never reach the rules. Analog pins are forwarded
/// without edge filtering.
#[derive(Default, Debug)]
pub struct EdgeDetector {
    kinds: HashMap<u8, InputKind>,
    previous: HashMap<u8, bool>,
}

impl EdgeDetector {
    pub fn new(inputs: impl IntoIterator<Item = (u8, InputKind)>) -> Self {
        Self {
            kinds: inputs.into_iter().collect(),
            previous: HashMap::new(),
        }
    }

    /// Feeds one raw sample and returns the event it produces, if any.
    ///
    /// `raw` is the unscaled pin value and `max` its resolution ceiling
    /// (1 for digital pins). Samples for pins not registered as inputs are
    /// discarded.
    pub fn feed(&mut self, pin: u8, raw: u16, max: u16) -> Option<Event> {
        let kind = *self.kinds.get(&pin)?;

        if kind == InputKind::Analog {
            let level = f64::from(raw) / f64::from(max.max(1));
            return Some(Event {
                pin,
                kind: EventKind::Level(level),
            });
        }

        let level = raw > 0;
        // Switches idle high under the internal pullup.
        let idle = kind == InputKind::Switch;
        let previous = self.previous.insert(pin, level).unwrap_or(idle);

        match (kind, previous, level) {
            (InputKind::Button | InputKind::Switch, false, true) => Some(EventKind::Edge(true)),
            (InputKind::Hold, false, true) => Some(EventKind::Edge(true)),
            (InputKind::Hold, true, false) => Some(EventKind::Edge(false)),
            _ => None,
        }
        .map(|kind| Event { pin, kind })
    }
}
