//! Event logging for drill replay and debugging.
//!
//! Every phase change, clock capture, verdict, processing delay and
//! registration outcome is recorded as an [`Event`] stamped with the real
//! (wall) time it happened at. The log answers "what did the user click, when
//! did the system think it was, and how long did it make them wait".
//!
//! # Example
//!
//! ```rust
//! use registration_drill_core::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::CourseRegistered {
//!     at_ms: 1_000,
//!     course_id: 101,
//!     title: "자료구조".to_string(),
//! });
//! assert_eq!(log.events_of_type("CourseRegistered").len(), 1);
//! ```

use crate::core::time::Millis;
use crate::eligibility::Eligibility;
use crate::latency::LatencyKind;
use crate::models::course::CourseId;
use crate::orchestrator::Phase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    PhaseEntered {
        at_ms: Millis,
        phase: Phase,
    },

    ClockAnchored {
        at_ms: Millis,
        real_anchor_ms: Millis,
        sim_anchor_ms: Millis,
    },

    /// Clock sampled at the instant of a gated action.
    ActionCaptured {
        at_ms: Millis,
        sim_click_ms: Millis,
        anchored: bool,
    },

    Classified {
        at_ms: Millis,
        eligibility: Eligibility,
    },

    ProcessingStarted {
        at_ms: Millis,
        kind: LatencyKind,
        delay_ms: u64,
    },

    ProcessingFinished {
        at_ms: Millis,
        kind: LatencyKind,
    },

    SessionCommitted {
        at_ms: Millis,
        session_id: String,
        early: bool,
    },

    ViewChanged {
        at_ms: Millis,
        view: String,
    },

    CourseRegistered {
        at_ms: Millis,
        course_id: CourseId,
        title: String,
    },

    RegistrationRejected {
        at_ms: Millis,
        course_id: CourseId,
        reason: String,
    },

    CourseCancelled {
        at_ms: Millis,
        course_id: CourseId,
    },

    LoggedOut {
        at_ms: Millis,
    },

    /// Stored session destroyed on restart.
    SessionCleared {
        at_ms: Millis,
    },
}

impl Event {
    /// Wall time the event was recorded at
    pub fn at_ms(&self) -> Millis {
        match self {
            Event::PhaseEntered { at_ms, .. }
            | Event::ClockAnchored { at_ms, .. }
            | Event::ActionCaptured { at_ms, .. }
            | Event::Classified { at_ms, .. }
            | Event::ProcessingStarted { at_ms, .. }
            | Event::ProcessingFinished { at_ms, .. }
            | Event::SessionCommitted { at_ms, .. }
            | Event::ViewChanged { at_ms, .. }
            | Event::CourseRegistered { at_ms, .. }
            | Event::RegistrationRejected { at_ms, .. }
            | Event::CourseCancelled { at_ms, .. }
            | Event::LoggedOut { at_ms }
            | Event::SessionCleared { at_ms } => *at_ms,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::PhaseEntered { .. } => "PhaseEntered",
            Event::ClockAnchored { .. } => "ClockAnchored",
            Event::ActionCaptured { .. } => "ActionCaptured",
            Event::Classified { .. } => "Classified",
            Event::ProcessingStarted { .. } => "ProcessingStarted",
            Event::ProcessingFinished { .. } => "ProcessingFinished",
            Event::SessionCommitted { .. } => "SessionCommitted",
            Event::ViewChanged { .. } => "ViewChanged",
            Event::CourseRegistered { .. } => "CourseRegistered",
            Event::RegistrationRejected { .. } => "RegistrationRejected",
            Event::CourseCancelled { .. } => "CourseCancelled",
            Event::LoggedOut { .. } => "LoggedOut",
            Event::SessionCleared { .. } => "SessionCleared",
        }
    }

    /// Course the event concerns, if any
    pub fn course_id(&self) -> Option<CourseId> {
        match self {
            Event::CourseRegistered { course_id, .. }
            | Event::RegistrationRejected { course_id, .. }
            | Event::CourseCancelled { course_id, .. } => Some(*course_id),
            _ => None,
        }
    }
}

/// Append-only list of drill events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_course(&self, course_id: CourseId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.course_id() == Some(course_id))
            .collect()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_for_course() {
        let mut log = EventLog::new();
        log.log(Event::CourseRegistered {
            at_ms: 1,
            course_id: 101,
            title: "X".to_string(),
        });
        log.log(Event::RegistrationRejected {
            at_ms: 2,
            course_id: 102,
            reason: "same title".to_string(),
        });
        log.log(Event::CourseCancelled {
            at_ms: 3,
            course_id: 101,
        });
        log.log(Event::LoggedOut { at_ms: 4 });

        assert_eq!(log.len(), 4);
        assert_eq!(log.events_for_course(101).len(), 2);
        assert_eq!(log.events_for_course(102)[0].at_ms(), 2);
        assert_eq!(log.last().map(Event::event_type), Some("LoggedOut"));
    }
}
