//! Catalog browser - the browse phase
//!
//! Opened from the session hand-off. Owns the default cart, the current view,
//! the search term, the applied-course list and the notice overlay. Every
//! action except closing the notice and typing a search term is gated: it
//! samples a delay, holds the gate in Processing while the delay runs, and
//! commits its effect before the gate reopens.
//!
//! Early-bird sessions never see a registration affordance: rows carry
//! `register: None` and [`CatalogBrowser::register`] is refused outright.

use crate::cart::{
    apply_view, build_default_cart, AppliedCourse, AppliedCourses, CancelOutcome, RegistrationError,
    ViewMode,
};
use crate::config::DrillConfig;
use crate::latency::{
    GateError, GateState, LatencyConfig, LatencyKind, LatencySimulator, ProcessingGate,
};
use crate::models::{Catalog, Course, CourseId, Event, EventLog, SessionRecord};
use crate::orchestrator::handoff::{self, SessionStore};
use crate::orchestrator::portal::DrillRuntime;
use crate::orchestrator::{DrillError, Phase};
use crate::rng::RngManager;
use std::sync::Arc;
use std::time::Duration;

/// A gated browser action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserAction {
    ChangeView(ViewMode),
    Register(CourseId),
    /// Cancellation the user already confirmed.
    Cancel(CourseId),
}

impl BrowserAction {
    pub fn latency_kind(&self) -> LatencyKind {
        match self {
            BrowserAction::ChangeView(_) => LatencyKind::Navigation,
            BrowserAction::Register(_) => LatencyKind::RegistrationSubmit,
            BrowserAction::Cancel(_) => LatencyKind::Cancellation,
        }
    }
}

/// An action whose delay is running.
#[derive(Debug)]
pub struct PendingAction {
    action: BrowserAction,
    delay_ms: u64,
}

impl PendingAction {
    pub fn action(&self) -> &BrowserAction {
        &self.action
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserOutcome {
    ViewChanged,
    Registered(AppliedCourse),
    Cancelled(AppliedCourse),
}

/// Register button state for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAffordance {
    pub course_id: CourseId,
    /// False while another action is processing.
    pub enabled: bool,
}

/// One rendered list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow<'a> {
    /// 1-based position in the list.
    pub number: usize,
    pub course: &'a Course,
    /// `None` for early-bird sessions.
    pub register: Option<RegisterAffordance>,
}

pub struct CatalogBrowser {
    session: SessionRecord,
    catalog: Arc<Catalog>,
    runtime: DrillRuntime,
    cart: Vec<Course>,
    view: ViewMode,
    search: String,
    notice_open: bool,
    applied: AppliedCourses,
    latency: LatencySimulator,
    gate: ProcessingGate,
    events: EventLog,
}

impl CatalogBrowser {
    /// Open from the stored session; `None` when there is no usable record.
    ///
    /// The cart shuffle uses the configured seed and the latency simulator the
    /// next one, so one seed reproduces the whole browse phase.
    pub fn open(
        store: &dyn SessionStore,
        catalog: Arc<Catalog>,
        config: &DrillConfig,
        runtime: DrillRuntime,
    ) -> Option<Self> {
        let session = handoff::load(store)?;
        let seed = config.seed_or(runtime.now_ms());
        let latency = match LatencySimulator::new(config.latency.clone(), seed.wrapping_add(1)) {
            Ok(latency) => latency,
            Err(e) => {
                tracing::warn!(error = %e, "latency config rejected; browser not opened");
                return None;
            }
        };

        let cart = build_default_cart(&catalog, &session.identity, &mut RngManager::new(seed));

        let mut events = EventLog::new();
        events.log(Event::PhaseEntered {
            at_ms: runtime.now_ms(),
            phase: Phase::Browsing,
        });
        tracing::info!(
            session_id = %session.session_id,
            early = session.is_early(),
            cart = cart.len(),
            "catalog browser opened"
        );

        Some(Self {
            session,
            catalog,
            runtime,
            cart,
            view: ViewMode::Cart,
            search: String::new(),
            notice_open: true,
            applied: AppliedCourses::new(),
            latency,
            gate: ProcessingGate::new(),
            events,
        })
    }

    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &[Course] {
        &self.cart
    }

    pub fn view(&self) -> &ViewMode {
        &self.view
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn applied(&self) -> &AppliedCourses {
        &self.applied
    }

    pub fn notice_open(&self) -> bool {
        self.notice_open
    }

    pub fn is_processing(&self) -> bool {
        self.gate.is_processing()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn latency_config(&self) -> &LatencyConfig {
        self.latency.config()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Whether rows get a register affordance at all.
    pub fn registration_enabled(&self) -> bool {
        !self.session.is_early()
    }

    pub fn close_notice(&mut self) {
        self.notice_open = false;
    }

    /// Narrow the current view; not gated.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// The current list, filtered and searched, ready to render.
    pub fn rows(&self) -> Vec<CourseRow<'_>> {
        let registration = self.registration_enabled();
        let enabled = !self.gate.is_processing();
        apply_view(
            &self.catalog,
            &self.cart,
            &self.session.identity.department,
            &self.view,
            &self.search,
        )
        .into_iter()
        .enumerate()
        .map(|(i, course)| CourseRow {
            number: i + 1,
            course,
            register: registration.then_some(RegisterAffordance {
                course_id: course.id,
                enabled,
            }),
        })
        .collect()
    }

    fn reject(&mut self, course_id: CourseId, err: RegistrationError) -> DrillError {
        tracing::info!(course_id, reason = %err, "registration rejected");
        self.events.log(Event::RegistrationRejected {
            at_ms: self.runtime.now_ms(),
            course_id,
            reason: err.to_string(),
        });
        err.into()
    }

    fn precheck(&mut self, action: &BrowserAction) -> Result<(), DrillError> {
        match action {
            BrowserAction::ChangeView(_) => Ok(()),
            BrowserAction::Register(id) => {
                let id = *id;
                if !self.registration_enabled() {
                    return Err(self.reject(id, RegistrationError::Unavailable));
                }
                let checked = match self.catalog.get(id) {
                    Some(course) => self.applied.check(course),
                    None => Err(RegistrationError::UnknownCourse(id)),
                };
                checked.map_err(|e| self.reject(id, e))
            }
            BrowserAction::Cancel(id) => {
                if self.applied.contains(*id) {
                    Ok(())
                } else {
                    Err(RegistrationError::NotRegistered(*id).into())
                }
            }
        }
    }

    /// Validate `action`, sample its delay and close the gate.
    ///
    /// Rejections happen here, before any delay, and leave everything as it was.
    pub fn begin(&mut self, action: BrowserAction) -> Result<PendingAction, DrillError> {
        let kind = action.latency_kind();
        if let GateState::Processing { kind: active, .. } = self.gate.state() {
            return Err(GateError::Busy {
                active,
                requested: kind,
            }
            .into());
        }
        self.precheck(&action)?;

        let delay_ms = self.latency.simulate(kind);
        self.gate.begin(kind, delay_ms)?;
        self.events.log(Event::ProcessingStarted {
            at_ms: self.runtime.now_ms(),
            kind,
            delay_ms,
        });
        Ok(PendingAction { action, delay_ms })
    }

    /// Reopen the gate and commit the effect of `pending`.
    ///
    /// A pending action this browser's gate is not processing has no effect.
    pub fn complete(&mut self, pending: PendingAction) -> Result<BrowserOutcome, DrillError> {
        let kind = self.gate.finish()?;
        let now_ms = self.runtime.now_ms();
        self.events.log(Event::ProcessingFinished { at_ms: now_ms, kind });

        match pending.action {
            BrowserAction::ChangeView(view) => {
                let label = view.label();
                self.view = view;
                self.notice_open = false;
                self.search.clear();
                self.events.log(Event::ViewChanged {
                    at_ms: now_ms,
                    view: label.to_string(),
                });
                tracing::debug!(view = label, "view changed");
                Ok(BrowserOutcome::ViewChanged)
            }
            BrowserAction::Register(id) => {
                let applied = match self.catalog.get(id) {
                    Some(course) => self.applied.apply(course, now_ms).cloned(),
                    None => Err(RegistrationError::UnknownCourse(id)),
                };
                match applied {
                    Ok(applied) => {
                        self.events.log(Event::CourseRegistered {
                            at_ms: now_ms,
                            course_id: id,
                            title: applied.course.title.clone(),
                        });
                        tracing::info!(course_id = id, title = %applied.course.title, "course registered");
                        Ok(BrowserOutcome::Registered(applied))
                    }
                    Err(e) => Err(self.reject(id, e)),
                }
            }
            BrowserAction::Cancel(id) => match self.applied.cancel(id) {
                Some(cancelled) => {
                    self.events.log(Event::CourseCancelled {
                        at_ms: now_ms,
                        course_id: id,
                    });
                    tracing::info!(course_id = id, "registration cancelled");
                    Ok(BrowserOutcome::Cancelled(cancelled))
                }
                None => Err(RegistrationError::NotRegistered(id).into()),
            },
        }
    }

    /// Begin, wait the delay out, complete.
    pub fn perform(&mut self, action: BrowserAction) -> Result<BrowserOutcome, DrillError> {
        let pending = self.begin(action)?;
        self.runtime.sleeper.sleep(pending.delay());
        self.complete(pending)
    }

    pub fn change_view(&mut self, view: ViewMode) -> Result<(), DrillError> {
        self.perform(BrowserAction::ChangeView(view)).map(|_| ())
    }

    pub fn register(&mut self, course_id: CourseId) -> Result<AppliedCourse, DrillError> {
        match self.perform(BrowserAction::Register(course_id))? {
            BrowserOutcome::Registered(applied) => Ok(applied),
            _ => Err(RegistrationError::UnknownCourse(course_id).into()),
        }
    }

    /// Cancel a registration. Without `confirmed` nothing happens.
    pub fn cancel(&mut self, course_id: CourseId, confirmed: bool) -> Result<CancelOutcome, DrillError> {
        if !confirmed {
            return Ok(CancelOutcome::NotConfirmed);
        }
        match self.perform(BrowserAction::Cancel(course_id))? {
            BrowserOutcome::Cancelled(applied) => Ok(CancelOutcome::Cancelled(applied)),
            _ => Err(RegistrationError::NotRegistered(course_id).into()),
        }
    }

    /// End the session: the stored record is destroyed and the event log
    /// handed back.
    pub fn logout(mut self, store: &mut dyn SessionStore) -> Result<EventLog, DrillError> {
        if let GateState::Processing { kind, .. } = self.gate.state() {
            return Err(GateError::Busy {
                active: kind,
                requested: LatencyKind::Navigation,
            }
            .into());
        }
        store.clear()?;
        self.events.log(Event::LoggedOut {
            at_ms: self.runtime.now_ms(),
        });
        tracing::info!(session_id = %self.session.session_id, "logged out");
        Ok(self.events)
    }
}
