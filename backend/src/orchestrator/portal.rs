//! Portal - the setup and login phases
//!
//! Drives the first half of a drill:
//!
//! ```text
//! Setup ──enter_login──▶ Login ──begin_login──▶ (processing) ──complete_login──▶ HandedOff
//!   ▲                      │
//!   └────back_to_setup─────┘
//! ```
//!
//! 1. The setup form is validated and the synthetic clock is anchored.
//! 2. The display ticker shows synthetic time until the phase ends.
//! 3. On the login click the clock is captured and classified immediately.
//! 4. The latency simulator picks a delay from the verdict; the gate stays in
//!    Processing until it runs out.
//! 5. The session record is committed to the store and the phase ends.
//!
//! # Example
//!
//! ```rust
//! use registration_drill_core::config::DrillConfig;
//! use registration_drill_core::core::time::{parse_civil, ManualWallClock};
//! use registration_drill_core::models::{Catalog, Category, Course};
//! use registration_drill_core::orchestrator::{DrillRuntime, InMemorySessionStore, Portal};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::new(vec![Course {
//!     id: 1,
//!     department: "융합공과대학 컴퓨터과학전공".to_string(),
//!     year: 2,
//!     category: Category::MajorRequired,
//!     code: "HBJ0101".to_string(),
//!     credits: 3,
//!     title: "자료구조".to_string(),
//!     instructor: "김교수".to_string(),
//!     schedule: "월1-2".to_string(),
//! }]).unwrap());
//!
//! let wall = ManualWallClock::new(parse_civil("2026-01-01T00:00:00").unwrap());
//! let config = DrillConfig { seed: Some(1), ..DrillConfig::default() };
//! let mut portal = Portal::new(
//!     config,
//!     catalog,
//!     DrillRuntime::manual(wall.clone()),
//!     InMemorySessionStore::new(),
//! ).unwrap();
//!
//! portal.form_mut().unwrap().select_college("융합공과대학");
//! portal.form_mut().unwrap().select_department("융합공과대학 컴퓨터과학전공");
//! portal.enter_login().unwrap();
//!
//! wall.advance(11_000); // one second past the boundary
//! let outcome = portal.login().unwrap();
//! assert!(!outcome.record.is_early());
//! ```

use crate::config::DrillConfig;
use crate::core::ticker::DisplayTicker;
use crate::core::time::{ClockAnchor, ManualWallClock, SyntheticClock, SystemWallClock, WallClock};
use crate::eligibility::{self, ActionCapture, Eligibility};
use crate::latency::{
    GateError, GateState, InstantSleeper, LatencyKind, LatencySimulator, ProcessingGate, Sleeper,
    ThreadSleeper,
};
use crate::models::{Catalog, Event, EventLog, SessionRecord};
use crate::orchestrator::browser::CatalogBrowser;
use crate::orchestrator::handoff::{self, SessionStore};
use crate::orchestrator::setup::{SetupForm, ValidatedSetup};
use crate::orchestrator::DrillError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Where a drill currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Editing the setup form.
    Setup,
    /// Login screen with the synthetic clock running.
    Login,
    /// Session committed; the portal's work is done.
    HandedOff,
    /// Catalog browser open.
    Browsing,
}

/// Wall clock and sleeper shared by the portal and the browser.
#[derive(Clone)]
pub struct DrillRuntime {
    pub wall: Arc<dyn WallClock>,
    pub sleeper: Arc<dyn Sleeper>,
}

impl DrillRuntime {
    /// Host time, real waits.
    pub fn system() -> Self {
        Self {
            wall: Arc::new(SystemWallClock),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Caller-controlled time, no waits.
    pub fn manual(wall: ManualWallClock) -> Self {
        Self {
            wall: Arc::new(wall),
            sleeper: Arc::new(InstantSleeper),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.wall.now_ms()
    }
}

/// A login whose verdict is fixed and whose delay is running.
///
/// Not `Clone`: each pending login completes exactly once.
#[derive(Debug)]
pub struct PendingLogin {
    capture: ActionCapture,
    eligibility: Eligibility,
    delay_ms: u64,
}

impl PendingLogin {
    pub fn capture(&self) -> &ActionCapture {
        &self.capture
    }

    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub record: SessionRecord,
    pub delay_ms: u64,
}

struct ActiveLogin {
    setup: ValidatedSetup,
    clock: SyntheticClock,
}

pub struct Portal<S: SessionStore> {
    config: DrillConfig,
    catalog: Arc<Catalog>,
    runtime: DrillRuntime,
    store: S,
    phase: Phase,
    form: SetupForm,
    active: Option<ActiveLogin>,
    latency: LatencySimulator,
    gate: ProcessingGate,
    ticker: Option<DisplayTicker>,
    events: EventLog,
}

impl<S: SessionStore> Portal<S> {
    pub fn new(
        config: DrillConfig,
        catalog: Arc<Catalog>,
        runtime: DrillRuntime,
        store: S,
    ) -> Result<Self, DrillError> {
        config.validate()?;
        let seed = config.seed_or(runtime.now_ms());
        let latency = LatencySimulator::new(config.latency.clone(), seed)?;
        let form = SetupForm::from_config(&config);

        let mut events = EventLog::new();
        events.log(Event::PhaseEntered {
            at_ms: runtime.now_ms(),
            phase: Phase::Setup,
        });
        tracing::info!(seed, courses = catalog.len(), "portal ready");

        Ok(Self {
            config,
            catalog,
            runtime,
            store,
            phase: Phase::Setup,
            form,
            active: None,
            latency,
            gate: ProcessingGate::new(),
            ticker: None,
            events,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &DrillConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn form(&self) -> &SetupForm {
        &self.form
    }

    /// The form is editable only during setup.
    pub fn form_mut(&mut self) -> Result<&mut SetupForm, DrillError> {
        self.expect_phase(Phase::Setup)?;
        Ok(&mut self.form)
    }

    pub fn department_options(&self) -> Vec<&str> {
        self.form.department_options(&self.catalog)
    }

    pub fn clock(&self) -> Option<&SyntheticClock> {
        self.active.as_ref().map(|a| &a.clock)
    }

    pub fn setup(&self) -> Option<&ValidatedSetup> {
        self.active.as_ref().map(|a| &a.setup)
    }

    pub fn ticker(&self) -> Option<&DisplayTicker> {
        self.ticker.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.gate.is_processing()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), DrillError> {
        if self.phase != expected {
            return Err(DrillError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.events.log(Event::PhaseEntered {
            at_ms: self.runtime.now_ms(),
            phase,
        });
        tracing::info!(?phase, "phase entered");
    }

    fn stop_display(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// Validate the form and anchor the clock (설정 완료).
    ///
    /// A validation failure leaves the portal in setup, untouched.
    pub fn enter_login(&mut self) -> Result<ClockAnchor, DrillError> {
        self.expect_phase(Phase::Setup)?;
        let setup = self.form.validate(&self.catalog)?;

        let mut clock = SyntheticClock::new(Arc::clone(&self.runtime.wall), setup.boundary);
        let anchor = clock.start()?;
        self.events.log(Event::ClockAnchored {
            at_ms: anchor.real_anchor_ms,
            real_anchor_ms: anchor.real_anchor_ms,
            sim_anchor_ms: anchor.sim_anchor_ms,
        });

        self.active = Some(ActiveLogin { setup, clock });
        self.enter(Phase::Login);
        Ok(anchor)
    }

    /// Start the display ticker for the login screen.
    pub fn start_display(&mut self) -> Result<&DisplayTicker, DrillError> {
        self.expect_phase(Phase::Login)?;
        if self.ticker.is_none() {
            let reader = match &self.active {
                Some(active) => active.clock.reader(),
                None => {
                    return Err(DrillError::WrongPhase {
                        expected: Phase::Login,
                        actual: self.phase,
                    })
                }
            };
            self.ticker = Some(DisplayTicker::spawn(reader, self.config.tick_interval()));
        }
        match &self.ticker {
            Some(ticker) => Ok(ticker),
            None => Err(DrillError::WrongPhase {
                expected: Phase::Login,
                actual: self.phase,
            }),
        }
    }

    /// Leave the login screen to edit the setup again (정보 수정).
    pub fn back_to_setup(&mut self) -> Result<(), DrillError> {
        self.expect_phase(Phase::Login)?;
        if let GateState::Processing { kind, .. } = self.gate.state() {
            return Err(GateError::Busy {
                active: kind,
                requested: LatencyKind::Navigation,
            }
            .into());
        }
        self.stop_display();
        if let Some(mut active) = self.active.take() {
            active.clock.stop();
        }
        self.enter(Phase::Setup);
        Ok(())
    }

    /// Capture, classify and start processing a login click.
    ///
    /// The verdict is fixed here. Fired from setup (before any anchor), the
    /// form is validated first and the clock's fallback value is captured.
    pub fn begin_login(&mut self) -> Result<PendingLogin, DrillError> {
        if let GateState::Processing { kind, .. } = self.gate.state() {
            return Err(GateError::Busy {
                active: kind,
                requested: LatencyKind::Login,
            }
            .into());
        }

        match self.phase {
            Phase::Login => {}
            Phase::Setup => {
                let setup = self.form.validate(&self.catalog)?;
                let clock = SyntheticClock::new(Arc::clone(&self.runtime.wall), setup.boundary);
                tracing::warn!("login fired before the clock was anchored; using fallback time");
                self.active = Some(ActiveLogin { setup, clock });
                self.enter(Phase::Login);
            }
            actual => {
                return Err(DrillError::WrongPhase {
                    expected: Phase::Login,
                    actual,
                })
            }
        }

        let Some(active) = self.active.as_ref() else {
            return Err(DrillError::WrongPhase {
                expected: Phase::Login,
                actual: self.phase,
            });
        };

        let capture = eligibility::capture(&active.clock);
        let verdict = capture.classify(&active.setup.boundary);
        let kind = LatencyKind::for_login(verdict);
        let delay_ms = self.latency.simulate(kind);
        self.gate.begin(kind, delay_ms)?;

        let at_ms = capture.real_click_ms;
        self.events.log(Event::ActionCaptured {
            at_ms,
            sim_click_ms: capture.sim_click_ms,
            anchored: capture.anchored,
        });
        self.events.log(Event::Classified {
            at_ms,
            eligibility: verdict,
        });
        self.events.log(Event::ProcessingStarted {
            at_ms,
            kind,
            delay_ms,
        });
        tracing::info!(
            sim_click_ms = capture.sim_click_ms,
            boundary_ms = active.setup.boundary.boundary_ms,
            early = verdict.is_early(),
            delay_ms,
            "login classified"
        );

        Ok(PendingLogin {
            capture,
            eligibility: verdict,
            delay_ms,
        })
    }

    /// Commit the session once the delay has run out.
    ///
    /// The gate reopens before anything is committed. A pending login that
    /// this portal's gate is not processing commits nothing; on a commit
    /// failure the portal stays on the login screen.
    pub fn complete_login(&mut self, pending: PendingLogin) -> Result<LoginOutcome, DrillError> {
        let Some(active) = self.active.as_ref() else {
            return Err(DrillError::WrongPhase {
                expected: Phase::Login,
                actual: self.phase,
            });
        };
        let kind = self.gate.finish()?;
        self.events.log(Event::ProcessingFinished {
            at_ms: self.runtime.now_ms(),
            kind,
        });

        let committed = handoff::commit(
            active.setup.identity.clone(),
            active.setup.boundary,
            active.setup.boundary_text.clone(),
            pending.capture,
            pending.eligibility,
            pending.delay_ms,
        )
        .and_then(|record| {
            handoff::persist(&mut self.store, &record)?;
            Ok(record)
        });
        let record = committed?;

        self.events.log(Event::SessionCommitted {
            at_ms: self.runtime.now_ms(),
            session_id: record.session_id.to_string(),
            early: record.is_early(),
        });
        self.stop_display();
        if let Some(mut active) = self.active.take() {
            active.clock.stop();
        }
        self.enter(Phase::HandedOff);

        Ok(LoginOutcome {
            delay_ms: pending.delay_ms,
            record,
        })
    }

    /// Click login and wait the delay out.
    pub fn login(&mut self) -> Result<LoginOutcome, DrillError> {
        let pending = self.begin_login()?;
        self.runtime.sleeper.sleep(pending.delay());
        self.complete_login(pending)
    }

    /// Open the catalog browser from the stored session; `None` when there
    /// is no usable session.
    pub fn open_browser(&self) -> Option<CatalogBrowser> {
        CatalogBrowser::open(
            &self.store,
            Arc::clone(&self.catalog),
            &self.config,
            self.runtime.clone(),
        )
    }

    /// Start over from the setup form after a hand-off (logout / restart).
    ///
    /// The stored session is destroyed, so a browser can no longer be opened
    /// from it.
    pub fn restart(&mut self) -> Result<(), DrillError> {
        self.expect_phase(Phase::HandedOff)?;
        self.store.clear()?;
        self.events.log(Event::SessionCleared {
            at_ms: self.runtime.now_ms(),
        });
        tracing::info!("session cleared for restart");
        self.enter(Phase::Setup);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::parse_civil;
    use crate::models::{Category, Course};
    use crate::orchestrator::handoff::InMemorySessionStore;
    use crate::orchestrator::setup::{SetupError, SetupField};

    fn portal(wall: &ManualWallClock) -> Portal<InMemorySessionStore> {
        let catalog = Catalog::new(vec![Course {
            id: 1,
            department: "융합공과대학 컴퓨터과학전공".to_string(),
            year: 4,
            category: Category::MajorRequired,
            code: "HBJ0401".to_string(),
            credits: 3,
            title: "캡스톤디자인".to_string(),
            instructor: String::new(),
            schedule: String::new(),
        }])
        .unwrap();
        let config = DrillConfig {
            seed: Some(3),
            ..DrillConfig::default()
        };
        let mut portal = Portal::new(
            config,
            Arc::new(catalog),
            DrillRuntime::manual(wall.clone()),
            InMemorySessionStore::new(),
        )
        .unwrap();
        let form = portal.form_mut().unwrap();
        form.select_college("융합공과대학");
        form.select_department("융합공과대학 컴퓨터과학전공");
        portal
    }

    #[test]
    fn test_placeholder_blocks_login_phase() {
        let wall = ManualWallClock::new(0);
        let mut portal = portal(&wall);
        portal.form_mut().unwrap().select_college("사범대학");

        let err = portal.enter_login().unwrap_err();
        assert!(matches!(
            err,
            DrillError::Setup(SetupError::Placeholder(SetupField::Department))
        ));
        assert_eq!(portal.phase(), Phase::Setup);
        assert!(portal.clock().is_none());
    }

    #[test]
    fn test_second_login_while_processing_is_busy() {
        let wall = ManualWallClock::new(parse_civil("2026-01-01T00:00:00").unwrap());
        let mut portal = portal(&wall);
        portal.enter_login().unwrap();

        let pending = portal.begin_login().unwrap();
        assert!(portal.is_processing());
        assert!(matches!(
            portal.begin_login(),
            Err(DrillError::Gate(GateError::Busy { .. }))
        ));
        assert!(matches!(portal.back_to_setup(), Err(DrillError::Gate(_))));

        portal.complete_login(pending).unwrap();
        assert!(!portal.is_processing());
        assert_eq!(portal.phase(), Phase::HandedOff);
    }

    #[test]
    fn test_form_locked_after_setup() {
        let wall = ManualWallClock::new(0);
        let mut portal = portal(&wall);
        portal.enter_login().unwrap();
        assert!(matches!(
            portal.form_mut(),
            Err(DrillError::WrongPhase {
                expected: Phase::Setup,
                actual: Phase::Login
            })
        ));

        portal.back_to_setup().unwrap();
        assert!(portal.form_mut().is_ok());
        assert!(portal.clock().is_none());
    }

    #[test]
    fn test_pending_login_from_other_portal_commits_nothing() {
        let wall = ManualWallClock::new(parse_civil("2026-01-01T00:00:00").unwrap());
        let mut first = portal(&wall);
        let mut second = portal(&wall);
        first.enter_login().unwrap();
        second.enter_login().unwrap();

        let pending = first.begin_login().unwrap();
        assert!(matches!(
            second.complete_login(pending),
            Err(DrillError::Gate(GateError::NotProcessing))
        ));
        assert_eq!(second.store().load_raw().unwrap(), None);
        assert_eq!(second.phase(), Phase::Login);
    }

    #[test]
    fn test_display_ticker_stopped_on_handoff() {
        let wall = ManualWallClock::new(0);
        let mut portal = portal(&wall);
        portal.enter_login().unwrap();
        assert!(portal.start_display().unwrap().is_running());

        portal.login().unwrap();
        assert!(portal.ticker().is_none());
    }
}
