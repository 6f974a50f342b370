//! The host's handle on a scene.
//!
//! The host receives a [`SceneHandle`] through the scene-ready event and
//! later calls `start_game` on it. The configuration is validated on the
//! spot; the scene picks it up at the start of its next tick.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::config::{CatchConfig, StartError, ValidatedConfig};
use crate::session::Phase;

/// State shared between a scene and the handles it gives out.
#[derive(Debug)]
pub(crate) struct SceneControl {
    phase: Cell<Phase>,
    pending: RefCell<Option<ValidatedConfig>>,
    catalog: Rc<Catalog>,
}

impl SceneControl {
    pub(crate) fn new(catalog: Rc<Catalog>) -> Self {
        Self {
            phase: Cell::new(Phase::Idle),
            pending: RefCell::new(None),
            catalog,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.set(phase);
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn take_pending(&self) -> Option<ValidatedConfig> {
        self.pending.borrow_mut().take()
    }

    pub(crate) fn discard_pending(&self) {
        self.pending.borrow_mut().take();
    }

    fn request_start(&self, config: &CatchConfig) -> Result<(), StartError> {
        let phase = self.phase.get();
        if phase != Phase::Idle {
            return Err(StartError::NotIdle(phase));
        }
        let mut pending = self.pending.borrow_mut();
        if pending.is_some() {
            return Err(StartError::AlreadyPending);
        }
        *pending = Some(config.validate(&self.catalog)?);
        Ok(())
    }
}

/// Cheap to clone; every clone talks to the same scene.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    control: Rc<SceneControl>,
}

impl SceneHandle {
    pub(crate) fn new(control: Rc<SceneControl>) -> Self {
        Self { control }
    }

    /// Ask the scene to start a round with `config`.
    ///
    /// Errors are reported here, synchronously; on error nothing is queued.
    pub fn start_game(&self, config: &CatchConfig) -> Result<(), StartError> {
        self.control.request_start(config)
    }

    pub fn phase(&self) -> Phase {
        self.control.phase()
    }

    /// A validated start is waiting for the scene's next tick.
    pub fn is_start_pending(&self) -> bool {
        self.control.pending.borrow().is_some()
    }
}
