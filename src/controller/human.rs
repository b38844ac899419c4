//! Input-driven controller.

use std::marker::PhantomData;

use crate::core::UnitId;
use crate::events::{ControllerEvent, KeyboardEvent, MouseEvent};
use crate::rules::GameRules;

use super::Controller;

/// Closure translating a key event into a move descriptor.
pub type KeyMapping<D> = Box<dyn FnMut(&KeyboardEvent) -> Option<D> + Send>;
/// Closure translating a mouse event into a move descriptor.
pub type MouseMapping<D> = Box<dyn FnMut(&MouseEvent) -> Option<D> + Send>;

/// A controller fed by raw input events.
///
/// Holds at most one pending descriptor; a newer input overwrites an
/// unconsumed older one, matching the last-writer-wins rule applied
/// downstream by the orchestrator.
pub struct HumanController<R: GameRules> {
    unit: UnitId,
    keys: Option<KeyMapping<R::Descriptor>>,
    mouse: Option<MouseMapping<R::Descriptor>>,
    pending: Option<R::Descriptor>,
    _rules: PhantomData<R>,
}

impl<R: GameRules> HumanController<R> {
    /// A controller with no bindings; attach them with the builders.
    #[must_use]
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            keys: None,
            mouse: None,
            pending: None,
            _rules: PhantomData,
        }
    }

    /// Bind a keyboard mapping.
    #[must_use]
    pub fn with_keys(
        mut self,
        mapping: impl FnMut(&KeyboardEvent) -> Option<R::Descriptor> + Send + 'static,
    ) -> Self {
        self.keys = Some(Box::new(mapping));
        self
    }

    /// Bind a mouse mapping.
    #[must_use]
    pub fn with_mouse(
        mut self,
        mapping: impl FnMut(&MouseEvent) -> Option<R::Descriptor> + Send + 'static,
    ) -> Self {
        self.mouse = Some(Box::new(mapping));
        self
    }
}

impl<R: GameRules> Controller for HumanController<R> {
    type Rules = R;

    fn unit(&self) -> UnitId {
        self.unit
    }

    fn wants_input(&self) -> bool {
        true
    }

    fn react_to_event(&mut self, event: &ControllerEvent<R::Descriptor>) {
        let mapped = match event {
            ControllerEvent::Keyboard(key) => self.keys.as_mut().and_then(|m| m(key)),
            ControllerEvent::Mouse(mouse) => self.mouse.as_mut().and_then(|m| m(mouse)),
            ControllerEvent::Move { .. } => None,
        };
        if mapped.is_some() {
            self.pending = mapped;
        }
    }

    fn poll_pending_move(&mut self) -> Option<R::Descriptor> {
        self.pending.take()
    }
}
