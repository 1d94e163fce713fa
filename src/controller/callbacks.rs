//! `ControllerCallbacks` and the capability table computed from it.

use std::fmt;

use crate::controller::event::{EventKind, MouseButton};
use crate::topo_error::TopoError;

/// Result of a controller callback.
pub type CallbackResult<T = ()> = Result<T, TopoError>;

/// Script-side behavior of a controller.
///
/// Every callback has a no-op default. Event callbacks are only dispatched
/// when [`implements`](Self::implements) says so at load time; lifecycle
/// callbacks are always called.
pub trait ControllerCallbacks {
    /// Whether the callback for `kind` is provided.
    fn implements(&self, kind: EventKind) -> bool;

    fn on_loaded(&mut self) -> CallbackResult {
        Ok(())
    }
    fn create_graph(&mut self) -> CallbackResult {
        Ok(())
    }
    fn init_graph(&mut self) -> CallbackResult {
        Ok(())
    }
    fn bwd_init_graph(&mut self) -> CallbackResult {
        Ok(())
    }
    fn store_reset_state(&mut self) -> CallbackResult {
        Ok(())
    }
    fn reset(&mut self) -> CallbackResult {
        Ok(())
    }
    fn cleanup(&mut self) -> CallbackResult {
        Ok(())
    }
    fn on_heart_beat(&mut self) -> CallbackResult {
        Ok(())
    }

    fn draw(&mut self) -> CallbackResult {
        Ok(())
    }
    fn on_begin_animation_step(&mut self, _dt: f64) -> CallbackResult {
        Ok(())
    }
    fn on_end_animation_step(&mut self, _dt: f64) -> CallbackResult {
        Ok(())
    }
    /// Returns whether the key was consumed.
    fn on_key_pressed(&mut self, _key: char) -> CallbackResult<bool> {
        Ok(false)
    }
    /// Returns whether the key was consumed.
    fn on_key_released(&mut self, _key: char) -> CallbackResult<bool> {
        Ok(false)
    }
    fn on_mouse_move(&mut self, _x: i32, _y: i32) -> CallbackResult {
        Ok(())
    }
    fn on_mouse_button(
        &mut self,
        _button: MouseButton,
        _x: i32,
        _y: i32,
        _pressed: bool,
    ) -> CallbackResult {
        Ok(())
    }
    fn on_mouse_wheel(&mut self, _x: i32, _y: i32, _delta: i32) -> CallbackResult {
        Ok(())
    }
    fn on_script_event(&mut self, _sender: &str, _name: &str, _payload: &str) -> CallbackResult {
        Ok(())
    }
    fn on_gui_event(&mut self, _control: &str, _value_name: &str, _value: &str) -> CallbackResult {
        Ok(())
    }
}

impl<C: ControllerCallbacks + ?Sized> ControllerCallbacks for Box<C> {
    fn implements(&self, kind: EventKind) -> bool {
        (**self).implements(kind)
    }
    fn on_loaded(&mut self) -> CallbackResult {
        (**self).on_loaded()
    }
    fn create_graph(&mut self) -> CallbackResult {
        (**self).create_graph()
    }
    fn init_graph(&mut self) -> CallbackResult {
        (**self).init_graph()
    }
    fn bwd_init_graph(&mut self) -> CallbackResult {
        (**self).bwd_init_graph()
    }
    fn store_reset_state(&mut self) -> CallbackResult {
        (**self).store_reset_state()
    }
    fn reset(&mut self) -> CallbackResult {
        (**self).reset()
    }
    fn cleanup(&mut self) -> CallbackResult {
        (**self).cleanup()
    }
    fn on_heart_beat(&mut self) -> CallbackResult {
        (**self).on_heart_beat()
    }
    fn draw(&mut self) -> CallbackResult {
        (**self).draw()
    }
    fn on_begin_animation_step(&mut self, dt: f64) -> CallbackResult {
        (**self).on_begin_animation_step(dt)
    }
    fn on_end_animation_step(&mut self, dt: f64) -> CallbackResult {
        (**self).on_end_animation_step(dt)
    }
    fn on_key_pressed(&mut self, key: char) -> CallbackResult<bool> {
        (**self).on_key_pressed(key)
    }
    fn on_key_released(&mut self, key: char) -> CallbackResult<bool> {
        (**self).on_key_released(key)
    }
    fn on_mouse_move(&mut self, x: i32, y: i32) -> CallbackResult {
        (**self).on_mouse_move(x, y)
    }
    fn on_mouse_button(&mut self, button: MouseButton, x: i32, y: i32, pressed: bool) -> CallbackResult {
        (**self).on_mouse_button(button, x, y, pressed)
    }
    fn on_mouse_wheel(&mut self, x: i32, y: i32, delta: i32) -> CallbackResult {
        (**self).on_mouse_wheel(x, y, delta)
    }
    fn on_script_event(&mut self, sender: &str, name: &str, payload: &str) -> CallbackResult {
        (**self).on_script_event(sender, name, payload)
    }
    fn on_gui_event(&mut self, control: &str, value_name: &str, value: &str) -> CallbackResult {
        (**self).on_gui_event(control, value_name, value)
    }
}

/// Which event callbacks a controller provides, detected once at load.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallbackTable(u16);

impl CallbackTable {
    pub const NONE: CallbackTable = CallbackTable(0);

    pub fn detect<C: ControllerCallbacks + ?Sized>(callbacks: &C) -> Self {
        EventKind::ALL
            .into_iter()
            .filter(|&k| callbacks.implements(k))
            .fold(Self::NONE, |t, k| t.with(k))
    }

    #[inline]
    pub const fn with(self, kind: EventKind) -> Self {
        CallbackTable(self.0 | 1 << kind.index())
    }

    #[inline]
    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    pub fn implemented(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |&k| self.contains(k))
    }

    pub fn missing(self) -> impl Iterator<Item = EventKind> {
        EventKind::ALL.into_iter().filter(move |&k| !self.contains(k))
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.implemented()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct KeysOnly;

    impl ControllerCallbacks for KeysOnly {
        fn implements(&self, kind: EventKind) -> bool {
            matches!(kind, EventKind::KeyPressed | EventKind::KeyReleased)
        }
    }

    #[test]
    fn detect_records_implemented_kinds() {
        let table = CallbackTable::detect(&KeysOnly);
        assert!(table.contains(EventKind::KeyPressed));
        assert!(!table.contains(EventKind::Draw));
        assert_eq!(table.implemented().count(), 2);
        assert_eq!(table.missing().count(), 10);
        assert_eq!(format!("{table:?}"), "{KeyPressed, KeyReleased}");
    }

    #[test]
    fn boxed_callbacks_forward() {
        let boxed: Box<dyn ControllerCallbacks> = Box::new(KeysOnly);
        assert_eq!(CallbackTable::detect(&boxed), CallbackTable::detect(&KeysOnly));
    }
}
