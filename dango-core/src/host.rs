//! The terminal host interface
//!
//! Everything the screen needs from its embedder, collapsed into one
//! capability trait. Every method has a no-op default, so a host implements
//! only what it cares about; [`NullHost`] implements nothing and is the
//! default for tests and headless use.
//!
//! Callbacks are invoked synchronously from within `Screen::write`, on the
//! calling thread, in the order their triggering commands appear in the
//! input. A callback must not reenter the screen.

use crate::buffer::BufferKind;
use crate::command::{Command, DynamicColorName, ResizeUnit};
use crate::color::Rgb;
use crate::cursor::{CursorDisplay, CursorShape};
use crate::modes::{MouseProtocol, MouseTransport, MouseWheelMode};

pub trait Host {
    /// Bytes to send back to the application (DSR, DA, color queries, ...).
    fn reply(&mut self, _data: &str) {}

    /// BEL.
    fn bell(&mut self) {}

    /// The window title changed (OSC 0/2 or a title-stack restore).
    fn set_window_title(&mut self, _title: &str) {}

    /// XTWINOPS resize request.
    fn resize_window(&mut self, _width: u16, _height: u16, _unit: ResizeUnit) {}

    /// DECCKM changed.
    fn set_application_cursor_keys(&mut self, _enable: bool) {}

    /// DECKPAM/DECKPNM.
    fn set_application_keypad(&mut self, _enable: bool) {}

    /// Bracketed paste mode changed.
    fn set_bracketed_paste(&mut self, _enable: bool) {}

    /// A mouse reporting protocol was switched on or off.
    fn set_mouse_protocol(&mut self, _protocol: MouseProtocol, _enable: bool) {}

    /// The mouse coordinate encoding changed.
    fn set_mouse_transport(&mut self, _transport: MouseTransport) {}

    /// Alternate-scroll wheel behavior changed.
    fn set_mouse_wheel_mode(&mut self, _mode: MouseWheelMode) {}

    /// DECSCUSR.
    fn set_cursor_style(&mut self, _display: CursorDisplay, _shape: CursorShape) {}

    /// Focus-event reporting changed.
    fn set_focus_events(&mut self, _enable: bool) {}

    /// OSC 10/11/12... query; return the current color to produce a reply.
    fn request_dynamic_color(&mut self, _name: DynamicColorName) -> Option<Rgb> {
        None
    }

    /// OSC 10/11/12... assignment.
    fn set_dynamic_color(&mut self, _name: DynamicColorName, _color: Rgb) {}

    /// OSC 110/111/112...
    fn reset_dynamic_color(&mut self, _name: DynamicColorName) {}

    /// OSC 4 palette assignment.
    fn set_color_palette(&mut self, _index: u8, _color: Rgb) {}

    /// OSC 4 palette query; return the current color to produce a reply.
    fn request_color_palette(&mut self, _index: u8) -> Option<Rgb> {
        None
    }

    /// OSC 104.
    fn reset_color_palette(&mut self, _index: Option<u8>) {}

    /// OSC 777 desktop notification.
    fn notify(&mut self, _title: &str, _content: &str) {}

    /// The active buffer switched between primary and alternate.
    fn buffer_changed(&mut self, _kind: BufferKind) {}

    /// Observation hook: the command batch produced by one `write` call,
    /// before it is applied.
    fn commands(&mut self, _commands: &[Command]) {}
}

/// A host that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl Host for NullHost {}
