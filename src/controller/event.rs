//! Events a scripted controller can react to.

use std::fmt;

/// Which mouse button an event refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Kinds of capability-gated events, one per optional callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum EventKind {
    Draw = 0,
    BeginAnimationStep,
    EndAnimationStep,
    KeyPressed,
    KeyReleased,
    MouseMove,
    MouseButtonLeft,
    MouseButtonRight,
    MouseButtonMiddle,
    MouseWheel,
    ScriptEvent,
    GuiEvent,
}

impl EventKind {
    pub const ALL: [EventKind; 12] = [
        EventKind::Draw,
        EventKind::BeginAnimationStep,
        EventKind::EndAnimationStep,
        EventKind::KeyPressed,
        EventKind::KeyReleased,
        EventKind::MouseMove,
        EventKind::MouseButtonLeft,
        EventKind::MouseButtonRight,
        EventKind::MouseButtonMiddle,
        EventKind::MouseWheel,
        EventKind::ScriptEvent,
        EventKind::GuiEvent,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of the script callback handling this kind.
    pub const fn callback_name(self) -> &'static str {
        match self {
            EventKind::Draw => "draw",
            EventKind::BeginAnimationStep => "onBeginAnimationStep",
            EventKind::EndAnimationStep => "onEndAnimationStep",
            EventKind::KeyPressed => "onKeyPressed",
            EventKind::KeyReleased => "onKeyReleased",
            EventKind::MouseMove => "onMouseMove",
            EventKind::MouseButtonLeft => "onMouseButtonLeft",
            EventKind::MouseButtonRight => "onMouseButtonRight",
            EventKind::MouseButtonMiddle => "onMouseButtonMiddle",
            EventKind::MouseWheel => "onMouseWheel",
            EventKind::ScriptEvent => "onScriptEvent",
            EventKind::GuiEvent => "onGUIEvent",
        }
    }

    /// Timer group the dispatch of this kind is accounted under.
    pub const fn timer_group(self) -> &'static str {
        match self {
            EventKind::Draw => "draw",
            EventKind::BeginAnimationStep | EventKind::EndAnimationStep => "AnimationStep",
            _ => "Event",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.callback_name())
    }
}

/// An event delivered to a controller.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ControllerEvent {
    Draw,
    BeginAnimationStep { dt: f64 },
    EndAnimationStep { dt: f64 },
    KeyPressed(char),
    KeyReleased(char),
    MouseMove { x: i32, y: i32 },
    MouseButton {
        button: MouseButton,
        x: i32,
        y: i32,
        pressed: bool,
    },
    MouseWheel { x: i32, y: i32, delta: i32 },
    Script {
        sender: String,
        name: String,
        payload: String,
    },
    Gui {
        control: String,
        value_name: String,
        value: String,
    },
}

impl ControllerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ControllerEvent::Draw => EventKind::Draw,
            ControllerEvent::BeginAnimationStep { .. } => EventKind::BeginAnimationStep,
            ControllerEvent::EndAnimationStep { .. } => EventKind::EndAnimationStep,
            ControllerEvent::KeyPressed(_) => EventKind::KeyPressed,
            ControllerEvent::KeyReleased(_) => EventKind::KeyReleased,
            ControllerEvent::MouseMove { .. } => EventKind::MouseMove,
            ControllerEvent::MouseButton { button, .. } => match button {
                MouseButton::Left => EventKind::MouseButtonLeft,
                MouseButton::Right => EventKind::MouseButtonRight,
                MouseButton::Middle => EventKind::MouseButtonMiddle,
            },
            ControllerEvent::MouseWheel { .. } => EventKind::MouseWheel,
            ControllerEvent::Script { .. } => EventKind::ScriptEvent,
            ControllerEvent::Gui { .. } => EventKind::GuiEvent,
        }
    }
}

/// Calls made on every controller regardless of what it implements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Loaded,
    CreateGraph,
    InitGraph,
    BwdInitGraph,
    StoreResetState,
    Reset,
    Cleanup,
    HeartBeat,
}

impl Lifecycle {
    pub const fn callback_name(self) -> &'static str {
        match self {
            Lifecycle::Loaded => "onLoaded",
            Lifecycle::CreateGraph => "createGraph",
            Lifecycle::InitGraph => "initGraph",
            Lifecycle::BwdInitGraph => "bwdInitGraph",
            Lifecycle::StoreResetState => "storeResetState",
            Lifecycle::Reset => "reset",
            Lifecycle::Cleanup => "cleanup",
            Lifecycle::HeartBeat => "onHeartBeatEvent",
        }
    }
}
