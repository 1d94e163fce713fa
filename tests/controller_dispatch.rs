use std::rc::Rc;

use topo_propagate::controller::{CallbackResult, MouseButton};
use topo_propagate::prelude::*;

#[derive(Default)]
struct Recorder {
    log: Vec<String>,
    fail_gui: bool,
}

impl ControllerCallbacks for Recorder {
    fn implements(&self, kind: EventKind) -> bool {
        !matches!(kind, EventKind::Draw | EventKind::MouseWheel)
    }

    fn init_graph(&mut self) -> CallbackResult {
        self.log.push("initGraph".into());
        Ok(())
    }

    fn cleanup(&mut self) -> CallbackResult {
        self.log.push("cleanup".into());
        Ok(())
    }

    fn on_end_animation_step(&mut self, dt: f64) -> CallbackResult {
        self.log.push(format!("end {dt}"));
        Ok(())
    }

    fn on_key_released(&mut self, key: char) -> CallbackResult<bool> {
        self.log.push(format!("release {key}"));
        Ok(true)
    }

    fn on_mouse_button(&mut self, button: MouseButton, x: i32, y: i32, pressed: bool) -> CallbackResult {
        self.log.push(format!("{button:?} {x} {y} {pressed}"));
        Ok(())
    }

    fn on_script_event(&mut self, sender: &str, name: &str, payload: &str) -> CallbackResult {
        self.log.push(format!("{sender}/{name}/{payload}"));
        Ok(())
    }

    fn on_gui_event(&mut self, control: &str, _: &str, value: &str) -> CallbackResult {
        if self.fail_gui {
            return Err(TopoError::CallbackFailed {
                callback: "onGUIEvent",
                message: format!("cannot parse `{value}` for {control}"),
            });
        }
        Ok(())
    }
}

#[test]
fn events_reach_typed_callbacks_in_order() {
    let mut ctl = ScriptedController::new("scene", Recorder::default());
    ctl.load();
    assert!(ctl.lifecycle(Lifecycle::InitGraph));

    ctl.handle(&ControllerEvent::EndAnimationStep { dt: 0.5 });
    ctl.handle(&ControllerEvent::MouseButton {
        button: MouseButton::Right,
        x: 4,
        y: 5,
        pressed: false,
    });
    ctl.handle(&ControllerEvent::Script {
        sender: "node".into(),
        name: "ping".into(),
        payload: "{}".into(),
    });
    assert!(ctl.handle(&ControllerEvent::KeyReleased('x')).handled());
    assert_eq!(ctl.handle(&ControllerEvent::Draw), Dispatch::Skipped);
    assert!(ctl.lifecycle(Lifecycle::Cleanup));

    assert_eq!(
        ctl.callbacks().log,
        vec![
            "initGraph",
            "end 0.5",
            "Right 4 5 false",
            "node/ping/{}",
            "release x",
            "cleanup"
        ]
    );
}

#[test]
fn failing_callback_keeps_controller_running() {
    let sink = Rc::new(RecordingSink::new());
    let mut ctl = ScriptedController::new(
        "scene",
        Recorder {
            fail_gui: true,
            ..Default::default()
        },
    )
    .with_sink(sink.clone());
    ctl.load();

    let gui = ControllerEvent::Gui {
        control: "slider".into(),
        value_name: "stiffness".into(),
        value: "abc".into(),
    };
    assert_eq!(ctl.handle(&gui), Dispatch::Failed);
    assert_eq!(
        ctl.handle(&ControllerEvent::EndAnimationStep { dt: 1.0 }),
        Dispatch::Called { handled: false }
    );

    let errors = sink.entries();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].origin, "scene");
    assert!(errors[0].message.contains("slider"));
}

#[test]
fn table_is_detected_at_load_only() {
    let mut ctl = ScriptedController::new("scene", Recorder::default());
    assert_eq!(ctl.table(), topo_propagate::controller::CallbackTable::NONE);
    ctl.load();
    assert!(!ctl.table().contains(EventKind::MouseWheel));
    assert!(ctl.table().contains(EventKind::GuiEvent));
    assert_eq!(ctl.table().implemented().count(), 10);
}
