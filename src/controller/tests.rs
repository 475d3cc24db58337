use super::*;
use crate::config::LibrarySource;
use crate::options::{DialogOptions, Hooks, Sound, Waveform, WindowSize};
use crate::protocol::{Envelope, HostCommand, HostSignal};
use crate::window::{HeadlessBackend, HeadlessWindow, NativeWindow};
use serde_json::{json, Value};
use std::time::Duration;

fn test_config() -> AlertConfig {
    AlertConfig {
        library: LibrarySource::Inline("var Swal = {};".to_string()),
        app_name: "Tests".to_string(),
        ..AlertConfig::default()
    }
}

fn setup(platform: Platform) -> (Arc<HeadlessBackend>, Arc<AlertRuntime>) {
    setup_with(platform, test_config())
}

fn setup_with(platform: Platform, config: AlertConfig) -> (Arc<HeadlessBackend>, Arc<AlertRuntime>) {
    let backend = Arc::new(HeadlessBackend::new(platform));
    let runtime = AlertRuntime::new(backend.clone(), config).unwrap();
    (backend, runtime)
}

/// Let the lifecycle task catch up
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn newest(backend: &HeadlessBackend) -> Arc<HeadlessWindow> {
    backend.last_window().expect("a dialog window")
}

#[derive(Clone, Default)]
struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn push(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

impl crate::options::LifecycleObserver for Recorder {
    fn on_before_open(&self, _payload: &Value) {
        self.push("before_open");
    }

    fn on_open(&self, _payload: &Value) {
        self.push("open");
    }

    fn on_close(&self, payload: &Value) {
        self.push(format!("close {}", payload));
    }

    fn on_after_close(&self) {
        self.push("after_close");
    }
}

#[tokio::test]
async fn test_fire_resolves_once_after_teardown() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller.fire(DialogOptions::new().title("Saved")).unwrap();
    let window = newest(&backend);
    assert_eq!(controller.instance().as_ref(), Some(pending.instance()));
    assert!(window.menu_removed());
    let page = window.page_path().unwrap();
    assert!(page.exists());

    settle().await;
    assert!(window.is_shown());

    window.run_dialog(DialogResult::confirmed(json!(true)));
    let result = pending.await;

    assert_eq!(result, DialogResult::confirmed(json!(true)));
    assert!(window.is_destroyed());
    assert!(!page.exists());
    assert!(controller.instance().is_none());
    assert!(!controller.is_visible());
    assert!(!backend.router().is_subscribed(window.instance()));
}

#[tokio::test]
async fn test_observers_run_in_order_before_result() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();
    let recorder = Recorder::default();

    let pending = controller
        .fire(DialogOptions::new().observe(recorder.clone()))
        .unwrap();
    let window = newest(&backend);

    let host = window.host();
    host.before_open(json!({}));
    host.open(json!({}));
    settle().await;
    assert!(controller.is_visible());

    host.settle(DialogResult::dismissed(DismissReason::Cancel));
    host.close(json!({"reason": "cancel"}));
    host.after_close();
    let result = pending.await;

    assert_eq!(result.dismiss, Some(DismissReason::Cancel));
    assert_eq!(
        recorder.entries(),
        vec![
            "before_open".to_string(),
            "open".to_string(),
            r#"close {"reason":"cancel"}"#.to_string(),
            "after_close".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_open_without_before_open_notifies_both() {
    let (backend, runtime) = setup(Platform::Linux);
    let recorder = Recorder::default();
    let pending = runtime
        .controller()
        .fire(DialogOptions::new().observe(recorder.clone()))
        .unwrap();
    let window = newest(&backend);

    backend
        .router()
        .route(Envelope::new(window.instance().clone(), HostSignal::Open(json!({}))));
    window.destroy();
    pending.await;

    assert_eq!(
        recorder.entries(),
        vec![
            "before_open".to_string(),
            "open".to_string(),
            "close {}".to_string(),
            "after_close".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_external_destroy_resolves_close() {
    let (backend, runtime) = setup(Platform::Linux);
    let recorder = Recorder::default();
    let controller = runtime.controller();
    let pending = controller
        .fire(DialogOptions::new().observe(recorder.clone()))
        .unwrap();

    settle().await;
    newest(&backend).destroy();
    let result = pending.await;

    assert_eq!(result, DialogResult::dismissed(DismissReason::Close));
    assert_eq!(
        recorder.entries(),
        vec!["close {}".to_string(), "after_close".to_string()]
    );
    assert!(controller.instance().is_none());
}

#[tokio::test]
async fn test_native_close_notifies_close_once() {
    let (backend, runtime) = setup(Platform::Linux);
    let recorder = Recorder::default();
    let pending = runtime
        .controller()
        .fire(DialogOptions::new().observe(recorder.clone()))
        .unwrap();
    let window = newest(&backend);

    let host = window.host();
    host.before_open(json!({}));
    host.open(json!({}));
    settle().await;

    window.request_close();
    // A late page report must not notify again
    host.close(json!({"late": true}));
    let result = pending.await;

    assert_eq!(result.dismiss, Some(DismissReason::Close));
    let closes = recorder
        .entries()
        .into_iter()
        .filter(|entry| entry.starts_with("close"))
        .count();
    assert_eq!(closes, 1);
}

#[tokio::test]
async fn test_first_result_wins() {
    let (backend, runtime) = setup(Platform::Linux);
    let pending = runtime.controller().fire(DialogOptions::new()).unwrap();
    let window = newest(&backend);
    let instance = window.instance().clone();

    backend.router().route(Envelope::new(
        instance.clone(),
        HostSignal::ReturnPromise(DialogResult::confirmed(json!("first"))),
    ));
    backend.router().route(Envelope::new(
        instance,
        HostSignal::ReturnPromise(DialogResult::confirmed(json!("second"))),
    ));
    window.destroy();

    assert_eq!(pending.await, DialogResult::confirmed(json!("first")));
}

#[tokio::test]
async fn test_settled_window_destroyed_after_grace() {
    let config = AlertConfig {
        teardown_grace_ms: 10,
        ..test_config()
    };
    let (backend, runtime) = setup_with(Platform::Linux, config);
    let pending = runtime.controller().fire(DialogOptions::new()).unwrap();
    let window = newest(&backend);

    backend.router().route(Envelope::new(
        window.instance().clone(),
        HostSignal::ReturnPromise(DialogResult::dismissed(DismissReason::Timer)),
    ));

    let result = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .expect("grace period elapsed");
    assert_eq!(result.dismiss, Some(DismissReason::Timer));
    assert!(window.is_destroyed());
}

#[tokio::test]
async fn test_singleton_collision_shows_existing() {
    let (backend, runtime) = setup(Platform::Linux);
    let first = runtime.controller();
    let second = runtime.controller();

    let pending = first.fire(DialogOptions::new().singleton("update")).unwrap();
    let window = newest(&backend);

    let duplicate = second.fire(DialogOptions::new().singleton("update")).unwrap();
    assert_eq!(duplicate.await, DialogResult::dismissed(DismissReason::Showing));
    assert_eq!(backend.windows().len(), 1);
    assert_eq!(window.show_count(), 1);
    assert!(second.instance().is_none());

    window.run_dialog(DialogResult::confirmed(json!(1)));
    pending.await;
    assert!(runtime.registry().is_empty());

    let again = second.fire(DialogOptions::new().singleton("update")).unwrap();
    assert_eq!(backend.windows().len(), 1);
    assert_ne!(newest(&backend).instance(), window.instance());
    newest(&backend).destroy();
    assert_eq!(again.await.dismiss, Some(DismissReason::Close));
}

#[tokio::test]
async fn test_creation_failure_releases_singleton() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();
    backend.fail_next_creation("no display");

    let err = controller
        .fire(DialogOptions::new().singleton("once"))
        .err()
        .unwrap();
    assert!(matches!(err, AlertError::WindowCreation(_)));
    assert!(runtime.registry().is_empty());
    assert!(controller.instance().is_none());

    let pending = controller.fire(DialogOptions::new().singleton("once")).unwrap();
    newest(&backend).destroy();
    pending.await;
}

#[tokio::test]
async fn test_second_fire_on_busy_controller() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller.fire(DialogOptions::new()).unwrap();
    assert!(matches!(
        controller.fire(DialogOptions::new()),
        Err(AlertError::InstanceBusy(_))
    ));

    newest(&backend).destroy();
    pending.await;
    assert_eq!(backend.windows().len(), 1);
}

#[tokio::test]
async fn test_destroy_clears_state_immediately() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller.fire(DialogOptions::new().singleton("K")).unwrap();
    let window = newest(&backend);
    let host = window.host();
    host.before_open(json!({}));
    host.open(json!({}));
    settle().await;
    assert!(controller.is_visible());

    window.destroy();
    // No yield: the lifecycle task has not torn down yet
    assert!(!controller.is_visible());
    assert!(controller.instance().is_none());

    let refired = controller.fire(DialogOptions::new().singleton("K")).unwrap();
    assert_ne!(refired.instance(), pending.instance());
    assert_eq!(runtime.registry().holder("K").as_ref(), Some(refired.instance()));
    let replacement = newest(&backend);
    assert_ne!(replacement.instance(), window.instance());

    assert_eq!(pending.await.dismiss, Some(DismissReason::Close));
    settle().await;
    // The old teardown leaves the new instance alone
    assert_eq!(controller.instance().as_ref(), Some(refired.instance()));
    assert_eq!(runtime.registry().holder("K").as_ref(), Some(refired.instance()));

    replacement.destroy();
    assert_eq!(refired.await.dismiss, Some(DismissReason::Close));
}

#[tokio::test]
async fn test_destroyed_singleton_holder_not_refocused() {
    let (backend, runtime) = setup(Platform::Linux);
    let first = runtime.controller();
    let second = runtime.controller();

    let pending = first.fire(DialogOptions::new().singleton("K")).unwrap();
    let window = newest(&backend);
    settle().await;
    let shows = window.show_count();

    window.destroy();
    let fresh = second.fire(DialogOptions::new().singleton("K")).unwrap();
    assert_eq!(window.show_count(), shows);
    assert_eq!(second.instance().as_ref(), Some(fresh.instance()));
    assert_ne!(newest(&backend).instance(), window.instance());

    pending.await;
    newest(&backend).destroy();
    assert_eq!(fresh.await.dismiss, Some(DismissReason::Close));
}

#[tokio::test]
async fn test_same_controller_singleton_shows_existing() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller.fire(DialogOptions::new().singleton("S")).unwrap();
    let window = newest(&backend);

    let duplicate = controller.fire(DialogOptions::new().singleton("S")).unwrap();
    assert_eq!(duplicate.await, DialogResult::dismissed(DismissReason::Showing));
    assert_eq!(backend.windows().len(), 1);
    assert!(window.show_count() >= 1);
    assert_eq!(controller.instance().as_ref(), Some(pending.instance()));
    assert_eq!(runtime.registry().holder("S").as_ref(), Some(pending.instance()));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_busy_controller_releases_new_singleton() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller.fire(DialogOptions::new()).unwrap();
    assert!(matches!(
        controller.fire(DialogOptions::new().singleton("other")),
        Err(AlertError::InstanceBusy(_))
    ));
    assert!(runtime.registry().is_empty());

    newest(&backend).destroy();
    pending.await;
}

#[test]
fn test_fire_outside_runtime() {
    let backend = Arc::new(HeadlessBackend::default());
    let runtime = AlertRuntime::new(backend.clone(), test_config()).unwrap();

    let result = runtime.controller().fire(DialogOptions::new());
    assert!(matches!(result, Err(AlertError::Runtime(_))));
    assert!(backend.windows().is_empty());
}

#[tokio::test]
async fn test_window_options_resolved() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new())
        .window(WindowOverrides {
            resizable: Some(true),
            ..WindowOverrides::default()
        })
        .size(WindowSize {
            width: Some(420),
            height: None,
        })
        .always_on_top(true);

    let pending = runtime.controller().fire(options).unwrap();
    let window = newest(&backend);
    let resolved = window.options();

    assert_eq!((resolved.width, resolved.height), (420, 600));
    assert!(resolved.resizable);
    assert!(!resolved.show);
    assert!(resolved.skip_taskbar);
    assert!(resolved.privileged_scripting);
    assert!(resolved.always_on_top);
    assert!(!resolved.modal);

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_frameless_forces_backdrop() {
    let (backend, runtime) = setup(Platform::Linux);
    let dialog = DialogOptions::new()
        .set(KEY_BACKDROP, "red")
        .set(KEY_ALLOW_OUTSIDE_CLICK, true);

    let pending = runtime.controller().fire_frameless(dialog).unwrap();
    let window = newest(&backend);

    let config = window.page_config().unwrap();
    assert_eq!(config[KEY_BACKDROP], json!(FRAMELESS_BACKDROP));
    assert_eq!(config[KEY_ALLOW_OUTSIDE_CLICK], json!(false));

    let resolved = window.options();
    assert!(!resolved.frame);
    assert!(resolved.transparent);
    assert!(!resolved.closable);
    assert!(!resolved.has_shadow);
    assert_eq!(resolved.background_color.as_deref(), Some("#00000000"));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_framed_dialog_defaults() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new().set(KEY_ANIMATION, true)).draggable(true);

    let pending = runtime.controller().fire_with_frame(options).unwrap();
    let window = newest(&backend);

    let resolved = window.options();
    assert!(resolved.frame);
    assert!(resolved.closable);
    assert_eq!(resolved.title.as_deref(), Some("Tests"));

    let config = window.page_config().unwrap();
    assert_eq!(config[KEY_ANIMATION], json!(false));
    assert_eq!(config[KEY_ALLOW_OUTSIDE_CLICK], json!(false));
    assert_eq!(config["customClass"]["popup"], json!("border-radius-0"));
    // Framed windows are never dragged by their body
    assert!(config["customClass"].get("confirmButton").is_none());

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_draggable_page() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new()).draggable(true);

    let pending = runtime.controller().fire_frameless(options).unwrap();
    let window = newest(&backend);

    let config = window.page_config().unwrap();
    for part in ["closeButton", "confirmButton", "cancelButton", "input"] {
        assert_eq!(config["customClass"][part], json!("no-drag"));
    }
    let html = std::fs::read_to_string(window.page_path().unwrap()).unwrap();
    assert!(html.contains("-webkit-app-region:drag"));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_toast_attaches_to_focused_window() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new().title("Copied"))
        .window(WindowOverrides {
            frame: Some(true),
            ..WindowOverrides::default()
        })
        .always_on_top(true);

    let pending = DialogController::fire_toast(&runtime, options).unwrap();
    let window = newest(&backend);

    let resolved = window.options();
    assert_eq!(resolved.parent, Some(ParentWindow::Focused));
    assert!(resolved.modal);
    assert!(!resolved.always_on_top);
    assert!(!resolved.frame);
    assert_eq!(window.page_config().unwrap()[KEY_TOAST], json!(true));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_position_maps_to_anchor() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    let pending = controller
        .fire(DialogOptions::new().position("top-start"))
        .unwrap();
    let window = newest(&backend);
    assert_eq!(controller.position(), Anchor::TopLeft);
    assert!(window.page_config().unwrap().get("position").is_none());
    assert_eq!(window.anchors().first(), Some(&Anchor::TopLeft));
    assert_eq!(window.origin(), Some((0, 0)));

    // Page asks for a reposition once it has measured itself
    window.host().open(json!({}));
    settle().await;
    assert!(window.anchors().len() >= 2);
    assert!(window.anchors().iter().all(|anchor| *anchor == Anchor::TopLeft));

    window.destroy();
    pending.await;

    let pending = controller.fire(DialogOptions::new().position("sideways")).unwrap();
    assert_eq!(controller.position(), Anchor::Center);
    newest(&backend).destroy();
    pending.await;
}

#[tokio::test]
async fn test_mac_modal_left_to_window_manager() {
    let (backend, runtime) = setup(Platform::MacOs);
    let options = StructuredOptions::new(DialogOptions::new().position("bottom-end"))
        .parent(ParentWindow::Handle(7));

    let pending = runtime.controller().fire(options).unwrap();
    let window = newest(&backend);
    settle().await;

    assert!(window.anchors().is_empty());
    assert!(window.is_shown());

    window.focus();
    settle().await;
    assert_eq!(backend.registered_shortcuts().len(), 2);

    window.blur();
    settle().await;
    assert!(backend.registered_shortcuts().is_empty());

    window.focus();
    settle().await;
    window.request_close();
    pending.await;
    assert!(backend.registered_shortcuts().is_empty());
}

#[tokio::test]
async fn test_shortcuts_untouched_off_mac() {
    let (backend, runtime) = setup(Platform::Windows);
    let pending = runtime.controller().fire(DialogOptions::new()).unwrap();
    let window = newest(&backend);

    window.focus();
    settle().await;
    assert!(backend.registered_shortcuts().is_empty());
    // Windows and Linux still pin modal dialogs
    assert_eq!(window.anchors(), vec![Anchor::Center, Anchor::Center]);

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_open_sound_reaches_page() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new())
        .sound(Sound::note(Waveform::Triangle, "A4", 0.2));

    let pending = runtime.controller().fire(options).unwrap();
    let window = newest(&backend);

    window.run_dialog(DialogResult::confirmed(json!(true)));
    pending.await;

    let played = window.audio().played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].waveform, Waveform::Triangle);
    assert!((played[0].frequency - 440.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_invalid_sound_is_dropped() {
    let (backend, runtime) = setup(Platform::Linux);
    let options = StructuredOptions::new(DialogOptions::new())
        .sound(Sound::note(Waveform::Sine, "H9", 0.2));

    let pending = runtime.controller().fire(options).unwrap();
    let window = newest(&backend);

    window.run_dialog(DialogResult::confirmed(json!(true)));
    assert_eq!(pending.await, DialogResult::confirmed(json!(true)));
    assert!(window.audio().played().is_empty());
}

#[tokio::test]
async fn test_remote_calls_without_window() {
    let (_backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();

    assert_eq!(controller.exec_js("1 + 1").await.unwrap(), Value::Null);
    assert_eq!(controller.get_timer_left().await.unwrap(), None);
    assert_eq!(controller.is_loading().await.unwrap(), None);
    assert!(controller.enable_buttons().await.is_ok());
    assert!(!controller.resize_to_fit(None));
}

#[tokio::test]
async fn test_remote_calls_reach_page() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();
    let pending = controller.fire(DialogOptions::new().timer(3000)).unwrap();
    let window = newest(&backend);

    window.on_eval(|script| match script {
        "Swal.getTimerLeft()" => Ok(json!(1500)),
        "Swal.isTimerRunning()" => Ok(json!(true)),
        "Swal.increaseTimer(500)" => Ok(json!(2000)),
        _ => Ok(Value::Null),
    });

    assert_eq!(controller.get_timer_left().await.unwrap(), Some(1500));
    assert_eq!(controller.is_timer_running().await.unwrap(), Some(true));
    assert_eq!(controller.increase_timer(500).await.unwrap(), Some(2000));

    controller.show_validation_message("Name can't be \"empty\"").await.unwrap();
    assert!(window
        .scripts()
        .contains(&r#"Swal.showValidationMessage("Name can't be \"empty\"")"#.to_string()));
    assert_eq!(
        window.commands().last(),
        Some(&HostCommand::ResizeToFit { delay_ms: Some(25) })
    );

    window.destroy();
    pending.await;

    // Destroyed windows answer nothing
    assert_eq!(controller.exec_js("Swal.getTimerLeft()").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_evaluation_failure_propagates() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();
    let pending = controller.fire(DialogOptions::new()).unwrap();
    let window = newest(&backend);

    window.on_eval(|_| Err("Swal is not defined".to_string()));
    assert!(matches!(
        controller.click_confirm().await,
        Err(AlertError::Evaluation(_))
    ));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_loading_commands_gated_by_stage() {
    let (backend, runtime) = setup(Platform::Linux);
    let controller = runtime.controller();
    let pending = controller.fire(DialogOptions::new()).unwrap();
    let window = newest(&backend);

    let host = window.host();
    host.before_open(json!({}));
    host.open(json!({}));
    assert!(controller.send_command(HostCommand::ShowLoading));
    assert!(window.surface().is_loading());
    assert!(controller.send_command(HostCommand::HideLoading));
    assert!(!window.surface().is_loading());

    window.run_dialog(DialogResult::confirmed(json!(true)));
    pending.await;
    assert!(!controller.send_command(HostCommand::ShowLoading));
}

#[tokio::test]
async fn test_uncaught_exception_dialog() {
    let (backend, runtime) = setup(Platform::Linux);
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();

    let handler = runtime.uncaught_exception(
        false,
        Some(Box::new(move |report: ErrorReport| {
            sink.lock().unwrap().push(report.message);
        })),
        Some(true),
    );
    let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    let pending = handler.handle(&error).unwrap();
    let window = newest(&backend);

    let config = window.page_config().unwrap();
    assert_eq!(config["type"], json!("error"));
    assert!(config["html"].as_str().unwrap().contains("disk full"));
    assert_eq!(window.options().title.as_deref(), Some("Error"));
    assert!(window.options().always_on_top);
    assert!(reported.lock().unwrap().is_empty());

    window.run_dialog(DialogResult::dismissed(DismissReason::Close));
    pending.await;
    assert_eq!(*reported.lock().unwrap(), vec!["disk full".to_string()]);
}

#[tokio::test]
async fn test_uncaught_exception_hides_trace() {
    let (backend, runtime) = setup(Platform::Linux);
    let handler = runtime.uncaught_exception(true, None, None);

    let pending = handler
        .handle_report(ErrorReport {
            name: "TypeError".to_string(),
            message: "x is undefined".to_string(),
            trace: vec!["at main".to_string()],
        })
        .unwrap();
    let window = newest(&backend);

    let config = window.page_config().unwrap();
    assert_eq!(config["title"], json!("x is undefined"));
    assert!(config.get("html").is_none());
    assert_eq!(window.options().title.as_deref(), Some("TypeError"));

    window.destroy();
    pending.await;
}

#[tokio::test]
async fn test_hooks_builder_observes() {
    let (backend, runtime) = setup(Platform::Linux);
    let opened = Arc::new(Mutex::new(0));
    let counter = opened.clone();

    let pending = runtime
        .controller()
        .fire(DialogOptions::new().observe(Hooks::new().on_open(move |_| {
            *counter.lock().unwrap() += 1;
        })))
        .unwrap();
    let window = newest(&backend);

    window.run_dialog(DialogResult::confirmed(json!(null)));
    pending.await;
    assert_eq!(*opened.lock().unwrap(), 1);
}
