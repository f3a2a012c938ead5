use std::time::Duration;

use quickkeys_surface::{
    QuickKeysPlugin, SurfaceConfig,
    error::DeviceError,
    host::{DetectionEvent, DrawProps, HostCapabilities},
    mock::{DeviceCommand, HostNotification, MockManager, RecordingContext},
    plugin::register_props,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

async fn next_event<D>(
    events: &mut tokio::sync::mpsc::Receiver<DetectionEvent<D>>,
) -> Option<DetectionEvent<D>> {
    tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test(start_paused = true)]
async fn connected_devices_are_reported() {
    let (manager, handle) = MockManager::new();
    let plugin = QuickKeysPlugin::new(manager, SurfaceConfig::default());
    let mut events = plugin.detection();

    handle.connect(Some("ABC123"));

    let Some(DetectionEvent::SurfacesAdded(surfaces)) = next_event(&mut events).await else {
        panic!("expected surfaces to be added");
    };

    assert_eq!(surfaces.len(), 1);
    assert_eq!(surfaces[0].device_handle, "ABC123");
    assert_eq!(surfaces[0].surface_id, "quickkeys:ABC123");
    assert_eq!(surfaces[0].description, "Xencelabs Quick Keys");

    plugin.reject_surface(&surfaces[0]);
}

#[tokio::test(start_paused = true)]
async fn devices_without_id_are_ignored() {
    let (manager, handle) = MockManager::new();
    let plugin = QuickKeysPlugin::new(manager, SurfaceConfig::default());
    let mut events = plugin.detection();

    handle.connect(None);
    handle.disconnect(None);
    handle.fail(DeviceError::Transport("usb reset".to_string()));
    handle.disconnect(Some("ABC123"));

    let Some(DetectionEvent::SurfacesRemoved(removed)) = next_event(&mut events).await else {
        panic!("expected only the removal to come through");
    };

    assert_eq!(removed, vec!["ABC123".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn destroy_stops_detection_and_closes_devices() {
    let (manager, handle) = MockManager::new();
    let plugin = QuickKeysPlugin::new(manager, SurfaceConfig::default());
    plugin.init().await.unwrap();
    let mut events = plugin.detection();

    plugin.trigger_scan().await.unwrap();
    plugin.destroy().await.unwrap();

    assert_eq!(handle.calls(), vec!["scan_devices", "close_all"]);

    handle.connect(Some("LATE"));
    assert!(next_event(&mut events).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn opened_surface_works_end_to_end() {
    let (manager, handle) = MockManager::new();
    let plugin = QuickKeysPlugin::new(manager, SurfaceConfig::default());
    let mut events = plugin.detection();

    let device = handle.connect(Some("ABC123"));
    let Some(DetectionEvent::SurfacesAdded(mut surfaces)) = next_event(&mut events).await else {
        panic!("expected surfaces to be added");
    };
    let discovered = surfaces.remove(0);

    let context = RecordingContext::new();
    let mut opened = plugin.open_surface(
        discovered.surface_id,
        discovered.plugin_info,
        context.clone(),
    );
    let surface = &mut opened.surface;

    assert_eq!(surface.surface_id(), "quickkeys:ABC123");
    assert_eq!(surface.product_name(), "Xencelabs Quick Keys");

    surface.init().await.unwrap();
    surface.ready().await.unwrap();
    surface.update_capabilities(&HostCapabilities::default());
    device.take_commands();

    surface
        .draw(&CancellationToken::new(), &DrawProps::new("1/2").with_text("Undo"))
        .await
        .unwrap();
    assert_eq!(
        device.take_commands(),
        vec![DeviceCommand::SetKeyText(5, "Undo".to_string())]
    );

    device.press(5);
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(
        context.notifications(),
        vec![HostNotification::KeyDown("1/2".to_string())]
    );

    surface.show_status("Waiting").await.unwrap();
    device.take_commands();

    // Destroying the plugin stops the surface's tasks too
    plugin.destroy().await.unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(device.commands().is_empty());
    assert!(!device.press(0));
}

#[test]
fn register_props_shape() {
    let props = serde_json::to_value(register_props()).unwrap();

    assert_eq!(props["brightness"], json!(true));
    assert_eq!(props["pincodeMap"], json!(null));
    assert_eq!(props["configFields"], json!([]));
    assert_eq!(props["location"], json!(null));

    let layout = &props["surfaceLayout"];
    assert_eq!(
        layout["stylePresets"],
        json!({
            "default": { "text": true },
            "wheel": { "colors": "hex" },
            "empty": {},
        })
    );
    assert_eq!(
        layout["controls"]["menu"],
        json!({ "row": 0, "column": 0, "stylePreset": "empty" })
    );
    assert_eq!(
        layout["controls"]["wheel"],
        json!({ "row": 0, "column": 5, "stylePreset": "wheel" })
    );
    assert_eq!(layout["controls"]["0/1"], json!({ "row": 0, "column": 1 }));
    assert_eq!(layout["controls"]["1/4"], json!({ "row": 1, "column": 4 }));
    assert_eq!(layout["controls"].as_object().unwrap().len(), 10);
}
