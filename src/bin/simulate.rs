/// Runs the plugin against a simulated Quick Keys and logs what the device and the host see
/// Run with: cargo run --bin simulate [config.toml]
use std::time::Duration;

use quickkeys_surface::{
    OpenSurfaceResult, QuickKeysPlugin, SurfaceConfig,
    driver::WheelDirection,
    host::{DetectionEvent, DrawProps},
    mock::{MockManager, RecordingContext},
};
use tokio_util::sync::CancellationToken;

const DEVICE_ID: &str = "QK-SIM-0001";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stdout,
        simplelog::ColorChoice::Never,
    )?;

    let config = match std::env::args().nth(1) {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::default(),
    };
    log::info!("Using {:?}", config);

    let (manager, manager_handle) = MockManager::new();
    let plugin = QuickKeysPlugin::new(manager, config);
    plugin.init().await?;

    let mut detection = plugin.detection();

    let device = manager_handle.connect(Some(DEVICE_ID));
    plugin.trigger_scan().await?;

    let Some(DetectionEvent::SurfacesAdded(surfaces)) = detection.recv().await else {
        return Err("simulated device was not detected".into());
    };

    let context = RecordingContext::new();
    let mut opened = Vec::new();

    for discovered in surfaces {
        let OpenSurfaceResult {
            mut surface,
            register_props,
        } = plugin.open_surface(discovered.surface_id, discovered.plugin_info, context.clone());

        log::info!(
            "Registering {} ({}) with {} controls",
            surface.surface_id(),
            surface.product_name(),
            register_props.surface_layout.controls.len()
        );

        surface.init().await?;
        surface.ready().await?;

        opened.push(surface);
    }

    let token = CancellationToken::new();

    for surface in opened.iter_mut() {
        surface.set_brightness(60).await?;
        surface
            .draw(&token, &DrawProps::new("0/1").with_text("Copy"))
            .await?;
        surface
            .draw(&token, &DrawProps::new("0/2").with_text("Paste everywhere"))
            .await?;
        surface
            .draw(&token, &DrawProps::new("wheel").with_color("#00ff88"))
            .await?;
    }

    device.press(0);
    device.release(0);
    device.rotate(WheelDirection::Left);
    device.rotate(WheelDirection::Right);
    device.press(8);
    device.release(8);

    for surface in opened.iter_mut() {
        surface.show_status("Simulating").await?;
    }

    // Long enough for two refreshes
    tokio::time::sleep(Duration::from_millis(6500)).await;

    for surface in opened.iter_mut() {
        surface.clear_status(Some("Bye")).await?;
        surface.close().await?;
    }

    manager_handle.disconnect(Some(DEVICE_ID));
    if let Some(DetectionEvent::SurfacesRemoved(handles)) = detection.recv().await {
        log::info!("Host removed {:?}", handles);
    }

    log::info!("Host received {} notifications", context.notifications().len());
    log::info!("Device received {} commands", device.commands().len());

    plugin.destroy().await?;

    log::info!("Simulation finished");

    Ok(())
}
