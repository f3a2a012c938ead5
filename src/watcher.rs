use futures_lite::{StreamExt, stream::Boxed};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    driver::{ManagerEvent, QuickKeysDevice},
    host::{DetectionEvent, DiscoveredSurface},
    mappings::{PRODUCT_NAME, surface_id_for},
};

/// Translates a single manager event into the host's detection event, if any
fn manager_event_to_detection<D: QuickKeysDevice>(
    event: ManagerEvent<D>,
) -> Option<DetectionEvent<D>> {
    match event {
        ManagerEvent::Connected { device_id, handle } => {
            // Ignore devices without an id
            let Some(device_id) = device_id else {
                log::warn!("Ignoring connected device without an id");
                return None;
            };

            log::info!("Found device {}", device_id);

            Some(DetectionEvent::SurfacesAdded(vec![DiscoveredSurface {
                surface_id: surface_id_for(&device_id),
                device_handle: device_id,
                description: PRODUCT_NAME.to_string(),
                plugin_info: handle,
            }]))
        }
        ManagerEvent::Disconnected { device_id } => {
            let device_id = device_id?;

            log::info!("Disconnected device {}", device_id);

            Some(DetectionEvent::SurfacesRemoved(vec![device_id]))
        }
        ManagerEvent::Error(err) => {
            log::error!("Device manager error: {}", err);

            None
        }
    }
}

/// Forwards device manager lifecycle events to the host as detection events
/// until `token` is cancelled, the stream ends or the host drops its receiver
pub async fn watcher_task<D: QuickKeysDevice>(
    mut watcher_stream: Boxed<ManagerEvent<D>>,
    outbound: mpsc::Sender<DetectionEvent<D>>,
    token: CancellationToken,
) {
    log::info!("Watcher is ready");

    loop {
        let ev = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            v = watcher_stream.next() => v,
        };

        let Some(ev) = ev else {
            log::info!("Watcher is shutting down");
            break;
        };

        let Some(detection) = manager_event_to_detection(ev) else {
            continue;
        };

        if outbound.send(detection).await.is_err() {
            log::info!("Host stopped listening for detection events, watcher is shutting down");
            break;
        }
    }
}
