use std::io::BufRead;
use std::thread;
use std::time::Instant;

use catalog::{ApiClient, ServerEndpoints};
use runtime::{EventBus, EventSender, FrameClock};
use streaming::{ReconnectPolicy, run_marker_socket};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::ViewerError;
use crate::commands::{Command, CommandError};
use crate::config::ViewerConfig;
use crate::events::{Request, ViewerEvent};
use crate::viewer::Viewer;

/// Runs the viewer until `quit` or end of input.
///
/// Must be called inside a tokio runtime; a current-thread runtime is
/// enough since every task only awaits I/O.
pub async fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let endpoints = ServerEndpoints::from_base(&config.server)?;
    let api = ApiClient::new(endpoints.clone()).with_source(config.catalog_source());
    let mut bus: EventBus<ViewerEvent> = EventBus::new();
    let mut viewer = Viewer::new(config.viewport());

    info!(
        server = %endpoints.http_base(),
        socket = %endpoints.ws_url(),
        "terrain viewer starting"
    );
    tokio::spawn(run_marker_socket(
        endpoints.ws_url().to_string(),
        ReconnectPolicy::default(),
        bus.sender(),
    ));
    spawn_input_thread(bus.sender())?;

    viewer.command(Command::Maps);
    if let Some(id) = config.map.clone() {
        viewer.select_map(id);
    }

    let mut ticker = tokio::time::interval(config.frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut clock = FrameClock::new(Instant::now());
    let mut last_hud = None;

    while !viewer.quit_requested() {
        ticker.tick().await;
        let frame = clock.tick(Instant::now());

        for event in bus.drain() {
            let print_hud = matches!(event, ViewerEvent::Input(Command::Hud));
            viewer.handle(event);
            if print_hud {
                println!("{}", viewer.hud());
            }
        }
        let sender = bus.sender();
        for request in viewer.take_requests() {
            dispatch(&api, &sender, request);
        }

        let hud = viewer.hud();
        if last_hud.as_ref() != Some(&hud) {
            debug!(hud = %hud.lines().join(" | "), "hud");
            last_hud = Some(hud);
        }
        let rendered = viewer.render();
        trace!(
            frame = frame.index,
            dt_s = frame.dt_s,
            draws = rendered.commands.len(),
            triangles = rendered.triangle_count(),
            "frame"
        );
    }

    info!(frames = clock.frames_elapsed(), "terrain viewer stopping");
    // Dropping the bus is what stops the socket task.
    drop(bus);
    Ok(())
}

/// Starts the async work behind a request; its outcome comes back as an event.
pub fn dispatch(api: &ApiClient, events: &EventSender<ViewerEvent>, request: Request) {
    let api = api.clone();
    let events = events.clone();
    match request {
        Request::ListMaps => {
            tokio::spawn(async move {
                events.emit(ViewerEvent::MapsListed(api.list_maps().await));
            });
        }
        Request::LoadMap { generation, id } => {
            tokio::spawn(async move {
                let result = api.load_map(&id).await;
                events.emit(ViewerEvent::MapLoaded {
                    generation,
                    id,
                    result,
                });
            });
        }
        Request::CreateMarker { x, z } => {
            tokio::spawn(async move {
                if let Err(err) = api.create_marker(x, z).await {
                    warn!(%err, x, z, "marker create failed");
                    events.emit(ViewerEvent::RequestFailed(format!("Error placing marker: {err}")));
                }
            });
        }
        Request::ClearMarkers => {
            tokio::spawn(async move {
                if let Err(err) = api.clear_markers().await {
                    warn!(%err, "marker clear failed");
                    events.emit(ViewerEvent::RequestFailed(format!("Error clearing markers: {err}")));
                }
            });
        }
    }
}

/// Blocking stdin reads stay off the runtime so shutdown never waits on them.
fn spawn_input_thread(events: EventSender<ViewerEvent>) -> Result<(), ViewerError> {
    thread::Builder::new()
        .name("viewer-input".to_string())
        .spawn(move || read_commands(std::io::stdin().lock(), &events))
        .map_err(ViewerError::Io)?;
    Ok(())
}

/// Posts one event per parsed line, then `InputClosed` at end of input.
pub fn read_commands<R: BufRead>(reader: R, events: &EventSender<ViewerEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "input read failed");
                break;
            }
        };
        match line.parse::<Command>() {
            Ok(command) => {
                if !events.emit(ViewerEvent::Input(command)) {
                    return;
                }
            }
            Err(CommandError::Empty) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
    events.emit(ViewerEvent::InputClosed);
}
