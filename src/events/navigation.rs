use crate::core::{PlaybackCoordinator, Scope};
use crate::dom::EventListener;
use wasm_bindgen::JsValue;
use web_sys as web;

/// Stop every track on history navigation and page unload so no playback
/// survives a route change.
pub fn wire_route_stops(
    window: &web::Window,
    coordinator: &PlaybackCoordinator,
    scope: &mut Scope,
) -> Result<(), JsValue> {
    for kind in ["popstate", "pagehide"] {
        let coordinator = coordinator.clone();
        scope.hold(EventListener::new(window, kind, move |_| {
            log::info!("[coordinator] {} -> stop all", kind);
            coordinator.stop_all();
        })?);
    }
    Ok(())
}

#[inline]
pub fn page_visible(document: &web::Document) -> bool {
    !document.hidden()
}

/// Forward page visibility changes to `on_change`.
pub fn watch_page_visibility(
    document: &web::Document,
    mut on_change: impl FnMut(bool) + 'static,
) -> Result<EventListener, JsValue> {
    let doc = document.clone();
    EventListener::new(document, "visibilitychange", move |_| {
        on_change(page_visible(&doc));
    })
}
