use super::*;

pub(super) fn boot() {
    let hostname = match web_sys::window().map(|window| window.location().hostname()) {
        Some(Ok(hostname)) => hostname,
        _ => {
            warn!("page hostname is unreadable; indicator disabled");
            return;
        }
    };
    debug!(%hostname, "page script starting");
    RENDERER.with(|slot| *slot.borrow_mut() = Some(Rc::new(IndicatorRenderer::new(hostname))));

    if let Err(error) = install_listeners() {
        error!(%error, "failed to subscribe to indicator updates");
    }
    if let Err(error) = when_body_ready() {
        error!(%error, "failed to schedule first indicator render");
    }
}

fn dispatch(event: IndicatorEvent) {
    let Some(renderer) = RENDERER.with(|slot| slot.borrow().clone()) else {
        return;
    };
    spawn_local(async move {
        let mut host = match DocumentBadgeHost::current() {
            Ok(host) => host,
            Err(error) => {
                error!(%error, "page document unavailable");
                return;
            }
        };
        let reaction = renderer.handle(&event, &ChromeSyncStore, &mut host).await;
        debug!(?event, ?reaction, "indicator event handled");
    });
}

fn install_listeners() -> Result<(), String> {
    STORAGE_CHANGED_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(JsValue, JsValue)>::wrap(Box::new(
            move |changes: JsValue, area: JsValue| {
                if let Some(change) = decode_store_change(&changes, &area) {
                    dispatch(IndicatorEvent::StorageChanged(change));
                }
            },
        ));
        add_storage_changed_listener(&callback)?;
        *slot.borrow_mut() = Some(callback);
        Ok::<(), String>(())
    })?;

    RUNTIME_MESSAGE_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(JsValue)>::wrap(Box::new(move |message: JsValue| {
            match decode_runtime_message(message) {
                Some(message) => dispatch(IndicatorEvent::Message(message)),
                None => debug!("ignoring unrecognized runtime message"),
            }
        }));
        add_runtime_message_listener(&callback)?;
        *slot.borrow_mut() = Some(callback);
        Ok::<(), String>(())
    })
}

/// Renders now when `body` exists, otherwise once the document is parsed.
fn when_body_ready() -> Result<(), String> {
    let document = document()?;
    if document.body().is_some() {
        dispatch(IndicatorEvent::DocumentReady);
        return Ok(());
    }

    DOCUMENT_READY_HANDLER.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            dispatch(IndicatorEvent::DocumentReady);
        }));
        document
            .add_event_listener_with_callback("DOMContentLoaded", callback.as_ref().unchecked_ref())
            .map_err(|_| "failed to listen for DOMContentLoaded".to_string())?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}
