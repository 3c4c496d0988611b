use super::*;

fn popup() -> Option<Rc<Popup>> {
    POPUP.with(|slot| slot.borrow().clone())
}

pub(super) async fn boot() -> Result<(), String> {
    let popup = match Popup::open(ChromeSyncStore, ChromeTabs).await {
        Ok(popup) => popup,
        Err(QuickToggleError::NoActiveTab) => {
            warn!("no active tab; popup stays empty");
            return Ok(());
        }
        Err(error) => return Err(error.to_string()),
    };
    let document = document()?;
    render(&document, &popup.view())?;
    info!(domain = %popup.hostname(), marked = popup.current_mark().is_some(), "popup ready");

    POPUP.with(|slot| *slot.borrow_mut() = Some(Rc::new(popup)));
    install_handlers(&document)
}

fn render(document: &Document, view: &QuickToggleView) -> Result<(), String> {
    set_text(document, POPUP_CURRENT_DOMAIN_ID, &view.hostname)?;

    let select = element_by_id::<HtmlSelectElement>(document, POPUP_ENVIRONMENT_SELECT_ID)?;
    select.set_text_content(None);
    for option in &view.options {
        append_option(&select, option)?;
    }
    select.set_value(&view.selected);

    set_display(document, POPUP_REMOVE_ID, view.show_remove)
}

fn append_option(select: &HtmlSelectElement, option: &EnvironmentOption) -> Result<(), String> {
    let element = HtmlOptionElement::new_with_text_and_value(&option.text, &option.value)
        .map_err(|_| "failed to create environment option".to_string())?;
    select
        .append_child(&element)
        .map_err(|_| "failed to add environment option".to_string())?;
    Ok(())
}

fn install_handlers(document: &Document) -> Result<(), String> {
    install_handler(
        &POPUP_SAVE_HANDLER,
        document,
        POPUP_SAVE_ID,
        "click",
        |_event| spawn_local(save_selected()),
    )?;
    install_handler(
        &POPUP_REMOVE_HANDLER,
        document,
        POPUP_REMOVE_ID,
        "click",
        |_event| spawn_local(remove_mark()),
    )?;
    install_handler(
        &POPUP_OPEN_SETTINGS_HANDLER,
        document,
        POPUP_OPEN_SETTINGS_ID,
        "click",
        |_event| spawn_local(open_settings()),
    )
}

fn selected_environment() -> Option<String> {
    let document = document().ok()?;
    element_by_id::<HtmlSelectElement>(&document, POPUP_ENVIRONMENT_SELECT_ID)
        .ok()
        .map(|select| select.value())
}

async fn save_selected() {
    let Some(popup) = popup() else {
        return;
    };
    let environment_id = selected_environment().unwrap_or_default();
    let outcome = popup.save(&environment_id, chrono::Utc::now()).await;
    finish(outcome, "failed to mark domain");
}

async fn remove_mark() {
    let Some(popup) = popup() else {
        return;
    };
    let outcome = popup.remove().await;
    finish(outcome, "failed to remove domain mark");
}

async fn open_settings() {
    let Some(popup) = popup() else {
        return;
    };
    if let Err(error) = popup.open_settings().await {
        error!(%error, "failed to open settings page");
    }
}

fn finish(outcome: Result<QuickToggleOutcome, QuickToggleError>, failure: &str) {
    match outcome {
        Ok(QuickToggleOutcome::Applied) => close_window(),
        Ok(QuickToggleOutcome::Ignored) => debug!("nothing to apply"),
        Err(error) => error!(%error, "{failure}"),
    }
}

fn close_window() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if window.close().is_err() {
        warn!("popup window refused to close");
    }
}
