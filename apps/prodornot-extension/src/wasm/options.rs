use super::*;

use std::future::Future;

use gloo_timers::future::TimeoutFuture;

fn settings() -> Option<Rc<Settings>> {
    SETTINGS.with(|slot| slot.borrow().clone())
}

fn spawn_page_task(task: &'static str, future: impl Future<Output = Result<(), String>> + 'static) {
    spawn_local(async move {
        if let Err(error) = future.await {
            error!(task, %error, "settings page task failed");
        }
    });
}

pub(super) async fn boot() -> Result<(), String> {
    let surface = match Settings::load(ChromeSyncStore, ChromeTabs, WindowPrompt).await {
        Ok(surface) => surface,
        Err(error) => {
            error!(%error, "settings load failed; page stays read-only");
            show_settings_error(&error.user_message());
            return Ok(());
        }
    };
    let surface = Rc::new(surface);
    SETTINGS.with(|slot| *slot.borrow_mut() = Some(surface.clone()));

    let document = document()?;
    render_environments(&document, &surface)?;
    render_domains(&document, &surface)?;
    render_indicator_settings(&document, surface.indicator_settings());
    install_handlers(&document)?;
    info!(
        environments = surface.environments().len(),
        domains = surface.domain_rows().len(),
        "settings page ready"
    );
    Ok(())
}

fn append_all(parent: &Element, children: &[&Element]) -> Result<(), String> {
    for child in children {
        parent
            .append_child(child)
            .map_err(|_| "failed to build settings list".to_string())?;
    }
    Ok(())
}

fn text_span(document: &Document, text: &str) -> Result<Element, String> {
    let span = create_element(document, "span", None)?;
    span.set_text_content(Some(text));
    Ok(span)
}

fn action_button(
    document: &Document,
    text: &str,
    action: &str,
    target: &str,
) -> Result<Element, String> {
    let button = create_element(document, "button", Some("secondary-button"))?;
    button
        .set_attribute("type", "button")
        .and_then(|()| button.set_attribute(ACTION_ATTRIBUTE, action))
        .and_then(|()| button.set_attribute(TARGET_ATTRIBUTE, target))
        .map_err(|_| "failed to build list button".to_string())?;
    button.set_text_content(Some(text));
    Ok(button)
}

fn environment_item(document: &Document, environment: &Environment) -> Result<Element, String> {
    let item = create_element(document, "div", Some("environment-item"))?;
    let info = create_element(document, "div", Some("environment-info"))?;
    let swatch = create_element(document, "div", Some("environment-color"))?;
    if let Some(swatch) = swatch.dyn_ref::<HtmlElement>() {
        swatch
            .style()
            .set_property("background-color", &environment.color)
            .map_err(|_| "failed to color environment swatch".to_string())?;
    }
    let icon = text_span(document, &environment.icon)?;
    let label = text_span(document, &environment.label)?;
    append_all(&info, &[&swatch, &icon, &label])?;

    let actions = create_element(document, "div", Some("environment-actions"))?;
    let edit = action_button(document, "Edit", list_action::EDIT_ENVIRONMENT, &environment.id)?;
    let delete = action_button(
        document,
        "Delete",
        list_action::DELETE_ENVIRONMENT,
        &environment.id,
    )?;
    append_all(&actions, &[&edit, &delete])?;

    append_all(&item, &[&info, &actions])?;
    Ok(item)
}

fn domain_item(document: &Document, row: &DomainRow) -> Result<Element, String> {
    let item = create_element(document, "div", Some("domain-item"))?;
    let info = create_element(document, "div", Some("domain-info"))?;
    let icon = text_span(document, &row.icon)?;
    if icon.set_attribute("title", &row.label).is_err() {
        debug!(domain = %row.domain, "could not title domain icon");
    }
    let domain = text_span(document, &row.domain)?;
    append_all(&info, &[&icon, &domain])?;
    let remove = action_button(document, "Remove", list_action::DELETE_DOMAIN, &row.domain)?;
    append_all(&item, &[&info, &remove])?;
    Ok(item)
}

fn render_environments(document: &Document, surface: &Settings) -> Result<(), String> {
    let list = element_by_id::<Element>(document, ENVIRONMENTS_LIST_ID)?;
    list.set_text_content(None);
    for environment in surface.environments() {
        let item = environment_item(document, &environment)?;
        append_all(&list, &[&item])?;
    }
    Ok(())
}

fn render_domains(document: &Document, surface: &Settings) -> Result<(), String> {
    let list = element_by_id::<Element>(document, DOMAINS_LIST_ID)?;
    list.set_text_content(None);
    for row in surface.domain_rows() {
        let item = domain_item(document, &row)?;
        append_all(&list, &[&item])?;
    }
    Ok(())
}

fn render_lists(surface: &Settings) -> Result<(), String> {
    let document = document()?;
    render_environments(&document, surface)?;
    render_domains(&document, surface)
}

fn render_indicator_settings(document: &Document, settings: IndicatorSettings) {
    check_radio(document, INDICATOR_STYLE_RADIO_NAME, settings.style.as_str());
    check_radio(
        document,
        INDICATOR_POSITION_RADIO_NAME,
        settings.position.as_str(),
    );
}

fn install_handlers(document: &Document) -> Result<(), String> {
    install_handler(
        &ADD_ENVIRONMENT_HANDLER,
        document,
        ADD_ENVIRONMENT_ID,
        "click",
        |_event| {
            if let Err(error) = open_environment_modal(None) {
                error!(%error, "failed to open environment form");
            }
        },
    )?;
    install_handler(
        &CANCEL_ENVIRONMENT_HANDLER,
        document,
        CANCEL_ENVIRONMENT_ID,
        "click",
        |_event| {
            if let Err(error) = close_environment_modal() {
                error!(%error, "failed to close environment form");
            }
        },
    )?;
    install_handler(
        &ENVIRONMENT_SUBMIT_HANDLER,
        document,
        ENVIRONMENT_FORM_ID,
        "submit",
        |event| {
            event.prevent_default();
            spawn_page_task("save-environment", submit_environment());
        },
    )?;
    install_handler(
        &ENVIRONMENTS_LIST_HANDLER,
        document,
        ENVIRONMENTS_LIST_ID,
        "click",
        |event| {
            if let Some(action) = list_action_from_event(&event) {
                run_list_action(action);
            }
        },
    )?;
    install_handler(
        &DOMAINS_LIST_HANDLER,
        document,
        DOMAINS_LIST_ID,
        "click",
        |event| {
            if let Some(action) = list_action_from_event(&event) {
                run_list_action(action);
            }
        },
    )?;
    install_handler(
        &SAVE_INDICATOR_HANDLER,
        document,
        SAVE_INDICATOR_SETTINGS_ID,
        "click",
        |_event| spawn_page_task("save-indicator-settings", save_indicator_settings()),
    )
}

fn list_action_from_event(event: &web_sys::Event) -> Option<ListAction> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let button = target.closest("button").ok().flatten()?;
    let action = button.get_attribute(ACTION_ATTRIBUTE)?;
    let target = button.get_attribute(TARGET_ATTRIBUTE)?;
    ListAction::from_attributes(&action, &target)
}

fn run_list_action(action: ListAction) {
    match action {
        ListAction::EditEnvironment(id) => {
            if let Err(error) = open_environment_modal(Some(&id)) {
                error!(%error, environment_id = %id, "failed to open environment form");
            }
        }
        ListAction::DeleteEnvironment(id) => {
            spawn_page_task("delete-environment", delete_environment(id));
        }
        ListAction::DeleteDomain(domain) => {
            spawn_page_task("delete-domain", delete_domain(domain));
        }
    }
}

fn open_environment_modal(editing: Option<&str>) -> Result<(), String> {
    let Some(surface) = settings() else {
        return Ok(());
    };
    let document = document()?;
    let form = element_by_id::<HtmlFormElement>(&document, ENVIRONMENT_FORM_ID)?;

    match editing {
        Some(id) => {
            let Some(draft) = surface.begin_edit(id) else {
                let error = SettingsError::UnknownEnvironment { id: id.to_string() };
                show_settings_error(&error.user_message());
                return render_lists(&surface);
            };
            set_input_value(&document, ENV_LABEL_INPUT_ID, &draft.label)?;
            set_input_value(&document, ENV_COLOR_INPUT_ID, &draft.color)?;
            set_input_value(&document, ENV_ICON_INPUT_ID, &draft.icon)?;
        }
        None => {
            surface.begin_create();
            form.reset();
        }
    }

    element_by_id::<Element>(&document, ENVIRONMENT_MODAL_ID)?
        .class_list()
        .add_1(MODAL_ACTIVE_CLASS)
        .map_err(|_| "failed to show environment form".to_string())
}

fn close_environment_modal() -> Result<(), String> {
    if let Some(surface) = settings() {
        surface.cancel_edit();
    }
    let document = document()?;
    element_by_id::<Element>(&document, ENVIRONMENT_MODAL_ID)?
        .class_list()
        .remove_1(MODAL_ACTIVE_CLASS)
        .map_err(|_| "failed to hide environment form".to_string())?;
    element_by_id::<HtmlFormElement>(&document, ENVIRONMENT_FORM_ID)?.reset();
    Ok(())
}

async fn submit_environment() -> Result<(), String> {
    let Some(surface) = settings() else {
        return Ok(());
    };
    let document = document()?;
    let draft = EnvironmentDraft {
        label: input_value(&document, ENV_LABEL_INPUT_ID)?,
        color: input_value(&document, ENV_COLOR_INPUT_ID)?,
        icon: input_value(&document, ENV_ICON_INPUT_ID)?,
    };

    match surface.save_environment(draft).await {
        Ok(environment) => {
            debug!(environment_id = %environment.id, "environment form saved");
            clear_settings_error();
            render_lists(&surface)?;
            close_environment_modal()
        }
        Err(error) => {
            error!(%error, "failed to save environment");
            show_settings_error(&error.user_message());
            Ok(())
        }
    }
}

async fn delete_environment(id: String) -> Result<(), String> {
    let Some(surface) = settings() else {
        return Ok(());
    };
    match surface.delete_environment(&id).await {
        Ok(DeleteOutcome::Cancelled) => return Ok(()),
        Ok(_) => clear_settings_error(),
        Err(error) => {
            error!(%error, environment_id = %id, "failed to delete environment");
            show_settings_error(&error.user_message());
        }
    }
    render_lists(&surface)
}

async fn delete_domain(domain: String) -> Result<(), String> {
    let Some(surface) = settings() else {
        return Ok(());
    };
    match surface.delete_domain(&domain).await {
        Ok(DeleteOutcome::DomainDeleted { broadcast }) => {
            log_broadcast(&broadcast);
            clear_settings_error();
        }
        Ok(_) => return Ok(()),
        Err(error) => {
            error!(%error, %domain, "failed to delete domain mark");
            show_settings_error(&error.user_message());
        }
    }
    render_lists(&surface)
}

async fn save_indicator_settings() -> Result<(), String> {
    let Some(surface) = settings() else {
        return Ok(());
    };
    let document = document()?;
    let chosen = IndicatorSettings {
        style: checked_radio_value(&document, INDICATOR_STYLE_RADIO_NAME)
            .as_deref()
            .and_then(IndicatorStyle::parse)
            .unwrap_or_default(),
        position: checked_radio_value(&document, INDICATOR_POSITION_RADIO_NAME)
            .as_deref()
            .and_then(IndicatorPosition::parse)
            .unwrap_or_default(),
    };
    let button = element_by_id::<HtmlElement>(&document, SAVE_INDICATOR_SETTINGS_ID)?;

    let feedback = match surface.save_indicator_settings(chosen).await {
        Ok(broadcast) => {
            log_broadcast(&broadcast);
            clear_settings_error();
            SaveFeedback::Saved
        }
        Err(error) => {
            error!(%error, "failed to save indicator settings");
            show_settings_error(&error.user_message());
            SaveFeedback::Failed
        }
    };

    button.set_text_content(Some(feedback.label()));
    TimeoutFuture::new(SAVE_FEEDBACK_RESET_MS).await;
    button.set_text_content(Some(SAVE_INDICATOR_LABEL));
    Ok(())
}

fn log_broadcast(broadcast: &BroadcastReport) {
    debug!(
        reloaded = broadcast.reloaded.len(),
        notified = broadcast.notified.len(),
        unreachable = broadcast.failed.len(),
        "indicator update sent to open tabs"
    );
}
