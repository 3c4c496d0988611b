use super::*;

pub(super) fn document() -> Result<Document, String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    window
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

pub(super) fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, String> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("missing #{id}"))?
        .dyn_into::<T>()
        .map_err(|_| format!("#{id} has an unexpected element type"))
}

pub(super) fn create_element(
    document: &Document,
    tag: &str,
    class: Option<&str>,
) -> Result<Element, String> {
    let element = document
        .create_element(tag)
        .map_err(|_| format!("failed to create <{tag}>"))?;
    if let Some(class) = class {
        element.set_class_name(class);
    }
    Ok(element)
}

pub(super) fn input_value(document: &Document, id: &str) -> Result<String, String> {
    element_by_id::<HtmlInputElement>(document, id).map(|input| input.value())
}

pub(super) fn set_input_value(document: &Document, id: &str, value: &str) -> Result<(), String> {
    element_by_id::<HtmlInputElement>(document, id)?.set_value(value);
    Ok(())
}

pub(super) fn set_text(document: &Document, id: &str, text: &str) -> Result<(), String> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("missing #{id}"))?
        .set_text_content(Some(text));
    Ok(())
}

pub(super) fn set_display(document: &Document, id: &str, visible: bool) -> Result<(), String> {
    let element = element_by_id::<HtmlElement>(document, id)?;
    element
        .style()
        .set_property("display", if visible { "block" } else { "none" })
        .map_err(|_| format!("failed to toggle #{id}"))
}

pub(super) fn checked_radio_value(document: &Document, name: &str) -> Option<String> {
    let selector = format!("input[name=\"{name}\"]:checked");
    document
        .query_selector(&selector)
        .ok()
        .flatten()?
        .dyn_into::<HtmlInputElement>()
        .ok()
        .map(|input| input.value())
}

pub(super) fn check_radio(document: &Document, name: &str, value: &str) {
    let selector = format!("input[name=\"{name}\"][value=\"{value}\"]");
    if let Some(input) = document
        .query_selector(&selector)
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
    {
        input.set_checked(true);
    }
}

/// Attaches `handler` to the element with `id` once; later calls are no-ops
/// while the slot already holds a closure.
pub(super) fn install_handler(
    slot: &'static std::thread::LocalKey<RefCell<Option<EventHandler>>>,
    document: &Document,
    id: &str,
    event: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Result<(), String> {
    let target = document
        .get_element_by_id(id)
        .ok_or_else(|| format!("missing #{id}"))?;
    slot.with(|slot| {
        if slot.borrow().is_some() {
            return Ok(());
        }
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(handler));
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|_| format!("failed to listen for {event} on #{id}"))?;
        *slot.borrow_mut() = Some(callback);
        Ok(())
    })
}

/// Banner above the settings lists. Created on first use so pages without the
/// placeholder still surface failures.
pub(super) fn show_settings_error(message: &str) {
    let Ok(document) = document() else {
        return;
    };
    let banner = match document.get_element_by_id(SETTINGS_ERROR_ID) {
        Some(banner) => banner,
        None => {
            let Ok(banner) = create_element(&document, "div", Some("error-banner")) else {
                return;
            };
            banner.set_id(SETTINGS_ERROR_ID);
            let _ = banner.set_attribute("role", "alert");
            if let Some(body) = document.body() {
                let _ = body.prepend_with_node_1(&banner);
            }
            banner
        }
    };
    banner.set_text_content(Some(message));
    let _ = banner.remove_attribute("hidden");
}

pub(super) fn clear_settings_error() {
    if let Some(banner) = document()
        .ok()
        .and_then(|document| document.get_element_by_id(SETTINGS_ERROR_ID))
    {
        banner.set_text_content(None);
        let _ = banner.set_attribute("hidden", "");
    }
}

/// The visited page's document, as seen by the page script.
pub(super) struct DocumentBadgeHost {
    document: Document,
}

impl DocumentBadgeHost {
    pub(super) fn current() -> Result<Self, String> {
        Ok(Self {
            document: document()?,
        })
    }
}

impl BadgeHost for DocumentBadgeHost {
    type Error = String;

    fn remove_badge(&mut self) -> Result<(), Self::Error> {
        while let Some(existing) = self.document.get_element_by_id(INDICATOR_ELEMENT_ID) {
            existing.remove();
        }
        Ok(())
    }

    fn insert_badge(&mut self, badge: &Badge) -> Result<(), Self::Error> {
        let body = self
            .document
            .body()
            .ok_or_else(|| "document body is unavailable".to_string())?;
        let element = create_element(&self.document, "div", None)?;
        element.set_id(badge.element_id);
        element
            .set_attribute("aria-label", &badge.aria_label)
            .map_err(|_| "failed to label indicator".to_string())?;
        element
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| "indicator is not an HTML element".to_string())?
            .style()
            .set_css_text(&badge.style.to_css_text());

        if let Some(content) = &badge.content {
            let icon = create_element(&self.document, "span", None)?;
            icon.set_text_content(Some(&content.icon));
            let label = create_element(&self.document, "span", None)?;
            label.set_text_content(Some(&content.label));
            element
                .append_child(&icon)
                .and_then(|_| element.append_child(&label))
                .map_err(|_| "failed to fill indicator".to_string())?;
        }

        body.append_child(&element)
            .map_err(|_| "failed to attach indicator".to_string())?;
        Ok(())
    }
}

/// `window.confirm` / `window.alert`.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct WindowPrompt;

impl UserPrompt for WindowPrompt {
    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}
