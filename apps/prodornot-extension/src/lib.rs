//! Browser entrypoints for the ProdOrNot extension.
//!
//! The wasm build exports one start function per extension surface; the
//! loaders in `static/` call the matching one. Everything browser-specific
//! lives behind `cfg(target_arch = "wasm32")`.

#[cfg(any(target_arch = "wasm32", test))]
mod console_route;
#[cfg(any(target_arch = "wasm32", test))]
mod list_action;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use prodornot_core::popup::EnvironmentOption;
    use prodornot_core::settings::{SAVE_FEEDBACK_RESET_MS, SAVE_INDICATOR_LABEL};
    use prodornot_core::tabs::BroadcastReport;
    use prodornot_core::{
        Badge, BadgeHost, DeleteOutcome, DomainRow, Environment,
        EnvironmentDraft, INDICATOR_ELEMENT_ID, IndicatorEvent, IndicatorPosition,
        IndicatorRenderer, IndicatorSettings, IndicatorStyle, QuickToggle, QuickToggleError,
        QuickToggleOutcome, QuickToggleView, RuntimeMessage, SaveFeedback, SettingsError,
        SettingsSurface, StorageArea, StoreChange, StoreError, StoreSnapshot, SyncStore, TabId,
        TabInfo, TabsApi, TabsError, UserPrompt, resolve_log_level,
    };
    use tracing::{debug, error, info, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{
        Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlOptionElement,
        HtmlSelectElement,
    };

    use crate::console_route::{ConsoleMethod, console_line, console_method_for};
    use crate::list_action::{self, ListAction};
    use crate::wasm_constants::*;

    mod chrome;
    mod content;
    mod dom;
    mod logging;
    mod options;
    mod popup;

    use chrome::*;
    use dom::*;

    type Settings = SettingsSurface<ChromeSyncStore, ChromeTabs, WindowPrompt>;
    type Popup = QuickToggle<ChromeSyncStore, ChromeTabs>;
    type EventHandler = Closure<dyn FnMut(web_sys::Event)>;

    thread_local! {
        static RENDERER: RefCell<Option<Rc<IndicatorRenderer>>> = const { RefCell::new(None) };
        static STORAGE_CHANGED_HANDLER: RefCell<Option<Closure<dyn FnMut(JsValue, JsValue)>>> = const { RefCell::new(None) };
        static RUNTIME_MESSAGE_HANDLER: RefCell<Option<Closure<dyn FnMut(JsValue)>>> = const { RefCell::new(None) };
        static DOCUMENT_READY_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };

        static SETTINGS: RefCell<Option<Rc<Settings>>> = const { RefCell::new(None) };
        static ADD_ENVIRONMENT_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static CANCEL_ENVIRONMENT_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static ENVIRONMENT_SUBMIT_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static ENVIRONMENTS_LIST_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static DOMAINS_LIST_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static SAVE_INDICATOR_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };

        static POPUP: RefCell<Option<Rc<Popup>>> = const { RefCell::new(None) };
        static POPUP_SAVE_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static POPUP_REMOVE_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static POPUP_OPEN_SETTINGS_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
    }

    /// Page script entrypoint, injected into every page.
    #[wasm_bindgen]
    pub fn start_content_script() {
        logging::init_logging("content");
        content::boot();
    }

    /// Settings page entrypoint. The loader calls it once the page DOM is parsed.
    #[wasm_bindgen]
    pub fn start_options_page() {
        logging::init_logging("options");
        spawn_local(async {
            if let Err(error) = options::boot().await {
                error!(%error, "settings page failed to start");
                show_settings_error(&error);
            }
        });
    }

    /// Toolbar popup entrypoint.
    #[wasm_bindgen]
    pub fn start_popup() {
        logging::init_logging("popup");
        spawn_local(async {
            if let Err(error) = popup::boot().await {
                error!(%error, "popup failed to start");
            }
        });
    }
}
