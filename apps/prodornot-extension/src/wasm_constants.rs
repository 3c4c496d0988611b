pub(crate) const ENVIRONMENTS_LIST_ID: &str = "environments-list";
pub(crate) const DOMAINS_LIST_ID: &str = "domains-list";
pub(crate) const ADD_ENVIRONMENT_ID: &str = "add-environment";
pub(crate) const ENVIRONMENT_MODAL_ID: &str = "environment-modal";
pub(crate) const ENVIRONMENT_FORM_ID: &str = "environment-form";
pub(crate) const CANCEL_ENVIRONMENT_ID: &str = "cancel-environment";
pub(crate) const ENV_LABEL_INPUT_ID: &str = "env-label";
pub(crate) const ENV_COLOR_INPUT_ID: &str = "env-color";
pub(crate) const ENV_ICON_INPUT_ID: &str = "env-icon";
pub(crate) const SAVE_INDICATOR_SETTINGS_ID: &str = "save-indicator-settings";
pub(crate) const SETTINGS_ERROR_ID: &str = "settings-error";
pub(crate) const INDICATOR_STYLE_RADIO_NAME: &str = "indicator-style";
pub(crate) const INDICATOR_POSITION_RADIO_NAME: &str = "indicator-position";
pub(crate) const MODAL_ACTIVE_CLASS: &str = "active";

pub(crate) const POPUP_CURRENT_DOMAIN_ID: &str = "current-domain";
pub(crate) const POPUP_ENVIRONMENT_SELECT_ID: &str = "environment-select";
pub(crate) const POPUP_SAVE_ID: &str = "save-environment";
pub(crate) const POPUP_REMOVE_ID: &str = "remove-environment";
pub(crate) const POPUP_OPEN_SETTINGS_ID: &str = "open-settings";

pub(crate) const ACTION_ATTRIBUTE: &str = "data-action";
pub(crate) const TARGET_ATTRIBUTE: &str = "data-target";
