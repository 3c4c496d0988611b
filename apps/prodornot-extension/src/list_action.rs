//! Row buttons on the settings page carry their intent in data attributes so
//! one delegated click handler per list can serve every row.

pub(crate) const EDIT_ENVIRONMENT: &str = "edit-environment";
pub(crate) const DELETE_ENVIRONMENT: &str = "delete-environment";
pub(crate) const DELETE_DOMAIN: &str = "delete-domain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListAction {
    EditEnvironment(String),
    DeleteEnvironment(String),
    DeleteDomain(String),
}

impl ListAction {
    pub(crate) fn from_attributes(action: &str, target: &str) -> Option<Self> {
        if target.is_empty() {
            return None;
        }
        let target = target.to_string();
        match action {
            EDIT_ENVIRONMENT => Some(Self::EditEnvironment(target)),
            DELETE_ENVIRONMENT => Some(Self::DeleteEnvironment(target)),
            DELETE_DOMAIN => Some(Self::DeleteDomain(target)),
            _ => None,
        }
    }

    #[cfg(test)]
    fn attributes(&self) -> (&'static str, &str) {
        match self {
            Self::EditEnvironment(id) => (EDIT_ENVIRONMENT, id),
            Self::DeleteEnvironment(id) => (DELETE_ENVIRONMENT, id),
            Self::DeleteDomain(domain) => (DELETE_DOMAIN, domain),
        }
    }
}
