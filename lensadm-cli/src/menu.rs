//! Active section tracking

use crate::config::ConfigStore;
use crate::observable::Observable;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Users,
    Roles,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Section::Users => "users",
            Section::Roles => "roles",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Users => "User management",
            Section::Roles => "Role management",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "users" | "user" => Ok(Section::Users),
            "roles" | "role" => Ok(Section::Roles),
            other => Err(format!("unknown section '{}', expected users or roles", other)),
        }
    }
}

pub struct MenuController {
    active: Observable<Section>,
    store: ConfigStore,
}

impl MenuController {
    /// Start on the remembered section when `remember_menu` is set
    pub fn new(store: ConfigStore) -> Self {
        let saved = store.with(|c| {
            if c.remember_menu {
                c.active_menu.as_deref().and_then(|m| m.parse().ok())
            } else {
                None
            }
        });
        Self {
            active: Observable::new(saved.unwrap_or_default()),
            store,
        }
    }

    pub fn active(&self) -> Section {
        self.active.get()
    }

    pub fn observe(&self) -> Observable<Section> {
        self.active.clone()
    }

    pub fn page_title(&self) -> &'static str {
        self.active().title()
    }

    /// Switch section and remember the choice
    pub fn select(&self, section: Section) {
        self.active.set(section);
        self.persist();
    }

    /// Write the current section to the configuration file
    pub fn persist(&self) {
        if !self.store.with(|c| c.remember_menu) {
            return;
        }
        let key = self.active().key().to_string();
        if let Err(e) = self.store.update(|c| c.active_menu = Some(key)) {
            warn!(error = %e, "failed to remember active section");
        }
    }

    pub fn reset(&self) {
        self.active.set(Section::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parsing() {
        assert_eq!("roles".parse::<Section>().unwrap(), Section::Roles);
        assert_eq!("Users".parse::<Section>().unwrap(), Section::Users);
        assert!("nodes".parse::<Section>().is_err());
        assert_eq!(Section::Roles.to_string(), "roles");
    }

    #[test]
    fn test_selection_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");

        let menu = MenuController::new(ConfigStore::open(&path).unwrap());
        assert_eq!(menu.active(), Section::Users);
        menu.select(Section::Roles);
        assert_eq!(menu.page_title(), "Role management");

        let reopened = MenuController::new(ConfigStore::open(&path).unwrap());
        assert_eq!(reopened.active(), Section::Roles);
    }

    #[test]
    fn test_selection_not_remembered_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "remember_menu = false\n").unwrap();

        let menu = MenuController::new(ConfigStore::open(&path).unwrap());
        menu.select(Section::Roles);

        let reopened = MenuController::new(ConfigStore::open(&path).unwrap());
        assert_eq!(reopened.active(), Section::Users);
    }
}
