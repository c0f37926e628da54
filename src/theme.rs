// Dark-mode preference, persisted as the literal "true"/"false"

use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{KeyValueStore, DARK_MODE_KEY};

pub struct Theme {
    store: Arc<dyn KeyValueStore>,
    dark: bool,
}

impl Theme {
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let dark = match store.get(DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!("Could not read dark mode preference: {}", e);
                false
            }
        };
        Self { store, dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn toggle(&mut self) -> Result<bool, StoreError> {
        let dark = !self.dark;
        self.store.set(DARK_MODE_KEY, if dark { "true" } else { "false" })?;
        self.dark = dark;
        Ok(dark)
    }
}
