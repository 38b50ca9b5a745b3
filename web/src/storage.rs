use gloo::storage::{LocalStorage, Storage as _};
use tashbets_core::StoragePort;

/// The browser's `localStorage` behind the core storage port.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct LocalStore;

impl StoragePort for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = LocalStorage::raw().set_item(key, value) {
            log::error!("could not write {key} to local storage: {err:?}");
        }
    }

    fn remove(&self, key: &str) {
        let _ = LocalStorage::raw().remove_item(key);
    }

    fn clear(&self) {
        let _ = LocalStorage::raw().clear();
    }
}
