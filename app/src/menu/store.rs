use std::collections::HashSet;

use log::*;

use infra::documents::Documents;
use infra::ids::{Id, IdGen};
use infra::persistence::{KeyValueStore, MemoryStore};

use super::models::{MenuDraft, MenuItem, MenuItemId, ValidationError};

pub const DEFAULT_KEY: &str = "menuItems";

/// The single owner of the menu. Items keep the order they were added in;
/// when persistence is attached, every mutation writes the whole list back.
#[derive(Debug)]
pub struct MenuStore<S = MemoryStore> {
    items: Vec<MenuItem>,
    idgen: IdGen,
    persistence: Option<Persistence<S>>,
}

#[derive(Debug)]
struct Persistence<S> {
    docs: Documents<S>,
    key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    Loaded(usize),
    Missing,
    Failed,
    Unpersisted,
}

impl MenuStore<MemoryStore> {
    pub fn in_memory() -> Self {
        MenuStore::unpersisted()
    }
}

impl<S: KeyValueStore> MenuStore<S> {
    pub fn unpersisted() -> Self {
        MenuStore {
            items: Vec::new(),
            idgen: IdGen::new(),
            persistence: None,
        }
    }

    pub fn persistent(store: S, key: &str) -> Self {
        let docs = Documents::wrap(store);
        let key = key.to_string();
        MenuStore {
            items: Vec::new(),
            idgen: IdGen::new(),
            persistence: Some(Persistence { docs, key }),
        }
    }

    pub fn list(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn get(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn add(&mut self, draft: MenuDraft) -> Result<MenuItem, ValidationError> {
        let draft = draft.validate()?;
        let idgen = &self.idgen;
        let id = self.fresh_id(|| idgen.generate());
        let item = MenuItem::from_draft(id, draft);
        info!("Add {} {:?} to {}", item.id, item.dish_name, item.course);
        self.items.push(item.clone());
        self.write_through();
        Ok(item)
    }

    fn fresh_id(&self, mut next: impl FnMut() -> Id<MenuItem>) -> MenuItemId {
        loop {
            let id = MenuItemId::Generated(next());
            if self.get(&id).is_none() {
                return id;
            }
            warn!("Generated id {} already in use; regenerating", id);
        }
    }

    /// Removing an unknown id is not an error; nothing changes.
    pub fn remove(&mut self, id: &MenuItemId) -> Option<MenuItem> {
        let removed = self
            .items
            .iter()
            .position(|item| &item.id == id)
            .map(|idx| self.items.remove(idx));
        match removed {
            Some(ref item) => info!("Removed {} {:?}", id, item.dish_name),
            None => debug!("Remove {}: no such item", id),
        }
        self.write_through();
        removed
    }

    pub fn clear(&mut self) {
        info!("Clearing {} items", self.items.len());
        self.items.clear();
        self.write_through();
    }

    /// Replaces the in-memory list with the persisted one, if there is one.
    /// A missing or unreadable record leaves the list as it was. Only the
    /// first item carrying a given id is kept; the record itself is
    /// rewritten on the next mutation.
    pub fn hydrate(&mut self) -> Hydration {
        let persistence = match self.persistence.as_ref() {
            Some(p) => p,
            None => return Hydration::Unpersisted,
        };
        match persistence.docs.load::<Vec<MenuItem>>(&persistence.key) {
            Ok(Some(items)) => {
                let items = first_of_each_id(items);
                info!("Hydrated {} items from {:?}", items.len(), persistence.key);
                let n = items.len();
                self.items = items;
                Hydration::Loaded(n)
            }
            Ok(None) => {
                info!("No saved menu at {:?}", persistence.key);
                Hydration::Missing
            }
            Err(e) => {
                error!("Error loading menu items from {:?}: {:?}", persistence.key, e);
                Hydration::Failed
            }
        }
    }

    // Failures are logged only; the in-memory list stays authoritative.
    fn write_through(&self) {
        if let Some(p) = self.persistence.as_ref() {
            if let Err(e) = p.docs.save(&p.key, &self.items) {
                error!("Error saving menu items to {:?}: {:?}", p.key, e);
            }
        }
    }
}

fn first_of_each_id(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.id.clone());
            if !fresh {
                warn!("Dropping {:?}: id {} already loaded", item.dish_name, item.id);
            }
            fresh
        })
        .collect()
}
