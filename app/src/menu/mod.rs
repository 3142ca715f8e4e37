use anyhow::Result;

use infra::persistence::KeyValueStore;

use crate::services::{Commandable, Queryable, Request};

mod models;
pub mod queries;
mod store;

pub use self::models::{
    Course, EmptyId, MenuDraft, MenuItem, MenuItemId, Price, PriceError, UnknownCourse,
    ValidationError, MAX_CENTS,
};
pub use self::queries::{Average, CourseFilter, CourseStats, MenuSummary};
pub use self::store::{Hydration, MenuStore, DEFAULT_KEY};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShowMenu;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShowSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMenuItem(pub MenuDraft);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveMenuItem(pub MenuItemId);

#[derive(Debug, Clone, Copy, Default)]
pub struct ClearMenu;

impl Request for ShowMenu {
    type Resp = Vec<MenuItem>;
}

impl Request for ShowSummary {
    type Resp = MenuSummary;
}

impl Request for AddMenuItem {
    type Resp = MenuItem;
}

impl Request for RemoveMenuItem {
    type Resp = Option<MenuItem>;
}

impl Request for ClearMenu {
    type Resp = ();
}

impl<S: KeyValueStore> Queryable<ShowMenu> for MenuStore<S> {
    fn query(&self, _: ShowMenu) -> Result<Vec<MenuItem>> {
        Ok(self.list().to_vec())
    }
}

impl<S: KeyValueStore> Queryable<ShowSummary> for MenuStore<S> {
    fn query(&self, _: ShowSummary) -> Result<MenuSummary> {
        Ok(MenuSummary::of(self.list()))
    }
}

impl<S: KeyValueStore> Commandable<AddMenuItem> for MenuStore<S> {
    fn execute(&mut self, AddMenuItem(draft): AddMenuItem) -> Result<MenuItem> {
        let item = self.add(draft)?;
        Ok(item)
    }
}

impl<S: KeyValueStore> Commandable<RemoveMenuItem> for MenuStore<S> {
    fn execute(&mut self, RemoveMenuItem(id): RemoveMenuItem) -> Result<Option<MenuItem>> {
        Ok(self.remove(&id))
    }
}

impl<S: KeyValueStore> Commandable<ClearMenu> for MenuStore<S> {
    fn execute(&mut self, _: ClearMenu) -> Result<()> {
        self.clear();
        Ok(())
    }
}
