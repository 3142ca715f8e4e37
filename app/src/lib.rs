use anyhow::Result;
use log::*;

use infra::persistence::KeyValueStore;

pub mod accounts;
pub mod config;
pub mod menu;
pub mod services;

/// The application's long-lived state: one menu store, hydrated at start
/// and handed to whoever needs it.
#[derive(Debug)]
pub struct Bistro {
    menu: menu::MenuStore<Box<dyn KeyValueStore>>,
}

impl Bistro {
    pub fn new(config: &config::Config) -> Result<Self> {
        let mut menu = config.storage.build()?;

        debug!("Hydrate menu");
        let hydration = menu.hydrate();
        info!("Booting bistro: {:?}, {} items", hydration, menu.list().len());

        Ok(Bistro { menu })
    }

    pub fn menu(&self) -> &menu::MenuStore<Box<dyn KeyValueStore>> {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut menu::MenuStore<Box<dyn KeyValueStore>> {
        &mut self.menu
    }
}
