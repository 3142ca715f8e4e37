use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

use bistro::menu::{
    queries, AddMenuItem, ClearMenu, Course, CourseFilter, MenuDraft, MenuItem, MenuItemId,
    Price, RemoveMenuItem, ShowMenu, ShowSummary,
};
use bistro::services::{Commandable, Queryable};

#[derive(Debug, StructOpt)]
#[structopt(name = "bistro", about = "Restaurant menu CLI")]
struct Opt {
    /// Configuration file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "show-menu", about = "Show menu")]
    ShowMenu {
        #[structopt(long = "course", default_value = "All")]
        course: CourseFilter,
    },
    #[structopt(name = "add", about = "Add a dish")]
    Add {
        #[structopt(long = "name")]
        name: String,
        #[structopt(long = "description")]
        description: String,
        #[structopt(long = "course")]
        course: Course,
        #[structopt(long = "price")]
        price: Price,
    },
    #[structopt(name = "remove", about = "Remove a dish")]
    Remove { id: MenuItemId },
    #[structopt(name = "clear", about = "Remove every dish")]
    Clear,
    #[structopt(name = "summary", about = "Counts and average prices")]
    Summary,
    #[structopt(name = "recent", about = "Most recently added dishes")]
    Recent {
        #[structopt(short = "n", long = "count", default_value = "3")]
        count: usize,
    },
    #[structopt(name = "search", about = "Search dish names and descriptions")]
    Search { text: String },
    #[structopt(name = "courses", about = "List the courses")]
    Courses,
    #[structopt(name = "ids", about = "Show when each dish id was minted")]
    Ids,
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    bistro: bistro::config::Config,
    #[serde(default)]
    env_logger: bistro::config::EnvLogger,
}

fn print_item(item: &MenuItem) {
    println!(
        "{}  {:<14} {:>9}  {}: {}",
        item.id(),
        item.course().name(),
        item.price().to_string(),
        item.dish_name(),
        item.description()
    );
}

fn print_id(item: &MenuItem) {
    match item.id() {
        MenuItemId::Generated(id) => {
            let untyped = id.untyped();
            let stamp: DateTime<Utc> = untyped.timestamp().into();
            println!(
                "{}  t:{}; r:0x{:0>16x}  {}",
                id,
                stamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                untyped.random(),
                item.dish_name()
            );
        }
        MenuItemId::Legacy(id) => println!("{}  legacy  {}", id, item.dish_name()),
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config_buf = String::new();
    File::open(&opt.config)
        .with_context(|| format!("open {:?}", opt.config))?
        .read_to_string(&mut config_buf)?;
    let mut config: Config = toml::from_str(&config_buf).context("parse config")?;
    config.bistro.apply_env()?;

    config.env_logger.builder().init();
    debug!("Options: {:?}", opt);

    let mut bistro = bistro::Bistro::new(&config.bistro)?;

    match opt.command {
        Commands::ShowMenu { course } => {
            let list = bistro.menu().query(ShowMenu)?;
            let shown = queries::filter(&list, course);
            for item in shown.iter() {
                print_item(item);
            }
            println!(
                "Showing {} item{} ({})",
                shown.len(),
                if shown.len() == 1 { "" } else { "s" },
                course
            );
        }
        Commands::Add {
            name,
            description,
            course,
            price,
        } => {
            let draft = MenuDraft {
                dish_name: name,
                description,
                course,
                price,
            };
            let item = bistro.menu_mut().execute(AddMenuItem(draft))?;
            print_item(&item);
        }
        Commands::Remove { id } => {
            match bistro.menu_mut().execute(RemoveMenuItem(id.clone()))? {
                Some(item) => println!("Removed {}", item.dish_name()),
                None => println!("No dish with id {}", id),
            }
        }
        Commands::Clear => {
            bistro.menu_mut().execute(ClearMenu)?;
            println!("Menu cleared");
        }
        Commands::Summary => {
            let summary = bistro.menu().query(ShowSummary)?;
            println!("Total items: {}", summary.total);
            println!("Average price: {}", summary.average);
            for stats in summary.courses.iter() {
                println!(
                    "{:<14} {:>3} items, average {}",
                    stats.course.name(),
                    stats.count,
                    stats.average
                );
            }
            println!("Recently added:");
            for item in summary.recent.iter() {
                print_item(item);
            }
        }
        Commands::Recent { count } => {
            for item in queries::recent(bistro.menu().list(), count) {
                print_item(item);
            }
        }
        Commands::Search { text } => {
            for item in queries::search(bistro.menu().list(), &text) {
                print_item(item);
            }
        }
        Commands::Courses => {
            for course in Course::ALL.iter() {
                println!("{}", course);
            }
        }
        Commands::Ids => {
            for item in bistro.menu().list() {
                print_id(item);
            }
        }
    }

    Ok(())
}
