//! Views computed over the current item list: per-course counts and
//! averages, filtering, search, and the chef's dashboard summary.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::models::{Course, MenuItem, Price, UnknownCourse};

/// How many recent items the dashboard shows.
pub const DASHBOARD_RECENT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseFilter {
    All,
    Only(Course),
}

/// An average that may not exist; shown as `N/A` when it doesn't.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Average(pub Option<Price>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseStats {
    pub course: Course,
    pub count: usize,
    pub average: Average,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSummary {
    pub total: usize,
    pub average: Average,
    pub courses: Vec<CourseStats>,
    pub recent: Vec<MenuItem>,
}

impl Default for CourseFilter {
    fn default() -> Self {
        CourseFilter::All
    }
}

impl CourseFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::Only(course) => item.course() == *course,
        }
    }
}

impl FromStr for CourseFilter {
    type Err = UnknownCourse;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if src.trim().eq_ignore_ascii_case("all") {
            return Ok(CourseFilter::All);
        }
        src.parse().map(CourseFilter::Only)
    }
}

impl fmt::Display for CourseFilter {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CourseFilter::All => fmt.write_str("All"),
            CourseFilter::Only(course) => fmt::Display::fmt(course, fmt),
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(price) => fmt::Display::fmt(&price, fmt),
            None => fmt.write_str("N/A"),
        }
    }
}

/// Every course, including those with no items.
pub fn count_by_course(items: &[MenuItem]) -> BTreeMap<Course, usize> {
    let mut counts = Course::ALL
        .iter()
        .map(|&c| (c, 0))
        .collect::<BTreeMap<_, _>>();
    for item in items {
        *counts.entry(item.course()).or_insert(0) += 1;
    }
    counts
}

pub fn average_price(items: &[MenuItem], course: Course) -> Option<Price> {
    Price::average(
        items
            .iter()
            .filter(|i| i.course() == course)
            .map(MenuItem::price),
    )
}

pub fn overall_average(items: &[MenuItem]) -> Option<Price> {
    Price::average(items.iter().map(MenuItem::price))
}

pub fn filter(items: &[MenuItem], filter: CourseFilter) -> Vec<&MenuItem> {
    items.iter().filter(|i| filter.matches(i)).collect()
}

/// The last `n` items added, oldest first.
pub fn recent(items: &[MenuItem], n: usize) -> &[MenuItem] {
    &items[items.len().saturating_sub(n)..]
}

/// Case-insensitive match on dish name or description. Blank text matches
/// everything.
pub fn search<'a>(items: &'a [MenuItem], text: &str) -> Vec<&'a MenuItem> {
    let needle = text.trim().to_lowercase();
    items
        .iter()
        .filter(|i| {
            needle.is_empty()
                || i.dish_name().to_lowercase().contains(&needle)
                || i.description().to_lowercase().contains(&needle)
        })
        .collect()
}

impl MenuSummary {
    pub fn of(items: &[MenuItem]) -> Self {
        let courses = count_by_course(items)
            .into_iter()
            .map(|(course, count)| CourseStats {
                course,
                count,
                average: Average(average_price(items, course)),
            })
            .collect();
        MenuSummary {
            total: items.len(),
            average: Average(overall_average(items)),
            courses,
            recent: recent(items, DASHBOARD_RECENT).to_vec(),
        }
    }

    pub fn course(&self, course: Course) -> Option<&CourseStats> {
        self.courses.iter().find(|s| s.course == course)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::menu::models::MenuDraft;
    use crate::menu::store::MenuStore;
    use maplit::btreemap;

    fn menu(dishes: &[(&str, &str, Course, &str)]) -> MenuStore {
        let mut store = MenuStore::in_memory();
        for &(name, description, course, price) in dishes {
            store
                .add(MenuDraft {
                    dish_name: name.to_string(),
                    description: description.to_string(),
                    course,
                    price: price.parse().expect("price"),
                })
                .expect("add");
        }
        store
    }

    fn price(s: &str) -> Price {
        s.parse().expect("price")
    }

    #[test]
    fn counts_every_course() {
        let store = menu(&[
            ("Soup", "Hot soup", Course::Starters, "50"),
            ("Bread", "Warm bread", Course::Starters, "10"),
            ("Steak", "Rare", Course::Mains, "30"),
        ]);

        let counts = count_by_course(store.list());

        assert_eq!(counts.len(), Course::ALL.len());
        assert_eq!(counts[&Course::Starters], 2);
        assert_eq!(counts[&Course::Mains], 1);
        assert_eq!(counts[&Course::Prosecco], 0);
    }

    #[test]
    fn averages_per_course_and_overall() {
        let store = menu(&[
            ("Soup", "Hot soup", Course::Starters, "50.00"),
            ("Steak", "Rare", Course::Mains, "30.00"),
        ]);
        let items = store.list();

        assert_eq!(overall_average(items), Some(price("40.00")));
        assert_eq!(average_price(items, Course::Starters), Some(price("50.00")));
        assert_eq!(average_price(items, Course::Mains), Some(price("30.00")));
        assert_eq!(average_price(items, Course::Desserts), None);
        assert_eq!(Average(average_price(items, Course::Desserts)).to_string(), "N/A");
        assert_eq!(overall_average(&[]), None);
    }

    #[test]
    fn filters_by_course() {
        let store = menu(&[
            ("Soup", "Hot soup", Course::Starters, "50"),
            ("Steak", "Rare", Course::Mains, "30"),
            ("Bread", "Warm bread", Course::Starters, "10"),
        ]);
        let items = store.list();

        let names = |v: Vec<&MenuItem>| {
            v.iter()
                .map(|i| i.dish_name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(
            names(filter(items, CourseFilter::All)),
            vec!["Soup", "Steak", "Bread"]
        );
        assert_eq!(
            names(filter(items, CourseFilter::Only(Course::Starters))),
            vec!["Soup", "Bread"]
        );
        assert!(filter(items, CourseFilter::Only(Course::Sorbet)).is_empty());
    }

    #[test]
    fn parses_filters() {
        assert_eq!("All".parse::<CourseFilter>(), Ok(CourseFilter::All));
        assert_eq!("all".parse::<CourseFilter>(), Ok(CourseFilter::All));
        assert_eq!(
            "soup".parse::<CourseFilter>(),
            Ok(CourseFilter::Only(Course::Soup))
        );
        assert!("nothing".parse::<CourseFilter>().is_err());
    }

    #[test]
    fn recent_takes_the_tail() {
        let store = menu(&[
            ("A", "a", Course::Soup, "1"),
            ("B", "b", Course::Soup, "1"),
            ("C", "c", Course::Soup, "1"),
            ("D", "d", Course::Soup, "1"),
        ]);
        let items = store.list();

        let names = recent(items, 3)
            .iter()
            .map(|i| i.dish_name())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "C", "D"]);
        assert_eq!(recent(items, 10).len(), 4);
        assert!(recent(items, 0).is_empty());
    }

    #[test]
    fn searches_names_and_descriptions() {
        let store = menu(&[
            ("Tomato Soup", "Hot soup", Course::Soup, "5"),
            ("Caesar", "Crisp lettuce", Course::Salad, "7"),
            ("Lemon", "Sharp SORBET", Course::Sorbet, "3"),
        ]);
        let items = store.list();

        let names = |v: Vec<&MenuItem>| {
            v.iter()
                .map(|i| i.dish_name().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(search(items, "soup")), vec!["Tomato Soup"]);
        assert_eq!(names(search(items, "sorbet")), vec!["Lemon"]);
        assert_eq!(search(items, "  ").len(), 3);
        assert!(search(items, "pizza").is_empty());
    }

    #[test]
    fn summarises_the_dashboard() {
        let store = menu(&[
            ("Soup", "Hot soup", Course::Starters, "50"),
            ("Steak", "Rare", Course::Mains, "30"),
            ("Tart", "Sweet", Course::Desserts, "20"),
            ("Fish", "Grilled", Course::Mains, "40"),
        ]);

        let summary = MenuSummary::of(store.list());

        assert_eq!(summary.total, 4);
        assert_eq!(summary.average.to_string(), "35.00");
        let counts = summary
            .courses
            .iter()
            .filter(|s| s.count > 0)
            .map(|s| (s.course, s.count))
            .collect::<BTreeMap<_, _>>();
        assert_eq!(
            counts,
            btreemap! {
                Course::Starters => 1,
                Course::Mains => 2,
                Course::Desserts => 1,
            }
        );
        assert_eq!(
            summary.course(Course::Mains).map(|s| s.average),
            Some(Average(Some(price("35"))))
        );
        assert_eq!(
            summary.course(Course::Salad).map(|s| s.average.to_string()),
            Some("N/A".to_string())
        );
        let recent = summary.recent.iter().map(|i| i.dish_name()).collect::<Vec<_>>();
        assert_eq!(recent, vec!["Steak", "Tart", "Fish"]);
    }

    #[test]
    fn summary_of_empty_menu() {
        let summary = MenuSummary::of(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average, Average(None));
        assert!(summary.recent.is_empty());
        assert!(summary.courses.iter().all(|s| s.count == 0));
    }
}
