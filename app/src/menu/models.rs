use std::fmt;
use std::str::FromStr;

use err_derive::Error;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use infra::ids::{Entity, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Course {
    Starters,
    Mains,
    Desserts,
    Appetizer,
    #[serde(rename = "Hors D'Oeuvres", alias = "Hors D-Oeuvres")]
    HorsDOeuvres,
    #[serde(rename = "Amuse-Bouche")]
    AmuseBouche,
    Soup,
    Salad,
    Sorbet,
    Prosecco,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(display = "unknown course: {:?}", _0)]
pub struct UnknownCourse(pub String);

/// Largest accepted price, in cents. Prices are stored as JSON numbers of
/// currency units, which stay exact up to here.
pub const MAX_CENTS: u64 = 1_000_000_000_000;

/// A positive amount of money, held in cents, at most [`MAX_CENTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error(display = "price is empty")]
    Empty,
    #[error(display = "not a price: {:?}", _0)]
    Malformed(String),
    #[error(display = "price must be greater than 0")]
    NotPositive,
    #[error(display = "price has more than two decimal places: {:?}", _0)]
    TooPrecise(String),
    #[error(display = "price must not exceed {}", _0)]
    TooLarge(Price),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(display = "dish name must not be empty")]
    EmptyDishName,
    #[error(display = "description must not be empty")]
    EmptyDescription,
}

/// The caller-supplied part of a menu item; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDraft {
    pub dish_name: String,
    pub description: String,
    pub course: Course,
    pub price: Price,
}

/// Items added here get generated ids. Records written by earlier versions
/// of the app carry other strings (e.g. a millisecond timestamp); those are
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MenuItemId {
    Generated(Id<MenuItem>),
    Legacy(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(display = "menu item id must not be empty")]
pub struct EmptyId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub(crate) id: MenuItemId,
    pub(crate) dish_name: String,
    pub(crate) description: String,
    pub(crate) course: Course,
    pub(crate) price: Price,
}

impl Course {
    pub const ALL: [Course; 10] = [
        Course::Starters,
        Course::Mains,
        Course::Desserts,
        Course::Appetizer,
        Course::HorsDOeuvres,
        Course::AmuseBouche,
        Course::Soup,
        Course::Salad,
        Course::Sorbet,
        Course::Prosecco,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Course::Starters => "Starters",
            Course::Mains => "Mains",
            Course::Desserts => "Desserts",
            Course::Appetizer => "Appetizer",
            Course::HorsDOeuvres => "Hors D'Oeuvres",
            Course::AmuseBouche => "Amuse-Bouche",
            Course::Soup => "Soup",
            Course::Salad => "Salad",
            Course::Sorbet => "Sorbet",
            Course::Prosecco => "Prosecco",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for Course {
    type Err = UnknownCourse;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let name = src.trim();
        if name.eq_ignore_ascii_case("Hors D-Oeuvres") {
            return Ok(Course::HorsDOeuvres);
        }
        Course::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownCourse(src.to_string()))
    }
}

impl Price {
    pub const MAX: Price = Price { cents: MAX_CENTS };

    pub fn from_cents(cents: u64) -> Result<Self, PriceError> {
        if cents == 0 {
            return Err(PriceError::NotPositive);
        }
        if cents > MAX_CENTS {
            return Err(PriceError::TooLarge(Price::MAX));
        }
        Ok(Price { cents })
    }

    pub fn cents(&self) -> u64 {
        self.cents
    }

    pub fn as_units(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Mean of some prices, rounded half-up to the cent; `None` when there
    /// is nothing to average.
    pub fn average<I: IntoIterator<Item = Price>>(prices: I) -> Option<Price> {
        let (sum, count) = prices
            .into_iter()
            .fold((0u128, 0u128), |(sum, count), p| {
                (sum + u128::from(p.cents), count + 1)
            });
        if count == 0 {
            return None;
        }
        let cents = (sum * 2 + count) / (count * 2);
        Some(Price {
            cents: cents as u64,
        })
    }

    fn from_units(units: f64) -> Result<Self, PriceError> {
        if !units.is_finite() {
            return Err(PriceError::Malformed(units.to_string()));
        }
        let cents = (units * 100.0).round();
        if cents < 1.0 {
            return Err(PriceError::NotPositive);
        }
        if cents > MAX_CENTS as f64 {
            return Err(PriceError::TooLarge(Price::MAX));
        }
        Price::from_cents(cents as u64)
    }
}

impl FromStr for Price {
    type Err = PriceError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let text = src.trim();
        if text.is_empty() {
            return Err(PriceError::Empty);
        }
        let malformed = || PriceError::Malformed(src.to_string());

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, frac) = match unsigned.find('.') {
            Some(dot) => (&unsigned[..dot], &unsigned[dot + 1..]),
            None => (unsigned, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(malformed());
        }
        if frac.len() > 2 {
            return Err(PriceError::TooPrecise(src.to_string()));
        }
        if negative {
            return Err(PriceError::NotPositive);
        }
        let too_large = || PriceError::TooLarge(Price::MAX);

        let units = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| too_large())?
        };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| malformed())? * 10,
            _ => frac.parse::<u64>().map_err(|_| malformed())?,
        };
        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .ok_or_else(too_large)?;
        Price::from_cents(cents)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

// Stored as a plain number of currency units, the way the menu record has
// always been written.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_units())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let units = f64::deserialize(deserializer)?;
        Price::from_units(units).map_err(de::Error::custom)
    }
}

impl From<Id<MenuItem>> for MenuItemId {
    fn from(id: Id<MenuItem>) -> Self {
        MenuItemId::Generated(id)
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MenuItemId::Generated(id) => fmt::Display::fmt(id, fmt),
            MenuItemId::Legacy(s) => fmt.write_str(s),
        }
    }
}

impl FromStr for MenuItemId {
    type Err = EmptyId;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if src.is_empty() {
            return Err(EmptyId);
        }
        Ok(match src.parse::<Id<MenuItem>>() {
            Ok(id) => MenuItemId::Generated(id),
            Err(_) => MenuItemId::Legacy(src.to_string()),
        })
    }
}

impl Serialize for MenuItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MenuItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

impl MenuDraft {
    /// Trims the free-text fields and rejects any left empty.
    pub fn validate(self) -> Result<MenuDraft, ValidationError> {
        let dish_name = self.dish_name.trim();
        if dish_name.is_empty() {
            return Err(ValidationError::EmptyDishName);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(MenuDraft {
            dish_name: dish_name.to_string(),
            description: description.to_string(),
            course: self.course,
            price: self.price,
        })
    }
}

impl MenuItem {
    pub(crate) fn from_draft(id: MenuItemId, draft: MenuDraft) -> Self {
        let MenuDraft {
            dish_name,
            description,
            course,
            price,
        } = draft;
        MenuItem {
            id,
            dish_name,
            description,
            course,
            price,
        }
    }

    pub fn id(&self) -> &MenuItemId {
        &self.id
    }
    pub fn dish_name(&self) -> &str {
        &self.dish_name
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn course(&self) -> Course {
        self.course
    }
    pub fn price(&self) -> Price {
        self.price
    }
}

impl Entity for MenuItem {
    const PREFIX: &'static str = "dish";
}

#[cfg(test)]
mod test {
    use super::*;
    use infra::ids::IdGen;
    use serde_json::json;

    fn price(s: &str) -> Price {
        s.parse().expect("price")
    }

    #[test]
    fn courses_keep_menu_order() {
        let names = Course::ALL.iter().map(|c| c.name()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "Starters",
                "Mains",
                "Desserts",
                "Appetizer",
                "Hors D'Oeuvres",
                "Amuse-Bouche",
                "Soup",
                "Salad",
                "Sorbet",
                "Prosecco"
            ]
        );
        let mut sorted = Course::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Course::ALL.to_vec());
    }

    #[test]
    fn parses_course_names_loosely() {
        assert_eq!("mains".parse::<Course>(), Ok(Course::Mains));
        assert_eq!(" Amuse-Bouche ".parse::<Course>(), Ok(Course::AmuseBouche));
        assert_eq!("hors d'oeuvres".parse::<Course>(), Ok(Course::HorsDOeuvres));
        assert_eq!("Hors D-Oeuvres".parse::<Course>(), Ok(Course::HorsDOeuvres));
        assert_eq!(
            "Brunch".parse::<Course>(),
            Err(UnknownCourse("Brunch".to_string()))
        );
    }

    #[test]
    fn reads_legacy_course_spelling() {
        let course: Course = serde_json::from_value(json!("Hors D-Oeuvres")).expect("decode");
        assert_eq!(course, Course::HorsDOeuvres);
        assert_eq!(
            serde_json::to_value(&course).expect("encode"),
            json!("Hors D'Oeuvres")
        );
    }

    #[test]
    fn parses_prices() {
        assert_eq!(price("50").cents(), 5000);
        assert_eq!(price("50.5").cents(), 5050);
        assert_eq!(price(" 50.05 ").cents(), 5005);
        assert_eq!(price(".75").cents(), 75);
        assert_eq!(price("12.").cents(), 1200);
    }

    #[test]
    fn rejects_bad_prices() {
        assert_eq!("".parse::<Price>(), Err(PriceError::Empty));
        assert_eq!("   ".parse::<Price>(), Err(PriceError::Empty));
        assert_eq!("0".parse::<Price>(), Err(PriceError::NotPositive));
        assert_eq!("0.00".parse::<Price>(), Err(PriceError::NotPositive));
        assert_eq!("-3".parse::<Price>(), Err(PriceError::NotPositive));
        assert_eq!(
            "abc".parse::<Price>(),
            Err(PriceError::Malformed("abc".to_string()))
        );
        assert_eq!(
            "1.2.3".parse::<Price>(),
            Err(PriceError::Malformed("1.2.3".to_string()))
        );
        assert_eq!(
            "9.999".parse::<Price>(),
            Err(PriceError::TooPrecise("9.999".to_string()))
        );
    }

    #[test]
    fn rejects_prices_above_the_ceiling() {
        let too_large = Err(PriceError::TooLarge(Price::MAX));
        assert_eq!("10000000000.01".parse::<Price>(), too_large);
        assert_eq!("90071992547409.93".parse::<Price>(), too_large);
        assert_eq!("184467440737095516.15".parse::<Price>(), too_large);
        assert_eq!("99999999999999999999999".parse::<Price>(), too_large);
        assert_eq!(Price::from_cents(MAX_CENTS + 1), too_large);
        assert!(serde_json::from_value::<Price>(json!(1e11)).is_err());
    }

    #[test]
    fn largest_prices_survive_storage() {
        assert_eq!(price("10000000000.00"), Price::MAX);
        for text in &["10000000000.00", "9999999999.99", "1234567890.01", "0.01"] {
            let original = price(text);
            let json = serde_json::to_string(&original).expect("encode");
            let decoded: Price = serde_json::from_str(&json).expect("decode");
            assert_eq!(decoded, original, "{} stored as {}", text, json);
        }
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(price("50").to_string(), "50.00");
        assert_eq!(price("7.5").to_string(), "7.50");
        assert_eq!(price("0.05").to_string(), "0.05");
    }

    #[test]
    fn averages_round_half_up() {
        assert_eq!(Price::average(vec![]), None);
        assert_eq!(
            Price::average(vec![price("50"), price("30")]),
            Some(price("40"))
        );
        assert_eq!(
            Price::average(vec![price("10.00"), price("10.01")]),
            Some(price("10.01"))
        );
        assert_eq!(
            Price::average(vec![price("1"), price("1"), price("1.01")]),
            Some(price("1"))
        );
    }

    #[test]
    fn price_is_stored_as_units() {
        assert_eq!(serde_json::to_value(&price("50")).expect("encode"), json!(50.0));
        let decoded: Price = serde_json::from_value(json!(12.344)).expect("decode");
        assert_eq!(decoded, price("12.34"));
        let decoded: Price = serde_json::from_value(json!(30)).expect("decode");
        assert_eq!(decoded, price("30"));
        assert!(serde_json::from_value::<Price>(json!(0)).is_err());
        assert!(serde_json::from_value::<Price>(json!(-4.5)).is_err());
    }

    #[test]
    fn item_ids_keep_foreign_strings() {
        let generated = IdGen::new().generate::<MenuItem>();
        let parsed = generated.to_string().parse::<MenuItemId>().expect("parse");
        assert_eq!(parsed, MenuItemId::Generated(generated));

        let legacy = "1700000000000".parse::<MenuItemId>().expect("parse");
        assert_eq!(legacy, MenuItemId::Legacy("1700000000000".to_string()));
        assert_eq!(serde_json::to_value(&legacy).expect("encode"), json!("1700000000000"));

        assert_eq!("".parse::<MenuItemId>(), Err(EmptyId));
        assert!(serde_json::from_value::<MenuItemId>(json!("")).is_err());
    }

    #[test]
    fn validation_trims_text() {
        let draft = MenuDraft {
            dish_name: "  Soup ".into(),
            description: " Hot soup".into(),
            course: Course::Starters,
            price: price("50"),
        };
        let valid = draft.validate().expect("valid");
        assert_eq!(valid.dish_name, "Soup");
        assert_eq!(valid.description, "Hot soup");
    }

    #[test]
    fn validation_rejects_blank_text() {
        let draft = MenuDraft {
            dish_name: "   ".into(),
            description: "Hot soup".into(),
            course: Course::Starters,
            price: price("50"),
        };
        assert_eq!(draft.validate(), Err(ValidationError::EmptyDishName));

        let draft = MenuDraft {
            dish_name: "Soup".into(),
            description: "".into(),
            course: Course::Starters,
            price: price("50"),
        };
        assert_eq!(draft.validate(), Err(ValidationError::EmptyDescription));
    }
}
