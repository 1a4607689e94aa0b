//! Catalog record types.
//!
//! These mirror the JSON documents served by the catalog. Only `url` and the
//! display name carry meaning for the pagination core, every other field is
//! payload for detail views.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Pagination envelope
// ---------------------------------------------------------------------------

/// One page of a category listing or a filtered search.
///
/// `next` is `None` iff this is the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Envelope<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Envelope<U> {
        Envelope {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Film {
    pub title: String,
    pub episode_id: u32,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub characters: Vec<String>,
    pub planets: Vec<String>,
    pub starships: Vec<String>,
    pub vehicles: Vec<String>,
    pub species: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub films: Vec<String>,
    pub species: Vec<String>,
    pub vehicles: Vec<String>,
    pub starships: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Species {
    pub name: String,
    pub classification: String,
    pub designation: String,
    pub average_height: String,
    pub skin_colors: String,
    pub hair_colors: String,
    pub eye_colors: String,
    pub average_lifespan: String,
    /// Some species have no homeworld, the API sends `null`.
    pub homeworld: Option<String>,
    pub language: String,
    pub people: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    pub name: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    pub surface_water: String,
    pub population: String,
    pub residents: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Starship {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub cost_in_credits: String,
    pub length: String,
    pub max_atmosphering_speed: String,
    pub crew: String,
    pub passengers: String,
    pub cargo_capacity: String,
    pub consumables: String,
    pub hyperdrive_rating: String,
    #[serde(rename = "MGLT")]
    pub mglt: String,
    pub starship_class: String,
    pub pilots: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub cost_in_credits: String,
    pub length: String,
    pub max_atmosphering_speed: String,
    pub crew: String,
    pub passengers: String,
    pub cargo_capacity: String,
    pub consumables: String,
    pub vehicle_class: String,
    pub pilots: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
}

/// Any record served by the catalog.
///
/// Serializes as the bare inner document. There is no `Deserialize` impl,
/// decoding always goes through [Category::decode_envelope] or
/// [Category::decode_record] which know the concrete type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Film(Film),
    Person(Person),
    Species(Species),
    Planet(Planet),
    Starship(Starship),
    Vehicle(Vehicle),
}

impl Record {
    /// Canonical identifier of the entity.
    pub fn url(&self) -> &str {
        match self {
            Record::Film(film) => &film.url,
            Record::Person(person) => &person.url,
            Record::Species(species) => &species.url,
            Record::Planet(planet) => &planet.url,
            Record::Starship(starship) => &starship.url,
            Record::Vehicle(vehicle) => &vehicle.url,
        }
    }

    /// Human facing name, the title for films.
    pub fn display_name(&self) -> &str {
        match self {
            Record::Film(film) => &film.title,
            Record::Person(person) => &person.name,
            Record::Species(species) => &species.name,
            Record::Planet(planet) => &planet.name,
            Record::Starship(starship) => &starship.name,
            Record::Vehicle(vehicle) => &vehicle.name,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Record::Film(_) => Category::Films,
            Record::Person(_) => Category::People,
            Record::Species(_) => Category::Species,
            Record::Planet(_) => Category::Planets,
            Record::Starship(_) => Category::Starships,
            Record::Vehicle(_) => Category::Vehicles,
        }
    }

    /// Two records describe the same entity iff their urls match.
    pub fn same_entity(&self, other: &Record) -> bool {
        self.url() == other.url()
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// The six kinds of catalog entities.
///
/// Each variant selects its endpoint, its display title and the concrete
/// record type its envelopes decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Films,
    People,
    Species,
    Planets,
    Starships,
    Vehicles,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category '{0}', expected one of: films, people, species, planets, starships, vehicles")]
pub struct UnknownCategory(pub String);

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Films,
        Category::People,
        Category::Species,
        Category::Planets,
        Category::Starships,
        Category::Vehicles,
    ];

    /// Path segment of the category endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Films => "films",
            Category::People => "people",
            Category::Species => "species",
            Category::Planets => "planets",
            Category::Starships => "starships",
            Category::Vehicles => "vehicles",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Films => "Films",
            Category::People => "People",
            Category::Species => "Species",
            Category::Planets => "Planets",
            Category::Starships => "Starships",
            Category::Vehicles => "Vehicles",
        }
    }

    /// Decode one page of this category.
    pub fn decode_envelope<'de, D>(self, deserializer: D) -> Result<Envelope<Record>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let envelope = match self {
            Category::Films => Envelope::<Film>::deserialize(deserializer)?.map(Record::Film),
            Category::People => Envelope::<Person>::deserialize(deserializer)?.map(Record::Person),
            Category::Species => {
                Envelope::<Species>::deserialize(deserializer)?.map(Record::Species)
            },
            Category::Planets => Envelope::<Planet>::deserialize(deserializer)?.map(Record::Planet),
            Category::Starships => {
                Envelope::<Starship>::deserialize(deserializer)?.map(Record::Starship)
            },
            Category::Vehicles => {
                Envelope::<Vehicle>::deserialize(deserializer)?.map(Record::Vehicle)
            },
        };
        Ok(envelope)
    }

    /// Decode a single record of this category.
    pub fn decode_record<'de, D>(self, deserializer: D) -> Result<Record, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = match self {
            Category::Films => Record::Film(Film::deserialize(deserializer)?),
            Category::People => Record::Person(Person::deserialize(deserializer)?),
            Category::Species => Record::Species(Species::deserialize(deserializer)?),
            Category::Planets => Record::Planet(Planet::deserialize(deserializer)?),
            Category::Starships => Record::Starship(Starship::deserialize(deserializer)?),
            Category::Vehicles => Record::Vehicle(Vehicle::deserialize(deserializer)?),
        };
        Ok(record)
    }

    /// Put a freshly fetched listing page into display order.
    ///
    /// Films are listed by episode, everything else keeps server order.
    pub fn order_page(self, records: &mut [Record]) {
        if self == Category::Films {
            records.sort_by_key(|record| match record {
                Record::Film(film) => film.episode_id,
                _ => u32::MAX,
            });
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts the endpoint id or the title, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| {
                category.endpoint().eq_ignore_ascii_case(needle)
                    || category.title().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
