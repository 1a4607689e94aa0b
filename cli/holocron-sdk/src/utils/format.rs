//! Text helpers for search input and record detail views.

use chrono::{DateTime, NaiveDate, Utc};
use holocron_catalog::Record;

const DATE_FORMAT: &str = "%B %-d, %Y";

/// Extract the numeric id from a record url.
///
/// `https://swapi.dev/api/films/2/` -> `2`
pub fn id_from_url(url: &str) -> Option<u32> {
    url.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .and_then(|segment| segment.parse().ok())
}

/// Lowercase, drop everything but letters, digits and whitespace, then
/// collapse whitespace runs into single spaces.
pub fn normalize_query(query: &str) -> String {
    let kept = query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a catalog value carries no information.
pub fn is_unknown(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("n/a") || value.eq_ignore_ascii_case("unknown")
}

/// Group the digits of an integer value by thousands.
///
/// Anything that is not an integer is returned unchanged.
pub fn group_digits(value: &str) -> String {
    let Ok(number) = value.trim().parse::<i64>() else {
        return value.to_string();
    };

    let digits = number.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if number < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// `"172", "cm"` -> `"172 cm"`, unknown values are kept as they are.
pub fn with_unit(value: &str, unit: &str) -> String {
    if is_unknown(value) {
        return value.to_string();
    }
    format!("{} {unit}", group_digits(value))
}

fn percentage(value: &str) -> String {
    if is_unknown(value) {
        return value.to_string();
    }
    format!("{value}%")
}

/// Roman numeral for 1..=3999, plain decimal otherwise.
pub fn roman_numeral(value: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    if !(1..=3999).contains(&value) {
        return value.to_string();
    }

    let mut remaining = value;
    let mut numeral = String::new();
    for (amount, symbol) in NUMERALS {
        while remaining >= amount {
            numeral.push_str(symbol);
            remaining -= amount;
        }
    }
    numeral
}

/// Human readable form of a calendar date or an RFC 3339 timestamp.
pub fn format_date(value: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.format(DATE_FORMAT).to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.with_timezone(&Utc).format(DATE_FORMAT).to_string();
    }
    value.to_string()
}

/// Labelled rows for a record detail view.
pub fn describe(record: &Record) -> Vec<(&'static str, String)> {
    match record {
        Record::Film(film) => vec![
            ("Episode", roman_numeral(film.episode_id)),
            ("Director", film.director.clone()),
            ("Producer", film.producer.clone()),
            ("Release date", format_date(&film.release_date)),
            ("Characters", film.characters.len().to_string()),
            ("Planets", film.planets.len().to_string()),
        ],
        Record::Person(person) => vec![
            ("Birth year", person.birth_year.clone()),
            ("Gender", person.gender.clone()),
            ("Height", with_unit(&person.height, "cm")),
            ("Mass", with_unit(&person.mass, "kg")),
            ("Hair color", person.hair_color.clone()),
            ("Skin color", person.skin_color.clone()),
            ("Eye color", person.eye_color.clone()),
            ("Films", person.films.len().to_string()),
        ],
        Record::Species(species) => vec![
            ("Classification", species.classification.clone()),
            ("Designation", species.designation.clone()),
            ("Language", species.language.clone()),
            ("Average height", with_unit(&species.average_height, "cm")),
            ("Average lifespan", with_unit(&species.average_lifespan, "years")),
            ("Skin colors", species.skin_colors.clone()),
            ("Hair colors", species.hair_colors.clone()),
            ("Eye colors", species.eye_colors.clone()),
        ],
        Record::Planet(planet) => vec![
            ("Climate", planet.climate.clone()),
            ("Terrain", planet.terrain.clone()),
            ("Gravity", planet.gravity.clone()),
            ("Diameter", with_unit(&planet.diameter, "km")),
            ("Rotation period", with_unit(&planet.rotation_period, "hours")),
            ("Orbital period", with_unit(&planet.orbital_period, "days")),
            ("Surface water", percentage(&planet.surface_water)),
            ("Population", group_digits(&planet.population)),
        ],
        Record::Starship(starship) => vec![
            ("Model", starship.model.clone()),
            ("Class", starship.starship_class.clone()),
            ("Manufacturer", starship.manufacturer.clone()),
            ("Cost", with_unit(&starship.cost_in_credits, "credits")),
            ("Length", with_unit(&starship.length, "m")),
            ("Max speed", with_unit(&starship.max_atmosphering_speed, "km/h")),
            ("Crew", group_digits(&starship.crew)),
            ("Passengers", group_digits(&starship.passengers)),
            ("Cargo capacity", with_unit(&starship.cargo_capacity, "kg")),
            ("Consumables", starship.consumables.clone()),
            ("Hyperdrive rating", starship.hyperdrive_rating.clone()),
            ("MGLT", starship.mglt.clone()),
        ],
        Record::Vehicle(vehicle) => vec![
            ("Model", vehicle.model.clone()),
            ("Class", vehicle.vehicle_class.clone()),
            ("Manufacturer", vehicle.manufacturer.clone()),
            ("Cost", with_unit(&vehicle.cost_in_credits, "credits")),
            ("Length", with_unit(&vehicle.length, "m")),
            ("Max speed", with_unit(&vehicle.max_atmosphering_speed, "km/h")),
            ("Crew", group_digits(&vehicle.crew)),
            ("Passengers", group_digits(&vehicle.passengers)),
            ("Cargo capacity", with_unit(&vehicle.cargo_capacity, "kg")),
            ("Consumables", vehicle.consumables.clone()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use holocron_catalog::types::{Film, Planet};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn id_is_last_path_segment() {
        assert_eq!(id_from_url("https://swapi.dev/api/films/2/"), Some(2));
        assert_eq!(id_from_url("https://swapi.dev/api/people/17"), Some(17));
        assert_eq!(id_from_url("https://swapi.dev/api/people/"), None);
        assert_eq!(id_from_url(""), None);
    }

    #[test]
    fn query_normalization() {
        assert_eq!(normalize_query("  Luke Sky-walker! "), "luke skywalker");
        assert_eq!(normalize_query("C-3PO"), "c3po");
        assert_eq!(normalize_query("???"), "");
    }

    #[test]
    fn punctuation_beside_whitespace_leaves_no_gaps() {
        assert_eq!(normalize_query("Luke ?"), "luke");
        assert_eq!(normalize_query("Darth - Vader"), "darth vader");
        assert_eq!(normalize_query("\tObi-Wan\u{2000} Kenobi \n"), "obiwan kenobi");
    }

    #[test]
    fn letters_outside_ascii_are_kept() {
        assert_eq!(normalize_query("Padmé Amidala"), "padmé amidala");
        assert_eq!(normalize_query("ÉCLIPSE"), "éclipse");
    }

    #[test]
    fn unknown_values() {
        assert!(is_unknown(""));
        assert!(is_unknown("n/a"));
        assert!(is_unknown("Unknown"));
        assert!(!is_unknown("172"));
    }

    #[test]
    fn digits_are_grouped() {
        assert_eq!(group_digits("200000"), "200,000");
        assert_eq!(group_digits("1000000000000"), "1,000,000,000,000");
        assert_eq!(group_digits("999"), "999");
        assert_eq!(group_digits("-1234"), "-1,234");
        assert_eq!(group_digits("1.5"), "1.5");
        assert_eq!(group_digits("unknown"), "unknown");
    }

    #[test]
    fn units_are_appended_to_known_values() {
        assert_eq!(with_unit("172", "cm"), "172 cm");
        assert_eq!(with_unit("1358", "kg"), "1,358 kg");
        assert_eq!(with_unit("unknown", "kg"), "unknown");
        assert_eq!(with_unit("n/a", "years"), "n/a");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(roman_numeral(4), "IV");
        assert_eq!(roman_numeral(6), "VI");
        assert_eq!(roman_numeral(1977), "MCMLXXVII");
        assert_eq!(roman_numeral(0), "0");
        assert_eq!(roman_numeral(4000), "4000");
    }

    #[test]
    fn dates_are_formatted() {
        assert_eq!(format_date("1977-05-25"), "May 25, 1977");
        assert_eq!(format_date("2014-12-10T14:23:31.880000Z"), "December 10, 2014");
        assert_eq!(format_date("a long time ago"), "a long time ago");
    }

    #[test]
    fn film_details() {
        let film = Record::Film(Film {
            title: "A New Hope".to_string(),
            episode_id: 4,
            director: "George Lucas".to_string(),
            release_date: "1977-05-25".to_string(),
            characters: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        });
        let rows = describe(&film);
        assert_eq!(rows[0], ("Episode", "IV".to_string()));
        assert_eq!(rows[1], ("Director", "George Lucas".to_string()));
        assert_eq!(rows[3], ("Release date", "May 25, 1977".to_string()));
        assert_eq!(rows[4], ("Characters", "2".to_string()));
    }

    #[test]
    fn planet_details() {
        let planet = Record::Planet(Planet {
            name: "Tatooine".to_string(),
            diameter: "10465".to_string(),
            surface_water: "1".to_string(),
            population: "200000".to_string(),
            rotation_period: "unknown".to_string(),
            ..Default::default()
        });
        let rows = describe(&planet);
        let get = |label: &str| {
            rows.iter()
                .find(|(row, _)| *row == label)
                .map(|(_, value)| value.as_str())
        };
        assert_eq!(get("Diameter"), Some("10,465 km"));
        assert_eq!(get("Surface water"), Some("1%"));
        assert_eq!(get("Population"), Some("200,000"));
        assert_eq!(get("Rotation period"), Some("unknown"));
    }

    proptest! {
        #[test]
        fn grouping_round_trips(number in any::<i64>()) {
            let grouped = group_digits(&number.to_string());
            prop_assert_eq!(grouped.replace(',', "").parse::<i64>().unwrap(), number);
        }

        #[test]
        fn normalized_query_is_idempotent(query in "\\PC{0,24}") {
            let once = normalize_query(&query);
            prop_assert_eq!(normalize_query(&once), once.clone());
        }
    }
}
