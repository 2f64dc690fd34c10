use crate::models::{GeographicUnit, Lean};
use lazy_static::lazy_static;
use std::collections::HashMap;

// Electoral votes by state and congressional district, 2024 apportionment.
static ELECTORAL_VOTES: [(&str, u32); 54] = [
    ("Alabama", 9), ("Alaska", 3), ("Arizona", 11), ("Arkansas", 6), ("California", 54),
    ("Colorado", 10), ("Connecticut", 7), ("Delaware", 3), ("District of Columbia", 3),
    ("Florida", 30), ("Georgia", 16), ("Hawaii", 4), ("Idaho", 4), ("Illinois", 19),
    ("Indiana", 11), ("Iowa", 6), ("Kansas", 6), ("Kentucky", 8), ("Louisiana", 8),
    ("Maine", 2), ("Maine CD-1", 1), ("Maine CD-2", 1), ("Maryland", 10),
    ("Massachusetts", 11), ("Michigan", 15), ("Minnesota", 10), ("Mississippi", 6),
    ("Missouri", 10), ("Montana", 4), ("Nebraska", 4), ("Nebraska CD-2", 1), ("Nevada", 6),
    ("New Hampshire", 4), ("New Jersey", 14), ("New Mexico", 5), ("New York", 28),
    ("North Carolina", 16), ("North Dakota", 3), ("Ohio", 17), ("Oklahoma", 7), ("Oregon", 8),
    ("Pennsylvania", 19), ("Rhode Island", 4), ("South Carolina", 9), ("South Dakota", 3),
    ("Tennessee", 11), ("Texas", 40), ("Utah", 6), ("Vermont", 3), ("Virginia", 13),
    ("Washington", 12), ("West Virginia", 4), ("Wisconsin", 10), ("Wyoming", 3),
];

// Units assumed to favor candidate B when they have no recent polling.
// Every other unit falls back to candidate A.
static FAVORS_B_WITHOUT_POLLS: [&str; 7] = [
    "District of Columbia",
    "Hawaii",
    "Illinois",
    "New Jersey",
    "Oregon",
    "Vermont",
    "Washington",
];

lazy_static! {
    static ref PRESIDENTIAL_2024: Vec<GeographicUnit> = ELECTORAL_VOTES
        .iter()
        .map(|(name, votes)| {
            let lean = if FAVORS_B_WITHOUT_POLLS.contains(name) {
                Lean::FavorsB
            } else {
                Lean::FavorsA
            };
            GeographicUnit::new(*name, *votes, lean)
        })
        .collect();

    static ref BY_NAME: HashMap<&'static str, usize> = ELECTORAL_VOTES
        .iter()
        .enumerate()
        .map(|(index, (name, _))| (*name, index))
        .collect();
}

pub fn presidential_2024() -> &'static [GeographicUnit] {
    &PRESIDENTIAL_2024
}

pub fn find(name: &str) -> Option<&'static GeographicUnit> {
    BY_NAME.get(name).map(|index| &PRESIDENTIAL_2024[*index])
}
