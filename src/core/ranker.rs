use crate::models::{Coordinate, Location};

/// Anything with an optional position on the globe
pub trait Located {
    fn coordinate(&self) -> Option<Coordinate>;
}

impl Located for Location {
    fn coordinate(&self) -> Option<Coordinate> {
        Location::coordinate(self)
    }
}

/// An item annotated with its distance from the ranking origin
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Output of [`rank_by_distance`]
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<T> {
    /// Items with a usable coordinate, nearest first
    pub ranked: Vec<Ranked<T>>,
    /// Items without a usable coordinate, in input order
    pub unranked: Vec<T>,
}

impl<T> Ranking<T> {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty() && self.unranked.is_empty()
    }
}

/// Annotate every item with its haversine distance from `origin` and sort
/// ascending
///
/// The sort is stable, so items at equal distance keep their input order.
/// Items with a missing or out-of-range coordinate are not ranked and come
/// back in `unranked`.
pub fn rank_by_distance<T, I>(origin: Coordinate, items: I) -> Ranking<T>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let mut ranked = Vec::new();
    let mut unranked = Vec::new();

    for item in items {
        match item.coordinate() {
            Some(position) => {
                let distance_km = origin.distance_to(&position);
                ranked.push(Ranked { item, distance_km });
            }
            None => unranked.push(item),
        }
    }

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    if !unranked.is_empty() {
        tracing::debug!("{} items without coordinates left unranked", unranked.len());
    }

    Ranking { ranked, unranked }
}
