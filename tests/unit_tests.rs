// Unit tests for SniffLocal ranking and feed merging

use chrono::{DateTime, Duration, TimeZone, Utc};
use snifflocal::core::{
    distance::{format_distance, haversine_distance},
    feed::merge_feed,
    filters::filter_by_category,
    ranker::rank_by_distance,
};
use snifflocal::models::{Category, Coordinate, FeedActivity, FeedItem, FeedSource, Location, LocationRef};
use uuid::Uuid;

fn location(name: &str, lat: Option<f64>, lng: Option<f64>, category: Category) -> Location {
    Location {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        latitude: lat,
        longitude: lng,
        address: None,
        category,
        created_by: None,
        created_at: Utc::now(),
        average_rating: 0.0,
        total_ratings: 0,
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn rating_item(offset_secs: i64) -> FeedItem {
    FeedItem {
        id: Uuid::new_v4(),
        author: None,
        location: LocationRef { id: Uuid::new_v4(), name: "Dog Beach".to_string() },
        created_at: base_time() + Duration::seconds(offset_secs),
        activity: FeedActivity::Rating { rating: 4, comment: Some("Lots of space".to_string()) },
    }
}

fn photo_item(offset_secs: i64) -> FeedItem {
    FeedItem {
        id: Uuid::new_v4(),
        author: None,
        location: LocationRef { id: Uuid::new_v4(), name: "Bark Park".to_string() },
        created_at: base_time() + Duration::seconds(offset_secs),
        activity: FeedActivity::Photo {
            photo_url: "https://cdn.test/photo.jpg".to_string(),
            caption: None,
        },
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert_eq!(distance, 0.0);
}

#[test]
fn test_haversine_known_fixture() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
    assert!((distance - 111.19).abs() < 0.01, "expected ~111.19 km, got {}", distance);
}

#[test]
fn test_haversine_symmetric() {
    let pairs = [
        ((52.3676, 4.9041), (48.8566, 2.3522)),
        ((-33.8688, 151.2093), (35.6762, 139.6503)),
        ((0.0, 179.5), (0.0, -179.5)),
    ];

    for ((lat1, lon1), (lat2, lon2)) in pairs {
        let there = haversine_distance(lat1, lon1, lat2, lon2);
        let back = haversine_distance(lat2, lon2, lat1, lon1);
        assert!((there - back).abs() < 1e-9, "{} != {}", there, back);
    }
}

#[test]
fn test_haversine_across_antimeridian_is_short() {
    let distance = haversine_distance(0.0, 179.5, 0.0, -179.5);
    assert!(distance < 112.0, "got {}", distance);
}

#[test]
fn test_ranking_sorted_non_decreasing() {
    let origin = Coordinate::new(52.3676, 4.9041).unwrap();

    // Spread of points on a coarse grid around the origin
    let locations: Vec<Location> = (0..15)
        .flat_map(|i| {
            (0..15).map(move |j| {
                let lat = 50.0 + (i as f64) * 0.37;
                let lng = 2.0 + (j as f64) * 0.53;
                location(&format!("{}-{}", i, j), Some(lat), Some(lng), Category::Park)
            })
        })
        .collect();

    let ranking = rank_by_distance(origin, locations);
    assert_eq!(ranking.ranked.len(), 225);

    for pair in ranking.ranked.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }

    // Every annotation matches a fresh haversine computation
    for ranked in &ranking.ranked {
        let expected = haversine_distance(
            origin.latitude,
            origin.longitude,
            ranked.item.latitude.unwrap(),
            ranked.item.longitude.unwrap(),
        );
        assert_eq!(ranked.distance_km, expected);
    }
}

#[test]
fn test_ranking_excludes_missing_coordinates() {
    let origin = Coordinate::new(0.0, 0.0).unwrap();
    let locations = vec![
        location("far", Some(0.0), Some(2.0), Category::Beach),
        location("no-lat", None, Some(1.0), Category::Beach),
        location("near", Some(0.0), Some(1.0), Category::Beach),
        location("no-coords", None, None, Category::Cafe),
    ];

    let ranking = rank_by_distance(origin, locations);

    let ranked: Vec<_> = ranking.ranked.iter().map(|r| r.item.name.as_str()).collect();
    assert_eq!(ranked, vec!["near", "far"]);

    let unranked: Vec<_> = ranking.unranked.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(unranked, vec!["no-lat", "no-coords"]);
}

#[test]
fn test_category_filter_after_ranking_keeps_distance_order() {
    let origin = Coordinate::new(0.0, 0.0).unwrap();
    let locations = vec![
        location("park-far", Some(0.0), Some(3.0), Category::Park),
        location("cafe-near", Some(0.0), Some(0.5), Category::Cafe),
        location("park-near", Some(0.0), Some(1.0), Category::Park),
    ];

    let ranking = rank_by_distance(origin, locations);
    let parks = filter_by_category(ranking.ranked, Some(Category::Park));

    let names: Vec<_> = parks.iter().map(|r| r.item.name.as_str()).collect();
    assert_eq!(names, vec!["park-near", "park-far"]);
}

#[test]
fn test_zero_distance_is_displayed() {
    assert_eq!(format_distance(Some(0.0)).as_deref(), Some("0.0 km"));
    assert_eq!(format_distance(None), None);
}

#[test]
fn test_merge_empty_ratings_yields_photos() {
    let photos = vec![photo_item(10), photo_item(30), photo_item(20)];
    let expected_ids = {
        let mut sorted = photos.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.into_iter().map(|p| p.id).collect::<Vec<_>>()
    };

    let merged = merge_feed::<String>(Ok(vec![]), Ok(photos));

    let ids: Vec<_> = merged.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, expected_ids);
    assert!(merged.failed_sources.is_empty());
}

#[test]
fn test_merge_interleaved_strictly_descending_and_complete() {
    let ratings = vec![rating_item(100), rating_item(60), rating_item(20)];
    let photos = vec![photo_item(80), photo_item(40), photo_item(0)];

    let mut input_ids: Vec<Uuid> = ratings.iter().chain(photos.iter()).map(|i| i.id).collect();

    let merged = merge_feed::<String>(Ok(ratings), Ok(photos));

    for pair in merged.items.windows(2) {
        assert!(pair[0].created_at > pair[1].created_at);
    }

    let mut output_ids: Vec<Uuid> = merged.items.iter().map(|i| i.id).collect();
    input_ids.sort();
    output_ids.sort();
    assert_eq!(input_ids, output_ids);

    let sources: Vec<_> = merged.items.iter().map(|i| i.source()).collect();
    assert_eq!(
        sources,
        vec![
            FeedSource::Ratings,
            FeedSource::Photos,
            FeedSource::Ratings,
            FeedSource::Photos,
            FeedSource::Ratings,
            FeedSource::Photos,
        ]
    );
}

#[test]
fn test_merge_with_failed_source_equals_sorted_survivor() {
    let ratings = vec![rating_item(5), rating_item(50), rating_item(25)];
    let mut expected = ratings.clone();
    expected.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let merged = merge_feed(Ok(ratings), Err("photos query timed out"));

    assert_eq!(merged.items, expected);
    assert_eq!(merged.failed_sources, vec![FeedSource::Photos]);
    assert!(merged.is_degraded());
}
