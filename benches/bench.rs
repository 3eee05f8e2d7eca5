// Criterion benchmarks for SniffLocal

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use snifflocal::core::{
    distance::haversine_distance, feed::merge_feed, filters::filter_by_category,
    ranker::rank_by_distance,
};
use snifflocal::models::{Category, Coordinate, FeedActivity, FeedItem, Location, LocationRef};
use uuid::Uuid;

fn create_location(id: usize, lat: f64, lon: f64) -> Location {
    let category = Category::ALL[id % Category::ALL.len()];
    Location {
        id: Uuid::new_v4(),
        name: format!("Spot {}", id),
        description: None,
        latitude: Some(lat),
        longitude: Some(lon),
        address: None,
        category,
        created_by: None,
        created_at: Utc::now(),
        average_rating: (id % 5) as f64,
        total_ratings: (id % 17) as i64,
    }
}

fn create_feed_items(count: usize, photos: bool) -> Vec<FeedItem> {
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let activity = if photos {
                FeedActivity::Photo {
                    photo_url: format!("https://cdn.test/{}.jpg", i),
                    caption: None,
                }
            } else {
                FeedActivity::Rating { rating: (i % 5 + 1) as u8, comment: None }
            };
            FeedItem {
                id: Uuid::new_v4(),
                author: None,
                location: LocationRef { id: Uuid::new_v4(), name: format!("Spot {}", i) },
                created_at: start + Duration::seconds((i * 37 % 9973) as i64),
                activity,
            }
        })
        .collect()
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(52.3676),
                black_box(4.9041),
                black_box(52.37),
                black_box(4.89),
            )
        });
    });
}

fn bench_ranking(c: &mut Criterion) {
    let origin = Coordinate::new(52.3676, 4.9041).unwrap();

    let mut group = c.benchmark_group("ranking");

    for location_count in [10, 100, 1000, 5000].iter() {
        let locations: Vec<Location> = (0..*location_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.0007) % 0.5;
                let lon_offset = (i as f64 * 0.0013) % 0.5;
                create_location(i, 52.1 + lat_offset, 4.7 + lon_offset)
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::new("rank_by_distance", location_count),
            location_count,
            |b, _| {
                b.iter(|| rank_by_distance(black_box(origin), black_box(locations.clone())));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("rank_then_filter", location_count),
            location_count,
            |b, _| {
                b.iter(|| {
                    let ranking = rank_by_distance(origin, locations.clone());
                    black_box(filter_by_category(ranking.ranked, Some(Category::Park)))
                });
            },
        );
    }

    group.finish();
}

fn bench_feed_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_merge");

    for per_source in [20, 100, 500].iter() {
        let ratings = create_feed_items(*per_source, false);
        let photos = create_feed_items(*per_source, true);

        group.bench_with_input(
            BenchmarkId::new("merge_feed", per_source),
            per_source,
            |b, _| {
                b.iter(|| {
                    merge_feed::<String>(
                        black_box(Ok(ratings.clone())),
                        black_box(Ok(photos.clone())),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_haversine_distance, bench_ranking, bench_feed_merge);

criterion_main!(benches);
