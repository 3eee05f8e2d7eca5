use crate::models::{Category, Location};

/// Anything that belongs to a location category
pub trait Categorized {
    fn category(&self) -> Category;
}

impl Categorized for Location {
    #[inline]
    fn category(&self) -> Category {
        self.category
    }
}

impl<T: Categorized> Categorized for super::ranker::Ranked<T> {
    #[inline]
    fn category(&self) -> Category {
        self.item.category()
    }
}

/// Keep only items in `category`, preserving order
///
/// `None` is the "all categories" selection and keeps everything.
pub fn filter_by_category<T: Categorized>(items: Vec<T>, category: Option<Category>) -> Vec<T> {
    match category {
        None => items,
        Some(wanted) => items.into_iter().filter(|i| i.category() == wanted).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Spot(&'static str, Category);

    impl Categorized for Spot {
        fn category(&self) -> Category {
            self.1
        }
    }

    #[test]
    fn test_filter_keeps_order() {
        let spots = vec![
            Spot("a", Category::Beach),
            Spot("b", Category::Park),
            Spot("c", Category::Beach),
        ];

        let beaches = filter_by_category(spots, Some(Category::Beach));
        let names: Vec<_> = beaches.iter().map(|s| s.0).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_no_category_keeps_all() {
        let spots = vec![Spot("a", Category::Cafe), Spot("b", Category::Trail)];
        assert_eq!(filter_by_category(spots, None).len(), 2);
    }
}
