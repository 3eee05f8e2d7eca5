// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod rows;

pub use domain::{
    AuthorSummary, Category, Coordinate, CoordinateError, FavoriteList, FeedActivity, FeedItem,
    FeedSource, FriendStatus, ListMembership, Location, LocationRef, Photo, Rating,
};
pub use requests::{
    AddToListRequest, CreateListRequest, CreateLocationRequest, LocationsQuery, PhotoUploadQuery,
    SubmitRatingRequest,
};
pub use responses::{
    CategoriesResponse, ErrorResponse, FeedResponse, HealthResponse, ListLocationsResponse,
    ListsResponse, LocationDetailResponse, LocationView, LocationsResponse, MembershipResponse,
    PhotoResponse, RatingResponse,
};
pub use rows::{PhotoWithAuthor, RatingWithAuthor};
