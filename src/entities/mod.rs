pub mod movie;
pub mod movie_genre;
pub mod movie_person;
pub mod person;
pub mod review;
