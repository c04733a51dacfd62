use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{movie, movie_person, person, review};

/// Fixed genre catalog. The integer code doubles as the wire format and the
/// canonical render order for a movie's genre set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Genre {
    Action = 1,
    Comedy = 2,
    Drama = 3,
    Horror = 4,
    SciFi = 5,
    Thriller = 6,
    Fantasy = 7,
    Romance = 8,
    Animation = 9,
    Adventure = 10,
    Family = 11,
    Mystery = 12,
    War = 13,
    Western = 14,
    Crime = 15,
    Documentary = 16,
    Biography = 17,
    History = 18,
}

impl Genre {
    pub fn as_code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Genre::Action),
            2 => Some(Genre::Comedy),
            3 => Some(Genre::Drama),
            4 => Some(Genre::Horror),
            5 => Some(Genre::SciFi),
            6 => Some(Genre::Thriller),
            7 => Some(Genre::Fantasy),
            8 => Some(Genre::Romance),
            9 => Some(Genre::Animation),
            10 => Some(Genre::Adventure),
            11 => Some(Genre::Family),
            12 => Some(Genre::Mystery),
            13 => Some(Genre::War),
            14 => Some(Genre::Western),
            15 => Some(Genre::Crime),
            16 => Some(Genre::Documentary),
            17 => Some(Genre::Biography),
            18 => Some(Genre::History),
            _ => None,
        }
    }
}

impl TryFrom<i32> for Genre {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Genre::from_code(code).ok_or_else(|| format!("{code} is not a valid genre code"))
    }
}

impl From<Genre> for i32 {
    fn from(genre: Genre) -> Self {
        genre.as_code()
    }
}

/// Role a person holds on a movie. Stored and serialized as the variant name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum MovieRole {
    Actor,
    Director,
    Producer,
}

impl MovieRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MovieRole::Actor => "Actor",
            MovieRole::Director => "Director",
            MovieRole::Producer => "Producer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Actor" => Some(MovieRole::Actor),
            "Director" => Some(MovieRole::Director),
            "Producer" => Some(MovieRole::Producer),
            _ => None,
        }
    }
}

pub(crate) fn default_limit() -> i64 {
    20
}

/// Deserializes a present-but-null field as `Some(None)`, so partial updates
/// can tell "clear this field" apart from "leave it alone".
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct MovieCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub release_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default, deserialize_with = "double_option")]
    pub rating: Option<Option<f64>>,
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<Genre>,
    pub rating: Option<f64>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieResponse {
    pub fn from_model(m: movie::Model, mut genres: Vec<Genre>) -> Self {
        genres.sort();
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            release_date: m.release_date,
            genres,
            rating: m.rating,
            image_path: m.image_path,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieSearchRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub director_id: Option<i32>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub actor_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct PersonCreate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonResponse {
    pub fn from_model(p: person::Model, movie_count: Option<i64>) -> Self {
        Self {
            id: p.id,
            name: p.name,
            email: p.email,
            movie_count,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PersonSearchRequest {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub movie_ids: Option<Vec<i32>>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub roles: Option<Vec<MovieRole>>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreditCreate {
    pub person_id: i32,
    pub role: MovieRole,
}

#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub id: i32,
    pub movie_id: i32,
    pub person_id: i32,
    pub role: MovieRole,
}

impl CreditResponse {
    pub fn from_model(mp: movie_person::Model, role: MovieRole) -> Self {
        Self { id: mp.id, movie_id: mp.movie_id, person_id: mp.person_id, role }
    }
}

/// One row of `GET /persons/{id}/movies`: the association plus enough of the
/// movie to render a credit line.
#[derive(Debug, Serialize)]
pub struct PersonMovieResponse {
    pub id: i32,
    pub movie_id: i32,
    pub movie_title: String,
    pub role: MovieRole,
    pub image_path: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<NaiveDate>,
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub author_name: String,
    pub rating: f64,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub movie_id: i32,
    pub author_name: String,
    pub rating: f64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewResponse {
    fn from(r: review::Model) -> Self {
        Self {
            id: r.id,
            movie_id: r.movie_id,
            author_name: r.author_name,
            rating: r.rating,
            content: r.content,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ReviewPage {
    pub items: Vec<ReviewResponse>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_codes_round_trip() {
        for code in 1..=18 {
            let genre = Genre::from_code(code).unwrap();
            assert_eq!(genre.as_code(), code);
        }
        assert_eq!(Genre::from_code(0), None);
        assert_eq!(Genre::from_code(19), None);
    }

    #[test]
    fn genre_sorts_by_code() {
        let mut genres = vec![Genre::Thriller, Genre::Action, Genre::SciFi];
        genres.sort();
        assert_eq!(genres, vec![Genre::Action, Genre::SciFi, Genre::Thriller]);
    }

    #[test]
    fn genre_wire_format_is_the_code() {
        let json = serde_json::to_string(&Genre::SciFi).unwrap();
        assert_eq!(json, "5");
        let back: Genre = serde_json::from_str("5").unwrap();
        assert_eq!(back, Genre::SciFi);
        assert!(serde_json::from_str::<Genre>("99").is_err());
    }

    #[test]
    fn role_names_round_trip() {
        for role in [MovieRole::Actor, MovieRole::Director, MovieRole::Producer] {
            assert_eq!(MovieRole::from_name(role.as_str()), Some(role));
        }
        assert_eq!(MovieRole::from_name("Extra"), None);
    }

    #[test]
    fn movie_update_distinguishes_null_from_absent() {
        let patch: MovieUpdate = serde_json::from_str(r#"{"rating": null}"#).unwrap();
        assert_eq!(patch.rating, Some(None));
        assert_eq!(patch.description, None);

        let patch: MovieUpdate = serde_json::from_str(r#"{"rating": 7.5}"#).unwrap();
        assert_eq!(patch.rating, Some(Some(7.5)));
    }
}
