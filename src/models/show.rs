use serde::{Deserialize, Serialize};

/// A stored show together with everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: i32,
    pub name: String,
    pub language: Option<String>,
    pub genres: Vec<Genre>,
    pub externals: Option<Externals>,
    pub rating: Option<Rating>,
    pub network: Option<Network>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Externals {
    pub imdb: Option<String>,
    pub tvrage: Option<i32>,
    pub thetvdb: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: i32,
    pub name: String,
    pub country: Option<Country>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    pub timezone: Option<String>,
}

/// Payload accepted by the create and update operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowInput {
    /// Required on create. On update it is optional but must match the path id.
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub network: Option<NetworkInput>,
    #[serde(default)]
    pub externals: Option<Externals>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInput {
    /// Refers to an existing network when positive.
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub country: Option<CountryInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
}
