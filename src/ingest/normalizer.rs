use tracing::debug;

use super::IngestError;
use crate::clients::tvmaze::{RawCountry, RawNetwork, RawShow};
use crate::models::show::{CountryInput, Externals, NetworkInput, Rating, ShowInput};

/// A show record with defaults applied, before any identity resolution.
///
/// Genres and the network are still plain candidates here; the reconciler
/// turns them into handles on stored or staged rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedShow {
    pub id: i32,
    pub name: String,
    pub language: Option<String>,
    pub genre_names: Vec<String>,
    pub externals: Option<Externals>,
    pub rating: Option<Rating>,
    pub network: Option<NetworkCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCandidate {
    pub id: Option<i32>,
    pub name: String,
    pub country: Option<CountryCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCandidate {
    pub code: String,
    pub name: String,
    pub timezone: Option<String>,
}

/// Converts one upstream record. `index` is the record's position in the
/// batch and only used for error reporting.
pub fn normalize(record: RawShow, index: usize) -> Result<NormalizedShow, IngestError> {
    let id = record.id.ok_or(IngestError::MalformedRecord { index })?;

    Ok(NormalizedShow {
        id,
        name: record.name.unwrap_or_default(),
        language: record.language,
        genre_names: record
            .genres
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .collect(),
        externals: record.externals.map(|e| Externals {
            imdb: e.imdb,
            tvrage: e.tvrage,
            thetvdb: e.thetvdb,
        }),
        rating: record.rating.map(|r| Rating { average: r.average }),
        network: record.network.map(network_from_raw),
    })
}

fn network_from_raw(raw: RawNetwork) -> NetworkCandidate {
    NetworkCandidate {
        id: raw.id,
        name: raw.name.unwrap_or_default(),
        country: raw.country.and_then(country_from_raw),
    }
}

fn country_from_raw(raw: RawCountry) -> Option<CountryCandidate> {
    let code = raw.code.filter(|c| !c.trim().is_empty());
    let Some(code) = code else {
        debug!("Dropping country block without a code");
        return None;
    };

    Some(CountryCandidate {
        code,
        name: raw.name.unwrap_or_default(),
        timezone: raw.timezone,
    })
}

/// Converts a create/update payload. The caller has already settled which id
/// the show gets.
#[must_use]
pub fn from_input(id: i32, input: ShowInput) -> NormalizedShow {
    NormalizedShow {
        id,
        name: input.name,
        language: input.language,
        genre_names: input.genres.unwrap_or_default(),
        externals: input.externals,
        rating: input.rating,
        network: input.network.map(network_from_input),
    }
}

fn network_from_input(input: NetworkInput) -> NetworkCandidate {
    NetworkCandidate {
        // Zero and negative ids mean "new network" on the HTTP surface.
        id: input.id.filter(|id| *id > 0),
        name: input.name,
        country: input.country.and_then(country_from_input),
    }
}

fn country_from_input(input: CountryInput) -> Option<CountryCandidate> {
    if input.code.trim().is_empty() {
        return None;
    }

    Some(CountryCandidate {
        code: input.code,
        name: input.name,
        timezone: input.timezone,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::tvmaze::{RawExternals, RawRating};

    fn raw(id: Option<i32>) -> RawShow {
        RawShow {
            id,
            name: Some("Show".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_id_is_malformed() {
        let err = normalize(raw(None), 3).unwrap_err();
        assert!(matches!(err, IngestError::MalformedRecord { index: 3 }));
    }

    #[test]
    fn absent_blocks_stay_absent() {
        let show = normalize(raw(Some(7)), 0).unwrap();
        assert_eq!(show.id, 7);
        assert!(show.genre_names.is_empty());
        assert!(show.externals.is_none());
        assert!(show.rating.is_none());
        assert!(show.network.is_none());
        assert!(show.language.is_none());
    }

    #[test]
    fn copies_nested_blocks() {
        let record = RawShow {
            id: Some(1),
            name: Some("Under the Dome".to_string()),
            language: Some("English".to_string()),
            genres: Some(vec![Some("Drama".to_string()), Some("Thriller".to_string())]),
            externals: Some(RawExternals {
                imdb: Some("tt1553656".to_string()),
                tvrage: None,
                thetvdb: Some(264_492),
            }),
            rating: Some(RawRating { average: None }),
            network: Some(RawNetwork {
                id: Some(2),
                name: Some("CBS".to_string()),
                country: Some(RawCountry {
                    name: Some("United States".to_string()),
                    code: Some("US".to_string()),
                    timezone: Some("America/New_York".to_string()),
                }),
            }),
        };

        let show = normalize(record, 0).unwrap();
        assert_eq!(show.genre_names, vec!["Drama", "Thriller"]);
        let externals = show.externals.unwrap();
        assert_eq!(externals.imdb.as_deref(), Some("tt1553656"));
        assert_eq!(externals.tvrage, None);
        assert_eq!(show.rating, Some(Rating { average: None }));

        let network = show.network.unwrap();
        assert_eq!(network.id, Some(2));
        assert_eq!(network.country.unwrap().code, "US");
    }

    #[test]
    fn null_genre_entries_are_dropped() {
        let record: RawShow =
            serde_json::from_str(r#"{"id": 1, "genres": ["Drama", null, "Thriller"]}"#).unwrap();

        let show = normalize(record, 0).unwrap();
        assert_eq!(show.genre_names, vec!["Drama", "Thriller"]);
    }

    #[test]
    fn country_without_code_is_dropped() {
        let record = RawShow {
            id: Some(1),
            network: Some(RawNetwork {
                id: Some(5),
                name: Some("Netflix".to_string()),
                country: Some(RawCountry {
                    name: Some("Nowhere".to_string()),
                    code: Some("  ".to_string()),
                    timezone: None,
                }),
            }),
            ..Default::default()
        };

        let network = normalize(record, 0).unwrap().network.unwrap();
        assert!(network.country.is_none());
    }

    #[test]
    fn input_network_without_positive_id_is_new() {
        let input = ShowInput {
            name: "Local".to_string(),
            network: Some(NetworkInput {
                id: Some(0),
                name: "Fresh".to_string(),
                country: None,
            }),
            ..Default::default()
        };

        let show = from_input(10, input);
        assert_eq!(show.id, 10);
        assert_eq!(show.network.unwrap().id, None);
    }
}
