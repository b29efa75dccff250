use std::fmt;

use serde::{Deserialize, Serialize};

// ── Catalog records ─────────────────────────────────────────────

/// A single anime entry as returned by the catalog API.
///
/// `status`, `kind` and `rating` are kept as raw codes so that a value the
/// upstream adds later still decodes; use the label helpers in `shiori-core`
/// to display them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub anime_id: String,
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub episodes: u32,
    #[serde(rename = "episodesAired", default)]
    pub episodes_aired: u32,
    #[serde(rename = "nextEpisodeAt")]
    pub next_episode_at: Option<String>,
    pub english: Option<String>,
    pub russian: String,
    #[serde(default)]
    pub duration: u32,
    #[serde(rename = "isCensored", default)]
    pub is_censored: bool,
    pub aired_on: Option<String>,
    pub released_on: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub kind: String,
    pub description: Option<String>,
    pub rating: String,
    pub season: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default)]
    pub score: f64,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub related_anime_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_anime_texts: Option<Vec<String>>,
    #[serde(default)]
    pub character_ids: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// One page of anime plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeListResponse {
    pub total_count: u64,
    pub anime_list: Vec<Anime>,
}

/// A genre, e.g. `{ "genre_id": 27, "name": "Shounen", "russian": "Сёнен" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub russian: String,
    pub genre_id: GenreCode,
    pub name: String,
}

/// Genre category code. The API sends either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreCode {
    Number(i64),
    Text(String),
}

impl fmt::Display for GenreCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Pagination for the plain list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimeListRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for AnimeListRequest {
    fn default() -> Self {
        Self { page: 1, limit: 30 }
    }
}

// ── Enumerations ────────────────────────────────────────────────

/// Wire code enum. Codes it does not list decode to `Unknown`.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
            /// A code this build does not know.
            #[serde(rename = "unknown")]
            Unknown,
        }

        impl $name {
            /// Every known code, without `Unknown`.
            pub const ALL: &[$name] = &[$(Self::$variant),+];

            /// Wire code, e.g. for query strings.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown => "unknown",
                }
            }

            pub fn from_code(code: &str) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    _ => Self::Unknown,
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let code = String::deserialize(deserializer)?;
                Ok(Self::from_code(&code))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

code_enum! {
    /// Anime format.
    AnimeKind {
        Tv => "tv",
        TvSpecial => "tv_special",
        Movie => "movie",
        Ova => "ova",
        Ona => "ona",
        Special => "special",
        Music => "music",
        Cm => "cm",
        Pv => "pv",
    }
}

code_enum! {
    /// Airing status.
    AnimeStatus {
        Anons => "anons",
        Ongoing => "ongoing",
        Released => "released",
    }
}

code_enum! {
    /// Age rating.
    AnimeRating {
        G => "g",
        Pg => "pg",
        Pg13 => "pg_13",
        R => "r",
        RPlus => "r_plus",
        Rx => "rx",
        Unrated => "none",
    }
}

code_enum! {
    /// Sort field for the filtered list.
    SortBy {
        Score => "score",
        AiredOn => "aired_on",
        Russian => "russian",
    }
}

code_enum! {
    SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}
