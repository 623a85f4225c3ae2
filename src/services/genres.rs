//! Word → TMDB genre table used to turn free-text moods into genre filters.

/// Search words and the genre they stand for.
///
/// Order matters: fuzzy matching returns the first key contained in a word.
const GENRE_WORDS: &[(&str, u32)] = &[
    ("action", 28),
    ("fast", 28),
    ("adrenaline", 28),
    ("fight", 28),
    ("adventure", 12),
    ("journey", 12),
    ("explore", 12),
    ("epic", 12),
    ("animation", 16),
    ("anime", 16),
    ("cartoon", 16),
    ("comedy", 35),
    ("funny", 35),
    ("laugh", 35),
    ("fun", 35),
    ("happy", 35),
    ("crime", 80),
    ("murder", 80),
    ("police", 80),
    ("heist", 80),
    ("documentary", 99),
    ("real", 99),
    ("fact", 99),
    ("learning", 99),
    ("drama", 18),
    ("sad", 18),
    ("cry", 18),
    ("emotional", 18),
    ("deep", 18),
    ("heavy", 18),
    ("family", 10751),
    ("kids", 10751),
    ("cute", 10751),
    ("wholesome", 10751),
    ("fantasy", 14),
    ("magic", 14),
    ("dream", 14),
    ("myth", 14),
    ("history", 36),
    ("past", 36),
    ("ancient", 36),
    ("war", 36),
    ("horror", 27),
    ("scary", 27),
    ("fear", 27),
    ("dark", 27),
    ("creep", 27),
    ("blood", 27),
    ("music", 10402),
    ("song", 10402),
    ("musical", 10402),
    ("mystery", 9648),
    ("secret", 9648),
    ("twist", 9648),
    ("strange", 9648),
    ("romance", 10749),
    ("love", 10749),
    ("kiss", 10749),
    ("couple", 10749),
    ("scifi", 878),
    ("space", 878),
    ("future", 878),
    ("robot", 878),
    ("tech", 878),
    ("alien", 878),
    ("thriller", 53),
    ("suspense", 53),
    ("nervous", 53),
    ("tension", 53),
    ("western", 37),
    ("cowboy", 37),
    ("desert", 37),
];

const GENRE_NAMES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Docu"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Sci-Fi"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

pub const ACTION: u32 = 28;
pub const THRILLER: u32 = 53;
pub const DRAMA: u32 = 18;
pub const HISTORY: u32 = 36;

/// Genre for a word that is itself a table key
pub fn exact(word: &str) -> Option<u32> {
    GENRE_WORDS
        .iter()
        .find(|(key, _)| *key == word)
        .map(|&(_, id)| id)
}

/// Genre of the first table key found inside `word`
pub fn fuzzy(word: &str) -> Option<u32> {
    GENRE_WORDS
        .iter()
        .find(|(key, _)| word.contains(key))
        .map(|&(_, id)| id)
}

pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRE_NAMES
        .iter()
        .find(|(genre, _)| *genre == id)
        .map(|&(_, name)| name)
}

/// Display names for `ids`, skipping unknown genres
pub fn genre_names(ids: &[u32]) -> Vec<&'static str> {
    ids.iter().filter_map(|&id| genre_name(id)).collect()
}
