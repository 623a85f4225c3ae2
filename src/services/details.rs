use chrono::{Datelike, NaiveDate};

use crate::{
    error::AppResult,
    models::{CatalogItem, MovieDetail, Pacing, TmdbMovieDetails, TmdbVideo, Weight},
    services::{genres, providers::MovieProvider},
};

const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
const HEAVY_BUDGET_THRESHOLD: u64 = 50_000_000;

/// Fetches details and videos concurrently and maps them to a detail record
///
/// A failed video lookup only costs the trailer.
pub async fn fetch_movie_detail(
    provider: &dyn MovieProvider,
    movie_id: u64,
) -> AppResult<MovieDetail> {
    let (details, videos) = tokio::join!(
        provider.movie_details(movie_id),
        provider.movie_videos(movie_id)
    );

    let details = details?;
    let videos = videos.unwrap_or_else(|e| {
        tracing::warn!(movie_id, error = %e, "Video lookup failed, continuing without trailer");
        Vec::new()
    });

    Ok(map_details(details, &videos))
}

pub fn map_details(details: TmdbMovieDetails, videos: &[TmdbVideo]) -> MovieDetail {
    let genre_ids: Vec<u32> = details.genres.iter().map(|g| g.id).collect();

    let pacing = if genre_ids
        .iter()
        .any(|id| *id == genres::ACTION || *id == genres::THRILLER)
    {
        Pacing::Fast
    } else if genre_ids.contains(&genres::DRAMA) {
        Pacing::Slow
    } else {
        Pacing::Medium
    };

    let weight = match details.budget {
        Some(budget) if budget > HEAVY_BUDGET_THRESHOLD => Weight::Heavy,
        _ => Weight::Light,
    };

    let origin = details
        .production_countries
        .first()
        .map(|c| format!("{}_SECTOR", c.iso_3166_1))
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let year = details
        .release_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.year());

    let youtube_id = videos
        .iter()
        .find(|v| v.video_type == "Trailer" && v.site == "YouTube")
        .map(|v| v.key.clone());

    let poster = details
        .poster_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", POSTER_BASE_URL, p))
        .unwrap_or_default();

    MovieDetail {
        item: CatalogItem {
            id: details.id,
            title: details.title,
            poster,
            youtube_id,
            moods: details.genres.iter().map(|g| g.name.to_lowercase()).collect(),
            pacing: Some(pacing),
            weight: Some(weight),
            year,
            runtime: details.runtime.unwrap_or(0),
            origin: Some(origin),
            provenance: None,
        },
        rating: details.vote_average,
        overview: details.overview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{TmdbCountry, TmdbGenre};
    use crate::services::providers::MockMovieProvider;

    fn genre(id: u32, name: &str) -> TmdbGenre {
        TmdbGenre {
            id,
            name: name.to_string(),
        }
    }

    fn video(key: &str, site: &str, video_type: &str) -> TmdbVideo {
        TmdbVideo {
            key: key.to_string(),
            site: site.to_string(),
            video_type: video_type.to_string(),
        }
    }

    fn details() -> TmdbMovieDetails {
        TmdbMovieDetails {
            id: 157336,
            title: "Interstellar".to_string(),
            overview: Some("A team of explorers travel through a wormhole.".to_string()),
            poster_path: Some("/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg".to_string()),
            release_date: Some("2014-11-05".to_string()),
            runtime: Some(169),
            budget: Some(165_000_000),
            vote_average: Some(8.4),
            genres: vec![genre(12, "Adventure"), genre(18, "Drama"), genre(878, "Science Fiction")],
            production_countries: vec![TmdbCountry {
                iso_3166_1: "US".to_string(),
            }],
        }
    }

    #[test]
    fn test_map_details() {
        let videos = vec![
            video("teaser1", "YouTube", "Teaser"),
            video("vimeo1", "Vimeo", "Trailer"),
            video("zSWdZVtXT7E", "YouTube", "Trailer"),
        ];

        let detail = map_details(details(), &videos);

        assert_eq!(detail.item.id, 157336);
        assert_eq!(detail.item.pacing, Some(Pacing::Slow));
        assert_eq!(detail.item.weight, Some(Weight::Heavy));
        assert_eq!(detail.item.origin.as_deref(), Some("US_SECTOR"));
        assert_eq!(detail.item.year, Some(2014));
        assert_eq!(detail.item.runtime, 169);
        assert_eq!(detail.item.youtube_id.as_deref(), Some("zSWdZVtXT7E"));
        assert_eq!(
            detail.item.moods,
            vec!["adventure", "drama", "science fiction"]
        );
        assert_eq!(
            detail.item.poster,
            "https://image.tmdb.org/t/p/w500/gEU2QniE6E77NI6lCU6MxlNBvIx.jpg"
        );
        assert_eq!(detail.rating, Some(8.4));
    }

    #[test]
    fn test_map_details_fast_beats_slow() {
        let mut d = details();
        d.genres.push(genre(53, "Thriller"));
        assert_eq!(map_details(d, &[]).item.pacing, Some(Pacing::Fast));
    }

    #[test]
    fn test_map_details_sparse_record() {
        let d = TmdbMovieDetails {
            id: 1,
            title: "Nothing Known".to_string(),
            overview: None,
            poster_path: None,
            release_date: Some(String::new()),
            runtime: None,
            budget: Some(50_000_000),
            vote_average: None,
            genres: vec![],
            production_countries: vec![],
        };

        let detail = map_details(d, &[]);

        assert_eq!(detail.item.pacing, Some(Pacing::Medium));
        assert_eq!(detail.item.weight, Some(Weight::Light));
        assert_eq!(detail.item.origin.as_deref(), Some("UNKNOWN"));
        assert_eq!(detail.item.year, None);
        assert_eq!(detail.item.youtube_id, None);
        assert_eq!(detail.item.poster, "");
        assert_eq!(detail.item.runtime, 0);
    }

    #[tokio::test]
    async fn test_video_failure_keeps_detail() {
        let mut provider = MockMovieProvider::new();
        provider
            .expect_movie_details()
            .returning(|_| Ok(details()));
        provider
            .expect_movie_videos()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));

        let detail = fetch_movie_detail(&provider, 157336).await.unwrap();

        assert_eq!(detail.item.title, "Interstellar");
        assert_eq!(detail.item.youtube_id, None);
    }

    #[tokio::test]
    async fn test_details_failure_fails_lookup() {
        let mut provider = MockMovieProvider::new();
        provider
            .expect_movie_details()
            .returning(|id| Err(AppError::NotFound(format!("movie {}", id))));
        provider.expect_movie_videos().returning(|_| Ok(vec![]));

        let result = fetch_movie_detail(&provider, 404).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
