/// TMDB (The Movie Database) provider
///
/// Covers keyword lookup, discover, title search, trending, details and
/// videos. Every response goes through the Redis read-through cache.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{TmdbKeyword, TmdbMovie, TmdbMovieDetails, TmdbPage, TmdbVideo},
    services::providers::{DiscoverParams, MovieProvider},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

const KEYWORD_CACHE_TTL: u64 = 604800; // 1 week
const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const TRENDING_CACHE_TTL: u64 = 21600; // 6 hours
const DETAILS_CACHE_TTL: u64 = 86400; // 1 day
const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "TMDB API key is not set. Set TMDB_API_KEY in the environment".to_string(),
            )
        })
    }

    /// GET `{api_url}{path}` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(query)
            .send()
            .await
            .map_err(redact_url)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB resource {}", path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(redact_url)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

/// The request URL carries the API key, so it never leaves the provider
fn redact_url(error: reqwest::Error) -> AppError {
    AppError::HttpClient(error.without_url())
}

#[async_trait::async_trait]
impl MovieProvider for TmdbProvider {
    async fn search_keyword(&self, word: &str) -> AppResult<Option<u64>> {
        let api_key = self.api_key()?;

        cached!(
            self.cache,
            CacheKey::Keyword(word.to_string()),
            KEYWORD_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbKeyword> = self
                    .get_json(
                        api_key,
                        "/search/keyword",
                        &[("query", word.to_string()), ("page", "1".to_string())],
                    )
                    .await?;

                let keyword_id = page.results.first().map(|k| k.id);
                tracing::debug!(word = %word, keyword_id = ?keyword_id, "Keyword lookup completed");

                Ok::<_, AppError>(keyword_id)
            }
        )
    }

    async fn discover(&self, params: &DiscoverParams) -> AppResult<Vec<TmdbMovie>> {
        let api_key = self.api_key()?;

        cached!(
            self.cache,
            CacheKey::Discover(params.fingerprint()),
            LIST_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbMovie> = self
                    .get_json(api_key, "/discover/movie", &params.query_pairs())
                    .await?;

                tracing::info!(
                    keywords = params.keyword_ids.len(),
                    genres = params.genre_ids.len(),
                    results = page.results.len(),
                    provider = "tmdb",
                    "Discover query completed"
                );

                Ok::<_, AppError>(page.results)
            }
        )
    }

    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbMovie>> {
        let api_key = self.api_key()?;

        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            LIST_CACHE_TTL,
            async move {
                let page: TmdbPage<TmdbMovie> = self
                    .get_json(
                        api_key,
                        "/search/movie",
                        &[
                            ("language", LANGUAGE.to_string()),
                            ("query", query.to_string()),
                            ("page", "1".to_string()),
                            ("include_adult", "false".to_string()),
                        ],
                    )
                    .await?;

                tracing::info!(
                    query = %query,
                    results = page.results.len(),
                    provider = "tmdb",
                    "Title search completed"
                );

                Ok::<_, AppError>(page.results)
            }
        )
    }

    async fn trending(&self) -> AppResult<Vec<TmdbMovie>> {
        let api_key = self.api_key()?;

        cached!(self.cache, CacheKey::Trending, TRENDING_CACHE_TTL, async move {
            let page: TmdbPage<TmdbMovie> =
                self.get_json(api_key, "/trending/movie/week", &[]).await?;
            Ok::<_, AppError>(page.results)
        })
    }

    async fn movie_details(&self, movie_id: u64) -> AppResult<TmdbMovieDetails> {
        let api_key = self.api_key()?;

        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let path = format!("/movie/{}", movie_id);
                let details: TmdbMovieDetails = self.get_json(api_key, &path, &[]).await?;
                Ok::<_, AppError>(details)
            }
        )
    }

    async fn movie_videos(&self, movie_id: u64) -> AppResult<Vec<TmdbVideo>> {
        let api_key = self.api_key()?;

        cached!(
            self.cache,
            CacheKey::MovieVideos(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let path = format!("/movie/{}/videos", movie_id);
                let page: TmdbPage<TmdbVideo> = self.get_json(api_key, &path, &[]).await?;
                Ok::<_, AppError>(page.results)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    async fn create_test_provider(api_key: Option<&str>) -> TmdbProvider {
        let (cache, _handle) = Cache::new(redis::Client::open("redis://localhost:6379").unwrap()).await;
        TmdbProvider::new(
            cache,
            api_key.map(str::to_string),
            "http://test.local/3/".to_string(),
        )
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let provider = create_test_provider(None).await;

        let result = provider.discover(&DiscoverParams::default()).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));

        let result = provider.movie_details(603).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_blank_api_key_counts_as_missing() {
        let provider = create_test_provider(Some("   ")).await;
        assert!(!provider.has_api_key());

        let result = provider.trending().await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_search_query_rejected() {
        let provider = create_test_provider(Some("test_key")).await;
        let result = provider.search_movies("  ").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let (cache, _handle) = Cache::new(redis::Client::open("redis://127.0.0.1:1").unwrap()).await;
        let provider = TmdbProvider::new(
            cache,
            Some("SUPERSECRET".to_string()),
            "http://127.0.0.1:1/3".to_string(),
        );

        let error = provider.movie_details(603).await.unwrap_err();
        assert!(matches!(error, AppError::HttpClient(_)));
        assert!(!error.to_string().contains("SUPERSECRET"));

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("SUPERSECRET"));
        assert!(!body.contains("api_key"));
    }

    #[tokio::test]
    async fn test_api_url_trailing_slash_trimmed() {
        let provider = create_test_provider(Some("test_key")).await;
        assert_eq!(provider.api_url, "http://test.local/3");
        assert_eq!(provider.name(), "tmdb");
    }
}
