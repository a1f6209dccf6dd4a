use crate::cache::{CacheEntry, CacheKey, ResponseCache};
use crate::client::{ApiError, ApiResult, BglApi};
use crate::{LeagueStats, Params, Resource, Standings, TeamRoster, WeeklyResults, params};
use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Payload plus the moment it was fetched from the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

/// Caching front for [`BglApi`]. Owns the response cache outright, so whoever
/// holds the client is the only writer; callers needing to share it hand it
/// to a single task rather than wrapping it in a lock.
#[derive(Debug)]
pub struct LeagueClient {
    api: BglApi,
    cache: ResponseCache,
}

impl LeagueClient {
    pub fn new(base_url: &str, ttl: Duration) -> ApiResult<Self> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|e| ApiError::Config(format!("cache TTL out of range: {e}")))?;
        if ttl <= TimeDelta::zero() {
            return Err(ApiError::Config("cache TTL must be positive".into()));
        }
        Ok(Self {
            api: BglApi::new(base_url)?,
            cache: ResponseCache::new(ttl),
        })
    }

    pub async fn get(&mut self, resource: Resource, params: &Params) -> ApiResult<CacheEntry> {
        self.get_at(resource, params, Utc::now()).await
    }

    /// Serve `resource` from the cache when a live entry exists, otherwise
    /// fetch it and remember the result as of `now`. Failed fetches leave the
    /// cache untouched.
    pub async fn get_at(
        &mut self,
        resource: Resource,
        params: &Params,
        now: DateTime<Utc>,
    ) -> ApiResult<CacheEntry> {
        let key = CacheKey::new(resource, params);
        if let Some(entry) = self.cache.lookup(&key, now) {
            debug!("using cached data for {key}");
            return Ok(entry.clone());
        }

        let payload = self.api.fetch(resource, params).await?;
        debug!("cached fresh data for {key}");
        Ok(self.cache.insert(key, payload, now))
    }

    /// Drop the entry for one resource so the next `get` refetches it.
    pub fn invalidate(&mut self, resource: Resource, params: &Params) -> bool {
        self.cache.remove(&CacheKey::new(resource, params))
    }

    pub fn is_cached(&self, resource: Resource, params: &Params) -> bool {
        self.is_cached_at(resource, params, Utc::now())
    }

    pub fn is_cached_at(&self, resource: Resource, params: &Params, now: DateTime<Utc>) -> bool {
        self.cache
            .lookup(&CacheKey::new(resource, params), now)
            .is_some()
    }

    pub async fn standings(&mut self) -> ApiResult<Cached<Standings>> {
        self.typed(Resource::Standings, &Params::new()).await
    }

    pub async fn weekly(&mut self, week: u32) -> ApiResult<Cached<WeeklyResults>> {
        self.typed(Resource::Weekly, &weekly_params(week)).await
    }

    pub async fn teams(&mut self) -> ApiResult<Cached<TeamRoster>> {
        self.typed(Resource::Teams, &Params::new()).await
    }

    pub async fn stats(&mut self) -> ApiResult<Cached<LeagueStats>> {
        self.typed(Resource::Stats, &Params::new()).await
    }

    async fn typed<T: DeserializeOwned>(
        &mut self,
        resource: Resource,
        params: &Params,
    ) -> ApiResult<Cached<T>> {
        self.typed_at(resource, params, Utc::now()).await
    }

    /// Typed form of [`LeagueClient::get_at`]. The payload is decoded before
    /// it is cached, so a body of the wrong shape is never remembered.
    pub async fn typed_at<T: DeserializeOwned>(
        &mut self,
        resource: Resource,
        params: &Params,
        now: DateTime<Utc>,
    ) -> ApiResult<Cached<T>> {
        let key = CacheKey::new(resource, params);
        if let Some(entry) = self.cache.lookup(&key, now) {
            debug!("using cached data for {key}");
            let data = decode(&entry.payload).map_err(|e| ApiError::Parse(e, key.to_string()))?;
            return Ok(Cached {
                data,
                fetched_at: entry.fetched_at,
            });
        }

        let payload = self.api.fetch(resource, params).await?;
        let data = T::deserialize(&payload).map_err(|e| ApiError::Parse(e, key.to_string()))?;
        debug!("cached fresh data for {key}");
        let entry = self.cache.insert(key, payload, now);
        Ok(Cached {
            data,
            fetched_at: entry.fetched_at,
        })
    }
}

/// Parameters for the `weekly` endpoint.
pub fn weekly_params(week: u32) -> Params {
    params([("week", week.to_string())])
}

fn decode<T: DeserializeOwned>(payload: &Arc<Value>) -> Result<T, serde_json::Error> {
    T::deserialize(payload.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use chrono::TimeZone;
    use mockito::Matcher;

    const TTL: Duration = Duration::from_secs(300);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 3, 12, 0, 0).unwrap()
    }

    fn endpoint(name: &str) -> Matcher {
        Matcher::UrlEncoded("endpoint".into(), name.into())
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(endpoint("teams"))
            .with_status(200)
            .with_body(r#"{"teams": []}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let first = client.get_at(Resource::Teams, &Params::new(), t0()).await.unwrap();
        let second = client
            .get_at(Resource::Teams, &Params::new(), t0() + TimeDelta::seconds(299))
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first.payload, &second.payload));
        assert_eq!(second.fetched_at, t0());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn call_after_ttl_refetches_exactly_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(endpoint("stats"))
            .with_status(200)
            .with_body(r#"{"totalTeams": 6}"#)
            .expect(2)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let expired = t0() + TimeDelta::seconds(300);
        client.get_at(Resource::Stats, &Params::new(), t0()).await.unwrap();
        let refreshed = client.get_at(Resource::Stats, &Params::new(), expired).await.unwrap();
        let again = client
            .get_at(Resource::Stats, &Params::new(), expired + TimeDelta::seconds(1))
            .await
            .unwrap();

        assert_eq!(refreshed.fetched_at, expired);
        assert!(Arc::ptr_eq(&refreshed.payload, &again.payload));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn weeks_are_cached_independently() {
        let mut server = mockito::Server::new_async().await;
        let week1 = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                endpoint("weekly"),
                Matcher::UrlEncoded("week".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": [{"rank": 1, "teamNumber": 2}]}"#)
            .expect(1)
            .create_async()
            .await;
        let week2 = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                endpoint("weekly"),
                Matcher::UrlEncoded("week".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let first = client.weekly(1).await.unwrap();
        let second = client.weekly(2).await.unwrap();
        client.weekly(1).await.unwrap();

        assert_eq!(first.data.results[0].team_number, 2);
        assert!(second.data.results.is_empty());
        week1.assert_async().await;
        week2.assert_async().await;
    }

    #[tokio::test]
    async fn failed_fetch_creates_no_entry() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let err = client.weekly(2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(!client.is_cached(Resource::Weekly, &weekly_params(2)));
    }

    #[tokio::test]
    async fn shape_mismatch_is_a_parse_error_and_is_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(endpoint("standings"))
            .with_status(200)
            .with_body(r#"{"standings": "not a list"}"#)
            .expect(2)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let err = client.standings().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(!client.is_cached(Resource::Standings, &Params::new()));

        // The next call goes back to the network instead of replaying the bad body.
        let err = client.standings().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn typed_hit_within_ttl_keeps_the_first_fetch_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(endpoint("stats"))
            .with_status(200)
            .with_body(r#"{"totalTeams": 8, "totalPlayers": 16}"#)
            .expect(1)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        let first: Cached<LeagueStats> =
            client.typed_at(Resource::Stats, &Params::new(), t0()).await.unwrap();
        let second: Cached<LeagueStats> = client
            .typed_at(Resource::Stats, &Params::new(), t0() + TimeDelta::seconds(10))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.data.total_players, 16);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(endpoint("teams"))
            .with_status(200)
            .with_body(r#"{"teams": []}"#)
            .expect(2)
            .create_async()
            .await;

        let mut client = LeagueClient::new(&server.url(), TTL).unwrap();
        client.teams().await.unwrap();
        assert!(client.invalidate(Resource::Teams, &Params::new()));
        assert!(!client.is_cached(Resource::Teams, &Params::new()));
        client.teams().await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = LeagueClient::new("https://example.com/exec", Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
