//! Hosted store adapter.
//!
//! JSON REST client over the hosted document store:
//!
//! ```text
//! GET    {base}/users/{uid}/habits        -> [HabitRecord]
//! POST   {base}/users/{uid}/habits        -> {"id": "..."}
//! PATCH  {base}/users/{uid}/habits/{id}
//! DELETE {base}/users/{uid}/habits/{id}
//! ```
//!
//! The hosted store has no server push here; `subscribe` polls and
//! republishes through a watch channel, which gives consumers the same
//! push-on-change contract as the local adapter. Cross-device conflicts
//! are the store's business (last write wins), not this client's.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::warn;
use url::Url;

use crate::error::StoreError;
use crate::habit::HabitId;
use crate::record::{HabitDraft, HabitPatch, HabitRecord};
use crate::store::{HabitStore, UserId};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

pub struct RemoteStore {
    client: Client,
    base: Url,
    token: Option<String>,
    poll_interval: Duration,
}

impl RemoteStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, StoreError> {
        let base = Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid base url: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base,
            token,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn habits_url(&self, user: &UserId) -> Result<Url, StoreError> {
        self.base
            .join(&format!("users/{}/habits", user))
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn habit_url(&self, user: &UserId, id: HabitId) -> Result<Url, StoreError> {
        self.base
            .join(&format!("users/{}/habits/{}", user, id))
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn fetch_all(&self, user: &UserId) -> Result<Vec<HabitRecord>, StoreError> {
        let url = self.habits_url(user)?;
        let resp = self.authed(self.client.get(url)).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        let records = resp
            .json::<Vec<HabitRecord>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(records)
    }
}

#[derive(Deserialize)]
struct CreatedResponse {
    id: HabitId,
}

#[async_trait]
impl HabitStore for RemoteStore {
    async fn subscribe(
        &self,
        user: &UserId,
    ) -> Result<watch::Receiver<Vec<HabitRecord>>, StoreError> {
        let snapshot = self.fetch_all(user).await?;
        let (tx, rx) = watch::channel(snapshot);

        let client = self.client.clone();
        let base = self.base.clone();
        let token = self.token.clone();
        let interval = self.poll_interval;
        let user = user.clone();

        tokio::spawn(async move {
            let poller = RemoteStore {
                client,
                base,
                token,
                poll_interval: interval,
            };
            loop {
                tokio::time::sleep(interval).await;
                if tx.is_closed() {
                    break;
                }
                match poller.fetch_all(&user).await {
                    Ok(records) => {
                        tx.send_if_modified(|current| {
                            if *current == records {
                                false
                            } else {
                                *current = records;
                                true
                            }
                        });
                    }
                    // Transient poll failures keep the last good snapshot.
                    Err(e) => warn!(user = %user, error = %e, "habit poll failed"),
                }
            }
        });

        Ok(rx)
    }

    async fn create(&self, user: &UserId, draft: HabitDraft) -> Result<HabitId, StoreError> {
        let url = self.habits_url(user)?;
        let resp = self
            .authed(self.client.post(url))
            .json(&draft)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(StoreError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        let created = resp
            .json::<CreatedResponse>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(created.id)
    }

    async fn update(
        &self,
        user: &UserId,
        id: HabitId,
        patch: HabitPatch,
    ) -> Result<(), StoreError> {
        let url = self.habit_url(user, id)?;
        let resp = self
            .authed(self.client.patch(url))
            .json(&patch)
            .send()
            .await?;
        match resp.status().as_u16() {
            s if (200..300).contains(&s) => Ok(()),
            404 => Err(StoreError::NotFound(id)),
            s => Err(StoreError::Rejected { status: s }),
        }
    }

    async fn delete(&self, user: &UserId, id: HabitId) -> Result<(), StoreError> {
        let url = self.habit_url(user, id)?;
        let resp = self.authed(self.client.delete(url)).send().await?;
        match resp.status().as_u16() {
            s if (200..300).contains(&s) => Ok(()),
            404 => Err(StoreError::NotFound(id)),
            s => Err(StoreError::Rejected { status: s }),
        }
    }
}
