use anyhow::Context;
use async_trait::async_trait;
use google_gmail1::Gmail;
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;

use crate::error::{Error, Result};
use crate::models::{Header, Message};
use crate::sync::{MailSource, SearchPage};

const USER_ID: &str = "me";

#[derive(Clone)]
pub struct GmailClient {
    hub: Gmail<HttpsConnector<HttpConnector>>,
}

impl GmailClient {
    pub fn new(hub: Gmail<HttpsConnector<HttpConnector>>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn search(&self, query: &str, page_token: Option<&str>) -> Result<SearchPage> {
        let mut req = self.hub.users().messages_list(USER_ID).q(query);
        if let Some(token) = page_token {
            req = req.page_token(token);
        }

        let (_, message_list) = req
            .doit()
            .await
            .context("Failed to list messages")
            .map_err(Error::MailSource)?;

        let ids = message_list
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        Ok(SearchPage {
            ids,
            next_page_token: message_list.next_page_token,
        })
    }

    async fn get(&self, id: &str) -> Result<Message> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get(USER_ID, id)
            .format("full")
            .doit()
            .await
            .with_context(|| format!("Failed to get message {}", id))
            .map_err(Error::MailSource)?;

        let headers = msg
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| Some(Header::new(h.name?, h.value.unwrap_or_default())))
            .collect();

        Ok(Message {
            id: msg.id.unwrap_or_else(|| id.to_string()),
            thread_id: msg.thread_id.unwrap_or_default(),
            headers,
        })
    }
}
