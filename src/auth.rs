use anyhow::Context;
use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tracing::{info, warn};
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::authenticator_delegate::{DefaultInstalledFlowDelegate, InstalledFlowDelegate};
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::{
    read_application_secret, ApplicationSecret, InstalledFlowAuthenticator,
    InstalledFlowReturnMethod,
};

use crate::config::{AuthConfig, TokenStore};
use crate::error::{Error, Result};

const APP_NAME: &str = "jobsheet";

pub type HttpsClient =
    hyper::Client<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>;

/// The two Google APIs used, each with its own credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    Gmail,
    Sheets,
}

impl Api {
    pub const ALL: [Api; 2] = [Api::Gmail, Api::Sheets];

    pub fn name(self) -> &'static str {
        match self {
            Api::Gmail => "gmail",
            Api::Sheets => "sheets",
        }
    }

    pub fn scope(self) -> &'static str {
        match self {
            Api::Gmail => "https://www.googleapis.com/auth/gmail.readonly",
            Api::Sheets => "https://www.googleapis.com/auth/spreadsheets",
        }
    }

    fn keyring_account(self) -> String {
        format!("{}_token", self.name())
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenData {
    tokens: Vec<TokenInfo>,
}

/// Keyring-backed token cache holding a single API's credential.
pub struct RingStorage {
    account: String,
}

impl RingStorage {
    pub fn new(api: Api) -> Self {
        Self {
            account: api.keyring_account(),
        }
    }

    fn entry(&self) -> anyhow::Result<Entry> {
        Entry::new(APP_NAME, &self.account).map_err(|e| anyhow::anyhow!("Keyring error: {}", e))
    }

    async fn get_all(&self) -> anyhow::Result<TokenData> {
        match self.entry()?.get_password() {
            Ok(serialized) => {
                serde_json::from_str(&serialized).context("Failed to deserialize tokens")
            }
            Err(keyring::Error::NoEntry) => Ok(TokenData::default()),
            Err(e) => Err(anyhow::anyhow!("Keyring error: {}", e)),
        }
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match self.entry()?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Keyring error: {}", e)),
        }
    }
}

#[async_trait]
impl TokenStorage for RingStorage {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let data = TokenData {
            tokens: vec![token],
        };
        let serialized = serde_json::to_string(&data).context("Failed to serialize tokens")?;
        self.entry()?
            .set_password(&serialized)
            .map_err(|e| anyhow::anyhow!("Keyring error: {}", e))?;
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        self.get_all()
            .await
            .ok()
            .and_then(|data| data.tokens.into_iter().next())
    }
}

/// Opens the consent page in a browser for redirect flows and defers to the
/// stock prompt when a code has to be pasted.
struct BrowserDelegate;

static PASTE_DELEGATE: DefaultInstalledFlowDelegate = DefaultInstalledFlowDelegate;

impl InstalledFlowDelegate for BrowserDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>> {
        if need_code {
            return PASTE_DELEGATE.present_user_url(url, need_code);
        }
        Box::pin(async move {
            println!("Opening browser for Google sign-in…");
            if let Err(e) = open::that(url) {
                warn!("Could not open browser: {}", e);
                println!("Open this URL to continue:\n{}", url);
            }
            Ok(String::new())
        })
    }
}

pub async fn load_secret<P: AsRef<Path>>(path: P) -> Result<ApplicationSecret> {
    read_application_secret(path)
        .await
        .context("Failed to read application secret")
        .map_err(Error::Auth)
}

pub fn https_client() -> Result<HttpsClient> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("Failed to load native roots")
        .map_err(Error::Auth)?
        .https_only()
        .enable_http1()
        .build();
    Ok(hyper::Client::builder().build(connector))
}

async fn build(
    api: Api,
    secret: ApplicationSecret,
    config: &AuthConfig,
    method: InstalledFlowReturnMethod,
) -> Result<DefaultAuthenticator> {
    let builder =
        InstalledFlowAuthenticator::builder(secret, method).flow_delegate(Box::new(BrowserDelegate));
    let builder = match config.token_store {
        TokenStore::File => builder.persist_tokens_to_disk(config.token_path(api.name())),
        TokenStore::Keyring => builder.with_storage(Box::new(RingStorage::new(api))),
    };
    builder
        .build()
        .await
        .with_context(|| format!("Failed to build {} authenticator", api))
        .map_err(Error::Auth)
}

/// Returns an authenticator holding a valid token for `api`.
///
/// A cached token is used (and refreshed) when present. Otherwise consent
/// runs through a local redirect, then through pasting the code by hand if
/// the redirect cannot complete.
pub async fn authorize(
    api: Api,
    secret: &ApplicationSecret,
    config: &AuthConfig,
) -> Result<DefaultAuthenticator> {
    let redirect = InstalledFlowReturnMethod::HTTPPortRedirect(config.redirect_port);
    let auth = build(api, secret.clone(), config, redirect).await?;
    match auth.token(&[api.scope()]).await {
        Ok(_) => return Ok(auth),
        Err(e) => warn!(
            "Local redirect failed for {} ({}). Falling back to copy-paste flow.",
            api, e
        ),
    }

    let auth = build(api, secret.clone(), config, InstalledFlowReturnMethod::Interactive).await?;
    auth.token(&[api.scope()])
        .await
        .with_context(|| format!("Failed to authorize {}", api))
        .map_err(Error::Auth)?;
    Ok(auth)
}

/// Removes every stored credential so the next run asks for consent again.
pub fn reset_tokens(config: &AuthConfig) -> Result<()> {
    for api in Api::ALL {
        match config.token_store {
            TokenStore::File => {
                let path = config.token_path(api.name());
                if path.exists() {
                    std::fs::remove_file(&path)
                        .with_context(|| format!("Failed to remove {}", path.display()))
                        .map_err(Error::Auth)?;
                }
            }
            TokenStore::Keyring => RingStorage::new(api).clear().map_err(Error::Auth)?,
        }
        info!("Cleared {} credential", api);
    }
    Ok(())
}
