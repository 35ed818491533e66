//! Async client for the Chainbase TON HTTP API.

use reqwest::{Client, Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::config::{
    Authorization, ClientConfig, ClientOptions, ConfigError, Credentials, SecurityScheme,
};
use crate::metadata::{Metadata, MetadataError};
use crate::models::*;
use crate::operations::{self, HttpMethod, Operation};
use crate::types::*;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// DNS, connection, timeout or body decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    /// A 2xx response whose envelope reports `ok: false`.
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("request metadata error: {0}")]
    Metadata(#[from] MetadataError),
    /// The `result` of a successful response does not match the endpoint's type.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the request gave up after the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_timeout())
    }

    /// The HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The API error reported by the server, parsed from a non-2xx body when possible.
    pub fn api_error(&self) -> Option<ApiError> {
        match self {
            Error::Api(e) => Some(e.clone()),
            Error::Status { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Async client for the Chainbase TON HTTP API.
///
/// Each endpoint is one method issuing exactly one request. Configuration
/// (timeout, credentials, server) belongs to the instance; setters take
/// `&mut self`, so it cannot change under in-flight requests.
///
/// # Example
///
/// ```no_run
/// use ton_openapi_client::TonApiClient;
///
/// #[tokio::main]
/// async fn main() -> ton_openapi_client::client::Result<()> {
///     let mut client = TonApiClient::mainnet();
///     client.auth("my-api-key");
///     let info = client.get_masterchain_info().await?;
///     println!("Last seqno: {}", info.last.seqno);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TonApiClient {
    client: Client,
    config: ClientConfig,
}

impl Default for TonApiClient {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl TonApiClient {
    /// Create a new client with a custom base URL, used verbatim.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::with_server(url))
    }

    /// Create a client for the server the API document declares (TON mainnet).
    pub fn mainnet() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Use a preconfigured `reqwest` client (proxies, TLS roots, pooling).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Override the security scheme declared by the API document.
    pub fn with_security_scheme(mut self, scheme: SecurityScheme) -> Self {
        self.config.set_security_scheme(scheme);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set request options such as the timeout.
    pub fn configure(&mut self, options: ClientOptions) {
        trace!(?options, "configuring client");
        self.config.apply(options);
    }

    /// Supply credentials: one value (`"key"`) or two (`("user", "password")`).
    ///
    /// They are applied per the security scheme on every request. A shape that
    /// does not fit the scheme fails at request time.
    pub fn auth(&mut self, credentials: impl Into<Credentials>) -> &mut Self {
        let credentials = credentials.into();
        trace!(?credentials, "setting credentials");
        self.config.set_credentials(credentials);
        self
    }

    /// Point the client at `url`, substituting `{name}` placeholders from `variables`.
    ///
    /// Placeholders of the server the API document declares take its declared
    /// defaults when no value is given. Any other unfilled placeholder fails the
    /// call and the previous server stays in place.
    pub fn server<I, K, V>(&mut self, url: &str, variables: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config.set_server(url, variables)?;
        trace!(server = self.config.server(), "server set");
        Ok(self)
    }

    /// Point the client at a fully qualified URL.
    pub fn server_url(&mut self, url: &str) -> Result<&mut Self> {
        self.server(url, std::iter::empty::<(String, String)>())
    }

    /// Issue the request described by `operation` with `params` as its metadata.
    ///
    /// `params` must serialize to a flat object (or `()` for none). Every endpoint
    /// method goes through here.
    pub async fn fetch<P, R>(&self, operation: &Operation, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut placement = Metadata::from_params(params)?.place(operation);

        let authorization = self
            .config
            .credentials()
            .map(|c| c.authorization(self.config.security_scheme()))
            .transpose()?;
        if let Some(Authorization::Query { name, value }) = &authorization {
            placement.query.push((name.to_string(), value.clone()));
        }

        let url = placement.url(self.config.server(), operation)?;

        debug!(
            operation = operation.id,
            method = %operation.method,
            path = operation.path,
            "dispatching request"
        );

        let mut request = self
            .client
            .request(method(operation.method), url)
            .timeout(self.config.timeout())
            .header(header::USER_AGENT, self.config.user_agent());

        for (name, value) in &placement.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = placement.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }

        request = match authorization {
            Some(Authorization::Basic { username, password }) => {
                request.basic_auth(username, password)
            }
            Some(Authorization::Bearer(token)) => request.bearer_auth(token),
            Some(Authorization::Header { name, value }) => request.header(name, value),
            Some(Authorization::Query { .. }) | None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                operation = operation.id,
                status = status.as_u16(),
                "request failed"
            );
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: TonResponse = response.json().await?;
        let result = envelope.into_result()?;
        Ok(serde_json::from_value(result)?)
    }

    // ── Accounts ─────────────────────────────────────────────────

    /// Get basic information about the address: balance, code, data, last transaction id.
    pub async fn get_address_information(
        &self,
        params: GetAddressInformationParams,
    ) -> Result<AddressInformation> {
        self.fetch(&operations::GET_ADDRESS_INFORMATION, &params)
            .await
    }

    /// Like `get_address_information`, but also parses known contract types.
    pub async fn get_extended_address_information(
        &self,
        params: GetExtendedAddressInformationParams,
    ) -> Result<Value> {
        self.fetch(&operations::GET_EXTENDED_ADDRESS_INFORMATION, &params)
            .await
    }

    /// Retrieve wallet information (simple, standard, v3 and v4 wallets).
    pub async fn get_wallet_information(
        &self,
        params: GetWalletInformationParams,
    ) -> Result<WalletInformation> {
        self.fetch(&operations::GET_WALLET_INFORMATION, &params)
            .await
    }

    /// Get transaction history of a given address.
    pub async fn get_transactions(&self, params: GetTransactionsParams) -> Result<Vec<Value>> {
        self.fetch(&operations::GET_TRANSACTIONS, &params).await
    }

    /// Get balance (in nanotons) of a given address.
    pub async fn get_address_balance(&self, params: GetAddressBalanceParams) -> Result<String> {
        self.fetch(&operations::GET_ADDRESS_BALANCE, &params).await
    }

    /// Get state of a given address: `uninitialized`, `active` or `frozen`.
    pub async fn get_address_state(&self, params: GetAddressStateParams) -> Result<String> {
        self.fetch(&operations::GET_ADDRESS_STATE, &params).await
    }

    /// Get NFT or Jetton information.
    pub async fn get_token_data(&self, params: GetTokenDataParams) -> Result<Value> {
        self.fetch(&operations::GET_TOKEN_DATA, &params).await
    }

    // ── Addresses ────────────────────────────────────────────────

    /// Convert an address from raw to human-readable format.
    pub async fn pack_address(&self, params: PackAddressParams) -> Result<String> {
        self.fetch(&operations::PACK_ADDRESS, &params).await
    }

    /// Convert an address from human-readable to raw format.
    pub async fn unpack_address(&self, params: UnpackAddressParams) -> Result<String> {
        self.fetch(&operations::UNPACK_ADDRESS, &params).await
    }

    /// Get all possible address forms.
    pub async fn detect_address(&self, params: DetectAddressParams) -> Result<Value> {
        self.fetch(&operations::DETECT_ADDRESS, &params).await
    }

    // ── Blocks ───────────────────────────────────────────────────

    /// Get up-to-date masterchain state.
    pub async fn get_masterchain_info(&self) -> Result<MasterchainInfo> {
        self.fetch(&operations::GET_MASTERCHAIN_INFO, &()).await
    }

    /// Get signatures of a masterchain block.
    pub async fn get_masterchain_block_signatures(
        &self,
        params: GetMasterchainBlockSignaturesParams,
    ) -> Result<Value> {
        self.fetch(&operations::GET_MASTERCHAIN_BLOCK_SIGNATURES, &params)
            .await
    }

    /// Get merkle proof of a shardchain block.
    pub async fn get_shard_block_proof(&self, params: GetShardBlockProofParams) -> Result<Value> {
        self.fetch(&operations::GET_SHARD_BLOCK_PROOF, &params)
            .await
    }

    /// Get consensus block and its update timestamp.
    pub async fn get_consensus_block(&self) -> Result<ConsensusBlock> {
        self.fetch(&operations::GET_CONSENSUS_BLOCK, &()).await
    }

    /// Look up a block by seqno, lt or unixtime.
    pub async fn lookup_block(&self, params: LookupBlockParams) -> Result<BlockIdExt> {
        self.fetch(&operations::LOOKUP_BLOCK, &params).await
    }

    /// Get shards of a masterchain block.
    pub async fn shards(&self, params: ShardsParams) -> Result<Shards> {
        self.fetch(&operations::SHARDS, &params).await
    }

    /// Get transactions of the given block.
    pub async fn get_block_transactions(
        &self,
        params: GetBlockTransactionsParams,
    ) -> Result<Value> {
        self.fetch(&operations::GET_BLOCK_TRANSACTIONS, &params)
            .await
    }

    /// Get metadata of a given block.
    pub async fn get_block_header(&self, params: GetBlockHeaderParams) -> Result<Value> {
        self.fetch(&operations::GET_BLOCK_HEADER, &params).await
    }

    // ── Transactions ─────────────────────────────────────────────

    /// Locate the outgoing transaction of `destination` by its incoming message.
    pub async fn try_locate_tx(&self, params: TryLocateTxParams) -> Result<Value> {
        self.fetch(&operations::TRY_LOCATE_TX, &params).await
    }

    /// Same as `try_locate_tx`.
    pub async fn try_locate_result_tx(&self, params: TryLocateResultTxParams) -> Result<Value> {
        self.fetch(&operations::TRY_LOCATE_RESULT_TX, &params)
            .await
    }

    /// Locate the incoming transaction of `source` by its outgoing message.
    pub async fn try_locate_source_tx(&self, params: TryLocateSourceTxParams) -> Result<Value> {
        self.fetch(&operations::TRY_LOCATE_SOURCE_TX, &params)
            .await
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Trace => Method::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKeyLocation, DEFAULT_TIMEOUT};
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = TonApiClient::mainnet();
        assert_eq!(
            client.config().server(),
            "https://ton-mainnet.s.chainbase.online/v1"
        );
        assert_eq!(client.config().timeout(), DEFAULT_TIMEOUT);

        let client = TonApiClient::new("https://toncenter.example.com/api/v2");
        assert_eq!(
            client.config().server(),
            "https://toncenter.example.com/api/v2"
        );
    }

    #[test]
    fn setters_update_only_their_instance() {
        let mut a = TonApiClient::mainnet();
        let b = a.clone();

        a.configure(ClientOptions::new().timeout_ms(5000));
        a.auth("secret")
            .server("https://{region}.api.example.com/{basePath}", [
                ("region", "eu"),
                ("basePath", "v14"),
            ])
            .unwrap();

        assert_eq!(a.config().timeout(), Duration::from_millis(5000));
        assert_eq!(a.config().server(), "https://eu.api.example.com/v14");
        assert!(a.config().credentials().is_some());

        assert_eq!(b.config().timeout(), DEFAULT_TIMEOUT);
        assert_eq!(
            b.config().server(),
            "https://ton-mainnet.s.chainbase.online/v1"
        );
        assert!(b.config().credentials().is_none());
    }

    #[test]
    fn unresolved_server_variable_is_a_config_error() {
        let mut client = TonApiClient::mainnet();
        let err = client
            .server("https://{region}.api.example.com/{basePath}", [
                ("name", "eu"),
                ("basePath", "v14"),
            ])
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnresolvedServerVariable(ref v)) if v == "region"
        ));
    }

    #[test]
    fn security_scheme_override() {
        let client = TonApiClient::mainnet().with_security_scheme(SecurityScheme::ApiKey {
            name: "api_key",
            location: ApiKeyLocation::Query,
        });
        assert_eq!(
            client.config().security_scheme(),
            Some(SecurityScheme::ApiKey {
                name: "api_key",
                location: ApiKeyLocation::Query,
            })
        );
    }

    #[test]
    fn error_accessors() {
        let err = Error::Status {
            status: 500,
            body: r#"{"ok":false,"error":"boom","code":500}"#.to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.api_error().map(|e| e.message), Some("boom".to_string()));
        assert!(!err.is_timeout());

        let err = Error::Status {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };
        assert_eq!(err.api_error(), None);
    }
}
