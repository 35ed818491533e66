//! The operations the API exposes, one immutable [`Operation`] per endpoint.
//!
//! The table below the type definitions is generated by `build.rs` from
//! `openapi.json`: a `const` per operation named after its operation id
//! (`getAddressInformation` becomes [`GET_ADDRESS_INFORMATION`]), the [`ALL`]
//! slice, the declared [`DEFAULT_SERVER`] and [`SECURITY_SCHEME`].

use std::fmt;

use crate::config::{ApiKeyLocation, SecurityScheme, ServerDefinition, ServerVariable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter value is placed in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

/// A parameter an operation declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub location: ParameterLocation,
    pub required: bool,
}

/// A single REST endpoint with a fixed path and verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub id: &'static str,
    pub path: &'static str,
    pub method: HttpMethod,
    pub summary: &'static str,
    pub parameters: &'static [Parameter],
}

impl Operation {
    /// The declared parameter called `name`.
    pub fn parameter(&self, name: &str) -> Option<&'static Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &'static Parameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

/// Look an operation up by its id, e.g. `"lookupBlock"`.
pub fn find(id: &str) -> Option<&'static Operation> {
    ALL.iter().find(|op| op.id == id)
}

include!(concat!(env!("OUT_DIR"), "/operations.rs"));

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_covers_every_endpoint_once() {
        assert_eq!(ALL.len(), 21);

        let paths: HashSet<_> = ALL.iter().map(|op| op.path).collect();
        assert_eq!(paths.len(), ALL.len(), "paths must be unique");

        for path in [
            "/getAddressInformation",
            "/getExtendedAddressInformation",
            "/getWalletInformation",
            "/getTransactions",
            "/getAddressBalance",
            "/getAddressState",
            "/packAddress",
            "/unpackAddress",
            "/getMasterchainInfo",
            "/getMasterchainBlockSignatures",
            "/getShardBlockProof",
            "/getConsensusBlock",
            "/lookupBlock",
            "/shards",
            "/getBlockTransactions",
            "/getBlockHeader",
            "/getTokenData",
            "/tryLocateTx",
            "/tryLocateResultTx",
            "/tryLocateSourceTx",
            "/detectAddress",
        ] {
            assert!(paths.contains(path), "missing {path}");
        }
    }

    #[test]
    fn every_operation_is_a_get_with_query_parameters() {
        for op in ALL {
            assert_eq!(op.method, HttpMethod::Get, "{}", op.id);
            assert!(
                op.parameters
                    .iter()
                    .all(|p| p.location == ParameterLocation::Query),
                "{}",
                op.id
            );
        }
    }

    #[test]
    fn constants_follow_operation_ids() {
        assert_eq!(GET_ADDRESS_INFORMATION.id, "getAddressInformation");
        assert_eq!(GET_ADDRESS_INFORMATION.path, "/getAddressInformation");
        assert_eq!(SHARDS.path, "/shards");
        assert_eq!(TRY_LOCATE_SOURCE_TX.path, "/tryLocateSourceTx");
        assert_eq!(GET_MASTERCHAIN_INFO.summary, "Get Masterchain Info");
    }

    #[test]
    fn parameter_requirements_are_preserved() {
        let address = GET_TRANSACTIONS.parameter("address").unwrap();
        assert!(address.required);
        assert!(!GET_TRANSACTIONS.parameter("limit").unwrap().required);
        assert!(GET_TRANSACTIONS.parameter("nope").is_none());

        let required: Vec<_> = LOOKUP_BLOCK.required_parameters().map(|p| p.name).collect();
        assert_eq!(required, ["workchain", "shard"]);

        assert!(GET_MASTERCHAIN_INFO.parameters.is_empty());
        assert!(GET_CONSENSUS_BLOCK.parameters.is_empty());
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("lookupBlock"), Some(&LOOKUP_BLOCK));
        assert_eq!(find("detectAddress").map(|op| op.path), Some("/detectAddress"));
        assert!(find("sendBoc").is_none());
    }

    #[test]
    fn declared_server_and_security() {
        assert_eq!(DEFAULT_SERVER.url, "https://{network}.s.chainbase.online/v1");
        assert_eq!(DEFAULT_SERVER.default_for("network"), Some("ton-mainnet"));
        assert_eq!(
            SECURITY_SCHEME,
            Some(SecurityScheme::ApiKey {
                name: "x-api-key",
                location: ApiKeyLocation::Header,
            })
        );
        assert_eq!(API_TITLE, "chainbase");
        assert_eq!(API_VERSION, "2.0.0");
    }
}
