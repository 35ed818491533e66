//! Ergonomic constructors for the generated parameter types.
//!
//! Block-addressed endpoints all take a `(workchain, shard, seqno)` triple;
//! [`BlockId`] carries it around and converts into each of their parameter types.

use crate::models::BlockIdExt;
use crate::types::{
    DetectAddressParams, GetAddressBalanceParams, GetAddressInformationParams,
    GetAddressStateParams, GetBlockHeaderParams, GetBlockTransactionsParams,
    GetExtendedAddressInformationParams, GetShardBlockProofParams, GetTokenDataParams,
    GetTransactionsParams, GetWalletInformationParams, LookupBlockParams, PackAddressParams,
    ShardsParams, TryLocateResultTxParams, TryLocateSourceTxParams, TryLocateTxParams,
    UnpackAddressParams,
};

/// Workchain id of the masterchain.
pub const MASTERCHAIN: i32 = -1;

/// Workchain id of the basechain.
pub const BASECHAIN: i32 = 0;

/// Shard id covering a whole workchain (`0x8000000000000000`).
pub const SHARD_ALL: i64 = i64::MIN;

/// A block addressed by workchain, shard and seqno.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId {
    pub workchain: i32,
    pub shard: i64,
    pub seqno: i32,
}

impl BlockId {
    pub const fn new(workchain: i32, shard: i64, seqno: i32) -> Self {
        Self {
            workchain,
            shard,
            seqno,
        }
    }

    /// A masterchain block; the masterchain has a single shard.
    pub const fn masterchain(seqno: i32) -> Self {
        Self::new(MASTERCHAIN, SHARD_ALL, seqno)
    }
}

impl From<&BlockIdExt> for BlockId {
    fn from(value: &BlockIdExt) -> Self {
        Self::new(value.workchain, value.shard, value.seqno)
    }
}

impl From<BlockId> for GetBlockHeaderParams {
    fn from(block: BlockId) -> Self {
        Self {
            workchain: block.workchain,
            shard: block.shard,
            seqno: block.seqno,
            root_hash: None,
            file_hash: None,
        }
    }
}

/// Pins the block by its hashes as well.
impl From<&BlockIdExt> for GetBlockHeaderParams {
    fn from(block: &BlockIdExt) -> Self {
        Self {
            root_hash: Some(block.root_hash.clone()),
            file_hash: Some(block.file_hash.clone()),
            ..BlockId::from(block).into()
        }
    }
}

impl From<BlockId> for GetBlockTransactionsParams {
    fn from(block: BlockId) -> Self {
        Self {
            workchain: block.workchain,
            shard: block.shard,
            seqno: block.seqno,
            root_hash: None,
            file_hash: None,
            after_lt: None,
            after_hash: None,
            count: None,
        }
    }
}

impl From<&BlockIdExt> for GetBlockTransactionsParams {
    fn from(block: &BlockIdExt) -> Self {
        Self {
            root_hash: Some(block.root_hash.clone()),
            file_hash: Some(block.file_hash.clone()),
            ..BlockId::from(block).into()
        }
    }
}

impl From<BlockId> for GetShardBlockProofParams {
    fn from(block: BlockId) -> Self {
        Self {
            workchain: block.workchain,
            shard: block.shard,
            seqno: block.seqno,
            from_seqno: None,
        }
    }
}

impl GetBlockTransactionsParams {
    /// Continue listing after the transaction `(after_lt, after_hash)`.
    pub fn after(mut self, after_lt: i64, after_hash: impl Into<String>) -> Self {
        self.after_lt = Some(after_lt);
        self.after_hash = Some(after_hash.into());
        self
    }

    pub fn with_count(mut self, count: i32) -> Self {
        self.count = Some(count);
        self
    }
}

impl LookupBlockParams {
    pub fn by_seqno(workchain: i32, shard: i64, seqno: i32) -> Self {
        Self {
            workchain,
            shard,
            seqno: Some(seqno),
            lt: None,
            unixtime: None,
        }
    }

    pub fn by_lt(workchain: i32, shard: i64, lt: i64) -> Self {
        Self {
            workchain,
            shard,
            seqno: None,
            lt: Some(lt),
            unixtime: None,
        }
    }

    pub fn by_unixtime(workchain: i32, shard: i64, unixtime: i64) -> Self {
        Self {
            workchain,
            shard,
            seqno: None,
            lt: None,
            unixtime: Some(unixtime),
        }
    }
}

impl ShardsParams {
    pub fn new(seqno: i32) -> Self {
        Self { seqno }
    }
}

impl GetTransactionsParams {
    /// The latest transactions of `address`, server-default page size.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            limit: None,
            lt: None,
            hash: None,
            to_lt: None,
            archival: None,
        }
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Start from the transaction `(lt, hash)` instead of the latest one.
    pub fn starting_at(mut self, lt: i64, hash: impl Into<String>) -> Self {
        self.lt = Some(lt);
        self.hash = Some(hash.into());
        self
    }

    pub fn until_lt(mut self, to_lt: i64) -> Self {
        self.to_lt = Some(to_lt);
        self
    }

    pub fn archival(mut self, archival: bool) -> Self {
        self.archival = Some(archival);
        self
    }
}

// `address`-only parameter types.
macro_rules! address_params {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $ty {
                pub fn new(address: impl Into<String>) -> Self {
                    Self { address: address.into() }
                }
            }
        )+
    };
}

address_params!(
    GetAddressInformationParams,
    GetExtendedAddressInformationParams,
    GetWalletInformationParams,
    GetAddressBalanceParams,
    GetAddressStateParams,
    PackAddressParams,
    UnpackAddressParams,
    GetTokenDataParams,
    DetectAddressParams,
);

// The three locate endpoints share one message key.
macro_rules! locate_params {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl $ty {
                /// The message from `source` to `destination` created at `created_lt`.
                pub fn new(
                    source: impl Into<String>,
                    destination: impl Into<String>,
                    created_lt: i64,
                ) -> Self {
                    Self {
                        source: source.into(),
                        destination: destination.into(),
                        created_lt,
                    }
                }
            }
        )+
    };
}

locate_params!(TryLocateTxParams, TryLocateResultTxParams, TryLocateSourceTxParams);
