//! Example: Query TON mainnet through the Chainbase API.
//!
//! Run with: CHAINBASE_API_KEY=... cargo run --example mainnet

use ton_openapi_client::{BlockId, ClientOptions, TonApiClient, client::Result, types::*};

const ADDRESS: &str = "EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N";

#[tokio::main]
async fn main() -> Result<()> {
    let mut client = TonApiClient::mainnet();
    client.configure(ClientOptions::new().timeout_ms(10_000));
    if let Ok(key) = std::env::var("CHAINBASE_API_KEY") {
        client.auth(key);
    }

    println!("=== TON Mainnet via Chainbase ===\n");

    // 1. Masterchain state
    println!("1. Fetching masterchain info...");
    let info = client.get_masterchain_info().await?;
    println!("   Last seqno: {}", info.last.seqno);
    println!("   Last root hash: {}", info.last.root_hash);
    println!("   State root hash: {}", info.state_root_hash);
    println!();

    // 2. Shards of the latest masterchain block
    println!("2. Fetching shards...");
    let shards = client.shards(ShardsParams::new(info.last.seqno)).await?;
    for shard in &shards.shards {
        println!(
            "   workchain {} shard {:x} seqno {}",
            shard.workchain, shard.shard, shard.seqno
        );
    }
    println!();

    // 3. Header of the latest masterchain block
    println!("3. Fetching block header...");
    let header = client
        .get_block_header(BlockId::from(&info.last).into())
        .await?;
    println!("   Global id: {}", header["global_id"]);
    println!();

    // 4. Account
    println!("4. Fetching account {ADDRESS}...");
    let account = client
        .get_address_information(GetAddressInformationParams::new(ADDRESS))
        .await?;
    println!("   State: {}", account.state);
    println!("   Balance: {} nanotons", account.balance);
    println!("   Last lt: {}", account.last_transaction_id.lt);
    println!();

    // 5. Recent transactions
    println!("5. Fetching recent transactions...");
    let txs = client
        .get_transactions(GetTransactionsParams::new(ADDRESS).with_limit(3))
        .await?;
    println!("   Got {} transactions", txs.len());

    println!("\n=== Done! ===");
    Ok(())
}
