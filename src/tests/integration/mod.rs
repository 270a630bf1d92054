//! Integration tests: install genesis, run the acceptance scenarios through
//! the full stack (pool -> executor -> environment), and exercise the RPC
//! dispatch path against a live node wiring.

use std::sync::Arc;
use std::time::Duration;

use crate::crypto::Keypair;
use crate::node::genesis::{self, GenesisConfig, GenesisInfo};
use crate::programs::token::ERR_TRANSFER_EXCEEDED;
use crate::programs::stablecoin::INITIAL_RATIO_MSG;
use crate::runtime::call::{Call, CallReturn, OracleCall, StableCall, TokenCall};
use crate::runtime::env::ExecutionEnv;
use crate::runtime::executor::Executor;
use crate::runtime::revert::Revert;
use crate::state::{AccountCache, InMemAccountStore};
use crate::txpool::ingest::{IngestResult, SignatureValidator, TxIngestor};
use crate::txpool::pool::{Tx, TxPool};

const ETH: u128 = 1_000_000_000_000_000_000;

struct TestChain {
    env: ExecutionEnv,
    pool: Arc<TxPool>,
    executor: Arc<Executor>,
    ingestor: TxIngestor<SignatureValidator>,
    info: GenesisInfo,
}

fn chain() -> TestChain {
    let cache = AccountCache::new(Arc::new(InMemAccountStore::new()));
    let info = genesis::install(&GenesisConfig::default_dev(), &cache).unwrap();
    let env = ExecutionEnv::new(cache.clone());
    let pool = Arc::new(TxPool::new(1000, Duration::from_secs(60)));
    let executor = Arc::new(Executor::new(env.clone(), pool.clone()));
    let ingestor = TxIngestor::new(pool.clone(), Arc::new(SignatureValidator::new(cache)));
    TestChain { env, pool, executor, ingestor, info }
}

/// Submit through ingest, drain the pool, and return the executed receipt.
async fn submit_and_run(chain: &TestChain, tx: Tx) -> crate::runtime::executor::Receipt {
    let id = tx.id_hex();
    match chain.ingestor.ingest(tx).await.unwrap() {
        IngestResult::Accepted(_) => {}
        IngestResult::Rejected(r) => panic!("ingest rejected: {}", r),
    }
    chain.executor.drain(64).await;
    chain.executor.receipt(&id).expect("receipt recorded")
}

#[tokio::test]
async fn test_token_transfer_chain() {
    let chain = chain();
    let deployer = Keypair::dev(0);
    let other1 = Keypair::dev(1);
    let other2 = Keypair::dev(2);
    assert_eq!(chain.info.deployer, deployer.address());

    // deployer hands 10 base units to other1
    let r = submit_and_run(
        &chain,
        Tx::sign(
            &deployer,
            0,
            Call::Token(TokenCall::Transfer { to: other1.address(), amount: 10 }),
            0,
        ),
    )
    .await;
    assert!(r.success);

    // other1 passes all 10 on to other2
    let r = submit_and_run(
        &chain,
        Tx::sign(
            &other1,
            0,
            Call::Token(TokenCall::Transfer { to: other2.address(), amount: 10 }),
            0,
        ),
    )
    .await;
    assert!(r.success);
    assert_eq!(r.ret, Some(CallReturn::Bool(true)));

    let token = chain.env.token().unwrap();
    assert_eq!(token.balance_of(&other2.address()), 10);
    assert_eq!(token.balance_of(&other1.address()), 0);
}

#[tokio::test]
async fn test_token_transfer_exceeding_balance_reverts() {
    let chain = chain();
    let deployer = Keypair::dev(0);
    let other1 = Keypair::dev(1);
    let other2 = Keypair::dev(2);

    submit_and_run(
        &chain,
        Tx::sign(
            &deployer,
            0,
            Call::Token(TokenCall::Transfer { to: other1.address(), amount: 10 }),
            0,
        ),
    )
    .await;

    // 15 exceeds the 10 other1 holds
    let r = submit_and_run(
        &chain,
        Tx::sign(
            &other1,
            0,
            Call::Token(TokenCall::Transfer { to: other2.address(), amount: 15 }),
            0,
        ),
    )
    .await;
    assert!(!r.success);
    assert_eq!(r.err, Some(Revert::msg(ERR_TRANSFER_EXCEEDED)));

    // both balances unchanged by the failed transfer
    let token = chain.env.token().unwrap();
    assert_eq!(token.balance_of(&other1.address()), 10);
    assert_eq!(token.balance_of(&other2.address()), 0);
}

#[tokio::test]
async fn test_stablecoin_full_scenario() {
    let chain = chain();
    let deployer = Keypair::dev(0);

    // fee rate survives construction
    let stc = chain.env.stablecoin().unwrap();
    assert_eq!(stc.fee_rate_percentage, 3);
    assert_eq!(chain.env.oracle_price().unwrap(), 4000);

    // mint with 1 ETH at price 4000
    let r = submit_and_run(&chain, Tx::sign(&deployer, 0, Call::Stable(StableCall::Mint), ETH)).await;
    assert!(r.success);
    assert_eq!(r.ret, Some(CallReturn::Amount(4000 * ETH)));
    assert_eq!(chain.env.stablecoin().unwrap().ledger.total_supply(), 4000 * ETH);

    // burn down to 100 tokens
    let r = submit_and_run(
        &chain,
        Tx::sign(&deployer, 1, Call::Stable(StableCall::Burn { amount: 3900 * ETH }), 0),
    )
    .await;
    assert!(r.success);
    assert_eq!(chain.env.stablecoin().unwrap().ledger.total_supply(), 100 * ETH);
}

#[tokio::test]
async fn test_buffer_deposit_below_minimum_reverts_with_amount() {
    let chain = chain();
    let deployer = Keypair::dev(0);

    submit_and_run(&chain, Tx::sign(&deployer, 0, Call::Stable(StableCall::Mint), ETH)).await;

    // 0.05 ETH is below the 10% of the 1 ETH backing the supply
    let r = submit_and_run(
        &chain,
        Tx::sign(&deployer, 1, Call::Stable(StableCall::DepositCollateralBuffer), ETH / 20),
    )
    .await;
    assert!(!r.success);
    assert_eq!(
        r.err,
        Some(Revert::InitialCollateralRatio {
            message: INITIAL_RATIO_MSG.to_string(),
            minimum_wei: ETH / 10,
        })
    );
    // the rolled-back deposit left the contract balance alone
    assert_eq!(
        chain.env.balance_wei(&crate::runtime::env::stablecoin_address()).unwrap(),
        ETH
    );
}

#[tokio::test]
async fn test_oracle_price_drives_mint() {
    let chain = chain();
    let deployer = Keypair::dev(0);

    submit_and_run(
        &chain,
        Tx::sign(&deployer, 0, Call::Oracle(OracleCall::SetPrice { price: 2500 }), 0),
    )
    .await;
    let r = submit_and_run(&chain, Tx::sign(&deployer, 1, Call::Stable(StableCall::Mint), 2 * ETH)).await;
    assert!(r.success);
    assert_eq!(r.ret, Some(CallReturn::Amount(5000 * ETH)));
}

#[tokio::test]
async fn test_buffer_lifecycle_deposit_then_withdraw() {
    let chain = chain();
    let deployer = Keypair::dev(0);
    let depositor = Keypair::dev(3);

    submit_and_run(&chain, Tx::sign(&deployer, 0, Call::Stable(StableCall::Mint), ETH)).await;

    let r = submit_and_run(
        &chain,
        Tx::sign(&depositor, 0, Call::Stable(StableCall::DepositCollateralBuffer), ETH / 10),
    )
    .await;
    assert!(r.success);
    let dpc = match r.ret {
        Some(CallReturn::Amount(a)) => a,
        other => panic!("unexpected return: {:?}", other),
    };
    assert_eq!(dpc, 400 * ETH);

    let before = chain.env.balance_wei(&depositor.address()).unwrap();
    let r = submit_and_run(
        &chain,
        Tx::sign(
            &depositor,
            1,
            Call::Stable(StableCall::WithdrawCollateralBuffer { amount: dpc }),
            0,
        ),
    )
    .await;
    assert!(r.success);
    assert_eq!(r.ret, Some(CallReturn::Amount(ETH / 10)));
    assert_eq!(chain.env.balance_wei(&depositor.address()).unwrap(), before + ETH / 10);
}

#[tokio::test]
async fn test_ingest_rejects_replayed_nonce() {
    let chain = chain();
    let deployer = Keypair::dev(0);
    let tx = Tx::sign(
        &deployer,
        0,
        Call::Token(TokenCall::Transfer { to: Keypair::dev(1).address(), amount: 1 }),
        0,
    );
    submit_and_run(&chain, tx.clone()).await;

    // the same nonce is spent now
    let res = chain.ingestor.ingest(tx).await.unwrap();
    assert!(matches!(res, IngestResult::Rejected(ref r) if r.contains("nonce")));
    assert_eq!(chain.pool.len(), 0);
}

mod rpc_dispatch {
    //! Drive the JSON-RPC dispatch path against a minimal RpcDeps wiring.

    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use crate::rpc::handlers::{RpcDeps, RpcHandler};
    use crate::rpc::server::{dispatch, JsonRpcRequest};
    use crate::runtime::executor::Receipt;
    use crate::state::Account;

    struct TestDeps {
        chain: TestChain,
    }

    #[async_trait]
    impl RpcDeps for TestDeps {
        async fn submit_transaction(&self, tx: Tx) -> Result<IngestResult> {
            Ok(self.chain.ingestor.ingest(tx).await?)
        }
        async fn get_account(&self, addr: &str) -> Result<Option<Account>> {
            self.chain.env.cache().get(&addr.to_string())
        }
        async fn get_receipt(&self, tx_id: &str) -> Option<Receipt> {
            self.chain.executor.receipt(tx_id)
        }
        async fn mempool_size(&self) -> usize {
            self.chain.pool.len()
        }
        async fn token_balance_of(&self, addr: &str) -> Result<u128> {
            Ok(self.chain.env.token()?.balance_of(&addr.to_string()))
        }
        async fn token_total_supply(&self) -> Result<u128> {
            Ok(self.chain.env.token()?.total_supply())
        }
        async fn stable_balance_of(&self, addr: &str) -> Result<u128> {
            Ok(self.chain.env.stablecoin()?.ledger.balance_of(&addr.to_string()))
        }
        async fn stable_total_supply(&self) -> Result<u128> {
            Ok(self.chain.env.stablecoin()?.ledger.total_supply())
        }
        async fn depositor_balance_of(&self, addr: &str) -> Result<u128> {
            Ok(self.chain.env.stablecoin()?.depositor.balance_of(&addr.to_string()))
        }
        async fn fee_rate(&self) -> Result<u128> {
            Ok(self.chain.env.stablecoin()?.fee_rate_percentage)
        }
        async fn oracle_price(&self) -> Result<u128> {
            Ok(self.chain.env.oracle_price()?)
        }
    }

    fn request(method: &str, params: Option<serde_json::Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(serde_json::json!(1)),
        }
    }

    #[tokio::test]
    async fn test_fee_rate_and_price_views() {
        let handler = RpcHandler::new(Arc::new(TestDeps { chain: chain() }));
        let resp = dispatch(&handler, request("fee_rate", None)).await;
        assert_eq!(resp.result, Some(serde_json::json!("3")));
        let resp = dispatch(&handler, request("oracle_price", None)).await;
        assert_eq!(resp.result, Some(serde_json::json!("4000")));
    }

    #[tokio::test]
    async fn test_submit_tx_roundtrip_via_json() {
        let chain = chain();
        let deployer = Keypair::dev(0);
        let tx = Tx::sign(&deployer, 0, Call::Stable(StableCall::Mint), ETH);

        let handler = RpcHandler::new(Arc::new(TestDeps { chain }));
        let params = serde_json::json!([tx]);
        let resp = dispatch(&handler, request("submit_tx", Some(params))).await;
        assert!(resp.error.is_none(), "submit failed: {:?}", resp.error);

        // large amounts survive the JSON boundary as strings
        let resp = dispatch(&handler, request("token_balance_of", Some(serde_json::json!([Keypair::dev(0).address()])))).await;
        assert_eq!(resp.result, Some(serde_json::json!((100 * ETH).to_string())));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let handler = RpcHandler::new(Arc::new(TestDeps { chain: chain() }));
        let resp = dispatch(&handler, request("no_such_method", None)).await;
        let err = resp.error.unwrap();
        assert_eq!(err.get("code").unwrap(), &serde_json::json!(-32601));
    }

    #[tokio::test]
    async fn test_status_reports_supplies() {
        let handler = RpcHandler::new(Arc::new(TestDeps { chain: chain() }));
        let resp = dispatch(&handler, request("status", None)).await;
        let status = resp.result.unwrap();
        assert_eq!(status.get("stable_total_supply").unwrap(), &serde_json::json!("0"));
        assert_eq!(status.get("oracle_price").unwrap(), &serde_json::json!("4000"));
    }
}

#[tokio::test]
async fn test_node_boot_and_shutdown() {
    let node = crate::node::node::Node::new(crate::node::node::NodeConfig::dev("127.0.0.1:0"));
    let (svc, info) = node.start().await.unwrap();
    assert_eq!(info.dev_addresses.len(), 10);
    svc.shutdown().await.unwrap();
}
