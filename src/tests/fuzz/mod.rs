//! Fuzz-style tests: random inputs must never panic, and the core
//! conservation invariants must hold after every call, failed or not.

use std::sync::Arc;

use rand::Rng;

use crate::crypto::Keypair;
use crate::node::genesis::{self, GenesisConfig};
use crate::runtime::call::{Call, OracleCall, StableCall, TokenCall};
use crate::runtime::env::ExecutionEnv;
use crate::state::{AccountCache, InMemAccountStore};
use crate::txpool::pool::Tx;

const ETH: u128 = 1_000_000_000_000_000_000;

fn fuzz_env() -> ExecutionEnv {
    let cache = AccountCache::new(Arc::new(InMemAccountStore::new()));
    genesis::install(&GenesisConfig::default_dev(), &cache).unwrap();
    ExecutionEnv::new(cache)
}

#[test]
fn fuzz_transfer_storm_conserves_supply() {
    let mut rng = rand::thread_rng();
    let env = fuzz_env();
    let actors: Vec<_> = (0..5).map(|i| Keypair::dev(i).address()).collect();

    let initial_supply = env.token().unwrap().total_supply();
    for _ in 0..1000 {
        let from = &actors[rng.gen_range(0..actors.len())];
        let to = &actors[rng.gen_range(0..actors.len())];
        let amount: u128 = rng.gen_range(0..200 * ETH);
        // failures are expected; state must stay consistent either way
        let _ = env.call(
            from,
            Call::Token(TokenCall::Transfer { to: to.clone(), amount }),
            0,
        );
        let token = env.token().unwrap();
        assert_eq!(token.total_supply(), initial_supply);
        assert_eq!(token.balance_sum(), initial_supply);
    }
}

fn total_wei(env: &ExecutionEnv) -> u128 {
    env.cache()
        .snapshot()
        .unwrap()
        .values()
        .map(|acc| acc.wei)
        .sum()
}

#[test]
fn fuzz_random_calls_never_panic() {
    let mut rng = rand::thread_rng();
    let env = fuzz_env();
    let actors: Vec<_> = (0..10).map(|i| Keypair::dev(i).address()).collect();
    let wei_at_genesis = total_wei(&env);

    for _ in 0..500 {
        let caller = actors[rng.gen_range(0..actors.len())].clone();
        let target = actors[rng.gen_range(0..actors.len())].clone();
        let amount: u128 = rng.gen_range(0..10_000 * ETH);
        let value: u128 = rng.gen_range(0..20 * ETH);

        let call = match rng.gen_range(0..8) {
            0 => Call::NativeTransfer { to: target },
            1 => Call::Token(TokenCall::Transfer { to: target, amount }),
            2 => Call::Token(TokenCall::Approve { spender: target, amount }),
            3 => Call::Token(TokenCall::TransferFrom {
                from: target.clone(),
                to: target,
                amount,
            }),
            4 => Call::Stable(StableCall::Mint),
            5 => Call::Stable(StableCall::Burn { amount }),
            6 => Call::Stable(StableCall::DepositCollateralBuffer),
            _ => Call::Oracle(OracleCall::SetPrice { price: rng.gen_range(1..10_000) }),
        };

        let before = env.cache().snapshot().unwrap();
        match env.call(&caller, call, value) {
            Ok(_) => {}
            Err(_) => {
                // atomicity: a failed call leaves the state byte-identical
                let after = env.cache().snapshot().unwrap();
                assert_eq!(before, after);
            }
        }
        // no call mints or destroys native currency
        assert_eq!(total_wei(&env), wei_at_genesis);
    }
}

#[test]
fn fuzz_transaction_parsing() {
    let mut rng = rand::thread_rng();

    for _ in 0..1000 {
        let len = rng.gen_range(0..256);
        let bogus: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        // just ensure we don't panic on garbage bytes
        let _ = bincode::deserialize::<Tx>(&bogus);
    }
}

#[test]
fn fuzz_tx_json_roundtrip() {
    let mut rng = rand::thread_rng();
    let kp = Keypair::dev(1);

    for _ in 0..100 {
        let tx = Tx::sign(
            &kp,
            rng.gen(),
            Call::Token(TokenCall::Transfer {
                to: Keypair::dev(rng.gen_range(0..10)).address(),
                amount: rng.gen(),
            }),
            rng.gen(),
        );
        let json = serde_json::to_string(&tx).unwrap();
        let back: Tx = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert!(back.verify_signature());
    }
}
