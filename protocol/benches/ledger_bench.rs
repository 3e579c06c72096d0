// Ledger engine and construction benchmarks.
//
// Covers whole-block decoding with and without transfer logs, and the
// pure construction stages an offline signer drives.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use num_bigint::BigUint;
use prost::Message;

use iotex_rosetta::action::{
    Action, ActionCore, ActionHash, BlockTransferLogs, Payload, Receipt, TransactionLog,
    TransactionLogTransfer, Transfer,
};
use iotex_rosetta::client::RawBlock;
use iotex_rosetta::construction::validate::transfer_operations;
use iotex_rosetta::construction::{
    ConstructionMetadata, Constructor, ParseRequest, PayloadsRequest,
};
use iotex_rosetta::crypto::{hash256b, PrivateKey};
use iotex_rosetta::identity::Address;
use iotex_rosetta::ledger::{decode_block, Currency, LedgerContext};

/// A block of `n` signed transfers from one key, all successful.
fn transfer_block(n: usize) -> (RawBlock, Address) {
    let key = PrivateKey::generate();
    let sender = Address::from_public_key(&key.public_key());
    let mut actions = Vec::with_capacity(n);
    let mut receipts = Vec::with_capacity(n);

    for i in 0..n {
        let core = ActionCore {
            version: 1,
            nonce: i as u64,
            gas_limit: 10_000,
            gas_price: "1000000000000".into(),
            chain_id: 1,
            payload: Some(Payload::Transfer(Transfer {
                amount: (i as u64 + 1).to_string(),
                recipient: Address::from_bytes([(i % 251) as u8; 20]).to_string(),
                payload: Vec::new(),
            })),
        };
        let signature = key.sign(&core.signing_digest());
        let bytes = Action {
            core: Some(core),
            sender_pub_key: key.public_key().to_uncompressed().to_vec(),
            signature: signature.as_bytes().to_vec(),
        }
        .encode_to_vec();
        receipts.push(Receipt {
            action_hash: ActionHash(hash256b(&bytes)),
            status: 1,
            gas_consumed: 10_000,
            contract_address: None,
        });
        actions.push(bytes);
    }

    let block = RawBlock {
        height: 10_000_000,
        hash: "aa".repeat(32),
        parent_hash: "bb".repeat(32),
        timestamp_ms: 1_700_000_000_000,
        actions,
        receipts,
    };
    (block, sender)
}

/// Transaction logs mirroring every transfer in `block`.
fn logs_for(block: &RawBlock, sender: &Address) -> BlockTransferLogs {
    BlockTransferLogs::Transaction(
        block
            .receipts
            .iter()
            .enumerate()
            .map(|(i, r)| TransactionLog {
                action_hash: r.action_hash,
                transfers: vec![TransactionLogTransfer {
                    log_type: 7,
                    amount: (i as u64 + 1).to_string(),
                    sender: sender.to_string(),
                    recipient: Address::from_bytes([(i % 251) as u8; 20]).to_string(),
                }],
            })
            .collect(),
    )
}

fn bench_decode_block(c: &mut Criterion) {
    let ctx = LedgerContext::default();
    let mut group = c.benchmark_group("ledger/decode_block");

    for n in [1usize, 16, 128] {
        let (block, sender) = transfer_block(n);
        let logs = logs_for(&block, &sender);
        group.throughput(Throughput::Elements(n as u64));

        group.bench_with_input(BenchmarkId::new("classified", n), &block, |b, block| {
            b.iter(|| decode_block(block, &BlockTransferLogs::Unavailable, &ctx));
        });
        group.bench_with_input(BenchmarkId::new("logged", n), &block, |b, block| {
            b.iter(|| decode_block(block, &logs, &ctx));
        });
    }

    group.finish();
}

fn bench_construction(c: &mut Criterion) {
    let currency = Currency::new("IOTX", 18);
    let constructor = Constructor::new(currency.clone(), 1);
    let request = PayloadsRequest {
        operations: transfer_operations(
            &Address::from_bytes([1; 20]),
            &Address::from_bytes([2; 20]),
            &BigUint::from(1_000_000u32),
            &currency,
        ),
        metadata: ConstructionMetadata {
            nonce: 1,
            gas_limit: 10_000,
            gas_price: 1_000_000_000_000,
        },
        public_keys: Vec::new(),
    };

    c.bench_function("construction/payloads", |b| {
        b.iter(|| constructor.payloads(&request));
    });

    let unsigned = constructor
        .payloads(&request)
        .map(|r| r.unsigned_transaction)
        .unwrap_or_default();
    let parse = ParseRequest {
        signed: false,
        transaction: unsigned,
    };
    c.bench_function("construction/parse_unsigned", |b| {
        b.iter(|| constructor.parse(&parse));
    });
}

criterion_group!(benches, bench_decode_block, bench_construction);
criterion_main!(benches);
