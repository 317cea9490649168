//! Call forest construction, commitment and revelation through the public API

use anyhow::Result;
use call_forest::errors::{Error, ForestError, UpdateError};
use call_forest::forest::{
    build_forest, build_forest_from_updates, cons, empty_forest_digest, flatten, forest_digest,
    hash_node, node_digest, par_forest_digest, update_digest, CallForest, CallForestNode,
    ForestIterator, MemoizedForest, DEFAULT_CONFIG,
};
use call_forest::types::CallDepth;
use call_forest::update::RawAccountUpdate;
use call_forest::zkp::{CircuitBuilder, Compiler, Digest, Native};
use call_forest::{AccountUpdate, AuthorizationKind};
use proptest::prelude::*;

fn account(key: u8) -> AccountUpdate {
    AccountUpdate::new([key; 32], AuthorizationKind::Signature)
        .with_balance_change(-i64::from(key))
}

/// `u0, u1 [u1_0], u2`
fn scenario() -> (AccountUpdate, AccountUpdate, AccountUpdate, AccountUpdate) {
    (account(10), account(11), account(12), account(20))
}

#[test]
fn test_concrete_scenario() -> Result<()> {
    let (u0, u1, u1_0, u2) = scenario();

    let forest = build_forest(vec![
        (u0.clone(), 0),
        (u1.clone(), 0),
        (u1_0.clone(), 1),
        (u2.clone(), 0),
    ])?;

    let expected = CallForest::new(vec![
        CallForestNode::leaf(u0.clone()),
        CallForestNode::new(u1.clone(), CallForest::new(vec![CallForestNode::leaf(u1_0.clone())])),
        CallForestNode::leaf(u2.clone()),
    ]);
    assert_eq!(forest, expected);

    let e = empty_forest_digest();
    let leaf_digest = |u: &AccountUpdate| hash_node(&update_digest(u), &e);
    let u1_children = cons(&leaf_digest(&u1_0), &e);
    let u1_digest = hash_node(&update_digest(&u1), &u1_children);
    let digest = cons(&leaf_digest(&u0), &cons(&u1_digest, &cons(&leaf_digest(&u2), &e)));

    assert_eq!(forest_digest(&forest)?, digest);
    Ok(())
}

#[test]
fn test_depth_validation() {
    let (u0, u1, ..) = scenario();

    let jump = build_forest(vec![(u0.clone(), 0), (u1.clone(), 2)]);
    let first_nonzero = build_forest(vec![(u0, 1), (u1, 1)]);

    assert!(matches!(
        jump,
        Err(Error::Forest(ForestError::InvalidDepthJump { index: 1, previous: Some(0), depth: 2 }))
    ));
    assert!(matches!(
        first_nonzero,
        Err(Error::Forest(ForestError::InvalidDepthJump { index: 0, previous: None, .. }))
    ));
}

#[test]
fn test_too_many_nodes() {
    let flat = (0..=4096u32).map(|i| (account((i % 256) as u8), 0));

    let result = build_forest(flat);

    assert!(matches!(
        result,
        Err(Error::Forest(ForestError::ForestTooLarge { bound: "node count", .. }))
    ));
}

#[test]
fn test_empty_forest_digest() -> Result<()> {
    assert_eq!(forest_digest(&CallForest::empty())?, Digest::ZERO);
    assert_eq!(forest_digest(&build_forest(Vec::new())?)?, empty_forest_digest());
    Ok(())
}

#[test]
fn test_prepend_law() -> Result<()> {
    let (u0, u1, u1_0, u2) = scenario();
    let mut forest = build_forest(vec![(u1, 0), (u1_0, 1), (u2, 0)])?;
    let head = CallForestNode::leaf(u0);
    let before = forest_digest(&forest)?;

    forest.prepend(head.clone());

    assert_eq!(forest_digest(&forest)?, cons(&node_digest(&head)?, &before));
    Ok(())
}

#[test]
fn test_order_sensitivity() -> Result<()> {
    let (a, b, ..) = scenario();

    let ab = build_forest(vec![(a.clone(), 0), (b.clone(), 0)])?;
    let ba = build_forest(vec![(b, 0), (a, 0)])?;

    assert_ne!(forest_digest(&ab)?, forest_digest(&ba)?);
    Ok(())
}

#[test]
fn test_raw_updates_into_forest() -> Result<()> {
    let raw = |key: u8, depth: CallDepth| RawAccountUpdate {
        public_key: Some([key; 32]),
        authorization_kind: Some(1),
        call_depth: Some(depth),
        ..Default::default()
    };
    let updates = [raw(1, 0), raw(2, 1), raw(3, 0)]
        .into_iter()
        .map(AccountUpdate::try_from)
        .collect::<std::result::Result<Vec<_>, Error>>()?;

    let forest = build_forest_from_updates(updates)?;

    assert_eq!(forest.len(), 2);
    assert_eq!(forest.node_count(), 3);
    let depths: Vec<CallDepth> =
        forest.to_updates().iter().map(AccountUpdate::call_depth).collect();
    assert_eq!(depths, vec![0, 1, 0]);

    let bad = RawAccountUpdate { public_key: Some([1; 32]), ..Default::default() };
    assert!(matches!(
        AccountUpdate::try_from(bad),
        Err(Error::Update(UpdateError::MalformedPayload { field: "authorization_kind", .. }))
    ));
    Ok(())
}

#[test]
fn test_memoized_matches_plain_after_edits() -> Result<()> {
    let (u0, u1, u1_0, u2) = scenario();
    let forest = build_forest(vec![(u0, 0), (u1, 0), (u1_0, 1), (u2, 0)])?;
    let mut memo = MemoizedForest::new(forest);

    assert_eq!(memo.digest()?, forest_digest(memo.forest())?);

    memo.replace_update(&[1, 0], account(30))?;
    assert_eq!(memo.digest()?, forest_digest(memo.forest())?);

    memo.replace_children(&[2], CallForest::new(vec![CallForestNode::leaf(account(31))]))?;
    assert_eq!(memo.digest()?, forest_digest(memo.forest())?);

    memo.push(CallForestNode::leaf(account(32)));
    assert_eq!(memo.digest()?, forest_digest(memo.forest())?);

    memo.prepend(CallForestNode::leaf(account(33)));
    assert_eq!(memo.digest()?, forest_digest(memo.forest())?);
    assert_eq!(memo.digest()?, par_forest_digest(memo.forest())?);
    Ok(())
}

#[test]
fn test_iterator_on_both_paths() -> Result<()> {
    let (u0, u1, u1_0, u2) = scenario();
    let flat = vec![(u0, 0), (u1, 0), (u1_0, 1), (u2, 0)];
    let forest = build_forest(flat.clone())?;
    let commitment = forest_digest(&forest)?;

    let mut native = ForestIterator::new(&forest, commitment, &DEFAULT_CONFIG)?;
    let revealed = native.reveal_all(&mut Native)?;

    let mut builder = CircuitBuilder::new();
    let committed = builder.constant_digest(&commitment);
    let mut in_circuit = ForestIterator::new(&forest, committed, &DEFAULT_CONFIG)?;
    let revealed_in_circuit = in_circuit.reveal_all(&mut builder)?;
    let (circuit, witness) = builder.build();
    circuit.check(&witness)?;

    let owned = |items: Vec<(&AccountUpdate, CallDepth)>| {
        items.into_iter().map(|(u, d)| (u.clone(), d)).collect::<Vec<_>>()
    };
    assert_eq!(owned(revealed), flat);
    assert_eq!(owned(revealed_in_circuit), flatten(&forest));
    Ok(())
}

#[test]
fn test_iterator_rejects_wrong_commitment() -> Result<()> {
    let (u0, u1, ..) = scenario();
    let forest = build_forest(vec![(u0.clone(), 0), (u1.clone(), 1)])?;
    let other = build_forest(vec![(u0, 0), (u1, 0)])?;

    let mut iter = ForestIterator::new(&forest, forest_digest(&other)?, &DEFAULT_CONFIG)?;

    assert!(iter.reveal_all(&mut Native).is_err());
    Ok(())
}

fn arb_depths() -> impl Strategy<Value = Vec<CallDepth>> {
    prop::collection::vec(any::<u8>(), 0..30).prop_map(|seeds| {
        let mut depths: Vec<CallDepth> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let depth = match depths.last() {
                None => 0,
                Some(prev) => CallDepth::from(seed) % (prev + 2),
            };
            depths.push(depth);
        }
        depths
    })
}

proptest! {
    #[test]
    fn prop_flatten_inverts_build_forest(depths in arb_depths()) {
        let flat: Vec<(AccountUpdate, CallDepth)> = depths
            .iter()
            .enumerate()
            .map(|(i, depth)| (account(i as u8), *depth))
            .collect();

        let forest = build_forest(flat.clone()).expect("generated sequences are valid");

        prop_assert_eq!(flatten(&forest), flat);
        prop_assert_eq!(forest.node_count(), depths.len());
    }
}
