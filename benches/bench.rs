use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use k256::{ProjectivePoint, Scalar};
use rand::thread_rng;

use frost_bip340::dkg::Round;
use frost_bip340::{Aggregator, NonceCommitmentPair, NoncePair, Participant};

fn run_dkg(threshold: u8, participants: u8) -> Vec<Participant> {
    let mut rng = thread_rng();
    let rounds: Vec<Round> = (1..=participants)
        .map(|index| Round::keygen(threshold, participants, index, &mut rng).unwrap())
        .collect();

    let all_shares: Vec<Vec<Scalar>> = rounds.iter().map(|round| round.shares()).collect();
    let all_commitments: Vec<Vec<ProjectivePoint>> = rounds
        .iter()
        .map(|round| round.commitments().to_vec())
        .collect();

    rounds
        .into_iter()
        .enumerate()
        .map(|(position, round)| {
            let received: Vec<Scalar> = (0..usize::from(participants))
                .filter(|&dealer| dealer != position)
                .map(|dealer| all_shares[dealer][position])
                .collect();
            let sets: Vec<Vec<ProjectivePoint>> = (0..usize::from(participants))
                .filter(|&dealer| dealer != position)
                .map(|dealer| all_commitments[dealer].clone())
                .collect();
            Participant::from_dkg(round, &received, &sets).unwrap()
        })
        .collect()
}

fn bench_dkg(c: &mut Criterion) {
    c.bench_function("dkg 2-of-3", |b| b.iter(|| run_dkg(2, 3)));
    c.bench_function("dkg 5-of-9", |b| b.iter(|| run_dkg(5, 9)));
}

fn bench_signing_share(c: &mut Criterion) {
    let group = run_dkg(2, 3);

    c.bench_function("signing share 2-of-3", |b| {
        b.iter_batched(
            || {
                let mut rng = thread_rng();
                let nonce = NoncePair::generate(&mut rng);
                let other = NoncePair::generate(&mut rng);
                let mut pairs = vec![NonceCommitmentPair::default(); 3];
                pairs[0] = nonce.commitments();
                pairs[1] = other.commitments();
                (nonce, pairs)
            },
            |(nonce, pairs)| {
                group[0]
                    .sign(b"bench message", nonce, &pairs, &[1, 2], None)
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_aggregation(c: &mut Criterion) {
    let group = run_dkg(2, 3);
    let mut rng = thread_rng();
    let message = b"bench message";

    let nonce_1 = NoncePair::generate(&mut rng);
    let nonce_2 = NoncePair::generate(&mut rng);
    let mut pairs = vec![NonceCommitmentPair::default(); 3];
    pairs[0] = nonce_1.commitments();
    pairs[1] = nonce_2.commitments();

    let shares = [
        group[0].sign(message, nonce_1, &pairs, &[1, 2], None).unwrap(),
        group[1].sign(message, nonce_2, &pairs, &[1, 2], None).unwrap(),
    ];
    let aggregator =
        Aggregator::new(*group[0].public_key(), message, &pairs, &[1, 2], None).unwrap();

    c.bench_function("aggregate 2-of-3", |b| {
        b.iter(|| aggregator.signature(&shares).unwrap())
    });
}

criterion_group!(benches, bench_dkg, bench_signing_share, bench_aggregation);
criterion_main!(benches);
