//! Online LDA Contract Falsification Tests
//!
//! Popperian falsification of the model's standing claims:
//!   - λ stays strictly positive and finite through every update
//!   - Output shapes match (n_topics, n_vocab) and (n_docs, n_topics)
//!   - γ is strictly positive for any in-range document
//!   - ρ_t lies in (0, 1] for τ₀ ≥ 1 and κ ≥ 0
//!   - E[log β] and exp(E[log β]) are always derived from the current λ
//!   - Training is deterministic with a fixed seed
//!
//! References:
//!   - Hoffman, M., Blei, D.M., Bach, F. (2010). Online Learning for Latent
//!     Dirichlet Allocation. NIPS.

use super::*;
use crate::special::dirichlet_expectation_rows;

fn trained(seed: u64) -> (OnlineLda, Vec<Checkpoint>) {
    let mut lda = OnlineLda::new(LdaConfig::new(3, 15).with_random_seed(seed)).expect("config");
    let corpus = lda.sample(90, 25.0).expect("sample");
    let checkpoints = lda
        .online_em(corpus.documents, EmConfig::default().with_batch_size(15))
        .expect("run")
        .collect::<Result<Vec<_>>>()
        .expect("checkpoints");
    (lda, checkpoints)
}

// ============================================================================
// FALSIFY-LDA-001: λ positivity
// Contract: every λ entry is finite and > 0 after every update
// ============================================================================

#[test]
fn falsify_lda_001_lambda_stays_positive() {
    let (_, checkpoints) = trained(42);
    assert_eq!(checkpoints.len(), 6);
    for checkpoint in &checkpoints {
        for &value in checkpoint.lambda.as_slice() {
            assert!(
                value.is_finite() && value > 0.0,
                "FALSIFIED LDA-001: λ entry {value} at step {}",
                checkpoint.step
            );
        }
    }
}

// ============================================================================
// FALSIFY-LDA-002: Output shapes
// Contract: λ and topic-word are (n_topics, n_vocab); mixtures are (n_docs, n_topics)
// ============================================================================

#[test]
fn falsify_lda_002_output_shapes() {
    let (mut lda, checkpoints) = trained(7);
    for checkpoint in &checkpoints {
        assert_eq!(
            checkpoint.lambda.shape(),
            (3, 15),
            "FALSIFIED LDA-002: checkpoint λ shape {:?}",
            checkpoint.lambda.shape()
        );
    }
    assert_eq!(lda.topic_words().shape(), (3, 15));

    let docs = vec![vec![0, 14], vec![3], vec![], vec![9, 9]];
    let mixtures = lda
        .document_topics(&docs, &InferOptions::default())
        .expect("mixtures");
    assert_eq!(
        mixtures.shape(),
        (4, 3),
        "FALSIFIED LDA-002: document-topic shape {:?} != (4, 3)",
        mixtures.shape()
    );
}

// ============================================================================
// FALSIFY-LDA-003: γ positivity
// Contract: γ > 0 for every document, converged or not
// ============================================================================

#[test]
fn falsify_lda_003_gamma_positive() {
    let (lda, _) = trained(3);
    let docs: [&[usize]; 4] = [&[], &[0], &[1, 2, 3, 4, 5, 6, 7, 8], &[14; 40]];
    for (i, doc) in docs.iter().enumerate() {
        for max_iter in [0, 1, 500] {
            let result = lda
                .infer_with_seed(doc, i as u64, false, &InferOptions::new(max_iter, 1e-6))
                .expect("infer");
            assert!(
                result.gamma.iter().all(|&g| g.is_finite() && g > 0.0),
                "FALSIFIED LDA-003: γ {:?} for doc {i} with max_iter {max_iter}",
                result.gamma
            );
        }
    }
}

// ============================================================================
// FALSIFY-LDA-004: Learning-rate range
// Contract: 0 < ρ_t ≤ 1 whenever τ₀ ≥ 1 and κ ≥ 0
// ============================================================================

#[test]
fn falsify_lda_004_rate_in_unit_interval() {
    for (tau0, kappa) in [(1.0, 0.0), (1.0, 0.5), (1.0, 1.0), (64.0, 0.7), (1024.0, 0.5)] {
        let lda = OnlineLda::new(LdaConfig::new(2, 2).with_schedule(tau0, kappa)).expect("config");
        for t in [0, 1, 10, 1_000, 1_000_000] {
            let rho = lda.rate(t);
            assert!(
                rho > 0.0 && rho <= 1.0,
                "FALSIFIED LDA-004: ρ_{t} = {rho} for τ₀={tau0}, κ={kappa}"
            );
        }
    }
}

// ============================================================================
// FALSIFY-LDA-005: Derived expectations
// Contract: E[log β] = ψ(λ) − ψ(Σλ) row-wise, exp(E[log β]) element-wise
// ============================================================================

#[test]
fn falsify_lda_005_expectations_follow_lambda() {
    let (lda, _) = trained(11);
    let expected = dirichlet_expectation_rows(lda.lambda());
    assert_eq!(
        *lda.elog_beta(),
        expected,
        "FALSIFIED LDA-005: E[log β] is stale relative to λ"
    );
    for (e, x) in lda
        .elog_beta()
        .as_slice()
        .iter()
        .zip(lda.exp_elog_beta().as_slice())
    {
        assert!(
            (e.exp() - x).abs() <= 1e-15 * x.abs().max(1.0),
            "FALSIFIED LDA-005: exp(E[log β]) {x} != exp({e})"
        );
    }
}

// ============================================================================
// FALSIFY-LDA-006: Topic-word simplex
// Contract: normalized topic-word rows are non-negative and sum to 1
// ============================================================================

#[test]
fn falsify_lda_006_topic_word_simplex() {
    let (lda, _) = trained(5);
    for (k, row) in lda.topic_words().rows().enumerate() {
        let total: f64 = row.iter().sum();
        assert!(
            (total - 1.0).abs() < 1e-10,
            "FALSIFIED LDA-006: topic {k} sums to {total}"
        );
        assert!(row.iter().all(|&p| p >= 0.0));
    }
}

// ============================================================================
// FALSIFY-LDA-007: Determinism
// Contract: same seed and same stream produce identical checkpoints
// ============================================================================

#[test]
fn falsify_lda_007_deterministic_with_seed() {
    let (a, checkpoints_a) = trained(99);
    let (b, checkpoints_b) = trained(99);
    assert_eq!(
        checkpoints_a, checkpoints_b,
        "FALSIFIED LDA-007: checkpoints differ for the same seed"
    );
    assert_eq!(a.lambda(), b.lambda());
}
