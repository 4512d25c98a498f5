//! Adaptive softmax conformance tests.
//!
//! Exercises the public API end to end: construction from code and from
//! JSON configuration, the three inference paths and their agreement, and
//! the error kinds reported for bad input.

use adaptive_softmax::nn::Segment;
use adaptive_softmax::prelude::*;

fn vocab_layer(seed: u64) -> AdaptiveLogSoftmaxWithLoss {
    let config = AdaptiveSoftmaxConfig::new(32, 1000, vec![50, 200, 600]).with_seed(seed);
    AdaptiveLogSoftmaxWithLoss::from_config(&config).expect("valid config")
}

/// Zipf-like targets: mostly shortlist, some in every cluster.
fn targets(batch: usize) -> Vec<usize> {
    (0..batch)
        .map(|i| match i % 8 {
            0 => 999 - i % 400,
            1 => 200 + (i * 17) % 400,
            2 => 50 + (i * 7) % 150,
            _ => (i * 3) % 50,
        })
        .collect()
}

#[test]
fn test_layer_from_json_config() {
    let json = r#"{
        "in_features": 16,
        "n_classes": 20,
        "cutoffs": [5, 10, 15],
        "div_value": 2.0,
        "seed": 3
    }"#;
    let config: AdaptiveSoftmaxConfig = serde_json::from_str(json).expect("valid json");
    assert!(!config.head_bias);

    let asm = AdaptiveLogSoftmaxWithLoss::from_config(&config).expect("valid config");
    assert_eq!(asm.head().weight().shape(), &[8, 16]);
    assert_eq!(asm.cutoffs(), &[5, 10, 15, 20]);

    let again = AdaptiveLogSoftmaxWithLoss::from_config(&config).expect("valid config");
    let x = Tensor::randn_seeded(&[4, 16], 0);
    assert_eq!(
        asm.log_prob(&x).expect("valid").data(),
        again.log_prob(&x).expect("valid").data()
    );
}

#[test]
fn test_json_config_defaults() {
    let json = r#"{"in_features": 64, "n_classes": 100, "cutoffs": [10, 50]}"#;
    let config: AdaptiveSoftmaxConfig = serde_json::from_str(json).expect("valid json");
    assert_eq!(config.div_value, AdaptiveSoftmaxConfig::DEFAULT_DIV_VALUE);
    assert_eq!(config.seed, None);

    let asm = AdaptiveLogSoftmaxWithLoss::from_config(&config).expect("valid config");
    assert_eq!(asm.tail()[0].hidden_features(), 16);
    assert_eq!(asm.tail()[1].hidden_features(), 4);
}

#[test]
fn test_invalid_json_config_is_rejected_at_construction() {
    let json = r#"{"in_features": 8, "n_classes": 10, "cutoffs": [4, 4]}"#;
    let config: AdaptiveSoftmaxConfig = serde_json::from_str(json).expect("valid json");
    let err = AdaptiveLogSoftmaxWithLoss::from_config(&config).expect_err("duplicate cutoff");
    assert_eq!(
        err.cutoff_violation(),
        Some(CutoffViolation::Duplicate { index: 1, value: 4 })
    );
}

#[test]
fn test_large_vocabulary_forward() {
    let asm = vocab_layer(1);
    let x = Tensor::randn_seeded(&[64, 32], 2);
    let y = targets(64);

    let out = asm.forward(&x, &y).expect("valid batch");
    assert_eq!(out.output.shape(), &[64]);
    assert!(out.output.data().iter().all(|&lp| lp < 0.0 && lp.is_finite()));

    let expected_loss = -out.output.data().iter().sum::<f32>() / 64.0;
    assert!((out.loss.item() - expected_loss).abs() < 1e-4);
}

#[test]
fn test_large_vocabulary_paths_agree() {
    let asm = vocab_layer(4);
    let x = Tensor::randn_seeded(&[32, 32], 5);
    let y = targets(32);

    let log_prob = asm.log_prob(&x).expect("valid input");
    assert_eq!(log_prob.shape(), &[32, 1000]);
    for total in log_prob.exp().sum_rows().data() {
        assert!((total - 1.0).abs() < 1e-4, "row sums to {total}");
    }

    let out = asm.forward(&x, &y).expect("valid batch");
    for (row, (&lp, &class)) in out.output.data().iter().zip(&y).enumerate() {
        let expected = log_prob.row(row)[class];
        assert!((lp - expected).abs() < 1e-4, "row {row}: {lp} vs {expected}");
    }

    let loss = NLLLoss::new().forward(&log_prob, &y);
    assert!((out.loss.item() - loss.item()).abs() < 1e-4);

    assert_eq!(asm.predict(&x).expect("valid input"), log_prob.argmax_rows());
}

#[test]
fn test_predictions_land_in_their_segment() {
    let mut asm = vocab_layer(6);
    // Push every row toward the last cluster.
    let last = asm.head_size() - 1;
    asm.head_mut().weight_mut().data_mut().fill(0.0);
    asm.head_mut().weight_mut().row_mut(last).fill(1.0);
    asm.refresh_caches();

    let x = Tensor::randn_seeded(&[16, 32], 7).abs();
    let predictions = asm.predict(&x).expect("valid input");
    for class in predictions {
        assert_eq!(
            asm.partition().locate(class),
            Some(Segment::Cluster {
                cluster: 2,
                offset: class - 600
            })
        );
    }
}

#[test]
fn test_unbatched_sample() {
    let asm = vocab_layer(8);
    let x = Tensor::randn_seeded(&[32], 9);

    let out = asm.forward(&x, &[123]).expect("valid sample");
    assert!(out.output.shape().is_empty());
    assert_eq!(out.loss.shape(), &[1]);

    let log_prob = asm.log_prob(&x).expect("valid input");
    assert_eq!(log_prob.shape(), &[1000]);
    assert!((out.output.item() + out.loss.item()).abs() < 1e-6);
    assert!((out.output.item() - log_prob.data()[123]).abs() < 1e-4);

    assert_eq!(asm.predict(&x).expect("valid input").len(), 1);
}

#[test]
fn test_error_kinds() {
    let asm = vocab_layer(10);
    let x = Tensor::randn_seeded(&[4, 32], 11);

    let err = asm.forward(&x, &[1, 2, 3]).expect_err("batch mismatch");
    assert!(err.is_shape_mismatch());

    let err = asm.forward(&x, &[1, 2, 3, 1000]).expect_err("class 1000");
    assert!(err.is_range_error());
    assert_eq!(
        err.to_string(),
        "Target values should be in [0, 999], but values in range [1, 1000] were found."
    );

    let err = asm
        .log_prob(&Tensor::randn_seeded(&[4, 31], 12))
        .expect_err("31 features");
    assert!(err.is_shape_mismatch());

    let err = AdaptiveLogSoftmaxWithLoss::new(32, 1000, &[50, 1000]).expect_err("cutoff 1000");
    assert!(err.is_configuration_error());
    assert!(!err.is_shape_mismatch());
}
