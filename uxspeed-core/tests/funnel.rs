use uxspeed_core::{
    compute, Calculator, DistributionResult, ModelParams, Overrides, ParameterRegistry,
    Percentile, RawValue,
};

fn registry() -> ParameterRegistry {
    ParameterRegistry::standard().expect("standard registry")
}

fn snapshot(pairs: &[(&str, f64)]) -> ModelParams {
    let overrides: Overrides = pairs
        .iter()
        .map(|(name, value)| (name.to_string(), RawValue::from(*value)))
        .collect();
    let state = registry().initialize(&overrides);
    ModelParams::from_state(&state).expect("model params")
}

fn assert_conserved(result: &DistributionResult) {
    for i in 0..result.len() {
        assert_eq!(
            result.errored_distribution[i]
                + result.bounced_distribution[i]
                + result.converted_distribution[i]
                + result.non_converted_distribution[i],
            result.total_population[i],
            "bucket {i} at {}s leaks users",
            result.x[i]
        );
    }
}

fn scenarios() -> Vec<ModelParams> {
    vec![
        snapshot(&[]),
        snapshot(&[("mu", -3.0), ("sigma", 0.05), ("bucketSize", 0.05)]),
        snapshot(&[("mu", 3.0), ("sigma", 3.0), ("bucketSize", 1.0)]),
        snapshot(&[
            ("maxErrorRate", 100.0),
            ("errorRateDecay", 0.0),
            ("bounceRateShift", 100.0),
        ]),
        snapshot(&[
            ("volume", 1_000_000_000.0),
            ("maxConversionRate", 100.0),
            ("conversionPovertyLine", 100.0),
            ("conversionDecay", 0.0),
        ]),
        snapshot(&[
            ("bounceRateScale", 200.0),
            ("bounceTimeCompression", 10.0),
            ("bounceRateShift", -100.0),
        ]),
    ]
}

#[test]
fn every_bucket_conserves_its_population() {
    for params in scenarios() {
        assert_conserved(&compute(&params));
    }
}

#[test]
fn flooring_never_overshoots_volume() {
    for params in scenarios() {
        let result = compute(&params);
        assert!(
            result.total_users() as f64 <= params.volume,
            "{} users for volume {}",
            result.total_users(),
            params.volume
        );
    }
}

#[test]
fn compute_is_deterministic() {
    for params in scenarios() {
        assert_eq!(compute(&params), compute(&params));
    }
}

#[test]
fn sequences_are_aligned_with_buckets() {
    let result = compute(&snapshot(&[]));
    let len = result.x.len();
    assert_eq!(len, 200);
    assert_eq!(result.total_population.len(), len);
    assert_eq!(result.error_rate_distribution.len(), len);
    assert_eq!(result.errored_distribution.len(), len);
    assert_eq!(result.bounce_rate_distribution.len(), len);
    assert_eq!(result.bounced_distribution.len(), len);
    assert_eq!(result.effective_bounce_rate_distribution.len(), len);
    assert_eq!(result.conversion_rate_distribution.len(), len);
    assert_eq!(result.converted_distribution.len(), len);
    assert_eq!(result.effective_conversion_rate_distribution.len(), len);
    assert_eq!(result.non_converted_distribution.len(), len);
    assert_eq!(*result.x.last().unwrap(), 99.5);
}

#[test]
fn percentiles_are_ordered() {
    let params = snapshot(&[
        ("volume", 100_000.0),
        ("mu", 1.5),
        ("sigma", 0.6),
        ("bucketSize", 0.5),
        ("maxTime", 100.0),
    ]);
    let result = compute(&params);

    let p50 = result.percentile(Percentile::P50).expect("median reached");
    let p90 = result.percentile(Percentile::P90).expect("p90 reached");
    let p95 = result.percentile(Percentile::P95).expect("p95 reached");
    assert!(p50 < p90, "{p50} < {p90}");
    assert!(p90 < p95, "{p90} < {p95}");

    let positions: Vec<f64> = result.annotations.iter().map(|a| a.x).collect();
    assert_eq!(positions, vec![p50, p90, p95]);
    // lognormal median is e^mu ≈ 4.48s, attributed to the bucket before the crossing
    assert!((4.0..=4.5).contains(&p50), "median at {p50}");
}

#[test]
fn empty_volume_produces_nothing() {
    let params = ModelParams {
        volume: 0.0,
        ..snapshot(&[])
    };
    let result = compute(&params);
    assert!(result.total_population.iter().all(|&users| users == 0));
    assert!(result.errored_distribution.iter().all(|&users| users == 0));
    assert!(result.bounced_distribution.iter().all(|&users| users == 0));
    assert!(result.converted_distribution.iter().all(|&users| users == 0));
    assert!(result.non_converted_distribution.iter().all(|&users| users == 0));
    assert_eq!(result.average_conversion_rate, 0.0);
    assert_eq!(result.average_non_bounced_conversion_rate, 0.0);
    assert_eq!(result.average_speed, 0.0);
    assert!(result.annotations.is_empty());
    assert_eq!(result.percentile50, None);
}

#[test]
fn end_to_end_conversion_stays_within_population() {
    let params = snapshot(&[
        ("mu", 0.0),
        ("sigma", 1.0),
        ("volume", 1_000_000.0),
        ("bucketSize", 0.1),
        ("maxTime", 100.0),
        ("conversionDecay", 1.0),
        ("maxConversionRate", 20.0),
        ("conversionPovertyLine", 0.3),
    ]);
    let result = compute(&params);
    assert!(result.total_converted > 0);
    assert!(result.total_converted <= result.total_users());
    assert_conserved(&result);
    assert!(result.average_conversion_rate > 0.0 && result.average_conversion_rate < 0.2);
    assert!(result.average_non_bounced_conversion_rate >= result.average_conversion_rate);
}

#[test]
fn bounces_only_draw_from_users_who_saw_no_error() {
    let params = snapshot(&[
        ("maxErrorRate", 100.0),
        ("errorRateDecay", 0.0),
        ("bounceRateShift", 50.0),
    ]);
    let result = compute(&params);
    assert_eq!(result.total_errored(), result.total_users());
    assert_eq!(result.total_bounced, 0);
    assert_eq!(result.total_converted, 0);
    for (i, &users) in result.total_population.iter().enumerate() {
        if users > 0 {
            assert_eq!(result.effective_bounce_rate_distribution[i], 100.0);
        }
    }
}

#[test]
fn average_speed_uses_requested_volume() {
    let params = snapshot(&[]);
    let result = compute(&params);
    let weighted: f64 = result
        .total_population
        .iter()
        .zip(&result.x)
        .map(|(&users, &t)| users as f64 * t)
        .sum();
    assert_eq!(result.average_speed, weighted / params.volume);
    let floored_mean = weighted / result.total_users() as f64;
    assert!(result.average_speed <= floored_mean);
}

#[test]
fn calculator_cascade_matches_registry() {
    let mut calculator = Calculator::standard(&Overrides::new()).expect("calculator");
    calculator.set("maxConversionRate", 30.0).unwrap();
    calculator.set("conversionPovertyLine", 20.0).unwrap();
    calculator.set("maxConversionRate", 10.0).unwrap();
    assert_eq!(calculator.state().value("conversionPovertyLine"), Some(10.0));

    let rates = &calculator.result().conversion_rate_distribution;
    assert!(rates.iter().all(|&rate| (rate - 10.0).abs() < 1e-9));
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let result = compute(&snapshot(&[]));
    let json = serde_json::to_value(&result).expect("serialize");
    assert!(json.get("totalPopulation").is_some());
    assert!(json.get("effectiveBounceRateDistribution").is_some());
    assert!(json.get("averageNonBouncedConversionRate").is_some());
    assert_eq!(json["annotations"][0]["percentile"], "50");
    assert!(json["annotations"][0]["text"]
        .as_str()
        .unwrap()
        .starts_with("50%ile: "));
}
