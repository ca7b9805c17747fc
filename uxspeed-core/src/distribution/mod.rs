//! Funnel simulation over the page-speed distribution.
//!
//! [`compute`] is a pure function of a [`ModelParams`] snapshot. Each stage works
//! on the population left over by the previous one:
//!
//! 1. users are spread over time buckets along a lognormal curve,
//! 2. some of them hit an error,
//! 3. some of the rest bounce,
//! 4. some of the rest convert, and whoever is left did not convert.
//!
//! Population counts are floored, so the buckets can sum to less than `volume`.

pub mod model;
pub mod result;

use statrs::distribution::{Continuous, LogNormal};
use tracing::{debug, warn};

pub use model::ModelParams;
pub use result::{Annotation, DistributionResult, Percentile};

/// Effective bounce rate reported for a bucket without users.
pub const EMPTY_BUCKET_BOUNCE_RATE: f64 = 100.0;
/// Effective conversion rate reported for a bucket without users.
pub const EMPTY_BUCKET_CONVERSION_RATE: f64 = 0.0;

pub fn compute(params: &ModelParams) -> DistributionResult {
    let x = buckets(params.max_time, params.bucket_size);
    let total_population = population(&x, params);

    let error_rate_distribution: Vec<f64> = x.iter().map(|&t| params.error_rate(t)).collect();
    let errored_distribution: Vec<u64> = total_population
        .iter()
        .zip(&error_rate_distribution)
        .map(|(&users, &rate)| share_ceil(users, rate))
        .collect();

    let bounce_rate_distribution: Vec<f64> = x.iter().map(|&t| params.bounce_rate(t)).collect();
    let bounced_distribution: Vec<u64> = total_population
        .iter()
        .zip(&errored_distribution)
        .zip(&bounce_rate_distribution)
        .map(|((&users, &errored), &rate)| share_ceil(users - errored, rate))
        .collect();

    let effective_bounce_rate_distribution: Vec<f64> = total_population
        .iter()
        .zip(errored_distribution.iter().zip(&bounced_distribution))
        .map(|(&users, (&errored, &bounced))| {
            percentage(errored + bounced, users, EMPTY_BUCKET_BOUNCE_RATE)
        })
        .collect();

    let conversion_rate_distribution: Vec<f64> =
        x.iter().map(|&t| params.conversion_rate(t)).collect();
    let converted_distribution: Vec<u64> = (0..x.len())
        .map(|i| {
            let remaining = total_population[i] - errored_distribution[i] - bounced_distribution[i];
            share_floor(remaining, conversion_rate_distribution[i])
        })
        .collect();

    let effective_conversion_rate_distribution: Vec<f64> = total_population
        .iter()
        .zip(&converted_distribution)
        .map(|(&users, &converted)| percentage(converted, users, EMPTY_BUCKET_CONVERSION_RATE))
        .collect();

    let non_converted_distribution: Vec<u64> = (0..x.len())
        .map(|i| {
            total_population[i]
                - errored_distribution[i]
                - bounced_distribution[i]
                - converted_distribution[i]
        })
        .collect();

    let total_bounced: u64 = bounced_distribution.iter().sum();
    let total_converted: u64 = converted_distribution.iter().sum();
    let total_non_converted: u64 = non_converted_distribution.iter().sum();

    let weighted_time: f64 = total_population
        .iter()
        .zip(&x)
        .map(|(&users, &t)| users as f64 * t)
        .sum();
    // Divides by the requested volume rather than the floored total.
    let average_speed = if params.volume == 0.0 {
        0.0
    } else {
        weighted_time / params.volume
    };

    let average_conversion_rate = ratio(
        total_converted,
        total_converted + total_non_converted + total_bounced,
    );
    let average_non_bounced_conversion_rate =
        ratio(total_converted, total_converted + total_non_converted);

    let mut result = DistributionResult {
        x,
        total_population,
        error_rate_distribution,
        errored_distribution,
        bounce_rate_distribution,
        bounced_distribution,
        effective_bounce_rate_distribution,
        conversion_rate_distribution,
        converted_distribution,
        effective_conversion_rate_distribution,
        non_converted_distribution,
        total_bounced,
        total_converted,
        total_non_converted,
        average_speed,
        average_conversion_rate,
        average_non_bounced_conversion_rate,
        percentile50: None,
        percentile90: None,
        percentile95: None,
        annotations: Vec::new(),
    };
    annotate_percentiles(&mut result, params.volume);

    debug!(
        buckets = result.len(),
        users = result.total_users(),
        converted = result.total_converted,
        bounced = result.total_bounced,
        average_conversion_rate = result.average_conversion_rate,
        "computed distribution"
    );
    result
}

/// Bucket start times `0, step, 2*step, ...` strictly below `max_time`.
fn buckets(max_time: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0 && max_time.is_finite()) {
        return Vec::new();
    }
    let mut x = Vec::new();
    loop {
        let t = x.len() as f64 * step;
        if t >= max_time {
            break;
        }
        x.push(t);
    }
    x
}

fn population(x: &[f64], params: &ModelParams) -> Vec<u64> {
    let density: Vec<f64> = match LogNormal::new(params.mu, params.sigma) {
        Ok(curve) => x.iter().map(|&t| curve.pdf(t)).collect(),
        Err(err) => {
            warn!(mu = params.mu, sigma = params.sigma, error = %err, "invalid lognormal shape, population is empty");
            return vec![0; x.len()];
        }
    };
    let density_sum: f64 = density.iter().sum();
    if !(density_sum > 0.0) {
        return vec![0; x.len()];
    }
    density
        .iter()
        .map(|&value| (value / density_sum * params.volume).floor() as u64)
        .collect()
}

/// `ceil(users * rate%)`, never more than `users`.
fn share_ceil(users: u64, rate: f64) -> u64 {
    ((users as f64 * rate / 100.0).ceil() as u64).min(users)
}

/// `floor(users * rate%)`, never more than `users`.
fn share_floor(users: u64, rate: f64) -> u64 {
    ((users as f64 * rate / 100.0).floor() as u64).min(users)
}

/// `part / whole * 100`, or `empty` for an empty whole.
fn percentage(part: u64, whole: u64, empty: f64) -> f64 {
    if whole == 0 {
        empty
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `part / whole`, or `0` for an empty whole.
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Marks the first bucket where the running total exceeds each percentile of
/// `volume`. The marker is placed on the bucket before the crossing one.
fn annotate_percentiles(result: &mut DistributionResult, volume: f64) {
    let mut users = 0u64;
    let mut pending = Percentile::ALL.to_vec();
    for index in 0..result.len() {
        if pending.is_empty() {
            break;
        }
        let bucket_users = result.total_population[index];
        users += bucket_users;
        let previous = result.x[index.saturating_sub(1)];
        let crossed: Vec<Percentile> = pending
            .iter()
            .copied()
            .filter(|percentile| users as f64 > volume * percentile.fraction())
            .collect();
        for percentile in crossed {
            result.record_percentile(percentile, previous, bucket_users);
        }
        pending.retain(|percentile| result.percentile(*percentile).is_none());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Overrides, ParameterRegistry};

    fn defaults() -> ModelParams {
        let registry = ParameterRegistry::standard().unwrap();
        ModelParams::from_state(&registry.initialize(&Overrides::new())).unwrap()
    }

    #[test]
    fn buckets_cover_half_open_range() {
        assert_eq!(buckets(2.0, 0.5), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(buckets(2.1, 0.5).len(), 5);
        assert!(buckets(10.0, 0.0).is_empty());
        assert!(buckets(10.0, -1.0).is_empty());
        assert!(buckets(f64::INFINITY, 1.0).is_empty());
        assert!(buckets(0.0, 1.0).is_empty());
    }

    #[test]
    fn bucket_starts_do_not_accumulate_drift() {
        let x = buckets(100.0, 0.1);
        assert_eq!(x.len(), 1000);
        assert_eq!(x[10], 1.0);
        assert!(x.last().is_some_and(|&t| t < 100.0));
    }

    #[test]
    fn population_never_exceeds_volume() {
        let params = defaults();
        let x = buckets(params.max_time, params.bucket_size);
        let users: u64 = population(&x, &params).iter().sum();
        assert!(users as f64 <= params.volume);
        assert!(users > 0);
    }

    #[test]
    fn first_bucket_is_empty() {
        let result = compute(&defaults());
        assert_eq!(result.x[0], 0.0);
        assert_eq!(result.total_population[0], 0);
        assert_eq!(result.effective_bounce_rate_distribution[0], EMPTY_BUCKET_BOUNCE_RATE);
        assert_eq!(result.effective_conversion_rate_distribution[0], EMPTY_BUCKET_CONVERSION_RATE);
    }

    #[test]
    fn invalid_shape_yields_empty_population() {
        let params = ModelParams {
            sigma: 0.0,
            ..defaults()
        };
        let result = compute(&params);
        assert!(!result.is_empty());
        assert_eq!(result.total_users(), 0);
        assert!(result.annotations.is_empty());
    }

    #[test]
    fn stage_shares_are_capped() {
        assert_eq!(share_ceil(10, 150.0), 10);
        assert_eq!(share_floor(10, 150.0), 10);
        assert_eq!(share_ceil(10, 1.0), 1);
        assert_eq!(share_floor(10, 1.0), 0);
        assert_eq!(share_ceil(0, 50.0), 0);
    }

    #[test]
    fn ratio_guards_empty_denominator() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
        assert_eq!(percentage(1, 4, 100.0), 25.0);
        assert_eq!(percentage(0, 0, 100.0), 100.0);
    }

    #[test]
    fn percentile_marks_previous_bucket() {
        let mut result = DistributionResult {
            x: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            total_population: vec![0, 40, 20, 35, 5],
            ..Default::default()
        };
        annotate_percentiles(&mut result, 100.0);
        // running totals: 0, 40, 60, 95, 100
        assert_eq!(result.percentile50, Some(1.0));
        assert_eq!(result.percentile90, Some(2.0));
        assert_eq!(result.percentile95, Some(3.0));
        let texts: Vec<&str> = result.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["50%ile: 1000ms", "90%ile: 2000ms", "95%ile: 3000ms"]);
        assert_eq!(result.annotations[0].y, 20);
    }

    #[test]
    fn one_bucket_can_cross_several_percentiles() {
        let mut result = DistributionResult {
            x: vec![0.0, 1.0, 2.0],
            total_population: vec![0, 10, 90],
            ..Default::default()
        };
        annotate_percentiles(&mut result, 100.0);
        assert_eq!(result.percentile50, Some(1.0));
        assert_eq!(result.percentile90, Some(1.0));
        assert_eq!(result.percentile95, Some(1.0));
        assert_eq!(result.annotations.len(), 3);
    }

    #[test]
    fn unreached_percentiles_are_absent() {
        let mut result = DistributionResult {
            x: vec![0.0, 1.0, 2.0],
            total_population: vec![0, 60, 32],
            ..Default::default()
        };
        annotate_percentiles(&mut result, 100.0);
        assert_eq!(result.percentile50, Some(0.0));
        assert_eq!(result.percentile90, Some(1.0));
        assert_eq!(result.percentile95, None);
        assert_eq!(result.annotations.len(), 2);
    }
}
