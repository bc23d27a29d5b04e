use num::traits::{Float, FloatConst};
use num::NumCast;

fn cast<T: Float>(n: usize) -> T {
    <T as NumCast>::from(n).unwrap_or_else(T::nan)
}

pub fn mean<T: Float>(values: &[T]) -> Option<T> {
    if values.is_empty() {
        return None;
    }
    let sum = values.iter().fold(T::zero(), |acc, v| acc + *v);
    Some(sum / cast(values.len()))
}

/// Standard deviation with one degree of freedom removed.
pub fn sample_std<T: Float>(values: &[T]) -> Option<T> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().fold(T::zero(), |acc, v| acc + (*v - m) * (*v - m));
    Some((ss / cast(values.len() - 1)).sqrt())
}

fn finite<T: Float>(values: &[T]) -> Vec<T> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Equal-width bins over [min, max] of the finite values; NaN and
/// infinities are not counted. Every bin is half open except the last,
/// which also takes `max`. A zero-width range yields one bin.
pub fn equal_width_bins<T: Float>(values: &[T], bins: usize) -> Vec<(T, T, usize)> {
    let values = finite(values);
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = values.iter().fold(T::infinity(), |acc, v| acc.min(*v));
    let hi = values.iter().fold(T::neg_infinity(), |acc, v| acc.max(*v));
    if hi == lo {
        return vec![(lo, hi, values.len())];
    }

    let width = (hi - lo) / cast(bins);
    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = ((*v - lo) / width).floor().to_usize().unwrap_or(0);
        counts[idx.min(bins - 1)] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = lo + width * cast(i);
            let upper = if i + 1 == bins { hi } else { lo + width * cast(i + 1) };
            (lower, upper, count)
        })
        .collect()
}

/// Gaussian kernel density with Scott's bandwidth, sampled at `points`
/// evenly spaced positions between the min and max of the finite values.
pub fn gaussian_kde<T: Float + FloatConst>(values: &[T], points: usize) -> Vec<(T, T)> {
    let values = finite(values);
    let std = match sample_std(&values) {
        Some(s) if s > T::zero() => s,
        _ => return Vec::new(),
    };
    if points == 0 {
        return Vec::new();
    }
    let n: T = cast(values.len());
    let h = std * n.powf(-T::one() / cast(5));
    let norm = T::one() / (n * h * (T::PI() + T::PI()).sqrt());
    let two: T = cast(2);

    let lo = values.iter().fold(T::infinity(), |acc, v| acc.min(*v));
    let hi = values.iter().fold(T::neg_infinity(), |acc, v| acc.max(*v));
    let step = if points > 1 {
        (hi - lo) / cast(points - 1)
    } else {
        T::zero()
    };

    (0..points)
        .map(|i| {
            let x = lo + step * cast(i);
            let sum = values.iter().fold(T::zero(), |acc, v| {
                let u = (x - *v) / h;
                acc + (-(u * u) / two).exp()
            });
            (x, sum * norm)
        })
        .collect()
}
