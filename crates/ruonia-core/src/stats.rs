pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let plain = values.iter().sum::<f64>() / n;
    if plain.is_finite() {
        return Some(plain);
    }
    let scale = magnitude(values);
    Some(values.iter().map(|v| v / scale).sum::<f64>() / n * scale).filter(|m| m.is_finite())
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let plain = deviation(values)?;
    if plain.is_finite() {
        return Some(plain);
    }
    let scale = magnitude(values);
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    Some(deviation(&scaled)? * scale).filter(|std| std.is_finite())
}

fn deviation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - avg).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

pub(crate) fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (left, right): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if left.len() < 2 {
        return None;
    }

    // Both sides normalized by magnitude; sums stay finite for any finite input.
    let (x_scale, y_scale) = (magnitude(&left), magnitude(&right));
    let left: Vec<f64> = left.iter().map(|x| x / x_scale).collect();
    let right: Vec<f64> = right.iter().map(|y| y / y_scale).collect();

    let mean_x = mean(&left)?;
    let mean_y = mean(&right)?;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in left.iter().zip(&right) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let coefficient = sxy / (sxx * syy).sqrt();
    coefficient
        .is_finite()
        .then(|| coefficient.clamp(-1.0, 1.0))
}

/// Largest absolute value, or 1.0 for all-zero input.
fn magnitude(values: &[f64]) -> f64 {
    let largest = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if largest > 0.0 && largest.is_finite() {
        largest
    } else {
        1.0
    }
}
