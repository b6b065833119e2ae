/// Snap a raw font weight to one of the named buckets 100..=900.
///
/// Weights up to 500 round down, heavier weights round up, following the
/// CSS `font-weight` fallback rules. Multiples of 100 in range map to
/// themselves.
pub fn fallback_weight(weight: i64) -> i64 {
    if weight <= 500 {
        weight.max(100).div_euclid(100) * 100
    } else if weight > 900 {
        900
    } else {
        (weight + 99).div_euclid(100) * 100
    }
}
