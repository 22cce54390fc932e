//! Pointwise mutual information over co-occurrence edges

use taxo_core::TermRegistry;
use tracing::info;

/// PMI of two terms seen `count_x` and `count_y` times that co-occurred
/// `joint` times, normalized by `n`:
///
/// `ln((2 * joint / n) / ((count_x / n) * (count_y / n)))`
///
/// Returns `None` when any input is zero.
pub fn pointwise_mutual_information(
    count_x: u32,
    count_y: u32,
    joint: u32,
    n: usize,
) -> Option<f64> {
    if n == 0 || count_x == 0 || count_y == 0 || joint == 0 {
        return None;
    }
    let n = n as f64;
    let p_xy = 2.0 * f64::from(joint) / n;
    let p_x = f64::from(count_x) / n;
    let p_y = f64::from(count_y) / n;
    Some((p_xy / (p_x * p_y)).ln())
}

/// Score every co-occurrence edge, normalizing by the number of registered
/// terms. Edges touching a zero-count term keep an MI of 0. Returns the
/// number of relation copies scored.
pub fn score_mutual_information(registry: &mut TermRegistry) -> usize {
    let n = registry.len();
    let counts: Vec<u32> = registry.iter().map(|(_, term)| term.count).collect();

    let mut scored = 0;
    for rel in registry.cooccurrences_mut() {
        let (cx, cy) = (counts[rel.source.index()], counts[rel.target.index()]);
        match pointwise_mutual_information(cx, cy, rel.count, n) {
            Some(mi) => {
                rel.mi = mi;
                scored += 1;
            }
            None => rel.mi = 0.0,
        }
    }

    info!("Computed mutual information for {} relations", scored);
    scored
}
