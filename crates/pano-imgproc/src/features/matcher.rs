use super::{Descriptor, FeatureError};

/// A correspondence between two descriptor collections.
///
/// The descriptors are referred to by their index in the slices handed to
/// [`match_descriptors`], so a match stays valid for as long as the caller
/// keeps those collections around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Index into the first descriptor collection.
    pub a: usize,
    /// Index into the second descriptor collection.
    pub b: usize,
    /// L1 distance between the two descriptors.
    pub distance: f32,
}

/// Sum of absolute differences between two descriptor vectors.
///
/// # Errors
///
/// Returns [`FeatureError::DescriptorLengthMismatch`] if the vectors differ in length.
pub fn l1_distance(a: &[f32], b: &[f32]) -> Result<f32, FeatureError> {
    if a.len() != b.len() {
        return Err(FeatureError::DescriptorLengthMismatch(a.len(), b.len()));
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum())
}

/// For each descriptor in `a` find the index of its nearest neighbour in `b`.
///
/// On equal distances the first candidate found is kept. The result holds
/// `None` for every element when `b` is empty.
pub fn match_descriptors_a2b(
    a: &[Descriptor],
    b: &[Descriptor],
) -> Result<Vec<Option<usize>>, FeatureError> {
    a.iter()
        .map(|da| {
            let mut best: Option<(usize, f32)> = None;
            for (k, db) in b.iter().enumerate() {
                let dist = l1_distance(&da.data, &db.data)?;
                if best.map_or(true, |(_, d)| dist < d) {
                    best = Some((k, dist));
                }
            }
            Ok(best.map(|(k, _)| k))
        })
        .collect()
}

/// Find the mutual nearest neighbours between two descriptor sets.
///
/// A pair `(i, j)` is returned only if `b[j]` is the nearest neighbour of
/// `a[i]` and `a[i]` is the nearest neighbour of `b[j]`, so every descriptor
/// takes part in at most one match. Matches come out ordered by `a`.
///
/// # Arguments
///
/// * `a` - The descriptors of the first image.
/// * `b` - The descriptors of the second image.
///
/// # Returns
///
/// The matches, empty if either set is empty.
pub fn match_descriptors(a: &[Descriptor], b: &[Descriptor]) -> Result<Vec<Match>, FeatureError> {
    if a.is_empty() || b.is_empty() {
        return Ok(Vec::new());
    }

    let a2b = match_descriptors_a2b(a, b)?;
    let b2a = match_descriptors_a2b(b, a)?;

    let mut matches = Vec::new();
    for (i, mb) in a2b.into_iter().enumerate() {
        let Some(j) = mb else { continue };
        if b2a[j] == Some(i) {
            matches.push(Match {
                a: i,
                b: j,
                distance: l1_distance(&a[i].data, &b[j].data)?,
            });
        }
    }

    log::debug!(
        "{} mutual matches out of {}x{} descriptors",
        matches.len(),
        a.len(),
        b.len()
    );

    Ok(matches)
}

/// Point pairs of a set of matches, in the first and in the second image.
pub type PointPairs = (Vec<[f64; 2]>, Vec<[f64; 2]>);

/// Collect the keypoint positions of each match, in match order.
///
/// # Returns
///
/// The points in the first image and the corresponding points in the second.
pub fn matched_points(
    a: &[Descriptor],
    b: &[Descriptor],
    matches: &[Match],
) -> Result<PointPairs, FeatureError> {
    let lookup = |set: &[Descriptor], i: usize| {
        set.get(i)
            .map(|d| d.point)
            .ok_or(FeatureError::MatchIndexOutOfBounds(i, set.len()))
    };
    matches
        .iter()
        .map(|m| Ok((lookup(a, m.a)?, lookup(b, m.b)?)))
        .collect::<Result<Vec<_>, FeatureError>>()
        .map(|pairs| pairs.into_iter().unzip())
}
