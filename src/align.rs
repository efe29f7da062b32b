use rand::{seq::index, Rng};

/// Share of a single copy that may be dropped while aligning.
pub const MAX_DELETION_RATIO: f32 = 0.2;

/// Pads `frames` with whole copies of itself, then drops individual frames until
/// the length is a multiple of `interval`.
///
/// Deletions are spread round-robin over the copies and land on a random frame
/// within each copy. Removing more than 20% of a copy makes the loop visibly
/// skip, so another whole copy is added instead until every copy stays under
/// that bound. Worst case: interval 17 with 32 frames deletes 15/32 -> 13/64
/// -> 11/96.
pub fn align<T: Clone, R: Rng + ?Sized>(frames: &[T], interval: usize, rng: &mut R) -> Vec<T> {
    let len = frames.len();
    if len == 0 {
        return Vec::new();
    }

    let interval = interval.max(1);
    let mut copies = interval.div_ceil(len).max(1);
    let mut frames_to_delete = (copies * len) % interval;

    // Terminates at the latest once copies * len is a multiple of interval
    while frames_to_delete > 0
        && frames_to_delete.div_ceil(copies) as f32 > MAX_DELETION_RATIO * len as f32
    {
        copies += 1;
        frames_to_delete = (copies * len) % interval;
    }

    let mut aligned = Vec::with_capacity(copies * len - frames_to_delete);
    for copy in 0..copies {
        let deletions =
            frames_to_delete / copies + usize::from(copy < frames_to_delete % copies);
        let mut deleted = vec![false; len];
        for index in index::sample(rng, len, deletions) {
            deleted[index] = true;
        }

        aligned.extend(
            frames
                .iter()
                .zip(&deleted)
                .filter(|(_, &deleted)| !deleted)
                .map(|(frame, _)| frame.clone()),
        );
    }

    tracing::trace!(
        source = len,
        interval,
        copies,
        deleted = frames_to_delete,
        "aligned frames"
    );

    aligned
}

/// Repeats `frames` as whole copies until there are at least `min_len` of them.
pub fn extend_to<T: Clone>(frames: &[T], min_len: usize) -> Vec<T> {
    if frames.is_empty() {
        return Vec::new();
    }

    let copies = min_len.div_ceil(frames.len()).max(1);
    let mut extended = Vec::with_capacity(copies * frames.len());
    for _ in 0..copies {
        extended.extend_from_slice(frames);
    }

    extended
}
