//! Median filter over a window snapshot.

/// Median of `samples`, sorting the slice in place.
///
/// Odd length yields the middle element; even length the mean of the two
/// central elements.  An empty slice yields `0.0`.
pub fn median_in_place(samples: &mut [u16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_unstable();
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        f32::from(samples[mid])
    } else {
        (f32::from(samples[mid - 1]) + f32::from(samples[mid])) / 2.0
    }
}
