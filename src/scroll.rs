//! Clamping the vertical scroll offset.

/// Largest valid offset: content taller than the viewport can scroll until
/// its bottom reaches the viewport's bottom, shorter content cannot scroll.
#[must_use]
pub fn max_offset(content_height: f32, viewport_height: f32) -> f32 {
    let max = content_height - viewport_height;
    if max.is_finite() { max.max(0.0) } else { 0.0 }
}

/// Bring `scroll_y` into `[0, max_offset]`. A non-finite offset resets to 0.
#[must_use]
pub fn clamp(scroll_y: f32, content_height: f32, viewport_height: f32) -> f32 {
    let scroll_y = if scroll_y.is_finite() { scroll_y } else { 0.0 };
    scroll_y.clamp(0.0, max_offset(content_height, viewport_height))
}

/// Apply a drag delta scaled by `sensitivity`, then clamp.
///
/// A non-finite delta leaves the offset where it was (after clamping).
#[must_use]
pub fn apply_delta(
    scroll_y: f32,
    delta: f32,
    sensitivity: f32,
    content_height: f32,
    viewport_height: f32,
) -> f32 {
    let moved = scroll_y + delta * sensitivity;
    let target = if moved.is_finite() { moved } else { scroll_y };
    clamp(target, content_height, viewport_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn content_shorter_than_viewport_never_scrolls() {
        for delta in [-1000.0, -1.0, 0.0, 1.0, 250.0, 1e9] {
            assert_eq!(apply_delta(0.0, delta, 1.0, 500.0, 800.0), 0.0);
        }
    }

    #[test]
    fn delta_is_scaled_by_sensitivity() {
        assert_eq!(apply_delta(100.0, 10.0, 2.5, 2000.0, 800.0), 125.0);
        assert_eq!(apply_delta(100.0, -10.0, 2.5, 2000.0, 800.0), 75.0);
    }

    #[test]
    fn clamps_at_both_ends() {
        assert_eq!(apply_delta(1100.0, 500.0, 1.0, 2000.0, 800.0), 1200.0);
        assert_eq!(apply_delta(10.0, -500.0, 1.0, 2000.0, 800.0), 0.0);
    }

    #[test]
    fn shrinking_content_pulls_offset_back() {
        assert_eq!(clamp(1200.0, 1000.0, 800.0), 200.0);
        assert_eq!(clamp(1200.0, 300.0, 800.0), 0.0);
    }

    #[test]
    fn non_finite_inputs_stay_in_range() {
        assert_eq!(apply_delta(50.0, f32::NAN, 1.0, 2000.0, 800.0), 50.0);
        assert_eq!(apply_delta(50.0, f32::INFINITY, 1.0, 2000.0, 800.0), 50.0);
        assert_eq!(clamp(f32::NAN, 2000.0, 800.0), 0.0);
        assert_eq!(max_offset(f32::INFINITY, 800.0), 0.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn result_is_always_in_range(
            start in -1e6f32..1e6,
            deltas in prop::collection::vec(-5e3f32..5e3, 0..32),
            content in 0.0f32..1e5,
            viewport in 0.0f32..2e3,
        ) {
            let max = (content - viewport).max(0.0);
            let mut scroll = clamp(start, content, viewport);
            prop_assert!((0.0..=max).contains(&scroll));
            for delta in deltas {
                scroll = apply_delta(scroll, delta, 1.0, content, viewport);
                prop_assert!((0.0..=max).contains(&scroll));
            }
        }
    }
}
