/// Cuts `span` to `capacity - 1` bytes when it does not fit in `capacity`.
pub(crate) fn clamp_to_capacity(span: &[u8], capacity: usize) -> &[u8] {
    if span.len() >= capacity {
        &span[..capacity.saturating_sub(1)]
    } else {
        span
    }
}
