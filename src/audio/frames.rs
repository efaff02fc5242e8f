//! Pull-based stereo frame streaming shared by every pipeline stage.

/// One stereo sample pair, `[left, right]`, nominally in [-1, 1].
pub type Frame = [f64; 2];

/// A producer of stereo frames, pulled in chunks by whatever sits downstream.
///
/// `stream` fills as many frames of `frames` as it can and returns how many it
/// wrote together with whether more data may follow. A finished producer
/// returns `(0, false)` from then on.
pub trait FrameSource {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool);
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).stream(frames)
    }
}
