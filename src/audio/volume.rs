use super::frames::{Frame, FrameSource};

pub const MIN_VOLUME_DB: f64 = -30.0;
pub const MAX_VOLUME_DB: f64 = 6.0;

/// Gain stage controlled in decibels.
#[derive(Debug)]
pub struct Volume<S> {
    inner: S,
    db: f64,
    gain: f64,
}

impl<S> Volume<S> {
    pub fn new(inner: S, db: f64) -> Self {
        let mut v = Self {
            inner,
            db: 0.0,
            gain: 1.0,
        };
        v.set_db(db);
        v
    }

    /// Set the level, clamped to [`MIN_VOLUME_DB`, `MAX_VOLUME_DB`].
    pub fn set_db(&mut self, db: f64) {
        self.db = clamp_volume(db);
        self.gain = 10f64.powf(self.db / 20.0);
    }

    #[cfg(test)]
    pub fn db(&self) -> f64 {
        self.db
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

pub fn clamp_volume(db: f64) -> f64 {
    if db.is_nan() {
        return 0.0;
    }
    db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB)
}

impl<S: FrameSource> FrameSource for Volume<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let (n, more) = self.inner.stream(frames);
        if self.gain != 1.0 {
            for frame in &mut frames[..n] {
                frame[0] *= self.gain;
                frame[1] *= self.gain;
            }
        }
        (n, more)
    }
}
