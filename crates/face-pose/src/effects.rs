//! Camera effects and the landmark capability

/// Receives normalized face landmarks each tracking cycle
pub trait LandmarkConsumer {
    fn set_landmarks(&mut self, xs: &[f32], ys: &[f32]);

    fn set_mouth_open(&mut self, value: i32);
}

/// Effect applied to the camera preview.
///
/// Effects that need face landmarks expose [`LandmarkConsumer`] through
/// [`Effect::landmark_consumer`]; the rest keep the default `None`.
pub trait Effect: Send {
    fn name(&self) -> &str;

    fn landmark_consumer(&mut self) -> Option<&mut dyn LandmarkConsumer> {
        None
    }
}

/// Unfiltered camera preview
#[derive(Debug, Default)]
pub struct PlainEffect;

impl Effect for PlainEffect {
    fn name(&self) -> &str {
        "plain"
    }
}
