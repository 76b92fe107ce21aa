//! Animation clips extracted from glTF and a small mixer to play them.
//!
//! The bundled scene ships no animated asset, so the mixer is idle in
//! practice; when a loaded file does carry clips they are advanced by the
//! frame delta and written back onto the node transforms.

use cgmath::{Quaternion, Vector3};

use crate::scene::Node;

/// One track of keyframe values.
#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
    /// Morph targets and anything else we don't play back.
    Other,
}

/// A named animation track targeting one node.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    /// glTF node index the track applies to.
    pub target: usize,
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

impl AnimationClip {
    pub fn duration(&self) -> f32 {
        self.timestamps.last().copied().unwrap_or(0.0)
    }
}

/// Find the segment of `timestamps` containing `t` and the blend factor
/// within it.
fn sample(timestamps: &[f32], t: f32) -> (usize, usize, f32) {
    if timestamps.len() < 2 || t <= timestamps[0] {
        return (0, 0, 0.0);
    }
    for i in 0..timestamps.len() - 1 {
        let (a, b) = (timestamps[i], timestamps[i + 1]);
        if t < b {
            let alpha = if b > a { (t - a) / (b - a) } else { 0.0 };
            return (i, i + 1, alpha);
        }
    }
    let last = timestamps.len() - 1;
    (last, last, 0.0)
}

fn lerp(a: Vector3<f32>, b: Vector3<f32>, alpha: f32) -> Vector3<f32> {
    a + (b - a) * alpha
}

/// Advances clip time and writes sampled transforms onto the hierarchy.
pub struct Mixer {
    time: f32,
}

impl Mixer {
    pub fn new() -> Self {
        Self { time: 0.0 }
    }

    /// Advance by `dt` seconds and apply every clip to its target node.
    /// Clips loop over their own duration.
    pub fn update(&mut self, dt: f32, clips: &[AnimationClip], root: &mut Node) {
        if clips.is_empty() {
            return;
        }
        self.time += dt;
        for clip in clips {
            let duration = clip.duration();
            if duration <= 0.0 {
                continue;
            }
            let t = self.time % duration;
            let (i, j, alpha) = sample(&clip.timestamps, t);
            let Some(node) = root.find_mut(clip.target) else {
                continue;
            };
            match &clip.keyframes {
                Keyframes::Translation(values) => {
                    if let (Some(&a), Some(&b)) = (values.get(i), values.get(j)) {
                        node.transform.position = lerp(a, b, alpha);
                    }
                }
                Keyframes::Rotation(values) => {
                    if let (Some(&a), Some(&b)) = (values.get(i), values.get(j)) {
                        node.transform.rotation = a.slerp(b, alpha);
                    }
                }
                Keyframes::Scale(values) => {
                    if let (Some(&a), Some(&b)) = (values.get(i), values.get(j)) {
                        node.transform.scale = lerp(a, b, alpha);
                    }
                }
                Keyframes::Other => (),
            }
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_blends_within_segments() {
        let times = [0.0, 1.0, 3.0];
        assert_eq!(sample(&times, 0.5), (0, 1, 0.5));
        let (i, j, alpha) = sample(&times, 2.0);
        assert_eq!((i, j), (1, 2));
        assert!((alpha - 0.5).abs() < 1e-6);
        // Past the end clamps to the last keyframe.
        assert_eq!(sample(&times, 9.0), (2, 2, 0.0));
    }

    #[test]
    fn mixer_moves_the_target_node() {
        let mut root = Node::new(0, "root");
        root.children.push(Node::new(1, "door"));
        let clip = AnimationClip {
            name: "open".to_string(),
            target: 1,
            timestamps: vec![0.0, 2.0],
            keyframes: Keyframes::Translation(vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(4.0, 0.0, 0.0),
            ]),
        };
        let mut mixer = Mixer::new();
        mixer.update(1.0, &[clip], &mut root);
        let x = root.find_mut(1).unwrap().transform.position.x;
        assert!((x - 2.0).abs() < 1e-5);
    }

    #[test]
    fn mixer_without_clips_is_inert() {
        let mut root = Node::new(0, "root");
        let mut mixer = Mixer::new();
        mixer.update(1.0, &[], &mut root);
        assert_eq!(root.transform.position.x, 0.0);
    }
}
