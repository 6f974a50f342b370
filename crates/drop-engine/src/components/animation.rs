//! Sprite frame animation.
//!
//! A character owns a handful of named clips (idle, walk-left, ...) and the
//! game picks which one plays each tick.

use std::collections::HashMap;

/// One named frame sequence laid out along an atlas row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Atlas columns, in playback order.
    pub cols: Vec<f32>,
    /// Atlas row shared by every frame.
    pub row: f32,
    /// Seconds per frame.
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationClip {
    /// Consecutive columns `start_col..start_col + frame_count` on `row`.
    pub fn strip(row: f32, start_col: f32, frame_count: u32, fps: f32) -> Self {
        Self {
            cols: (0..frame_count).map(|i| start_col + i as f32).collect(),
            row,
            frame_duration: 1.0 / fps,
            looping: true,
        }
    }

    /// A single still frame.
    pub fn still(row: f32, col: f32) -> Self {
        Self {
            cols: vec![col],
            row,
            frame_duration: 1.0,
            looping: false,
        }
    }
}

/// Plays one clip at a time out of a named set.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    clips: HashMap<&'static str, AnimationClip>,
    current: &'static str,
    frame: usize,
    timer: f32,
    halted: bool,
}

impl Animator {
    /// Start with `name` selected.
    pub fn new(name: &'static str, clip: AnimationClip) -> Self {
        let mut clips = HashMap::new();
        clips.insert(name, clip);
        Self {
            clips,
            current: name,
            ..Default::default()
        }
    }

    pub fn with_clip(mut self, name: &'static str, clip: AnimationClip) -> Self {
        self.clips.insert(name, clip);
        self
    }

    /// Switch to `name`, restarting it only if it was not already playing.
    /// Ignored while halted or when the clip is unknown.
    pub fn play(&mut self, name: &'static str) {
        if self.halted || self.current == name || !self.clips.contains_key(name) {
            return;
        }
        self.current = name;
        self.frame = 0;
        self.timer = 0.0;
    }

    /// Freeze on the current frame for good; later `play` calls are ignored.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn current(&self) -> &'static str {
        self.current
    }

    pub fn frame_index(&self) -> usize {
        self.frame
    }

    /// `(col, row)` of the frame on screen.
    pub fn current_frame(&self) -> Option<(f32, f32)> {
        let clip = self.clips.get(self.current)?;
        clip.cols.get(self.frame).map(|&col| (col, clip.row))
    }

    /// Advance by `dt` seconds. Returns true if the frame changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.halted {
            return false;
        }
        let Some(clip) = self.clips.get(self.current) else {
            return false;
        };
        if clip.cols.len() < 2 {
            return false;
        }

        self.timer += dt;
        let mut changed = false;
        while self.timer >= clip.frame_duration {
            self.timer -= clip.frame_duration;
            if self.frame + 1 < clip.cols.len() {
                self.frame += 1;
            } else if clip.looping {
                self.frame = 0;
            } else {
                break;
            }
            changed = true;
        }
        changed
    }
}
