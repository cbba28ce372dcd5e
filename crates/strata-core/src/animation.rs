//! Flip-book frames. Each frame owns a full layer stack.

use crate::error::EngineResult;
use crate::layer::{LayerStack, ResizePolicy};
use std::time::Duration;

/// Playback rate used when none (or an invalid one) is given.
pub const DEFAULT_FPS: u32 = 12;

/// Ordered frames with a current index.
#[derive(Debug)]
pub struct Frames {
    frames: Vec<LayerStack>,
    current: usize,
    width: u32,
    height: u32,
    selection_opacity: f64,
}

impl Frames {
    /// Start with a single frame.
    pub fn new(width: u32, height: u32, selection_opacity: f64) -> EngineResult<Self> {
        let mut frames = Self {
            frames: Vec::new(),
            current: 0,
            width,
            height,
            selection_opacity,
        };
        let first = frames.new_stack()?;
        frames.frames.push(first);
        Ok(frames)
    }

    fn new_stack(&self) -> EngineResult<LayerStack> {
        let mut stack = LayerStack::new(self.width, self.height)?;
        let selection = stack.selection().id();
        stack.set_opacity(selection, self.selection_opacity);
        Ok(stack)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false: there is at least one frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &LayerStack {
        &self.frames[self.current]
    }

    pub fn current_mut(&mut self) -> &mut LayerStack {
        &mut self.frames[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&LayerStack> {
        self.frames.get(index)
    }

    /// Append a fresh frame and make it current.
    pub fn add_frame(&mut self) -> EngineResult<usize> {
        let stack = self.new_stack()?;
        self.frames.push(stack);
        self.current = self.frames.len() - 1;
        log::debug!("Added frame {}", self.current);
        Ok(self.current)
    }

    /// Delete the current frame; the previous one becomes current.
    /// Ignored when only one frame is left.
    pub fn delete_frame(&mut self) -> bool {
        if self.frames.len() <= 1 {
            return false;
        }
        self.frames.remove(self.current);
        self.current = self.current.saturating_sub(1);
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if self.current + 1 >= self.frames.len() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn goto(&mut self, index: usize) -> bool {
        if index >= self.frames.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    /// Step forward for playback, wrapping to the first frame.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.frames.len();
        self.current
    }

    /// Reallocate the surfaces of every frame. Nothing changes unless every
    /// surface of every frame could be allocated.
    pub fn resize(&mut self, width: u32, height: u32, policy: ResizePolicy) -> EngineResult<()> {
        let fresh = self
            .frames
            .iter()
            .map(|stack| stack.allocate_surfaces(width, height))
            .collect::<EngineResult<Vec<_>>>()?;
        for (stack, surfaces) in self.frames.iter_mut().zip(fresh) {
            stack.swap_surfaces(surfaces, width, height, policy);
        }
        self.width = width;
        self.height = height;
        Ok(())
    }
}

/// Playback timing for the frame timer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    fps: u32,
    playing: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl Playback {
    /// Zero fps falls back to the default rate.
    pub fn new(fps: u32) -> Self {
        Self {
            fps: if fps == 0 { DEFAULT_FPS } else { fps },
            playing: false,
        }
    }

    /// Parse a user-entered rate; anything unusable means the default.
    pub fn parse(fps: &str) -> Self {
        Self::new(fps.trim().parse().unwrap_or(DEFAULT_FPS))
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start or stop playback. Returns whether it is now playing.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Time between frame advances.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> Frames {
        Frames::new(8, 8, 0.7).unwrap()
    }

    #[test]
    fn test_add_frame_becomes_current() {
        let mut frames = frames();
        assert_eq!(frames.add_frame().unwrap(), 1);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.current().names(), vec!["Selection", "Layer 1"]);
    }

    #[test]
    fn test_frames_have_independent_stacks() {
        let mut frames = frames();
        frames.current_mut().add_layer(None).unwrap();
        frames.add_frame().unwrap();
        assert_eq!(frames.current().len(), 1);
        assert_eq!(frames.get(0).unwrap().len(), 2);
    }

    #[test]
    fn test_cannot_delete_last_frame() {
        let mut frames = frames();
        assert!(!frames.delete_frame());
        frames.add_frame().unwrap();
        assert!(frames.delete_frame());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames.current_index(), 0);
    }

    #[test]
    fn test_navigation_is_bounded() {
        let mut frames = frames();
        frames.add_frame().unwrap();
        assert!(!frames.next());
        assert!(frames.prev());
        assert!(!frames.prev());
        assert!(frames.goto(1));
        assert!(!frames.goto(5));
    }

    #[test]
    fn test_advance_wraps() {
        let mut frames = frames();
        frames.add_frame().unwrap();
        frames.add_frame().unwrap();
        assert_eq!(frames.advance(), 0);
        assert_eq!(frames.advance(), 1);
    }

    #[test]
    fn test_resize_all_frames() {
        let mut frames = frames();
        frames.add_frame().unwrap();
        frames.resize(16, 4, ResizePolicy::DropContent).unwrap();
        assert_eq!(frames.get(0).unwrap().width(), 16);
        assert_eq!(frames.get(1).unwrap().height(), 4);
    }

    #[test]
    fn test_playback_interval() {
        let playback = Playback::parse("abc");
        assert_eq!(playback.fps(), DEFAULT_FPS);
        assert_eq!(Playback::new(0).fps(), DEFAULT_FPS);
        let fast = Playback::new(25);
        assert_eq!(fast.interval(), Duration::from_millis(40));
        let mut playback = Playback::default();
        assert!(playback.toggle());
        assert!(playback.is_playing());
    }
}
