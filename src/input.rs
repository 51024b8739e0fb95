use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// What a key press asks the app to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleWireframe,
    ToggleFullscreen,
}

impl Action {
    /// The action bound to `key`, if any.
    pub fn for_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Escape => Some(Action::Quit),
            KeyCode::KeyW => Some(Action::ToggleWireframe),
            KeyCode::KeyF => Some(Action::ToggleFullscreen),
            _ => None,
        }
    }
}

/// Tracks keyboard state and turns fresh key presses into [`Action`]s.
///
/// Holding a key down fires its action once; auto-repeat is ignored.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key transition, returning the action for a new press.
    pub fn key(&mut self, key: KeyCode, state: ElementState) -> Option<Action> {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) {
                    Action::for_key(key)
                } else {
                    None
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                None
            }
        }
    }

    /// Process a window event, returning the action it triggers.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<Action> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(key) => self.key(key, event.state),
                PhysicalKey::Unidentified(_) => None,
            },
            // Lost focus means we never see the releases.
            WindowEvent::Focused(false) => {
                self.keys_down.clear();
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_keys() {
        assert_eq!(Action::for_key(KeyCode::Escape), Some(Action::Quit));
        assert_eq!(Action::for_key(KeyCode::KeyW), Some(Action::ToggleWireframe));
        assert_eq!(Action::for_key(KeyCode::KeyF), Some(Action::ToggleFullscreen));
        assert_eq!(Action::for_key(KeyCode::Space), None);
    }

    #[test]
    fn held_key_fires_once() {
        let mut input = Input::new();
        assert_eq!(
            input.key(KeyCode::KeyW, ElementState::Pressed),
            Some(Action::ToggleWireframe)
        );
        // Auto-repeat
        assert_eq!(input.key(KeyCode::KeyW, ElementState::Pressed), None);

        assert_eq!(input.key(KeyCode::KeyW, ElementState::Released), None);
        assert_eq!(
            input.key(KeyCode::KeyW, ElementState::Pressed),
            Some(Action::ToggleWireframe)
        );
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let mut input = Input::new();
        assert_eq!(input.key(KeyCode::KeyA, ElementState::Pressed), None);
        assert_eq!(input.key(KeyCode::KeyA, ElementState::Released), None);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = Input::new();
        input.key(KeyCode::KeyF, ElementState::Pressed);
        assert_eq!(input.handle_event(&WindowEvent::Focused(false)), None);
        // Without the reset this press would count as auto-repeat.
        assert_eq!(
            input.key(KeyCode::KeyF, ElementState::Pressed),
            Some(Action::ToggleFullscreen)
        );
    }
}
