use sdl2::keyboard::Keycode;

/// Maps an SDL key to its Chip-8 keypad index.
///
/// SDL names keys after their label, e.g. `"Q"` or `"4"`; single-character names are passed on
/// to the Chip-8 keymap.
pub fn keymap(key: Keycode) -> Option<u8> {
    let name = key.name();
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(label), None) => chip8_vm::keymap(label),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_keypad() {
        assert_eq!(keymap(Keycode::X), Some(0x0));
        assert_eq!(keymap(Keycode::Num1), Some(0x1));
        assert_eq!(keymap(Keycode::Num4), Some(0xC));
        assert_eq!(keymap(Keycode::V), Some(0xF));
    }

    #[test]
    fn test_ignores_other_keys() {
        assert_eq!(keymap(Keycode::Space), None);
        assert_eq!(keymap(Keycode::Num0), None);
        assert_eq!(keymap(Keycode::Escape), None);
    }
}
