/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
///
/// Hosts translate their own key events into these labels; letters are case-insensitive.
pub fn keymap(label: char) -> Option<u8> {
    match label.to_ascii_uppercase() {
        'X' => Some(0x0),
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        'Q' => Some(0x4),
        'W' => Some(0x5),
        'E' => Some(0x6),
        'A' => Some(0x7),
        'S' => Some(0x8),
        'D' => Some(0x9),
        'Z' => Some(0xA),
        'C' => Some(0xB),
        '4' => Some(0xC),
        'R' => Some(0xD),
        'F' => Some(0xE),
        'V' => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "1234QWERASDFZXCV";

    #[test]
    fn test_every_key_has_exactly_one_label() {
        let mut seen = [0; 16];
        for label in LAYOUT.chars() {
            let key = keymap(label).expect("layout label should map to a key");
            seen[key as usize] += 1;
        }
        assert_eq!(seen, [1; 16]);
    }

    #[test]
    fn test_keypad_corners() {
        assert_eq!(keymap('1'), Some(0x1));
        assert_eq!(keymap('4'), Some(0xC));
        assert_eq!(keymap('Z'), Some(0xA));
        assert_eq!(keymap('V'), Some(0xF));
        assert_eq!(keymap('X'), Some(0x0));
    }

    #[test]
    fn test_lowercase_labels() {
        assert_eq!(keymap('q'), Some(0x4));
    }

    #[test]
    fn test_unmapped_labels() {
        assert_eq!(keymap('0'), None);
        assert_eq!(keymap('G'), None);
        assert_eq!(keymap(' '), None);
    }
}
