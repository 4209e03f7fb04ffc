use ratatui::style::Color;

/// Runtime theme colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub bg0: Color,
    pub bg2: Color,
    pub fg0: Color,
    pub grey2: Color,

    // Scrollbar
    pub track: Color,
    pub handle: Color,
    pub handle_dragging: Color,

    // Status
    pub active: Color,
    pub inactive: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            track: Color::Rgb(0x32, 0x30, 0x2f),
            handle: Color::Rgb(0x92, 0x83, 0x74),
            handle_dragging: Color::Rgb(0xd8, 0xa6, 0x57),
            active: Color::Rgb(0xa9, 0xb6, 0x65),
            inactive: Color::Rgb(0xea, 0x69, 0x62),
        }
    }
}
