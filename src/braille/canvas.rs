use ratatui::style::Color;

/// Braille Unicode canvas with a per-cell foreground color.
/// Each character cell represents a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct ColorCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    bits: Vec<u8>,
    colors: Vec<Option<Color>>,
}

impl ColorCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![0u8; width * height],
            colors: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    /// Cell color is last-write-wins: a cell shared by two regions keeps
    /// the color of whichever drew later.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        let idx = cy * self.width + cx;
        self.bits[idx] |= bit;
        self.colors[idx] = Some(color);
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32, color: Color) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// Fill a horizontal run of pixels on one scanline
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        if y < 0 {
            return;
        }
        let start = x0.max(0);
        for x in start..=x1 {
            if x < 0 {
                continue;
            }
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// Iterate over non-empty cells as (col, row, braille char, color)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char, Color)> + '_ {
        self.bits.iter().enumerate().filter_map(move |(idx, &b)| {
            if b == 0 {
                return None;
            }
            let cy = idx / self.width;
            let cx = idx % self.width;
            let ch = char::from_u32(0x2800 + b as u32).unwrap_or(' ');
            let color = self.colors[idx].unwrap_or(Color::Reset);
            Some((cx, cy, ch, color))
        })
    }

    /// Convert the canvas to a string of Braille characters (colors dropped)
    #[cfg(test)]
    pub fn to_plain_string(&self) -> String {
        (0..self.height)
            .map(|cy| {
                (0..self.width)
                    .map(|cx| {
                        let b = self.bits[cy * self.width + cx];
                        char::from_u32(0x2800 + b as u32).unwrap_or(' ')
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = ColorCanvas::new(1, 1);
        canvas.set_pixel(0, 0, Color::White);
        assert_eq!(canvas.to_plain_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = ColorCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y, Color::White);
            }
        }
        assert_eq!(canvas.to_plain_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = ColorCanvas::new(2, 1);
        canvas.set_pixel(0, 0, Color::White);
        canvas.set_pixel(1, 1, Color::White);
        canvas.set_pixel(2, 2, Color::White);
        canvas.set_pixel(3, 3, Color::White);
        // First char: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second char: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(canvas.to_plain_string(), "⠑⢄");
    }

    #[test]
    fn test_cell_color_last_write_wins() {
        let mut canvas = ColorCanvas::new(1, 1);
        canvas.set_pixel(0, 0, Color::Red);
        canvas.set_pixel(1, 0, Color::Blue);
        let cells: Vec<_> = canvas.cells().collect();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].3, Color::Blue);
    }

    #[test]
    fn test_fill_span_clips_negative() {
        let mut canvas = ColorCanvas::new(2, 1);
        canvas.fill_span(0, -5, 3, Color::Green);
        let cells: Vec<_> = canvas.cells().collect();
        // Pixels 0..=3 on row 0 cover both cells
        assert_eq!(cells.len(), 2);
    }
}
