use crate::terminal::Terminal;
use crossterm::style::Color;

// Box drawing characters (rounded)
pub const BOX_TL: char = '╭';
pub const BOX_TR: char = '╮';
pub const BOX_BL: char = '╰';
pub const BOX_BR: char = '╯';
pub const BOX_H: char = '─';
pub const BOX_V: char = '│';
pub const BOX_TITLE_L: char = '┤';
pub const BOX_TITLE_R: char = '├';

/// A bordered, titled area of the screen
pub struct Panel {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
    pub title: String,
    pub title_color: Color,
    pub border_color: Color,
}

impl Panel {
    pub fn new(x: i32, y: i32, width: u16, height: u16, title: &str) -> Self {
        Self {
            x,
            y,
            width,
            height,
            title: title.to_string(),
            title_color: Color::White,
            border_color: Color::DarkGrey,
        }
    }

    pub fn colors(mut self, title: Color, border: Color) -> Self {
        self.title_color = title;
        self.border_color = border;
        self
    }

    pub fn inner_x(&self) -> i32 { self.x + 1 }
    pub fn inner_y(&self) -> i32 { self.y + 1 }
    pub fn inner_width(&self) -> u16 { self.width.saturating_sub(2) }
    pub fn inner_height(&self) -> u16 { self.height.saturating_sub(2) }

    /// Draw the border with the title left-aligned in the top edge
    pub fn draw(&self, term: &mut Terminal) {
        if self.width < 2 || self.height < 2 {
            return;
        }
        let w = self.width as i32;
        let h = self.height as i32;
        let bc = Some(self.border_color);

        term.set(self.x, self.y, BOX_TL, bc, false);
        term.set(self.x + w - 1, self.y, BOX_TR, bc, false);
        term.set(self.x, self.y + h - 1, BOX_BL, bc, false);
        term.set(self.x + w - 1, self.y + h - 1, BOX_BR, bc, false);

        for i in 1..w - 1 {
            term.set(self.x + i, self.y, BOX_H, bc, false);
            term.set(self.x + i, self.y + h - 1, BOX_H, bc, false);
        }
        for j in 1..h - 1 {
            term.set(self.x, self.y + j, BOX_V, bc, false);
            term.set(self.x + w - 1, self.y + j, BOX_V, bc, false);
        }

        let title_w = self.title.chars().count() as i32;
        if title_w > 0 && title_w + 5 <= w {
            let tx = self.x + 1;
            term.set(tx, self.y, BOX_TITLE_L, bc, false);
            term.set(tx + 1, self.y, ' ', None, false);
            term.set_str(tx + 2, self.y, &self.title, Some(self.title_color), true);
            term.set(tx + 2 + title_w, self.y, ' ', None, false);
            term.set(tx + 3 + title_w, self.y, BOX_TITLE_R, bc, false);
        }
    }
}
