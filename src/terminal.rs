use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Cell buffer drawn to the screen in one pass per frame
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Take over the real terminal (raw mode, alternate screen)
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;

        Ok(Self {
            width,
            height,
            buffer: Self::blank(width, height),
            alternate_screen: true,
        })
    }

    /// Buffer of a fixed size that never touches the tty (print mode, tests)
    pub fn offscreen(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: Self::blank(width, height),
            alternate_screen: false,
        }
    }

    fn blank(width: u16, height: u16) -> Vec<Vec<Cell>> {
        vec![vec![Cell::default(); width as usize]; height as usize]
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = Self::blank(width, height);
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            for cell in row {
                *cell = Cell::default();
            }
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    #[cfg(test)]
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.buffer.get(y as usize)?.get(x as usize)
    }

    /// Text of one buffer row, trailing blanks trimmed
    #[cfg(test)]
    pub fn row_text(&self, y: u16) -> String {
        self.buffer
            .get(y as usize)
            .map(|row| row.iter().map(|c| c.ch).collect::<String>().trim_end().to_string())
            .unwrap_or_default()
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut stdout = stdout();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(stdout, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(stdout, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(stdout, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(stdout, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        stdout.flush()?;
        Ok(())
    }

    /// Check for keypress (non-blocking), returns (code, modifiers)
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some((key_event.code, key_event.modifiers)));
            }
        }
        Ok(None)
    }

    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }

    /// Print buffer with ANSI colors (for print mode)
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for row in &self.buffer {
            for cell in row {
                if cell.ch == ' ' {
                    write!(out, " ")?;
                    continue;
                }

                if cell.bold {
                    write!(out, "\x1b[1m")?;
                }

                if let Some(color) = cell.fg {
                    match color {
                        Color::Rgb { r, g, b } => write!(out, "\x1b[38;2;{};{};{}m", r, g, b)?,
                        Color::AnsiValue(v) => write!(out, "\x1b[38;5;{}m", v)?,
                        Color::Black => write!(out, "\x1b[30m")?,
                        Color::DarkRed => write!(out, "\x1b[31m")?,
                        Color::DarkGreen => write!(out, "\x1b[32m")?,
                        Color::DarkYellow => write!(out, "\x1b[33m")?,
                        Color::DarkBlue => write!(out, "\x1b[34m")?,
                        Color::DarkMagenta => write!(out, "\x1b[35m")?,
                        Color::DarkCyan => write!(out, "\x1b[36m")?,
                        Color::Grey => write!(out, "\x1b[37m")?,
                        Color::DarkGrey => write!(out, "\x1b[90m")?,
                        Color::Red => write!(out, "\x1b[91m")?,
                        Color::Green => write!(out, "\x1b[92m")?,
                        Color::Yellow => write!(out, "\x1b[93m")?,
                        Color::Blue => write!(out, "\x1b[94m")?,
                        Color::Magenta => write!(out, "\x1b[95m")?,
                        Color::Cyan => write!(out, "\x1b[96m")?,
                        Color::White => write!(out, "\x1b[97m")?,
                        _ => {}
                    }
                }

                write!(out, "{}\x1b[0m", cell.ch)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
