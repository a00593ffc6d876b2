use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// 通用文本输入框组件，支持 UTF-8 (中英文)
#[derive(Debug, Clone, Default)]
pub struct InputBox {
    /// 输入内容
    content: String,
    /// 光标位置（按字符计数，非字节）
    cursor: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在光标处插入字符
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte(&self.content, self.cursor);
        self.content.insert(byte_pos, c);
        self.cursor += 1;
    }

    /// Backspace: 删除光标前的字符，返回内容是否改变
    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte(&self.content, self.cursor);
        let next_byte_pos = char_to_byte(&self.content, self.cursor + 1);
        self.content.drain(byte_pos..next_byte_pos);
        true
    }

    /// 光标左移
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// 光标右移
    pub fn move_right(&mut self) {
        let char_count = self.content.chars().count();
        if self.cursor < char_count {
            self.cursor += 1;
        }
    }

    /// 光标移到行首
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// 光标移到行尾
    pub fn move_end(&mut self) {
        self.cursor = self.content.chars().count();
    }

    /// 获取内容
    pub fn content(&self) -> &str {
        &self.content
    }

    /// 获取光标位置
    pub fn cursor_pos(&self) -> usize {
        self.cursor
    }
}

/// UTF-8 安全的字符位置转字节位置
fn char_to_byte(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// 渲染输入框；内容为空时显示占位提示
pub fn render_input_box(f: &mut Frame, input: &InputBox, placeholder: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let chars: Vec<char> = input.content().chars().collect();
    let cursor_pos = input.cursor_pos().min(chars.len());
    let before: String = chars[..cursor_pos].iter().collect();
    let cursor_char = chars
        .get(cursor_pos)
        .map(|c| c.to_string())
        .unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(cursor_pos + 1).collect();

    let mut spans = vec![
        Span::styled(
            "> ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(before, Style::default().fg(Color::White)),
        Span::styled(cursor_char, Style::default().fg(Color::Black).bg(Color::White)),
        Span::styled(after, Style::default().fg(Color::White)),
    ];

    if chars.is_empty() {
        spans.push(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(paragraph, area);
}
