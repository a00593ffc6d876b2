//! 终端选择列表，实现 Prompter

mod input;
mod layout;
mod picker;
mod theme;

use crate::package::{PickItem, PickOptions, Prompter};
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use picker::PickerState;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use theme::{AUTHOR, DESC, NAME, SEL_BG, SEL_FG};

/// 每次选择时进入备用屏幕，结束后恢复终端
#[derive(Debug, Default)]
pub struct TuiPrompter;

impl TuiPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TuiPrompter {
    fn pick(&mut self, items: &[PickItem], options: &PickOptions) -> Result<Option<usize>> {
        // guard 离开作用域时恢复终端，包括中途出错的情况
        let _guard = ScreenGuard::enter()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        run_picker(&mut terminal, items, options)
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("错误: {}", message);
    }
}

type RestoreStep = Box<dyn FnOnce() -> io::Result<()>>;

/// 依次执行全部恢复步骤，某一步失败不影响后续步骤，返回第一个错误
fn restore_all(steps: Vec<RestoreStep>) -> io::Result<()> {
    let mut first_err = None;
    for step in steps {
        if let Err(e) = step() {
            first_err.get_or_insert(e);
        }
    }
    first_err.map_or(Ok(()), Err)
}

fn restore_steps() -> Vec<RestoreStep> {
    vec![
        Box::new(disable_raw_mode),
        Box::new(|| execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)),
    ]
}

/// raw 模式 + 备用屏幕，Drop 时无条件恢复
struct ScreenGuard;

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        // 先构造 guard，进入备用屏幕失败时也会恢复 raw 模式
        let guard = ScreenGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        if let Err(e) = restore_all(restore_steps()) {
            log::warn!("恢复终端失败: {}", e);
        }
    }
}

/// 按键处理结果
enum KeyOutcome {
    Continue,
    Picked(Option<usize>),
    Cancelled,
}

fn run_picker(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    items: &[PickItem],
    options: &PickOptions,
) -> Result<Option<usize>> {
    let mut state = PickerState::new(items, options.match_on_description);

    loop {
        terminal.draw(|f| render_picker(f, &state, options))?;
        let page = visible_rows(terminal.size()?.height);

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match handle_key(key, &mut state, page) {
                KeyOutcome::Continue => {}
                // 过滤后没有条目时 Enter 不做任何事
                KeyOutcome::Picked(None) => {}
                KeyOutcome::Picked(Some(index)) => return Ok(Some(index)),
                KeyOutcome::Cancelled => return Ok(None),
            }
        }
    }
}

fn handle_key(key: KeyEvent, state: &mut PickerState, page: usize) -> KeyOutcome {
    match key.code {
        KeyCode::Esc => KeyOutcome::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancelled
        }
        KeyCode::Enter => KeyOutcome::Picked(state.selected_index()),
        KeyCode::Up => {
            state.move_up();
            KeyOutcome::Continue
        }
        KeyCode::Down => {
            state.move_down();
            KeyOutcome::Continue
        }
        KeyCode::PageUp => {
            state.page_up(page);
            KeyOutcome::Continue
        }
        KeyCode::PageDown => {
            state.page_down(page);
            KeyOutcome::Continue
        }
        KeyCode::Backspace => {
            state.delete_back();
            KeyOutcome::Continue
        }
        KeyCode::Left => {
            state.input.move_left();
            KeyOutcome::Continue
        }
        KeyCode::Right => {
            state.input.move_right();
            KeyOutcome::Continue
        }
        KeyCode::Home => {
            state.input.move_home();
            KeyOutcome::Continue
        }
        KeyCode::End => {
            state.input.move_end();
            KeyOutcome::Continue
        }
        KeyCode::Char(c) => {
            // 忽略带 Ctrl/Alt 修饰的字符
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                state.insert(c);
            }
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// 列表区域可见行数（总高度减去 header/输入框/footer/边框）
fn visible_rows(term_height: u16) -> usize {
    term_height.saturating_sub(11).max(1) as usize
}

fn render_picker(f: &mut Frame, state: &PickerState, options: &PickOptions) {
    let chunks = layout::picker_layout(f.area());

    layout::render_header(f, &options.placeholder, chunks[0]);
    input::render_input_box(f, &state.input, "输入以过滤", chunks[1]);
    render_item_list(f, state, chunks[2]);

    let footer = format!(
        "{}/{} | ↑↓ 选择 | Enter 确认 | Esc 取消",
        state.match_count(),
        state.total()
    );
    layout::render_footer(f, &footer, chunks[3]);
}

fn render_item_list(f: &mut Frame, state: &PickerState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // 内部水平边距
    let padded = inner.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    if state.match_count() == 0 {
        let empty = Paragraph::new(Line::from(Span::styled(
            "无结果",
            Style::default().fg(Color::DarkGray),
        )));
        f.render_widget(empty, padded);
        return;
    }

    let visible = padded.height as usize;
    let scroll = layout::scroll_offset(state.selected_pos(), visible);

    let lines: Vec<Line> = state
        .visible()
        .skip(scroll)
        .take(visible)
        .map(|(pos, item)| item_line(item, pos == state.selected_pos()))
        .collect();
    f.render_widget(Paragraph::new(lines), padded);

    // 滚动条
    if state.match_count() > visible {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(state.match_count()).position(scroll);
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                horizontal: 0,
                vertical: 1,
            }),
            &mut scrollbar_state,
        );
    }
}

/// "作者/" 与包名分色显示；描述与标签相同时不重复显示
fn item_line(item: &PickItem, selected: bool) -> Line<'static> {
    let base = if selected {
        Style::default().bg(SEL_BG)
    } else {
        Style::default()
    };
    let marker = if selected { "► " } else { "  " };

    let (author, name) = match item.label.split_once('/') {
        Some((author, name)) => (format!("{}/", author), name.to_string()),
        None => (String::new(), item.label.clone()),
    };
    let name_style = if selected {
        base.fg(SEL_FG).add_modifier(Modifier::BOLD)
    } else {
        base.fg(NAME)
    };

    let mut spans = vec![
        Span::styled(marker, base.fg(SEL_FG)),
        Span::styled(author, base.fg(AUTHOR)),
        Span::styled(name, name_style),
    ];
    if !item.description.is_empty() && item.description != item.label {
        spans.push(Span::styled(format!("  {}", item.description), base.fg(DESC)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn every_restore_step_runs_after_a_failure() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let (a, b, c) = (ran.clone(), ran.clone(), ran.clone());
        let steps: Vec<RestoreStep> = vec![
            Box::new(move || {
                a.borrow_mut().push("raw");
                Err(io::Error::other("raw mode"))
            }),
            Box::new(move || {
                b.borrow_mut().push("screen");
                Err(io::Error::other("screen"))
            }),
            Box::new(move || {
                c.borrow_mut().push("cursor");
                Ok(())
            }),
        ];

        let err = restore_all(steps).unwrap_err();
        assert_eq!(err.to_string(), "raw mode");
        assert_eq!(*ran.borrow(), vec!["raw", "screen", "cursor"]);
    }

    #[test]
    fn restore_succeeds_when_all_steps_succeed() {
        let steps: Vec<RestoreStep> = vec![Box::new(|| Ok(())), Box::new(|| Ok(()))];
        assert!(restore_all(steps).is_ok());
    }
}
