//! 单选列表的过滤与选择状态

use super::input::InputBox;
use crate::package::PickItem;

/// 大小写不敏感的子序列匹配；空模式匹配一切
pub fn fuzzy_match(pattern: &str, text: &str) -> bool {
    let mut haystack = text.chars().flat_map(char::to_lowercase);
    pattern
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .all(|p| haystack.any(|h| h == p))
}

pub struct PickerState<'a> {
    items: &'a [PickItem],
    match_on_description: bool,
    pub input: InputBox,
    /// 过滤后仍可见条目在 items 中的下标
    filtered: Vec<usize>,
    selected: usize,
}

impl<'a> PickerState<'a> {
    pub fn new(items: &'a [PickItem], match_on_description: bool) -> Self {
        Self {
            items,
            match_on_description,
            input: InputBox::new(),
            filtered: (0..items.len()).collect(),
            selected: 0,
        }
    }

    pub fn insert(&mut self, c: char) {
        self.input.insert(c);
        self.refilter();
    }

    pub fn delete_back(&mut self) {
        if self.input.delete_back() {
            self.refilter();
        }
    }

    fn refilter(&mut self) {
        let query = self.input.content();
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                fuzzy_match(query, &item.label)
                    || (self.match_on_description && fuzzy_match(query, &item.description))
            })
            .map(|(i, _)| i)
            .collect();
        self.selected = 0;
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    pub fn page_down(&mut self, page: usize) {
        let last = self.filtered.len().saturating_sub(1);
        self.selected = (self.selected + page).min(last);
    }

    pub fn page_up(&mut self, page: usize) {
        self.selected = self.selected.saturating_sub(page);
    }

    /// 当前选中条目在原始列表中的下标
    pub fn selected_index(&self) -> Option<usize> {
        self.filtered.get(self.selected).copied()
    }

    /// 过滤后的条目及其在过滤列表中的位置
    pub fn visible(&self) -> impl Iterator<Item = (usize, &'a PickItem)> + '_ {
        let items = self.items;
        self.filtered
            .iter()
            .enumerate()
            .map(move |(pos, &i)| (pos, &items[i]))
    }

    pub fn selected_pos(&self) -> usize {
        self.selected
    }

    pub fn match_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}
