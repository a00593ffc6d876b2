//! 选择列表配色，取自 Elm 标志的七巧板颜色

use ratatui::style::Color;

/// 作者前缀（橙）
pub const AUTHOR: Color = Color::Rgb(240, 173, 0);
/// 包名（蓝）
pub const NAME: Color = Color::Rgb(96, 181, 204);
/// 选中行背景色
pub const SEL_BG: Color = Color::Rgb(52, 73, 94);
/// 选中行文字
pub const SEL_FG: Color = Color::Rgb(255, 255, 255);
/// 描述文字（灰）
pub const DESC: Color = Color::Rgb(130, 130, 140);
