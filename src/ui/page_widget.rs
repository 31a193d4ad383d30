//! Lays the mounted page out in terminal cells and draws it.
//!
//! Layout works on untransformed boxes; those are what the viewport tests for
//! intersection.  Drawing then applies each element's sampled visual state:
//! opacity blends colours toward the background, translation shifts the box
//! by whole cells, and scale shrinks it around its centre.

use std::collections::HashMap;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use tokio::time::Instant;

use crate::app::hours::StoreStatus;
use crate::app::page::{ItemKind, Page, PageItem, SectionKind};
use crate::app::surface::PageSurface;
use crate::app::viewport::CellRect;
use crate::core::animation::VisualState;
use crate::core::document::ElementId;

use super::theme::Theme;

const MARGIN_X: u16 = 2;
const CARD_GAP: u16 = 2;
/// Content width needed before grid sections use two columns.
const TWO_COLUMN_MIN: u16 = 56;
/// Below this opacity an element isn't drawn at all.
const MIN_VISIBLE_OPACITY: f64 = 0.05;

// ───────────────────────────────────────── layout ────────────

/// Untransformed box of every mounted element, in page rows/columns.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub rects: HashMap<ElementId, CellRect>,
    /// Total page height in rows.
    pub height: u16,
}

/// Greedy word wrap.  Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if len > 0 {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if len == 0 { word.len() } else { len + 1 + word.len() };
        if needed > width {
            lines.push(std::mem::take(&mut line));
            len = 0;
        }
        if len > 0 {
            line.push(' ');
            len += 1;
        }
        line.extend(word.iter());
        len += word.len();
    }
    if len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Stack sections vertically: a heading row, then the section's cards,
/// two per row for grid sections when `width` allows.
pub fn layout_page(page: &Page, items: &[PageItem], width: u16) -> PageLayout {
    let inner_w = width.saturating_sub(MARGIN_X * 2).max(12);
    let mut rects = HashMap::new();
    let mut y: u16 = 1;

    for (si, section) in page.sections.iter().enumerate() {
        let cols: u16 = if section.kind.is_grid() && inner_w >= TWO_COLUMN_MIN { 2 } else { 1 };
        let col_w = (inner_w - CARD_GAP * (cols - 1)) / cols;
        let mut col = 0;
        let mut row_h = 0;

        for item in items.iter().filter(|it| it.section == si) {
            match item.kind {
                ItemKind::Heading => {
                    rects.insert(
                        item.element,
                        CellRect {
                            x: MARGIN_X,
                            y,
                            width: inner_w,
                            height: 1,
                        },
                    );
                    y = y.saturating_add(2);
                }
                ItemKind::Card(bi) => {
                    let text = section.blocks.get(bi).map_or("", |b| b.text.as_str());
                    let height = wrap_text(text, col_w.saturating_sub(4) as usize).len() as u16 + 2;
                    rects.insert(
                        item.element,
                        CellRect {
                            x: MARGIN_X + col * (col_w + CARD_GAP),
                            y,
                            width: col_w,
                            height,
                        },
                    );
                    row_h = row_h.max(height);
                    col += 1;
                    if col == cols {
                        y = y.saturating_add(row_h);
                        col = 0;
                        row_h = 0;
                    }
                }
            }
        }
        y = y.saturating_add(row_h + 1);
    }

    PageLayout { rects, height: y }
}

// ───────────────────────────────────────── widget ────────────

/// The page as seen from `top` (first page row drawn).  Built fresh each
/// frame.
pub struct PageWidget<'a> {
    pub page: &'a Page,
    pub items: &'a [PageItem],
    pub layout: &'a PageLayout,
    pub surface: &'a PageSurface,
    pub now: Instant,
    pub top: usize,
    pub px_per_row: f64,
    pub px_per_col: f64,
    pub store_status: Option<&'a StoreStatus>,
}

/// An element's on-screen box after transform and clipping.
struct Placed {
    rect: Rect,
    /// Rows of the element hidden above the area.
    skip_top: u16,
    clipped_top: bool,
    clipped_bottom: bool,
}

impl PageWidget<'_> {
    fn place(&self, area: Rect, cells: CellRect, state: &VisualState) -> Option<Placed> {
        let t = &state.transform;
        let (w, h, dx, dy) = if t.is_identity() {
            (cells.width as i32, cells.height as i32, 0, 0)
        } else {
            let scale = t.scale.max(0.0);
            (
                ((cells.width as f64 * scale).round() as i32).max(1),
                ((cells.height as f64 * scale).round() as i32).max(1),
                (t.translate_x / self.px_per_col).round() as i32,
                (t.translate_y / self.px_per_row).round() as i32,
            )
        };

        let x0 = area.x as i32 + cells.x as i32 + (cells.width as i32 - w) / 2 + dx;
        let y0 = area.y as i32 + cells.y as i32 - self.top as i32
            + (cells.height as i32 - h) / 2
            + dy;

        let left = x0.max(area.x as i32);
        let right = (x0 + w).min(area.right() as i32);
        let top = y0.max(area.y as i32);
        let bottom = (y0 + h).min(area.bottom() as i32);
        if right <= left || bottom <= top {
            return None;
        }

        Some(Placed {
            rect: Rect::new(
                left as u16,
                top as u16,
                (right - left) as u16,
                (bottom - top) as u16,
            ),
            skip_top: (top - y0) as u16,
            clipped_top: y0 < area.y as i32,
            clipped_bottom: y0 + h > area.bottom() as i32,
        })
    }

    fn render_heading(&self, title: &str, kind: SectionKind, p: &Placed, opacity: f64, buf: &mut Buffer) {
        let mut spans = vec![Span::styled(title.to_string(), Theme::heading_style(opacity))];
        if kind == SectionKind::Hours {
            if let Some(status) = self.store_status {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    status.message.clone(),
                    Theme::store_status_style(status.is_open, opacity),
                ));
            }
        }
        Paragraph::new(Line::from(spans)).render(p.rect, buf);
    }

    fn render_card(&self, text: &str, p: &Placed, opacity: f64, buf: &mut Buffer) {
        // Omit the border on an edge that is off-screen.
        let borders = match (p.clipped_top, p.clipped_bottom) {
            (true, true) => Borders::LEFT | Borders::RIGHT,
            (true, false) => Borders::LEFT | Borders::RIGHT | Borders::BOTTOM,
            (false, true) => Borders::LEFT | Borders::RIGHT | Borders::TOP,
            (false, false) => Borders::ALL,
        };
        let block = Block::default()
            .borders(borders)
            .border_style(Theme::card_border_style(opacity));
        let inner = block.inner(p.rect);
        block.render(p.rect, buf);

        let text_area = Rect::new(
            inner.x.saturating_add(1),
            inner.y,
            inner.width.saturating_sub(2),
            inner.height,
        );
        if text_area.width == 0 || text_area.height == 0 {
            return;
        }
        let skip = if p.clipped_top { p.skip_top.saturating_sub(1) } else { 0 };
        let lines: Vec<Line> = wrap_text(text, text_area.width as usize)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Theme::text_style(opacity))))
            .collect();
        Paragraph::new(lines).scroll((skip, 0)).render(text_area, buf);
    }
}

impl Widget for PageWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::page_style());

        for item in self.items {
            let Some(&cells) = self.layout.rects.get(&item.element) else {
                continue;
            };
            let state = self.surface.sample(item.element, self.now);
            if state.opacity < MIN_VISIBLE_OPACITY {
                continue;
            }
            let Some(placed) = self.place(area, cells, &state) else {
                continue;
            };
            let Some(section) = self.page.sections.get(item.section) else {
                continue;
            };

            match item.kind {
                ItemKind::Heading => {
                    self.render_heading(&section.title, section.kind, &placed, state.opacity, buf)
                }
                ItemKind::Card(bi) => {
                    let text = section.blocks.get(bi).map_or("", |b| b.text.as_str());
                    self.render_card(text, &placed, state.opacity, buf);
                }
            }
        }
    }
}
