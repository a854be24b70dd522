use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventKind, EventOutcome, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection,
    StatusBarStyle,
};

use crate::action::Action;
use crate::api::LoadSource;
use crate::catalog;
use crate::moves::{icon, order, projection};
use crate::sprite;
use crate::state::{AppState, CatalogTab, InputTarget, MovesFocus, Screen};

const BG_BASE: Color = Color::Rgb(12, 18, 28);
const BG_PANEL: Color = Color::Rgb(20, 32, 46);
const BG_PANEL_ALT: Color = Color::Rgb(26, 40, 58);
const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
const ACCENT_RED: Color = Color::Rgb(226, 94, 94);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Long-lived list and status components; they keep scroll offsets between
/// frames.
pub struct MiscritsUi {
    catalog_list: SelectList,
    stage_list: SelectList,
    creature_list: SelectList,
    ability_list: SelectList,
    status_bar: StatusBar,
}

impl Default for MiscritsUi {
    fn default() -> Self {
        Self::new()
    }
}

impl MiscritsUi {
    pub fn new() -> Self {
        Self {
            catalog_list: SelectList::new(),
            stage_list: SelectList::new(),
            creature_list: SelectList::new(),
            ability_list: SelectList::new(),
            status_bar: StatusBar::new(),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState, _render_ctx: RenderContext) {
        self.draw(frame, area, state);
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let base = Block::default().style(Style::default().bg(BG_BASE));
        frame.render_widget(base, area);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        render_header(frame, layout[0], state);
        match state.screen {
            Screen::Catalog => render_catalog(frame, layout[1], state, &mut self.catalog_list),
            Screen::Patch => render_patch(frame, layout[1], state, &mut self.stage_list),
            Screen::Moves => render_moves(
                frame,
                layout[1],
                state,
                &mut self.creature_list,
                &mut self.ability_list,
            ),
        }
        render_footer(frame, layout[2], state, &mut self.status_bar);
        if state.input.is_some() {
            render_input(frame, layout[1], state);
        }
    }
}

pub fn handle_event(event: &EventKind, state: &AppState) -> EventOutcome<Action> {
    match event {
        EventKind::Resize(width, height) => {
            EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => {
            if key.kind == KeyEventKind::Release {
                return EventOutcome::ignored();
            }
            match key_action(key, state) {
                Some(action) => EventOutcome::action(action),
                None => EventOutcome::ignored(),
            }
        }
        _ => EventOutcome::ignored(),
    }
}

fn key_action(key: &KeyEvent, state: &AppState) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Quit);
    }
    if state.input_active() {
        return match key.code {
            KeyCode::Esc => Some(Action::InputCancel),
            KeyCode::Enter => Some(Action::InputSubmit),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Char(ch) => Some(Action::InputChar(ch)),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') => return Some(Action::Quit),
        KeyCode::Char('1') => return Some(Action::ScreenSet(Screen::Catalog)),
        KeyCode::Char('2') => return Some(Action::ScreenSet(Screen::Patch)),
        KeyCode::Char('3') => return Some(Action::ScreenSet(Screen::Moves)),
        _ => {}
    }
    match state.screen {
        Screen::Catalog => catalog_key(key.code),
        Screen::Patch => patch_key(key.code),
        Screen::Moves => moves_key(key.code, state),
    }
}

fn catalog_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('j') | KeyCode::Down => Action::CatalogMove(1),
        KeyCode::Char('k') | KeyCode::Up => Action::CatalogMove(-1),
        KeyCode::PageDown | KeyCode::Right => Action::CatalogPage(1),
        KeyCode::PageUp | KeyCode::Left => Action::CatalogPage(-1),
        KeyCode::Tab => Action::CatalogTabToggle,
        KeyCode::Char('/') => Action::InputStart(InputTarget::CatalogSearch),
        KeyCode::Char('r') => Action::CatalogRarityNext,
        KeyCode::Char('e') => Action::CatalogElementNext,
        KeyCode::Char('c') => Action::CatalogFilterClear,
        KeyCode::Char('R') => Action::CatalogRetry,
        KeyCode::Enter => Action::CatalogOpen,
        _ => return None,
    };
    Some(action)
}

fn patch_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('j') | KeyCode::Down => Action::PatchStageMove(1),
        KeyCode::Char('k') | KeyCode::Up => Action::PatchStageMove(-1),
        KeyCode::Enter => Action::PatchStageSelect,
        KeyCode::Char('m') => Action::PatchModeToggle,
        KeyCode::Char('u') => Action::InputStart(InputTarget::UploadPath),
        KeyCode::Char('+') | KeyCode::Char('=') => Action::PatchScale(1),
        KeyCode::Char('-') => Action::PatchScale(-1),
        KeyCode::Char('0') => Action::PatchScaleReset,
        KeyCode::Char('a') => Action::PatchAspectToggle,
        KeyCode::Char('x') => Action::PatchEncode,
        KeyCode::Esc => Action::ScreenSet(Screen::Catalog),
        _ => return None,
    };
    Some(action)
}

fn moves_key(code: KeyCode, state: &AppState) -> Option<Action> {
    let focus = state.moves.focus;
    let action = match code {
        KeyCode::Tab => Action::MovesFocusToggle,
        KeyCode::Char('j') | KeyCode::Down => match focus {
            MovesFocus::Creatures => Action::MovesCreatureMove(1),
            MovesFocus::Abilities => Action::MovesAbilityMove(1),
        },
        KeyCode::Char('k') | KeyCode::Up => match focus {
            MovesFocus::Creatures => Action::MovesCreatureMove(-1),
            MovesFocus::Abilities => Action::MovesAbilityMove(-1),
        },
        KeyCode::Char('/') => Action::InputStart(InputTarget::CreatureSearch),
        KeyCode::Char('n') => Action::InputStart(InputTarget::AbilityName),
        KeyCode::Char('[') => Action::MovesTypeCycle(-1),
        KeyCode::Char(']') => Action::MovesTypeCycle(1),
        KeyCode::Enter | KeyCode::Char('s') => Action::MovesCommit,
        KeyCode::Esc | KeyCode::Char('z') => Action::MovesRevert,
        KeyCode::Char('K') => Action::MovesAbilityUp,
        KeyCode::Char('J') => Action::MovesAbilityDown,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::MovesApStep(1),
        KeyCode::Char('-') => Action::MovesApStep(-1),
        KeyCode::Char('t') => Action::MovesTrueDamageToggle,
        KeyCode::Char('h') => Action::MovesLogToggle,
        KeyCode::Char('l') => Action::MovesLoad(LoadSource::Local),
        KeyCode::Char('R') => Action::MovesLoad(LoadSource::Remote),
        KeyCode::Char('i') => Action::InputStart(InputTarget::ImportPath),
        KeyCode::Char('e') => Action::MovesExport,
        _ => return None,
    };
    Some(action)
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles: Vec<Line> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(index, screen)| Line::from(format!("{} {}", index + 1, screen.label())))
        .collect();
    let selected = Screen::ALL
        .iter()
        .position(|screen| *screen == state.screen)
        .unwrap_or(0);
    let mut title = vec![Span::styled(
        " MISCRITS ",
        Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
    )];
    if state.moves.store.has_unsaved_changes() {
        title.push(Span::styled("* unsaved ", Style::default().fg(ACCENT_GOLD)));
    }
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(title))
                .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
                .border_style(Style::default().fg(TEXT_DIM)),
        )
        .style(Style::default().fg(TEXT_DIM))
        .highlight_style(Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD))
        .divider(Span::styled(" | ", Style::default().fg(TEXT_DIM)));
    frame.render_widget(tabs, area);
}

fn render_catalog(frame: &mut Frame, area: Rect, state: &AppState, list: &mut SelectList) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(44), Constraint::Percentage(56)])
        .split(area);

    let rows = state.catalog.rows();
    let page = state.catalog.page(rows.len());
    let tab = match state.catalog.tab {
        CatalogTab::Miscrits => "MISCRITS",
        CatalogTab::Bosses => "BOSSES",
    };
    let block = panel(format!("{tab}  {}", page.label()), true);
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);

    if let Some(error) = state.catalog.active_error() {
        let text = Text::from(vec![
            Line::styled(error.to_string(), Style::default().fg(ACCENT_RED)),
            Line::styled("Press R to retry", Style::default().fg(TEXT_DIM)),
        ]);
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
    } else if state.catalog.active_resource_loading() {
        frame.render_widget(
            Paragraph::new(format!("Loading {} ", spinner(state.tick))).style(Style::default().fg(TEXT_DIM)),
            inner,
        );
    } else if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No matches").style(Style::default().fg(TEXT_DIM)),
            inner,
        );
    } else {
        let items: Vec<Line<'static>> = rows
            .iter()
            .map(|row| {
                Line::from(vec![
                    Span::styled(format!("{:>4} ", row.id), Style::default().fg(TEXT_DIM)),
                    Span::raw(catalog::short_name(&row.title, 28)),
                    Span::styled(format!("  {}", row.element), Style::default().fg(ACCENT_TEAL)),
                ])
            })
            .collect();
        let props = SelectListProps {
            items: &items,
            count: items.len(),
            selected: state.catalog.selected.min(items.len().saturating_sub(1)),
            is_focused: true,
            style: list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::CatalogSelect,
            render_item: &|item| item.clone(),
        };
        list.render(frame, inner, props);
    }

    render_catalog_detail(frame, layout[1], state, rows.get(state.catalog.selected));
}

fn render_catalog_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    row: Option<&crate::state::CatalogRow>,
) {
    let filter = &state.catalog.filter;
    let join = |values: &[String]| {
        if values.is_empty() {
            "All".to_string()
        } else {
            values.join(", ")
        }
    };
    let mut lines = vec![
        labeled("Search", if filter.query.is_empty() { "-" } else { &filter.query }),
        labeled("Rarity", &join(&filter.rarities)),
        labeled("Element", &join(&filter.elements)),
        Line::raw(""),
    ];

    if let Some(row) = row {
        let url = sprite::sprite_cdn_url(&row.sprite_name);
        lines.push(Line::styled(
            row.title.clone(),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ));
        lines.push(labeled("Id", &row.id.to_string()));
        lines.push(labeled("Element", &row.element));
        lines.push(labeled("Rarity", &row.rarity));
        lines.push(labeled("Sprite", &url));
        lines.push(labeled("Cache", &sprite::cache_filename(&url)));
        let size = match state.catalog.sprites.get(&url) {
            Some(info) => info.size_label(),
            None if state.catalog.sprite_requests.contains(&url) => {
                format!("loading {}", spinner(state.tick))
            }
            None => "-".to_string(),
        };
        lines.push(labeled("Size", &size));
        let icon = sprite::element_icon_url(&row.element);
        if !icon.is_empty() {
            lines.push(labeled("Icon", &icon));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Enter opens the sprite patcher",
            Style::default().fg(TEXT_DIM),
        ));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(panel("DETAIL", false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_patch(frame: &mut Frame, area: Rect, state: &AppState, list: &mut SelectList) {
    let patch = &state.patch;
    let Some(target) = patch.target.as_ref() else {
        let paragraph = Paragraph::new("Pick a creature or boss in the catalog and press Enter.")
            .style(Style::default().fg(TEXT_DIM))
            .block(panel("PATCH", true));
        frame.render_widget(paragraph, area);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(area);

    let block = panel(format!("#{} {}", target.id, target.title), true);
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);
    let items: Vec<Line<'static>> = target
        .stage_names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let marker = if patch.stage == Some(index + 1) { "> " } else { "  " };
            Line::from(format!("{marker}{}. {name}", index + 1))
        })
        .collect();
    let props = SelectListProps {
        items: &items,
        count: items.len(),
        selected: patch.stage_cursor.min(items.len().saturating_sub(1)),
        is_focused: true,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: false,
            wrap_navigation: false,
        },
        on_select: Action::PatchStageCursor,
        render_item: &|item| item.clone(),
    };
    list.render(frame, inner, props);

    let mut lines = vec![
        labeled("Mode", patch.mode.label()),
        labeled("Stage", patch.selected_name().unwrap_or("none selected")),
    ];
    if let Some(url) = patch.current_url() {
        lines.push(labeled("CDN", &url));
        lines.push(labeled("Cache", &sprite::cache_filename(&url)));
    }
    let (canvas_w, canvas_h) = sprite::preview_canvas(patch.mode);
    lines.push(labeled("Canvas", &format!("{canvas_w}x{canvas_h}")));
    lines.push(labeled("Upload", patch.upload_path.as_deref().unwrap_or("-")));
    lines.push(labeled(
        "Scale",
        &format!(
            "{:.1}x  aspect {}",
            patch.plan.scale(),
            if patch.plan.keep_aspect { "kept" } else { "free" }
        ),
    ));
    let encoder = match &patch.encoder_error {
        Some(error) => Line::from(vec![
            Span::styled("Encoder  ", Style::default().fg(TEXT_DIM)),
            Span::styled(error.clone(), Style::default().fg(ACCENT_RED)),
        ]),
        None => labeled("Encoder", "ready"),
    };
    lines.push(encoder);
    lines.push(Line::raw(""));

    if patch.running {
        lines.push(Line::styled(
            format!("Encoding {}", spinner(state.tick)),
            Style::default().fg(ACCENT_GOLD),
        ));
    } else if let Some(error) = &patch.error {
        lines.push(Line::styled(error.clone(), Style::default().fg(ACCENT_RED)));
    } else if let Some(last) = &patch.last {
        let (ow, oh) = last.original_size;
        let (tw, th) = last.target_size;
        lines.push(Line::styled(
            if last.reused { "Export (unchanged input)" } else { "Export" },
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        ));
        lines.push(labeled("Original", &format!("{ow}x{oh}")));
        lines.push(labeled("Resized", &format!("{tw}x{th}")));
        lines.push(labeled("Encoded", &format!("{} bytes", last.encoded_len)));
        lines.push(labeled("File", &last.exported_path.display().to_string()));
    } else if patch.can_encode() {
        lines.push(Line::styled("Press x to encode", Style::default().fg(TEXT_DIM)));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(panel("SPRITE", false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, layout[1]);
}

fn render_moves(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    creature_list: &mut SelectList,
    ability_list: &mut SelectList,
) {
    let moves = &state.moves;
    if !moves.store.is_loaded() {
        let text = if moves.loading {
            Line::styled(format!("Loading dataset {}", spinner(state.tick)), Style::default().fg(TEXT_DIM))
        } else if let Some(error) = &moves.load_error {
            Line::styled(error.clone(), Style::default().fg(ACCENT_RED))
        } else {
            Line::styled("No dataset. l local, R remote, i import.", Style::default().fg(TEXT_DIM))
        };
        frame.render_widget(Paragraph::new(text).block(panel("MOVES", true)), area);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(26),
            Constraint::Percentage(38),
            Constraint::Percentage(36),
        ])
        .split(area);

    let title = if moves.creature_query.is_empty() {
        format!("CREATURES {}", moves.store.creature_count())
    } else {
        format!("CREATURES /{}", moves.creature_query)
    };
    let block = panel(title, moves.focus == MovesFocus::Creatures);
    let inner = block.inner(layout[0]);
    frame.render_widget(block, layout[0]);
    let dataset = moves.store.dataset();
    let creatures: Vec<Line<'static>> = moves
        .creature_ids()
        .into_iter()
        .filter_map(|id| dataset.creature(id))
        .map(|creature| Line::from(creature.selector_label()))
        .collect();
    let props = SelectListProps {
        items: &creatures,
        count: creatures.len(),
        selected: moves.creature_index.min(creatures.len().saturating_sub(1)),
        is_focused: moves.focus == MovesFocus::Creatures,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::MovesCreatureSelect,
        render_item: &|item| item.clone(),
    };
    creature_list.render(frame, inner, props);

    let block = panel(
        format!("ABILITIES {}", moves.store.ability_count()),
        moves.focus == MovesFocus::Abilities,
    );
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);
    let ui_types = moves.store.ui_types();
    let abilities: Vec<Line<'static>> = moves
        .display_abilities()
        .into_iter()
        .map(|(_, ability)| {
            Line::from(vec![
                Span::raw(catalog::short_name(ability.name(), 20)),
                Span::styled(
                    format!("  {}", projection::storage_to_ui(ability, ui_types)),
                    Style::default().fg(ACCENT_TEAL),
                ),
                Span::styled(
                    format!("  [{}]", icon::resolve_icon(ability)),
                    Style::default().fg(TEXT_DIM),
                ),
            ])
        })
        .collect();
    let props = SelectListProps {
        items: &abilities,
        count: abilities.len(),
        selected: moves.ability_index.min(abilities.len().saturating_sub(1)),
        is_focused: moves.focus == MovesFocus::Abilities,
        style: list_style(),
        behavior: SelectListBehavior {
            show_scrollbar: true,
            wrap_navigation: false,
        },
        on_select: Action::MovesAbilitySelect,
        render_item: &|item| item.clone(),
    };
    ability_list.render(frame, inner, props);

    if moves.show_log {
        render_edit_log(frame, layout[2], state);
    } else {
        render_ability_editor(frame, layout[2], state);
    }
}

fn render_ability_editor(frame: &mut Frame, area: Rect, state: &AppState) {
    let moves = &state.moves;
    let mut lines = Vec::new();
    match (moves.selected_creature(), moves.selected_ability(), &moves.buffer) {
        (Some(creature), Some((_, ability)), Some(buffer)) => {
            let preview_icon = buffer.preview_icon(ability);
            let dirty = moves.buffer_dirty();
            lines.push(Line::styled(
                format!("#{} {}", ability.id, buffer.name),
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            ));
            lines.push(labeled("Type", &buffer.ui_type));
            lines.push(labeled("Stored", &format!("{} / {}", ability.kind(), ability.element())));
            lines.push(labeled("Icon", &preview_icon));
            lines.push(labeled("Icon url", &icon::icon_url(&preview_icon)));
            lines.push(labeled("AP", &ability.ap().to_string()));
            lines.push(labeled("True dmg", if ability.true_dmg() { "yes" } else { "no" }));
            if !ability.keys().is_empty() {
                lines.push(labeled("Keys", &ability.keys().join(", ")));
            }
            let mut order = Vec::new();
            if order::can_move_up(creature, ability.id) {
                order.push("K up");
            }
            if order::can_move_down(creature, ability.id) {
                order.push("J down");
            }
            if !order.is_empty() {
                lines.push(labeled("Order", &order.join("  ")));
            }
            lines.push(Line::raw(""));
            if dirty {
                lines.push(Line::styled(
                    "Edited: Enter saves, Esc reverts",
                    Style::default().fg(ACCENT_GOLD),
                ));
            }
        }
        _ => lines.push(Line::styled("No ability selected", Style::default().fg(TEXT_DIM))),
    }

    lines.push(Line::raw(""));
    let source = moves
        .store
        .source()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    lines.push(labeled("Source", &source));
    if let Some(path) = &moves.last_export {
        lines.push(labeled("Exported", path));
    }
    if moves.confirm_discard {
        lines.push(Line::styled(
            "Unsaved edits: press again to discard",
            Style::default().fg(ACCENT_RED),
        ));
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(panel_alt("EDITOR"))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_edit_log(frame: &mut Frame, area: Rect, state: &AppState) {
    let log = state.moves.store.edit_log();
    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = if log.is_empty() {
        vec![Line::styled("No edits yet", Style::default().fg(TEXT_DIM))]
    } else {
        log.iter()
            .rev()
            .take(height.max(1))
            .map(|entry| Line::raw(entry.summary()))
            .collect()
    };
    let paragraph = Paragraph::new(Text::from(lines))
        .block(panel_alt(format!("LOG {}", log.len())))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, body: Rect, state: &AppState) {
    let Some(input) = state.input.as_ref() else {
        return;
    };
    let area = Rect {
        x: body.x + 2,
        y: body.y + body.height.saturating_sub(3),
        width: body.width.saturating_sub(4),
        height: 3.min(body.height),
    };
    frame.render_widget(Clear, area);
    let line = Line::from(vec![
        Span::styled(
            format!("{}: ", input.target.prompt()),
            Style::default().fg(ACCENT_TEAL),
        ),
        Span::raw(format!("{}_", input.value)),
    ]);
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
            .border_style(Style::default().fg(ACCENT_GOLD)),
    );
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let status = state.message.clone().unwrap_or_else(|| {
        if state.catalog.active_resource_loading() {
            "Loading catalog...".to_string()
        } else if state.moves.loading {
            "Loading dataset...".to_string()
        } else if state.patch.running {
            "Encoding...".to_string()
        } else {
            String::new()
        }
    });
    let (left_hints, center_hints) = status_hints(state);
    let status_span = Span::styled(status.as_str(), Style::default().fg(ACCENT_GOLD));
    let status_items = [StatusBarItem::span(status_span)];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT_TEAL)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };

    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn status_hints(state: &AppState) -> (Vec<StatusBarHint<'static>>, Vec<StatusBarHint<'static>>) {
    if state.input_active() {
        let left = vec![
            StatusBarHint::new("Enter", "Apply"),
            StatusBarHint::new("Esc", "Cancel"),
        ];
        return (left, Vec::new());
    }

    let left = match state.screen {
        Screen::Catalog => vec![
            StatusBarHint::new("j/k", "Move"),
            StatusBarHint::new("PgUp/PgDn", "Page"),
            StatusBarHint::new("Tab", "Bosses"),
            StatusBarHint::new("/", "Search"),
            StatusBarHint::new("r/e", "Filter"),
            StatusBarHint::new("c", "Clear"),
            StatusBarHint::new("Enter", "Patch"),
        ],
        Screen::Patch => vec![
            StatusBarHint::new("j/k", "Stage"),
            StatusBarHint::new("Enter", "Pick"),
            StatusBarHint::new("m", "Mode"),
            StatusBarHint::new("u", "Upload"),
            StatusBarHint::new("+/-/0", "Scale"),
            StatusBarHint::new("a", "Aspect"),
            StatusBarHint::new("x", "Encode"),
        ],
        Screen::Moves => vec![
            StatusBarHint::new("Tab", "Focus"),
            StatusBarHint::new("n", "Name"),
            StatusBarHint::new("[ ]", "Type"),
            StatusBarHint::new("J/K", "Order"),
            StatusBarHint::new("+/-", "AP"),
            StatusBarHint::new("t", "True dmg"),
            StatusBarHint::new("h", "Log"),
            StatusBarHint::new("e", "Export"),
        ],
    };
    let center = vec![
        StatusBarHint::new("1-3", "Screen"),
        StatusBarHint::new("q", "Quit"),
    ];
    (left, center)
}

fn panel<'a>(title: impl Into<Line<'a>>, focused: bool) -> Block<'a> {
    let border = if focused { ACCENT_TEAL } else { TEXT_DIM };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(border))
}

fn panel_alt<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().bg(BG_PANEL_ALT).fg(TEXT_MAIN))
        .border_style(Style::default().fg(TEXT_DIM))
}

fn labeled(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<9}"), Style::default().fg(TEXT_DIM)),
        Span::styled(value.to_string(), Style::default().fg(TEXT_MAIN)),
    ])
}

fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}

fn list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: None,
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}
