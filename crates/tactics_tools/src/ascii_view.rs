//! ASCII battlefield view for terminal inspection.
//!
//! Renders a session frame the way a renderer would draw it: terrain,
//! units, the cursor, movement and attack overlays, the open menu and the
//! unit-info panel.
//!
//! ```text
//! ╔══ Prologue │ 8x6 │ state: unit_selected ══╗
//!  .  .  +  +  x  .  #  .
//!  .  +  +  S  +  x  #  .
//!  .  . [+] +  x  .  .  b
//! ```

use std::fmt::Write as _;

use tactics_core::prelude::*;

/// ASCII view configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Show the unit legend under the grid.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Terrain glyph for a cell.
fn terrain_char(tile: Option<&TileType>) -> char {
    match tile {
        None => ' ',
        Some(tile) if !tile.passable => '#',
        Some(tile) => match tile.move_cost {
            0 | 1 => '.',
            2 => '"',
            _ => '^',
        },
    }
}

/// Unit glyph: first letter of the name, upper case for the player.
fn unit_char(unit: &Unit) -> char {
    let base = unit.name.chars().next().unwrap_or('?');
    match unit.faction {
        Faction::Player => base.to_ascii_uppercase(),
        Faction::Enemy => base.to_ascii_lowercase(),
    }
}

fn faction_color(faction: Faction) -> &'static str {
    match faction {
        Faction::Player => colors::BLUE,
        Faction::Enemy => colors::RED,
    }
}

/// Render the current frame of `session`, or `None` if no map is loaded.
#[must_use]
pub fn render_session(session: &MapSession, config: &AsciiConfig) -> Option<String> {
    let field = session.battlefield()?;
    let view = session.view()?;
    Some(render_view(field, &view, config))
}

/// Render one frame.
#[must_use]
pub fn render_view(field: &Battlefield, view: &SessionView<'_>, config: &AsciiConfig) -> String {
    let mut output = String::new();
    let (width, height) = view.dimensions;
    let (bold, reset) = if config.use_color {
        (colors::BOLD, colors::RESET)
    } else {
        ("", "")
    };

    let _ = writeln!(
        output,
        "{bold}╔══ {} │ {width}x{height} │ state: {} ══╗{reset}",
        view.map_name, view.state
    );

    for y in 0..height {
        for x in 0..width {
            let pos = GridPos::new(x, y);
            let (open, close) = if pos == view.cursor { ('[', ']') } else { (' ', ' ') };
            output.push(open);
            push_cell(&mut output, field, view, pos, config);
            output.push(close);
        }
        output.push('\n');
    }

    if let Some(menu) = &view.menu {
        render_menu(&mut output, menu);
    }

    if let Some(unit) = view.unit_info {
        render_unit_info(&mut output, field, unit);
    }

    if config.show_legend {
        let _ = writeln!(output, "╠══ UNITS ══╣");
        for (index, unit) in field.roster().iter() {
            let color = if config.use_color { faction_color(unit.faction) } else { "" };
            let marker = if view.selected == Some(index) { '*' } else { ' ' };
            let _ = writeln!(
                output,
                "{marker}{color}{}{reset} {} ({}) {} hp {}/{} {}{}",
                unit_char(unit),
                unit.name,
                unit.faction,
                unit.position,
                unit.stats.hp,
                unit.stats.max_hp,
                unit.equipped_item().unwrap_or("unarmed"),
                if unit.has_moved { " [moved]" } else { "" }
            );
        }
        let _ = writeln!(
            output,
            "#=wall .=plain \"=rough ^=steep +=move x=attack [ ]=cursor"
        );
    }

    output.push_str("╚══╝\n");
    output
}

fn push_cell(
    output: &mut String,
    field: &Battlefield,
    view: &SessionView<'_>,
    pos: GridPos,
    config: &AsciiConfig,
) {
    if let Some(unit) = field
        .roster()
        .unit_at(pos)
        .and_then(|index| field.roster().get(index).ok())
    {
        let ch = unit_char(unit);
        if config.use_color {
            let dim = if unit.has_moved { colors::DIM } else { "" };
            let _ = write!(output, "{dim}{}{ch}{}", faction_color(unit.faction), colors::RESET);
        } else {
            output.push(ch);
        }
        return;
    }

    let (ch, color) = if view.movement.map_or(false, |cells| cells.contains(&pos)) {
        ('+', colors::CYAN)
    } else if view.attack.map_or(false, |cells| cells.contains(&pos)) {
        ('x', colors::YELLOW)
    } else {
        (terrain_char(field.grid().tile_at(pos).ok().flatten()), "")
    };

    if config.use_color && !color.is_empty() {
        let _ = write!(output, "{color}{ch}{}", colors::RESET);
    } else {
        output.push(ch);
    }
}

fn render_menu(output: &mut String, menu: &MenuView) {
    let _ = writeln!(output, "╠══ MENU ══╣");
    match menu {
        MenuView::Action { rows, highlighted } => {
            for (row, label) in rows.iter().enumerate() {
                let pointer = if row == *highlighted { '>' } else { ' ' };
                let _ = writeln!(output, "{pointer} {label}");
            }
        }
        MenuView::Inventory {
            items,
            highlighted,
            drop_enabled,
        } => {
            for (row, item) in items.iter().enumerate() {
                let pointer = if row == *highlighted { '>' } else { ' ' };
                let equipped = if item.equipped { 'E' } else { ' ' };
                let usable = if item.wieldable { "" } else { " (cannot wield)" };
                let _ = writeln!(output, "{pointer} {equipped} {}{usable}", item.name);
            }
            let pointer = if *highlighted == items.len() { '>' } else { ' ' };
            let state = if *drop_enabled { "" } else { " (nothing equipped)" };
            let _ = writeln!(output, "{pointer}   Drop{state}");
        }
        MenuView::DropConfirm { item, choice } => {
            let _ = writeln!(output, "  Drop {item}?");
            for option in [DropChoice::Yes, DropChoice::No] {
                let pointer = if option == *choice { '>' } else { ' ' };
                let _ = writeln!(output, "{pointer} {option:?}");
            }
        }
    }
}

fn render_unit_info(output: &mut String, field: &Battlefield, unit: &Unit) {
    let stats = &unit.stats;
    let weapon = unit
        .equipped_item()
        .map(|id| field.equipment().weapon_or_placeholder(id));
    let _ = writeln!(output, "╠══ {} ══╣", unit.name);
    let _ = writeln!(
        output,
        "  {} Lv {} ({}) at {}",
        unit.class_name, unit.level, unit.faction, unit.position
    );
    let _ = writeln!(
        output,
        "  HP {}/{}  Str {}  Mag {}  Skl {}  Spd {}  Lck {}  Def {}  Res {}  Con {}  Mov {}",
        stats.hp,
        stats.max_hp,
        stats.strength,
        stats.magic,
        stats.skill,
        stats.speed,
        stats.luck,
        stats.defense,
        stats.resistance,
        stats.constitution,
        stats.movement
    );
    match weapon {
        Some(weapon) => {
            let _ = writeln!(
                output,
                "  {} ({}) Mt {} Hit {} Crt {} Rng {:?}",
                weapon.name, weapon.weapon_type, weapon.might, weapon.hit, weapon.crit, weapon.range
            );
        }
        None => {
            let _ = writeln!(output, "  Unarmed");
        }
    }
}
