//! Event scripts: one command per line. Lines starting with `#` are
//! comments; a `#` anywhere else belongs to the command (`click #id`).
//!
//! ```text
//! path /gallery.html
//! click #t2
//! key ArrowRight
//! scroll 900
//! tick 100
//! input #email ada@example.com
//! submit #contact-form
//! intersect .card 0.5
//! track signup {"plan": "free"}
//! ```

use serde_json::Value;
use vitrine_types::error::{Result, VitrineError};
use vitrine_types::input::Key;
use vitrine_widgets::{Analytics, Page};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Click(String),
    Key(Key),
    Scroll(i32),
    Tick(u64),
    Submit(String),
    Input { selector: String, value: String },
    Intersect { selector: String, ratio: f32 },
    Path(String),
    Track { name: String, props: Value },
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let cmd = parse_line(line)
            .map_err(|e| VitrineError::Script(format!("line {}: {e}", i + 1)))?;
        commands.push(cmd);
    }
    Ok(commands)
}

fn parse_line(line: &str) -> std::result::Result<Command, String> {
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(v, r)| (v, r.trim()));
    let need = |what: &str| {
        if rest.is_empty() {
            Err(format!("`{verb}` needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };
    match verb {
        "click" => Ok(Command::Click(need("a selector")?)),
        "submit" => Ok(Command::Submit(need("a selector")?)),
        "path" => Ok(Command::Path(need("a path")?)),
        "key" => Ok(Command::Key(Key::from_name(&need("a key name")?))),
        "scroll" => need("an offset")?
            .parse()
            .map(Command::Scroll)
            .map_err(|_| format!("bad scroll offset {rest:?}")),
        "tick" => need("milliseconds")?
            .parse()
            .map(Command::Tick)
            .map_err(|_| format!("bad tick duration {rest:?}")),
        "input" => {
            let (selector, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "`input` needs a selector and a value".to_string())?;
            Ok(Command::Input {
                selector: selector.to_string(),
                value: value.trim().to_string(),
            })
        },
        "intersect" => {
            let (selector, ratio) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| "`intersect` needs a selector and a ratio".to_string())?;
            let ratio: f32 = ratio
                .parse()
                .map_err(|_| format!("bad intersection ratio {ratio:?}"))?;
            if !(0.0..=1.0).contains(&ratio) {
                return Err(format!("intersection ratio {ratio} outside 0..=1"));
            }
            Ok(Command::Intersect {
                selector: selector.trim().to_string(),
                ratio,
            })
        },
        "track" => {
            need("an event name")?;
            let (name, json) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, None), |(n, j)| (n, Some(j)));
            let props = match json {
                Some(json) => serde_json::from_str(json).map_err(|e| format!("bad props: {e}"))?,
                None => Value::Object(Default::default()),
            };
            Ok(Command::Track {
                name: name.to_string(),
                props,
            })
        },
        other => Err(format!("unknown command `{other}`")),
    }
}

/// Replay `commands` against `page`.
pub fn run(page: &mut Page, commands: &[Command]) -> Result<()> {
    for cmd in commands {
        log::debug!("script: {cmd:?}");
        match cmd {
            Command::Click(sel) => {
                page.click(sel)?;
            },
            Command::Key(key) => {
                page.key(key.clone());
            },
            Command::Scroll(y) => {
                page.scroll_to(*y);
            },
            Command::Tick(ms) => page.advance(*ms),
            Command::Submit(sel) => {
                page.submit(sel)?;
            },
            Command::Input { selector, value } => page.input(selector, value)?,
            Command::Intersect { selector, ratio } => {
                page.intersect(selector, *ratio)?;
            },
            Command::Path(path) => page.set_location(path),
            Command::Track { name, props } => match page.widget_mut::<Analytics>() {
                Some(analytics) => analytics.track_event(name, props.clone()),
                None => log::warn!("no analytics widget installed, dropping {name}"),
            },
        }
    }
    Ok(())
}
