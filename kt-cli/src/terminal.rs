use std::io::Write;

use async_trait::async_trait;
use kt_core::prelude::*;
use kt_core::session::{
    Operator,
    SessionEvent,
    SwitchSignal,
};
use ratatui::crossterm::event::{
    read,
    Event,
    KeyCode,
    KeyEvent,
    KeyEventKind,
    KeyModifiers,
};
use ratatui::crossterm::terminal::{
    disable_raw_mode,
    enable_raw_mode,
};
use tokio::io::{
    AsyncBufReadExt,
    BufReader,
    Lines,
    Stdin,
};
use tokio::sync::mpsc;
use tracing::*;

use crate::display::Display;

#[derive(Debug)]
enum Input {
    Line(String),
    Eof,
}

#[derive(Debug, Eq, PartialEq)]
enum KeyAction {
    Echo(char),
    Erase,
    Submit(String),
    Switch,
    Eof,
    Ignore,
}

// The line being typed at the terminal; in raw mode we have to do our own (very basic) editing.
#[derive(Default)]
struct LineEditor {
    buf: String,
}

impl LineEditor {
    fn handle(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('n') if ctrl => {
                self.buf.clear();
                KeyAction::Switch
            },
            KeyCode::Char('c') if ctrl => {
                self.buf.clear();
                KeyAction::Submit("exit".into())
            },
            KeyCode::Char('d') if ctrl && self.buf.is_empty() => KeyAction::Eof,
            KeyCode::Char(_) if ctrl => KeyAction::Ignore,
            KeyCode::Char(c) => {
                self.buf.push(c);
                KeyAction::Echo(c)
            },
            KeyCode::Backspace => match self.buf.pop() {
                Some(_) => KeyAction::Erase,
                None => KeyAction::Ignore,
            },
            KeyCode::Enter => KeyAction::Submit(std::mem::take(&mut self.buf)),
            _ => KeyAction::Ignore,
        }
    }
}

// Clears raw mode when dropped, so the terminal is usable again however we exit
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> anyhow::Result<RawModeGuard> {
        enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!("could not restore terminal: {err}");
        }
    }
}

// Raw mode doesn't translate newlines for us
fn write_raw(text: &str) -> EmptyResult {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", text.replace('\n', "\r\n"))?;
    stdout.flush()?;
    Ok(())
}

// Runs on its own thread for the lifetime of the process: keystrokes have to be seen (and Ctrl+N
// acted on) even while the session is busy talking to the backend or the cluster.
fn listen(lines: &mpsc::UnboundedSender<Input>, switch: &SwitchSignal) -> EmptyResult {
    let mut editor = LineEditor::default();
    loop {
        let Event::Key(key) = read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let input = match editor.handle(key) {
            KeyAction::Ignore => continue,
            KeyAction::Echo(c) => {
                write_raw(&c.to_string())?;
                continue;
            },
            KeyAction::Erase => {
                write_raw("\u{8} \u{8}")?;
                continue;
            },
            KeyAction::Switch => {
                write_raw("\n")?;
                debug!("switch requested from the keyboard");
                switch.raise();
                continue;
            },
            KeyAction::Submit(line) => Input::Line(line),
            KeyAction::Eof => Input::Eof,
        };

        write_raw("\n")?;
        if lines.send(input).is_err() {
            // nobody is reading anymore
            return Ok(());
        }
    }
}

pub struct TerminalOperator {
    lines: mpsc::UnboundedReceiver<Input>,
    display: Display,
    _raw_mode: RawModeGuard,
}

impl TerminalOperator {
    pub fn start(switch: SwitchSignal, display: Display) -> anyhow::Result<TerminalOperator> {
        let raw_mode = RawModeGuard::enable()?;
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new().name("key-listener".into()).spawn(move || {
            if let Err(err) = listen(&tx, &switch) {
                error!("keyboard listener stopped: {err}");
            }
        })?;

        Ok(TerminalOperator { lines: rx, display, _raw_mode: raw_mode })
    }
}

#[async_trait]
impl Operator for TerminalOperator {
    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write_raw(prompt)?;

        // mpsc::Receiver::recv is cancel-safe, so a line is never lost if we get interrupted here
        match self.lines.recv().await {
            Some(Input::Line(line)) => Ok(Some(line)),
            Some(Input::Eof) | None => Ok(None),
        }
    }

    fn show(&mut self, event: SessionEvent) {
        if let Err(err) = write_raw(&format!("{}\n", self.display.render(&event))) {
            warn!("could not write to terminal: {err}");
        }
    }
}

// Used when stdin isn't a terminal (e.g., input piped in from a file); there's no way to send
// Ctrl+N here, so `switch <n>` is the only way to change pods.
pub struct PipedOperator {
    lines: Lines<BufReader<Stdin>>,
    display: Display,
}

impl PipedOperator {
    pub fn new(display: Display) -> PipedOperator {
        PipedOperator { lines: BufReader::new(tokio::io::stdin()).lines(), display }
    }
}

#[async_trait]
impl Operator for PipedOperator {
    async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;

        let line = self.lines.next_line().await?;
        if let Some(l) = line.as_ref() {
            println!("{l}");
        }
        Ok(line)
    }

    fn show(&mut self, event: SessionEvent) {
        println!("{}", self.display.render(&event));
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn press(editor: &mut LineEditor, code: KeyCode) -> KeyAction {
        editor.handle(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(editor: &mut LineEditor, c: char) -> KeyAction {
        editor.handle(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[rstest]
    fn test_line_editor_submit() {
        let mut editor = LineEditor::default();
        for c in "hix".chars() {
            assert_eq!(press(&mut editor, KeyCode::Char(c)), KeyAction::Echo(c));
        }
        assert_eq!(press(&mut editor, KeyCode::Backspace), KeyAction::Erase);
        assert_eq!(press(&mut editor, KeyCode::Enter), KeyAction::Submit("hi".into()));

        // the buffer starts over after a submit
        assert_eq!(press(&mut editor, KeyCode::Backspace), KeyAction::Ignore);
        assert_eq!(press(&mut editor, KeyCode::Enter), KeyAction::Submit("".into()));
    }

    #[rstest]
    fn test_line_editor_switch_discards_partial_line() {
        let mut editor = LineEditor::default();
        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(ctrl(&mut editor, 'n'), KeyAction::Switch);
        press(&mut editor, KeyCode::Char('b'));
        assert_eq!(press(&mut editor, KeyCode::Enter), KeyAction::Submit("b".into()));
    }

    #[rstest]
    fn test_line_editor_ctrl_c_exits() {
        let mut editor = LineEditor::default();
        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(ctrl(&mut editor, 'c'), KeyAction::Submit("exit".into()));
    }

    #[rstest]
    fn test_line_editor_ctrl_d_only_on_empty_line() {
        let mut editor = LineEditor::default();
        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(ctrl(&mut editor, 'd'), KeyAction::Ignore);
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(ctrl(&mut editor, 'd'), KeyAction::Eof);
    }

    #[rstest]
    fn test_line_editor_ignores_other_keys() {
        let mut editor = LineEditor::default();
        assert_eq!(press(&mut editor, KeyCode::Up), KeyAction::Ignore);
        assert_eq!(ctrl(&mut editor, 'x'), KeyAction::Ignore);
        assert_eq!(press(&mut editor, KeyCode::Enter), KeyAction::Submit("".into()));
    }
}
